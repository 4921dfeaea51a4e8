//! Detection feed
//!
//! Runs on its own cadence: grab a frame, hand it to the detector, turn
//! the result into obstacles and overwrite the shared slot, repeat. The
//! render loop only ever sees the most recent complete obstacle set.

use std::cell::RefCell;
use std::rc::Rc;

use crate::coordinator::SessionHandle;
use crate::error::Result;
use crate::sim::{FrameSettings, LandmarkSet, ObstacleRect, extract};

/// Single-slot "latest obstacles" channel
///
/// Writes replace the whole set; reads hand out a cheap shared snapshot
/// that stays valid no matter what gets published afterwards.
#[derive(Debug, Clone, Default)]
pub struct ObstacleSlot {
    inner: Rc<RefCell<SlotInner>>,
}

#[derive(Debug, Default)]
struct SlotInner {
    rects: Rc<[ObstacleRect]>,
    version: u64,
}

impl ObstacleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current obstacle set
    pub fn publish(&self, rects: Vec<ObstacleRect>) {
        let mut inner = self.inner.borrow_mut();
        inner.rects = rects.into();
        inner.version += 1;
    }

    /// The most recently published set
    pub fn snapshot(&self) -> Rc<[ObstacleRect]> {
        self.inner.borrow().rects.clone()
    }

    /// Number of publishes so far
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }
}

/// External hand detector (MediaPipe Hands on the web)
#[allow(async_fn_in_trait)]
pub trait HandDetector {
    type Frame;

    /// Detect every hand in the frame, in the detector's own order
    async fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<LandmarkSet>>;
}

/// Supplier of camera frames; `None` ends the feed
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    type Frame;

    async fn next_frame(&mut self) -> Option<Self::Frame>;
}

/// Counters for the feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Detections that replaced the obstacle set
    pub published: u64,
    /// Detections skipped because they failed or were malformed
    pub failed: u64,
}

/// Turns detector results into published obstacle sets
pub struct DetectionFeed {
    frame: FrameSettings,
    slot: ObstacleSlot,
    stats: FeedStats,
}

impl DetectionFeed {
    pub fn new(frame: FrameSettings, slot: ObstacleSlot) -> Self {
        Self {
            frame,
            slot,
            stats: FeedStats::default(),
        }
    }

    pub fn stats(&self) -> FeedStats {
        self.stats
    }

    pub fn slot(&self) -> &ObstacleSlot {
        &self.slot
    }

    /// Handle one detector result
    ///
    /// Failures keep the previous obstacle set. Returns whether the set
    /// was replaced.
    pub fn publish(&mut self, result: Result<Vec<LandmarkSet>>) -> bool {
        match result.and_then(|hands| extract(&hands, &self.frame)) {
            Ok(rects) => {
                if rects.len() != self.slot.snapshot().len() {
                    log::debug!("Tracking {} hand(s)", rects.len());
                }
                self.slot.publish(rects);
                self.stats.published += 1;
                true
            }
            Err(e) => {
                self.stats.failed += 1;
                log::warn!("Skipping detection: {e}");
                false
            }
        }
    }

    /// Feed frames to the detector until the session stops or frames run out
    pub async fn run<D, S>(&mut self, detector: &mut D, frames: &mut S, session: &SessionHandle)
    where
        D: HandDetector,
        S: FrameSource<Frame = D::Frame>,
    {
        log::info!("Detection feed started");
        while session.is_running() {
            let Some(frame) = frames.next_frame().await else {
                break;
            };
            let result = detector.detect(&frame).await;
            // The session may have ended while the detector was busy
            if !session.is_running() {
                break;
            }
            self.publish(result);
        }
        log::info!(
            "Detection feed stopped ({} published, {} failed)",
            self.stats.published,
            self.stats.failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use glam::Vec2;
    use std::collections::VecDeque;

    fn frame() -> FrameSettings {
        FrameSettings::new(100, 100).unwrap()
    }

    fn hand(x0: f32, y0: f32, x1: f32, y1: f32) -> LandmarkSet {
        LandmarkSet::new(vec![Vec2::new(x0, y0), Vec2::new(x1, y1)])
    }

    /// Replays canned results, one per frame
    struct ScriptedDetector {
        results: VecDeque<Result<Vec<LandmarkSet>>>,
        seen: Vec<u32>,
        stop_after: Option<(usize, SessionHandle)>,
    }

    impl ScriptedDetector {
        fn new(results: Vec<Result<Vec<LandmarkSet>>>) -> Self {
            Self {
                results: results.into(),
                seen: Vec::new(),
                stop_after: None,
            }
        }
    }

    impl HandDetector for ScriptedDetector {
        type Frame = u32;

        async fn detect(&mut self, frame: &u32) -> Result<Vec<LandmarkSet>> {
            self.seen.push(*frame);
            if let Some((n, session)) = &self.stop_after {
                if self.seen.len() >= *n {
                    session.stop();
                }
            }
            self.results.pop_front().unwrap_or(Ok(Vec::new()))
        }
    }

    struct CountingFrames {
        next: u32,
        limit: u32,
    }

    impl FrameSource for CountingFrames {
        type Frame = u32;

        async fn next_frame(&mut self) -> Option<u32> {
            if self.next >= self.limit {
                return None;
            }
            self.next += 1;
            Some(self.next)
        }
    }

    #[test]
    fn test_slot_snapshot_is_stable() {
        let slot = ObstacleSlot::new();
        slot.publish(vec![ObstacleRect::new(1.0, 2.0, 3.0, 4.0)]);
        let snap = slot.snapshot();
        slot.publish(Vec::new());

        assert_eq!(snap.len(), 1);
        assert!(slot.snapshot().is_empty());
        assert_eq!(slot.version(), 2);
    }

    #[test]
    fn test_publish_replaces_whole_set() {
        let slot = ObstacleSlot::new();
        let mut feed = DetectionFeed::new(frame(), slot.clone());

        assert!(feed.publish(Ok(vec![hand(0.1, 0.1, 0.2, 0.2), hand(0.5, 0.5, 0.6, 0.6)])));
        assert_eq!(slot.snapshot().len(), 2);

        // One hand leaves the frame
        assert!(feed.publish(Ok(vec![hand(0.5, 0.5, 0.6, 0.6)])));
        let rects = slot.snapshot();
        assert_eq!(rects.len(), 1);
        assert!((rects[0].x - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_failure_keeps_previous_set() {
        let slot = ObstacleSlot::new();
        let mut feed = DetectionFeed::new(frame(), slot.clone());
        feed.publish(Ok(vec![hand(0.1, 0.1, 0.2, 0.2)]));

        assert!(!feed.publish(Err(Error::Detection("model crashed".into()))));
        assert!(!feed.publish(Ok(vec![LandmarkSet::default()])));

        assert_eq!(slot.snapshot().len(), 1);
        assert_eq!(slot.version(), 1);
        assert_eq!(feed.stats(), FeedStats { published: 1, failed: 2 });
    }

    #[test]
    fn test_run_until_frames_end() {
        let slot = ObstacleSlot::new();
        let mut feed = DetectionFeed::new(frame(), slot.clone());
        let mut detector = ScriptedDetector::new(vec![
            Ok(vec![hand(0.1, 0.1, 0.2, 0.2)]),
            Err(Error::Detection("blip".into())),
            Ok(vec![hand(0.3, 0.3, 0.4, 0.4), hand(0.7, 0.7, 0.8, 0.8)]),
        ]);
        let mut frames = CountingFrames { next: 0, limit: 3 };
        let session = SessionHandle::new();

        pollster::block_on(feed.run(&mut detector, &mut frames, &session));

        assert_eq!(detector.seen, vec![1, 2, 3]);
        assert_eq!(feed.stats(), FeedStats { published: 2, failed: 1 });
        assert_eq!(slot.snapshot().len(), 2);
    }

    #[test]
    fn test_run_stops_with_session() {
        let slot = ObstacleSlot::new();
        let mut feed = DetectionFeed::new(frame(), slot.clone());
        let session = SessionHandle::new();
        let mut detector = ScriptedDetector::new(vec![Ok(vec![hand(0.1, 0.1, 0.2, 0.2)])]);
        detector.stop_after = Some((2, session.clone()));
        let mut frames = CountingFrames { next: 0, limit: 100 };

        pollster::block_on(feed.run(&mut detector, &mut frames, &session));

        assert_eq!(detector.seen.len(), 2);
        // The result that arrived after teardown was dropped
        assert_eq!(feed.stats().published, 1);
        assert_eq!(slot.snapshot().len(), 1);
    }

    #[test]
    fn test_run_on_stopped_session_does_nothing() {
        let mut feed = DetectionFeed::new(frame(), ObstacleSlot::new());
        let session = SessionHandle::new();
        session.stop();
        let mut detector = ScriptedDetector::new(Vec::new());
        let mut frames = CountingFrames { next: 0, limit: 5 };

        pollster::block_on(feed.run(&mut detector, &mut frames, &session));
        assert!(detector.seen.is_empty());
    }
}
