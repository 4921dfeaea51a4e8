//! Render loop coordinator
//!
//! Owns the session and runs one render tick per display refresh:
//! clear the surface, then step and draw every registered entity in
//! registration order (obstacle overlay first, then the ball).
//!
//! The obstacle set is read once at the start of each tick, so every
//! entity in that tick sees the same snapshot even if a detection lands
//! while the tick is running.

use std::cell::Cell;
use std::rc::Rc;

use crate::audio::{DurationSampler, ToneSink};
use crate::error::Result;
use crate::feed::ObstacleSlot;
use crate::renderer::{Color, Palette, Surface};
use crate::settings::Settings;
use crate::sim::{CollisionResult, FrameSettings, MovingCircle, ObstacleRect, step_ball};

/// Shared liveness flag for one session
///
/// Cloned into both the render loop and the detection feed; once stopped,
/// neither reschedules itself.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    running: Rc<Cell<bool>>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            running: Rc::new(Cell::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn stop(&self) {
        self.running.set(false);
    }
}

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No session
    Idle,
    /// One tick per display refresh
    Running,
}

/// Everything a tick needs to read
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Display refresh timestamp (ms)
    pub now: f64,
    pub frame: &'a FrameSettings,
    pub obstacles: &'a [ObstacleRect],
}

/// Outlines of the detected hands
#[derive(Debug, Clone, Default)]
pub struct ObstacleOverlay;

/// The ball plus its cosmetic state
#[derive(Debug, Clone)]
pub struct BallEntity {
    pub circle: MovingCircle,
    pub color: Color,
    palette: Palette,
}

impl BallEntity {
    pub fn new(circle: MovingCircle, color: Color, palette: Palette) -> Self {
        Self {
            circle,
            color,
            palette,
        }
    }

    fn step(&mut self, ctx: &TickContext) -> CollisionResult {
        let result = step_ball(&mut self.circle, ctx.obstacles, ctx.frame, ctx.now);
        if result.bounce.any() {
            self.color = self.palette.next_color();
            log::debug!("Bounce at {:?}, color {}", self.circle.pos, self.color.to_css());
        }
        result
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.set_fill_color(self.color);
        surface.fill_circle(self.circle.pos, self.circle.radius);
    }
}

/// Something that is stepped and drawn once per tick
#[derive(Debug, Clone)]
pub enum Entity {
    Overlay(ObstacleOverlay),
    Ball(BallEntity),
}

impl Entity {
    /// Advance the entity; only the ball reports collisions
    pub fn step(&mut self, ctx: &TickContext) -> Option<CollisionResult> {
        match self {
            Entity::Overlay(_) => None,
            Entity::Ball(ball) => Some(ball.step(ctx)),
        }
    }

    pub fn render(&self, ctx: &TickContext, surface: &mut dyn Surface) {
        match self {
            Entity::Overlay(_) => {
                for rect in ctx.obstacles {
                    surface.stroke_rect(rect);
                }
            }
            Entity::Ball(ball) => ball.render(surface),
        }
    }
}

/// State of one running session
#[derive(Debug)]
pub struct Session {
    pub frame: FrameSettings,
    pub obstacles: ObstacleSlot,
    pub entities: Vec<Entity>,
    pub handle: SessionHandle,
}

impl Session {
    /// Register the overlay and a resting ball at the frame center
    pub fn new(
        frame: FrameSettings,
        settings: &Settings,
        obstacles: ObstacleSlot,
        now: f64,
        seed: u64,
    ) -> Result<Self> {
        let circle =
            MovingCircle::centered(&frame, settings.radius_divisor, settings.speed_divisor, now)?;
        let ball = BallEntity::new(circle, settings.ball_color()?, Palette::new(seed));

        Ok(Self {
            frame,
            obstacles,
            entities: vec![Entity::Overlay(ObstacleOverlay), Entity::Ball(ball)],
            handle: SessionHandle::new(),
        })
    }

    /// The first registered ball
    pub fn ball(&self) -> Option<&BallEntity> {
        self.entities.iter().find_map(|e| match e {
            Entity::Ball(ball) => Some(ball),
            _ => None,
        })
    }
}

/// What happened during one render tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub obstacles: usize,
    /// Obstacle that redirected the ball
    pub hit: Option<usize>,
    /// Whether the ball bounced off a frame edge (color + tone fired)
    pub bounced: bool,
}

/// Drives render ticks for at most one session at a time
pub struct LoopCoordinator<S, T, D> {
    surface: S,
    tone: T,
    sampler: D,
    session: Option<Session>,
    ticks: u64,
}

impl<S, T, D> LoopCoordinator<S, T, D>
where
    S: Surface,
    T: ToneSink,
    D: DurationSampler,
{
    pub fn new(surface: S, tone: T, sampler: D) -> Self {
        Self {
            surface,
            tone,
            sampler,
            session: None,
            ticks: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        match &self.session {
            Some(session) if session.handle.is_running() => LoopState::Running,
            _ => LoopState::Idle,
        }
    }

    /// Enter Running with a freshly set up session
    ///
    /// Any previous session is torn down first. Returns the handle shared
    /// with the detection feed.
    pub fn start(&mut self, session: Session) -> SessionHandle {
        self.stop();
        let handle = session.handle.clone();
        log::info!(
            "Session started ({}x{})",
            session.frame.width,
            session.frame.height
        );
        self.session = Some(session);
        self.ticks = 0;
        handle
    }

    /// Tear down the session; both loops stop rescheduling
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            session.handle.stop();
            log::info!("Session stopped after {} ticks", self.ticks);
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn tone(&self) -> &T {
        &self.tone
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one render tick at display time `now` (ms)
    ///
    /// Returns `None` when Idle; the caller should stop rescheduling.
    pub fn render_tick(&mut self, now: f64) -> Option<TickReport> {
        if self.state() == LoopState::Idle {
            // Drop a session whose handle was stopped from elsewhere
            self.stop();
            return None;
        }
        let session = self.session.as_mut()?;

        let obstacles = session.obstacles.snapshot();
        let ctx = TickContext {
            now,
            frame: &session.frame,
            obstacles: &obstacles,
        };

        let size = session.frame.size();
        self.surface.clear_rect(0.0, 0.0, size.x, size.y);

        let mut report = TickReport {
            obstacles: obstacles.len(),
            hit: None,
            bounced: false,
        };
        for entity in session.entities.iter_mut() {
            if let Some(result) = entity.step(&ctx) {
                report.hit = report.hit.or(result.hit);
                report.bounced |= result.bounce.any();
            }
            entity.render(&ctx, &mut self.surface);
        }

        if report.bounced {
            let duration = self.sampler.sample_duration();
            self.tone.play_tone(duration);
        }

        self.ticks += 1;
        Some(report)
    }
}
