//! Hand Bounce entry point
//!
//! On the web: acquires the camera, starts MediaPipe Hands and runs the
//! render loop and detection feed. Natively: runs a short headless session
//! with a scripted hand.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use js_sys::{Array, Float32Array, Object, Reflect};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{HtmlCanvasElement, HtmlVideoElement, MediaStream, MediaStreamTrack};

    use hand_bounce::audio::{AudioManager, HalfNormalDuration};
    use hand_bounce::feed::{FrameSource, HandDetector};
    use hand_bounce::renderer::CanvasSurface;
    use hand_bounce::sim::{FrameSettings, LandmarkSet};
    use hand_bounce::{
        DetectionFeed, Error, LoopCoordinator, ObstacleSlot, Result, Session, Settings,
    };

    // MediaPipe Hands shim; landmarks come back as flat [x0, y0, x1, y1, ...] per hand
    #[wasm_bindgen(inline_js = "
        export function create_hands(modelComplexity, maxNumHands) {
            const hands = new Hands({
                locateFile: file => `https://cdn.jsdelivr.net/npm/@mediapipe/hands/${file}`
            });
            hands.setOptions({ modelComplexity, maxNumHands });
            hands._latest = [];
            hands.onResults(results => {
                hands._latest = (results.multiHandLandmarks || [])
                    .map(marks => marks.flatMap(m => [m.x, m.y]));
            });
            return hands;
        }

        export async function detect_hands(hands, video) {
            hands._latest = [];
            await hands.send({ image: video });
            return hands._latest;
        }
    ")]
    extern "C" {
        #[wasm_bindgen(catch)]
        fn create_hands(
            model_complexity: u8,
            max_hands: u8,
        ) -> std::result::Result<JsValue, JsValue>;

        #[wasm_bindgen(catch)]
        async fn detect_hands(
            hands: &JsValue,
            video: &HtmlVideoElement,
        ) -> std::result::Result<JsValue, JsValue>;
    }

    type WebLoop = LoopCoordinator<CanvasSurface, AudioManager, HalfNormalDuration>;

    /// MediaPipe Hands behind the detector trait
    struct MediaPipeDetector {
        hands: JsValue,
    }

    impl HandDetector for MediaPipeDetector {
        type Frame = HtmlVideoElement;

        async fn detect(&mut self, video: &HtmlVideoElement) -> Result<Vec<LandmarkSet>> {
            let value = detect_hands(&self.hands, video)
                .await
                .map_err(|e| Error::Detection(format!("{e:?}")))?;
            let hands: Array = value
                .dyn_into()
                .map_err(|_| Error::Detection("detector did not return an array".into()))?;

            Ok(hands
                .iter()
                .map(|coords| LandmarkSet::from_flat(&Float32Array::new(&coords).to_vec()))
                .collect())
        }
    }

    /// Hands out the live video element once per animation frame
    struct VideoFrames {
        video: HtmlVideoElement,
    }

    impl FrameSource for VideoFrames {
        type Frame = HtmlVideoElement;

        async fn next_frame(&mut self) -> Option<HtmlVideoElement> {
            next_animation_frame().await?;
            Some(self.video.clone())
        }
    }

    async fn next_animation_frame() -> Option<f64> {
        let window = web_sys::window()?;
        let mut scheduled = true;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            if let Err(e) = window.request_animation_frame(&resolve) {
                log::warn!("requestAnimationFrame failed: {e:?}");
                scheduled = false;
            }
        });
        // An unscheduled promise never settles
        if !scheduled {
            return None;
        }
        JsFuture::from(promise).await.ok()?.as_f64()
    }

    fn performance_now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn setup_err(what: &str) -> impl FnOnce(JsValue) -> Error + '_ {
        move |e| Error::Setup(format!("{what}: {e:?}"))
    }

    /// Ask for the camera and read back the size it actually delivers
    async fn open_camera(settings: &Settings) -> Result<(MediaStream, FrameSettings)> {
        let window = web_sys::window().ok_or_else(|| Error::Setup("no window".into()))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(setup_err("media devices"))?;

        let video = Object::new();
        Reflect::set(&video, &"width".into(), &settings.camera_width.into())
            .map_err(setup_err("constraints"))?;
        Reflect::set(&video, &"height".into(), &settings.camera_height.into())
            .map_err(setup_err("constraints"))?;

        let constraints = web_sys::MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::FALSE);
        constraints.set_video(&video);

        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(setup_err("getUserMedia"))?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(setup_err("camera denied"))?
            .dyn_into()
            .map_err(setup_err("not a media stream"))?;

        let track: MediaStreamTrack = stream
            .get_video_tracks()
            .get(0)
            .dyn_into()
            .map_err(setup_err("no video track"))?;
        let actual = track.get_settings();
        let dim = |key: &str, fallback: u32| {
            Reflect::get(&actual, &key.into())
                .ok()
                .and_then(|v| v.as_f64())
                .map(|v| v as u32)
                .unwrap_or(fallback)
        };
        let frame = FrameSettings::new(
            dim("width", settings.camera_width),
            dim("height", settings.camera_height),
        )?;

        log::info!("Camera running at {}x{}", frame.width, frame.height);
        Ok((stream, frame))
    }

    async fn setup() -> Result<Rc<RefCell<WebLoop>>> {
        let settings = Settings::load();
        let (stream, frame) = open_camera(&settings).await?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| Error::Setup("no document".into()))?;

        let video: HtmlVideoElement = document
            .query_selector("video")
            .ok()
            .flatten()
            .ok_or_else(|| Error::Setup("no video element".into()))?
            .dyn_into()
            .map_err(|_| Error::Setup("not a video element".into()))?;
        video.set_muted(true);
        video.set_src_object(Some(&stream));
        let _ = video.play();

        let canvas: HtmlCanvasElement = document
            .query_selector("canvas")
            .ok()
            .flatten()
            .ok_or_else(|| Error::Setup("no canvas".into()))?
            .dyn_into()
            .map_err(|_| Error::Setup("not a canvas".into()))?;
        let surface = CanvasSurface::new(&canvas, &frame, settings.overlay_color()?)?;

        let hands = create_hands(settings.model_complexity, settings.max_hands)
            .map_err(setup_err("hand detector"))?;

        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        log::info!("Cosmetic seed: {}", seed);

        let slot = ObstacleSlot::new();
        let session = Session::new(frame, &settings, slot.clone(), performance_now(), seed)?;
        let mut coordinator = LoopCoordinator::new(
            surface,
            AudioManager::new(settings.tone_frequency_hz, settings.effective_volume()),
            HalfNormalDuration::new(
                settings.tone_mean_ms,
                settings.tone_deviation_ms,
                seed.wrapping_add(1),
            )?,
        );
        let handle = coordinator.start(session);

        // Detection runs on its own cadence
        let mut feed = DetectionFeed::new(frame, slot);
        let mut detector = MediaPipeDetector { hands };
        let mut frames = VideoFrames { video };
        wasm_bindgen_futures::spawn_local(async move {
            feed.run(&mut detector, &mut frames, &handle).await;
        });

        Ok(Rc::new(RefCell::new(coordinator)))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Hand Bounce starting...");

        match setup().await {
            Ok(app) => {
                setup_teardown(app.clone());
                request_animation_frame(app);
                log::info!("Hand Bounce running!");
            }
            Err(e) => log::error!("Setup failed: {e}"),
        }
    }

    /// Stop both loops when the page goes away
    fn setup_teardown(app: Rc<RefCell<WebLoop>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().stop();
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<WebLoop>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            render_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn render_loop(app: Rc<RefCell<WebLoop>>, time: f64) {
        let ticked = app.borrow_mut().render_tick(time).is_some();
        if ticked {
            request_animation_frame(app);
        } else {
            log::info!("Render loop stopped");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hand Bounce (native) starting...");
    log::info!("The camera version runs in the browser - run with `trunk serve`");

    if let Err(e) = headless::run() {
        log::error!("Headless demo failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted session: a hand sweeps in from the left, knocks the ball, and
/// leaves. Render ticks run at 60 Hz, detections land at 20 Hz.
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use hand_bounce::audio::{HalfNormalDuration, LogTone};
    use hand_bounce::consts::HAND_LANDMARKS;
    use hand_bounce::renderer::RecordingSurface;
    use hand_bounce::sim::{FrameSettings, LandmarkSet};
    use hand_bounce::{DetectionFeed, LoopCoordinator, ObstacleSlot, Result, Session, Settings};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const TICKS: u32 = 900;
    const DETECT_EVERY: u32 = 3;

    /// A 7x3 grid of landmarks centered on `center` (normalized)
    fn hand_at(center: Vec2) -> LandmarkSet {
        let points = (0..HAND_LANDMARKS)
            .map(|i| {
                let col = (i % 7) as f32 / 6.0 - 0.5;
                let row = (i / 7) as f32 / 2.0 - 0.5;
                center + Vec2::new(col * 0.08, row * 0.15)
            })
            .collect();
        LandmarkSet::new(points)
    }

    /// Hands visible at time `now`
    fn scripted_hands(now: f64) -> Vec<LandmarkSet> {
        let secs = (now / 1000.0) as f32;
        if secs < 2.5 {
            // Sweep from the left edge toward the ball
            vec![hand_at(Vec2::new(0.05 + 0.17 * secs, 0.5))]
        } else {
            Vec::new()
        }
    }

    pub fn run() -> Result<()> {
        let settings = Settings {
            seed: Some(1),
            ..Default::default()
        };
        settings.validate()?;

        let frame = FrameSettings::new(settings.camera_width, settings.camera_height)?;
        let slot = ObstacleSlot::new();
        let mut feed = DetectionFeed::new(frame, slot.clone());
        let session = Session::new(frame, &settings, slot, 0.0, 1)?;

        let mut coordinator = LoopCoordinator::new(
            RecordingSurface::new(),
            LogTone::default(),
            HalfNormalDuration::new(settings.tone_mean_ms, settings.tone_deviation_ms, 2)?,
        );
        coordinator.start(session);

        let mut hits = 0;
        for i in 0..TICKS {
            let now = i as f64 * FRAME_MS;
            if i % DETECT_EVERY == 0 {
                feed.publish(Ok(scripted_hands(now)));
            }
            let Some(report) = coordinator.render_tick(now) else {
                break;
            };
            if report.hit.is_some() {
                hits += 1;
            }
            if let Some(ball) = coordinator.session().and_then(|s| s.ball()) {
                if report.hit.is_some() || report.bounced {
                    log::info!(
                        "t={:>6.0}ms pos=({:.0}, {:.0}) vel=({:.3}, {:.3}){}",
                        now,
                        ball.circle.pos.x,
                        ball.circle.pos.y,
                        ball.circle.vel.x,
                        ball.circle.vel.y,
                        if report.bounced { " bounce" } else { " hand" }
                    );
                }
            }
        }

        let ticks = coordinator.ticks();
        let frames = coordinator.surface().frame_count();
        let tones = coordinator.tone().played;
        coordinator.stop();

        println!(
            "Ran {} ticks ({} frames drawn): {} hand hits, {} bounces, {} detections",
            ticks,
            frames,
            hits,
            tones,
            feed.stats().published
        );
        Ok(())
    }
}
