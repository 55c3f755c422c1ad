//! Session orchestration and the scene control surface.
//!
//! A [`Session`] wires the whole system together: it owns the particle
//! field, the shape generator and the presentation smoother, reads the
//! cells published by the detection task and the control surface, and
//! drives one render tick per call to [`Session::update`]. Commands land
//! in [`SceneControls`] cells and take effect on the next tick's generator
//! invocation, so a UI task never has to lock the session itself.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use holomorph_core::{Error, Result};
use holomorph_gesture::{
    DetectionCells, DetectionHandle, GestureConfig, GesturePipeline, LandmarkSource, SharedCell,
    SourceStatus, TransformSmoother,
};

use crate::field::{FieldConfig, FieldFrame, ParticleField};
use crate::glyph::{build_rasterizer, RasterConfig};
use crate::scheduler::TickScheduler;
use crate::shapes::{ShapeGenerator, ShapeRequest, PARTICLE_COUNT};
use crate::sink::RenderSink;

/// Complete session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Scene composition and cadence
    pub scene: SceneConfig,

    /// Morphing and idle animation tuning
    pub field: FieldConfig,

    /// Pinch detection and accumulation tuning
    pub gesture: GestureConfig,

    /// Text rasterization settings
    pub raster: RasterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Number of particles. Changing it requires a new session.
    pub particle_count: usize,

    /// Shape shown at startup
    pub initial_shape: String,

    /// Text shown when the text shape is selected
    pub initial_text: String,

    /// Accepted text length cap, in characters
    pub max_text_len: usize,

    /// Update/render cadence in ticks per second
    pub tick_hz: f64,

    /// Fixed seed for shape sampling. Unset draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig {
                particle_count: PARTICLE_COUNT,
                initial_shape: "universe".to_string(),
                initial_text: "PARTICLE".to_string(),
                max_text_len: 10,
                tick_hz: 60.0,
                seed: None,
            },
            field: FieldConfig::default(),
            gesture: GestureConfig::default(),
            raster: RasterConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from file
    pub fn from_file(path: &str) -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("HOLOMORPH"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables
    pub fn from_env() -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("HOLOMORPH"))
            .build()?;

        settings.try_deserialize()
    }
}

/// Control surface commands, JSON-tagged for embedding UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SceneCommand {
    /// Morph toward a named shape
    SetShape { id: String },
    /// Replace the text shown by the text shape
    SetText { text: String },
    /// Flip the fullscreen flag reported to the embedder
    ToggleFullscreen,
}

impl SceneCommand {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Shared control cells, written by the control surface and read by the
/// session once per tick. Last value wins per field, like the detection
/// cells; a burst of shape clicks between two ticks costs one generator
/// invocation, not several.
#[derive(Debug, Clone)]
pub struct SceneControls {
    shape: SharedCell<String>,
    text: SharedCell<String>,
    fullscreen: SharedCell<bool>,
}

impl SceneControls {
    pub fn new(initial_shape: String, initial_text: String) -> Self {
        Self {
            shape: SharedCell::new(initial_shape),
            text: SharedCell::new(initial_text),
            fullscreen: SharedCell::new(false),
        }
    }

    /// Applies one command to the cells.
    pub fn apply(&self, command: SceneCommand) {
        match command {
            SceneCommand::SetShape { id } => self.shape.publish(id),
            SceneCommand::SetText { text } => self.text.publish(text),
            SceneCommand::ToggleFullscreen => {
                let flipped = !self.fullscreen.snapshot();
                self.fullscreen.publish(flipped);
            }
        }
    }

    /// JSON convenience wrapper around [`SceneControls::apply`].
    pub fn apply_json(&self, json: &str) -> Result<()> {
        self.apply(SceneCommand::from_json(json)?);
        Ok(())
    }

    pub fn requested_shape(&self) -> String {
        self.shape.snapshot()
    }

    pub fn requested_text(&self) -> String {
        self.text.snapshot()
    }

    pub fn fullscreen(&self) -> bool {
        self.fullscreen.snapshot()
    }
}

/// One running holomorph scene.
pub struct Session {
    config: SessionConfig,
    generator: ShapeGenerator,
    field: ParticleField,
    smoother: TransformSmoother,
    cells: DetectionCells,
    controls: SceneControls,
    detection: Option<DetectionHandle>,
    frame: FieldFrame,
    current_request: ShapeRequest,
    elapsed: f64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Builds a session and generates the initial shape.
    pub fn new(config: SessionConfig) -> Result<Self> {
        if config.scene.particle_count == 0 {
            return Err(Error::Config("particle count must be positive".to_string()));
        }
        if config.scene.tick_hz <= 0.0 {
            return Err(Error::Config("tick rate must be positive".to_string()));
        }

        let rasterizer = build_rasterizer(&config.raster)?;
        let mut generator =
            ShapeGenerator::new(config.scene.particle_count, rasterizer, config.raster.clone());
        if let Some(seed) = config.scene.seed {
            generator = generator.with_seed(seed);
        }

        let controls = SceneControls::new(
            config.scene.initial_shape.clone(),
            truncate_text(&config.scene.initial_text, config.scene.max_text_len),
        );
        let current_request = requested(&controls, config.scene.max_text_len);

        let target = generator.generate(&current_request);
        let field = ParticleField::new(target, config.field.clone());
        let smoother = TransformSmoother::new(config.gesture.smoothing_alpha);

        Ok(Self {
            config,
            generator,
            field,
            smoother,
            cells: DetectionCells::new(),
            controls,
            detection: None,
            frame: FieldFrame::new(),
            current_request,
            elapsed: 0.0,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn current_text(&self) -> String {
        truncate_text(
            &self.controls.requested_text(),
            self.config.scene.max_text_len,
        )
    }

    pub fn fullscreen(&self) -> bool {
        self.controls.fullscreen()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The shared cells the detection task publishes into. Cloning is
    /// cheap; readers and the writer see the same slots.
    pub fn cells(&self) -> DetectionCells {
        self.cells.clone()
    }

    /// The control cells a UI task writes into.
    pub fn controls(&self) -> SceneControls {
        self.controls.clone()
    }

    /// Last status published by the landmark source.
    pub fn source_status(&self) -> SourceStatus {
        self.cells.status.snapshot()
    }

    pub fn is_detecting(&self) -> bool {
        self.detection.as_ref().map(|h| h.is_running()).unwrap_or(false)
    }

    /// A scheduler matching the configured tick rate.
    pub fn scheduler(&self) -> TickScheduler {
        TickScheduler::new(self.config.scene.tick_hz)
    }

    /// Starts the detection task against the given landmark source.
    pub async fn start_detection<S: LandmarkSource + 'static>(&mut self, source: S) -> Result<()> {
        if let Some(handle) = &self.detection {
            if handle.is_running() {
                return Err(Error::Source("detection already running".to_string()));
            }
        }
        let pipeline = GesturePipeline::new(self.config.gesture.clone());
        let handle = pipeline.start_streaming(source, self.cells.clone()).await?;
        self.detection = Some(handle);
        Ok(())
    }

    /// Stops the detection task and waits for the source to be released.
    /// A detection call already in flight finishes on its own.
    pub async fn stop_detection(&mut self) {
        if let Some(handle) = self.detection.take() {
            handle.stop();
            handle.wait().await;
        }
    }

    /// Applies a scene command. Shape and text take effect on the next
    /// tick's generator invocation.
    pub fn apply(&self, command: SceneCommand) {
        self.controls.apply(command);
    }

    /// Runs one update/render tick: reconcile the control cells, read the
    /// latest detection cells, smooth, morph, displace and hand the frame
    /// to the sink.
    pub fn update(&mut self, dt: f64, sink: &mut dyn RenderSink) -> Result<()> {
        self.elapsed += dt;
        self.reconcile_controls()?;

        let signal = self.cells.signal.snapshot();
        let interaction = self.cells.interaction.snapshot();
        let active = signal.is_pinch();

        let presented = self.smoother.smooth(&interaction);
        self.field.step(dt as f32, active);
        let transform = self.field.transform_for(&presented, active);
        self.field
            .emit_into(&mut self.frame, self.elapsed as f32, &transform);

        sink.submit(&self.frame)
    }

    /// Regenerates the target when the requested shape or text moved away
    /// from what the field is converging toward. A text change while
    /// another shape is showing changes nothing until the text shape is
    /// selected.
    fn reconcile_controls(&mut self) -> Result<()> {
        let desired = requested(&self.controls, self.config.scene.max_text_len);
        if desired != self.current_request {
            tracing::info!("shape request changed to {:?}", desired);
            let target = self.generator.generate(&desired);
            self.current_request = desired;
            self.field.set_target(target)?;
        }
        Ok(())
    }
}

/// The request the control cells currently describe.
fn requested(controls: &SceneControls, max_text_len: usize) -> ShapeRequest {
    let shape = controls.requested_shape();
    if shape == "text" {
        ShapeRequest::Text(truncate_text(&controls.requested_text(), max_text_len))
    } else {
        ShapeRequest::Id(shape)
    }
}

fn truncate_text(text: &str, max_len: usize) -> String {
    text.chars().take(max_len).collect()
}

/// Spawns the update/render loop on the scheduler, locking the session
/// once per tick. Errors are logged, not fatal; the loop keeps going.
pub fn spawn_render_loop<S>(
    session: Arc<Mutex<Session>>,
    mut sink: S,
    scheduler: &TickScheduler,
) -> JoinHandle<()>
where
    S: RenderSink + 'static,
{
    scheduler.spawn(move |dt| {
        let mut session = session.lock();
        if let Err(e) = session.update(dt, &mut sink) {
            tracing::error!("Render tick failed: {}", e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;
    use holomorph_core::{Hand, HandFrame, HandLandmark, LandmarkPoint, Timestamp};
    use holomorph_gesture::{GestureSignal, ScriptedSource};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    const TICK: f64 = 1.0 / 60.0;

    fn small_config() -> SessionConfig {
        let mut config = SessionConfig::default();
        config.scene.particle_count = 300;
        config.scene.seed = Some(11);
        config
    }

    fn tick(session: &mut Session) {
        let mut sink = CollectingSink::new();
        session.update(TICK, &mut sink).unwrap();
    }

    fn pinching_hand_at(wrist: (f64, f64)) -> Hand {
        let mut landmarks = [LandmarkPoint::new(wrist.0, wrist.1, 0.0); HandLandmark::COUNT];
        landmarks[HandLandmark::ThumbTip as usize] =
            LandmarkPoint::new(wrist.0 + 0.01, wrist.1, 0.0);
        landmarks[HandLandmark::IndexTip as usize] =
            LandmarkPoint::new(wrist.0 + 0.02, wrist.1, 0.0);
        Hand::new(landmarks)
    }

    fn two_hand_frame(nanos: i64, separation: f64) -> HandFrame {
        let left = pinching_hand_at((0.5 - separation / 2.0, 0.5));
        let right = pinching_hand_at((0.5 + separation / 2.0, 0.5));
        HandFrame::new(Timestamp::from_nanos(nanos), vec![left, right]).unwrap()
    }

    #[test]
    fn test_session_boots_with_initial_shape() {
        let session = Session::new(small_config()).unwrap();
        assert_eq!(session.field().len(), 300);
        assert_eq!(session.current_text(), "PARTICLE");
        assert!(!session.fullscreen());
        assert!(!session.is_detecting());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config();
        config.scene.particle_count = 0;
        assert!(matches!(
            Session::new(config).unwrap_err(),
            Error::Config(_)
        ));

        let mut config = small_config();
        config.scene.tick_hz = 0.0;
        assert!(matches!(
            Session::new(config).unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_set_shape_takes_effect_on_next_tick() {
        let mut session = Session::new(small_config()).unwrap();
        let before = session.field().target().positions.clone();

        session.apply(SceneCommand::SetShape {
            id: "heart".to_string(),
        });
        // nothing moves until a tick reconciles the cells
        assert_eq!(session.field().target().positions, before);

        tick(&mut session);
        assert_ne!(session.field().target().positions, before);
        assert_eq!(session.field().target().len(), 300);
    }

    #[test]
    fn test_unknown_shape_id_is_accepted() {
        let mut session = Session::new(small_config()).unwrap();
        session.apply(SceneCommand::SetShape {
            id: "blorp".to_string(),
        });
        tick(&mut session);
        assert_eq!(session.field().target().len(), 300);
    }

    #[test]
    fn test_set_text_truncates_to_cap() {
        let mut session = Session::new(small_config()).unwrap();
        session.apply(SceneCommand::SetText {
            text: "HOLOGRAPHIC FIELD".to_string(),
        });
        tick(&mut session);
        assert_eq!(session.current_text(), "HOLOGRAPHI");
    }

    #[test]
    fn test_text_update_defers_until_text_shape() {
        let mut session = Session::new(small_config()).unwrap();
        let before = session.field().target().positions.clone();

        session.apply(SceneCommand::SetText {
            text: "HI".to_string(),
        });
        tick(&mut session);
        // universe is showing, so the target is untouched
        assert_eq!(session.field().target().positions, before);

        session.apply(SceneCommand::SetShape {
            id: "text".to_string(),
        });
        tick(&mut session);
        assert_ne!(session.field().target().positions, before);
    }

    #[test]
    fn test_text_update_regenerates_in_text_shape() {
        let mut session = Session::new(small_config()).unwrap();
        session.apply(SceneCommand::SetShape {
            id: "text".to_string(),
        });
        tick(&mut session);
        let showing = session.field().target().positions.clone();

        session.apply(SceneCommand::SetText {
            text: "OK".to_string(),
        });
        tick(&mut session);
        assert_ne!(session.field().target().positions, showing);
    }

    #[test]
    fn test_command_burst_last_value_wins() {
        let mut session = Session::new(small_config()).unwrap();
        session.apply(SceneCommand::SetShape {
            id: "heart".to_string(),
        });
        session.apply(SceneCommand::SetShape {
            id: "saturn".to_string(),
        });
        tick(&mut session);
        // last value wins; the field converges on saturn
        let ring = crate::color::hsl_to_rgb(0.1, 0.8, 0.6);
        let has_ring_color = session
            .field()
            .target()
            .colors
            .iter()
            .any(|c| (*c - ring).length() < 1e-5);
        assert!(has_ring_color);
    }

    #[test]
    fn test_toggle_fullscreen_flips_flag() {
        let session = Session::new(small_config()).unwrap();
        session.apply(SceneCommand::ToggleFullscreen);
        assert!(session.fullscreen());
        session.apply(SceneCommand::ToggleFullscreen);
        assert!(!session.fullscreen());
    }

    #[test]
    fn test_controls_clone_reaches_session() {
        let mut session = Session::new(small_config()).unwrap();
        let controls = session.controls();
        let before = session.field().target().positions.clone();

        controls
            .apply_json(r#"{"type":"setShape","id":"flower"}"#)
            .unwrap();
        tick(&mut session);
        assert_ne!(session.field().target().positions, before);
    }

    #[test]
    fn test_scene_command_json_round_trip() {
        let command = SceneCommand::from_json(r#"{"type":"setShape","id":"heart"}"#).unwrap();
        assert_eq!(
            command,
            SceneCommand::SetShape {
                id: "heart".to_string()
            }
        );

        let json = SceneCommand::ToggleFullscreen.to_json().unwrap();
        assert_eq!(json, r#"{"type":"toggleFullscreen"}"#);

        let err = SceneCommand::from_json("not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_update_emits_one_frame_per_tick() {
        let mut session = Session::new(small_config()).unwrap();
        let mut sink = CollectingSink::new();
        session.update(TICK, &mut sink).unwrap();
        session.update(TICK, &mut sink).unwrap();
        assert_eq!(sink.submitted(), 2);
        assert_eq!(sink.last_frame().unwrap().len(), 300);
    }

    #[test]
    fn test_idle_session_accumulates_yaw() {
        let mut session = Session::new(small_config()).unwrap();
        let mut sink = CollectingSink::new();
        for _ in 0..10 {
            session.update(0.1, &mut sink).unwrap();
        }
        assert!((session.field().idle_yaw() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_pinch_signal_freezes_yaw() {
        let mut session = Session::new(small_config()).unwrap();
        let mut sink = CollectingSink::new();
        session.update(0.1, &mut sink).unwrap();
        let yaw = session.field().idle_yaw();

        let cells = session.cells();
        cells.signal.publish(GestureSignal::SinglePinch {
            distance: 0.05,
            anchor: holomorph_core::Anchor::new(0.5, 0.5),
        });
        session.update(0.1, &mut sink).unwrap();
        assert_eq!(session.field().idle_yaw(), yaw);
    }

    #[tokio::test]
    async fn test_detection_feeds_rendered_scale() {
        let mut session = Session::new(small_config()).unwrap();

        // Pinch separation widens 0.30 to 0.33, a 1.1x scale gesture.
        let frames = vec![two_hand_frame(1_000, 0.30), two_hand_frame(2_000, 0.33)];
        let source = ScriptedSource::new(frames);
        session.start_detection(source).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.stop_detection().await;
        assert!(!session.is_detecting());
        assert_eq!(session.source_status(), SourceStatus::Stopped);

        let scale = session.cells().interaction.snapshot().scale;
        assert!((scale - 1.1).abs() < 1e-9, "got scale {}", scale);

        // The first smoothed sample seeds at the published value, so the
        // emitted frame is scaled immediately.
        let mut sink = CollectingSink::new();
        session.update(TICK, &mut sink).unwrap();
        let frame = sink.last_frame().unwrap();
        let model_max = session
            .field()
            .positions()
            .iter()
            .map(|p| p.length())
            .fold(0.0f32, f32::max);
        let emitted_max = frame
            .positions
            .iter()
            .map(|p| glam::Vec3::from_array(*p).length())
            .fold(0.0f32, f32::max);
        assert!(emitted_max > model_max * 1.05);
    }

    #[tokio::test]
    async fn test_double_start_detection_rejected() {
        let mut session = Session::new(small_config()).unwrap();
        let frames: Vec<HandFrame> = (0..10_000)
            .map(|i| HandFrame::empty(Timestamp::from_nanos(i + 1)))
            .collect();
        session
            .start_detection(ScriptedSource::new(frames))
            .await
            .unwrap();

        let err = session
            .start_detection(ScriptedSource::new(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Source(_)));

        session.stop_detection().await;
    }

    struct CountingSink {
        frames: Arc<AtomicU64>,
    }

    impl RenderSink for CountingSink {
        fn submit(&mut self, _frame: &FieldFrame) -> Result<()> {
            self.frames.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_render_loop_drives_session() {
        let session = Session::new(small_config()).unwrap();
        let scheduler = session.scheduler();
        let controls = session.controls();
        let frames = Arc::new(AtomicU64::new(0));
        let sink = CountingSink {
            frames: frames.clone(),
        };

        let session = Arc::new(Mutex::new(session));
        let handle = spawn_render_loop(session.clone(), sink, &scheduler);

        // publish from outside the loop, as a UI task would
        controls.apply(SceneCommand::SetShape {
            id: "fireworks".to_string(),
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        scheduler.stop();
        handle.await.unwrap();

        assert!(frames.load(Ordering::SeqCst) > 0);
        assert!(session.lock().elapsed() > 0.0);
        let max_radius = session
            .lock()
            .field()
            .target()
            .positions
            .iter()
            .map(|p| p.length())
            .fold(0.0f32, f32::max);
        assert!(max_radius <= 5.0 + 1e-4, "fireworks radius cap");
    }
}
