//! The frame loop: wait for the scheduler, read the clock, tick the scene,
//! render.
//!
//! Positions are a pure function of elapsed time, so there is no fixed
//! timestep or accumulator. A long stall is reported but never clamped.

use std::thread;
use std::time::{Duration, Instant};

use orrery_scene::{Camera, Scene, SceneGraph};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;

/// Gap between consecutive frames above which a warning is logged.
pub const MAX_FRAME_GAP: f64 = 0.25; // 250ms = 4 FPS

/// A rendering backend failed. Fatal to the frame loop.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("transform written for unknown body {0}")]
    UnknownBody(u32),

    #[error("render backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum FrameLoopError {
    #[error("rendering failed on frame {frame}")]
    Render {
        frame: u64,
        #[source]
        source: RenderError,
    },

    /// `run` or `step` was called after a render failure.
    #[error("frame loop already stopped after a render failure")]
    AlreadyFailed,
}

/// Receives transforms and materials, then draws what it has.
pub trait Renderer: SceneGraph {
    fn render(&mut self, camera: &Camera) -> Result<(), RenderError>;
}

/// What the scheduler hands the loop next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    Frame,
    Resize { width: u32, height: u32 },
    Shutdown,
}

/// Source of frame callbacks. `wait` is the loop's only suspension point.
pub trait FrameScheduler {
    fn wait(&mut self) -> SchedulerEvent;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    RenderFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Scheduled,
    Stopped(StopReason),
}

/// Scheduler that sleeps to hit a target frame rate.
///
/// A `target_fps` of zero issues frames back to back. With a frame limit the
/// scheduler reports shutdown once that many frames have been issued.
#[derive(Debug)]
pub struct PacedScheduler {
    frame_interval: Option<Duration>,
    next_frame: Option<Instant>,
    frame_limit: Option<u64>,
    frames_issued: u64,
    pending_resize: Option<(u32, u32)>,
}

impl PacedScheduler {
    pub fn new(target_fps: u32) -> Self {
        let frame_interval = match target_fps {
            0 => None,
            fps => Some(Duration::from_secs_f64(1.0 / f64::from(fps))),
        };
        Self {
            frame_interval,
            next_frame: None,
            frame_limit: None,
            frames_issued: 0,
            pending_resize: None,
        }
    }

    pub fn with_frame_limit(mut self, limit: Option<u64>) -> Self {
        self.frame_limit = limit;
        self
    }

    /// Queue a resize; it is delivered before the next frame.
    pub fn request_resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width, height));
    }

    pub fn frames_issued(&self) -> u64 {
        self.frames_issued
    }
}

impl FrameScheduler for PacedScheduler {
    fn wait(&mut self) -> SchedulerEvent {
        if let Some((width, height)) = self.pending_resize.take() {
            return SchedulerEvent::Resize { width, height };
        }
        if matches!(self.frame_limit, Some(limit) if self.frames_issued >= limit) {
            return SchedulerEvent::Shutdown;
        }

        if let Some(interval) = self.frame_interval {
            let now = Instant::now();
            let due = self.next_frame.unwrap_or(now);
            if due > now {
                thread::sleep(due - now);
            }
            // Don't try to catch up after a stall.
            self.next_frame = Some(due.max(now) + interval);
        }

        self.frames_issued += 1;
        SchedulerEvent::Frame
    }
}

/// Drives a [`Scene`] from a clock and a scheduler into a renderer.
pub struct FrameLoop<C, R, S> {
    scene: Scene,
    clock: C,
    renderer: R,
    scheduler: S,
    state: LoopState,
    frame_count: u64,
    last_frame_time: Option<f64>,
}

impl<C: Clock, R: Renderer, S: FrameScheduler> FrameLoop<C, R, S> {
    /// Attach every body's material to `renderer` and wait in `Idle`.
    pub fn new(scene: Scene, clock: C, mut renderer: R, scheduler: S) -> Self {
        scene.attach(&mut renderer);
        Self {
            scene,
            clock,
            renderer,
            scheduler,
            state: LoopState::Idle,
            frame_count: 0,
            last_frame_time: None,
        }
    }

    /// Run until the scheduler reports shutdown or rendering fails.
    pub fn run(&mut self) -> Result<(), FrameLoopError> {
        info!(bodies = self.scene.len(), "frame loop starting");
        loop {
            if let LoopState::Stopped(reason) = self.step()? {
                info!(?reason, frames = self.frame_count, "frame loop stopped");
                return Ok(());
            }
        }
    }

    /// Wait for one scheduler event and handle it.
    pub fn step(&mut self) -> Result<LoopState, FrameLoopError> {
        match self.state {
            LoopState::Stopped(StopReason::RenderFailed) => {
                return Err(FrameLoopError::AlreadyFailed);
            }
            LoopState::Stopped(StopReason::Shutdown) => return Ok(self.state),
            LoopState::Idle | LoopState::Scheduled => {}
        }
        self.state = LoopState::Scheduled;

        match self.scheduler.wait() {
            SchedulerEvent::Frame => self.frame()?,
            SchedulerEvent::Resize { width, height } => {
                self.on_resize(width, height);
            }
            SchedulerEvent::Shutdown => self.state = LoopState::Stopped(StopReason::Shutdown),
        }
        Ok(self.state)
    }

    /// Forward a viewport change to the camera. Returns whether the
    /// projection changed.
    pub fn on_resize(&mut self, width: u32, height: u32) -> bool {
        let changed = self.scene.on_resize(width, height);
        if changed {
            debug!(width, height, "viewport resized");
        }
        changed
    }

    fn frame(&mut self) -> Result<(), FrameLoopError> {
        let t = self.clock.elapsed_seconds();
        if let Some(previous) = self.last_frame_time {
            let gap = t - previous;
            if gap > MAX_FRAME_GAP {
                warn!(
                    "Frame gap {:.1}ms exceeds {:.1}ms",
                    gap * 1000.0,
                    MAX_FRAME_GAP * 1000.0
                );
            }
        }
        self.last_frame_time = Some(t);

        self.scene.tick(t, &mut self.renderer);
        if let Err(source) = self.renderer.render(self.scene.camera()) {
            error!(frame = self.frame_count, %source, "render failed, stopping");
            self.state = LoopState::Stopped(StopReason::RenderFailed);
            return Err(FrameLoopError::Render {
                frame: self.frame_count,
                source,
            });
        }
        self.frame_count += 1;
        Ok(())
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames rendered successfully.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use glam::{Quat, Vec3};
    use orrery_materials::{MaterialDescriptor, NullTextureLoader};
    use orrery_scene::{BodyId, Geometry, presets};
    use std::collections::VecDeque;

    /// Replays a fixed script, advancing the clock before each frame.
    struct ScriptedScheduler {
        events: VecDeque<SchedulerEvent>,
        clock: ManualClock,
        step: f64,
    }

    impl ScriptedScheduler {
        fn new(events: &[SchedulerEvent], clock: &ManualClock, step: f64) -> Self {
            Self {
                events: events.iter().copied().collect(),
                clock: clock.clone(),
                step,
            }
        }
    }

    impl FrameScheduler for ScriptedScheduler {
        fn wait(&mut self) -> SchedulerEvent {
            let event = self.events.pop_front().unwrap_or(SchedulerEvent::Shutdown);
            if event == SchedulerEvent::Frame {
                self.clock.advance(self.step);
            }
            event
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        attached: usize,
        transforms: Vec<(BodyId, Vec3)>,
        renders: u64,
        fail_on: Option<u64>,
        aspect_ratios: Vec<f32>,
    }

    impl SceneGraph for CountingRenderer {
        fn set_transform(&mut self, id: BodyId, position: Vec3, _rotation: Quat) {
            self.transforms.push((id, position));
        }

        fn attach_material(
            &mut self,
            _id: BodyId,
            _geometry: &Geometry,
            _material: &MaterialDescriptor,
        ) {
            self.attached += 1;
        }
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, camera: &Camera) -> Result<(), RenderError> {
            if self.fail_on == Some(self.renders) {
                return Err(RenderError::Backend("device lost".into()));
            }
            self.renders += 1;
            self.aspect_ratios.push(camera.projection.aspect_ratio);
            Ok(())
        }
    }

    type TestLoop = FrameLoop<ManualClock, CountingRenderer, ScriptedScheduler>;

    fn scene() -> Scene {
        presets::simple_cubes()
            .build(&NullTextureLoader, "")
            .unwrap()
    }

    fn build_loop(
        clock: &ManualClock,
        renderer: CountingRenderer,
        events: &[SchedulerEvent],
        step: f64,
    ) -> TestLoop {
        let scheduler = ScriptedScheduler::new(events, clock, step);
        FrameLoop::new(scene(), clock.clone(), renderer, scheduler)
    }

    fn resize(width: u32, height: u32) -> SchedulerEvent {
        SchedulerEvent::Resize { width, height }
    }

    use SchedulerEvent::{Frame, Shutdown};

    #[test]
    fn test_new_attaches_and_stays_idle() {
        let clock = ManualClock::default();
        let frame_loop = build_loop(&clock, CountingRenderer::default(), &[], 0.0);
        assert_eq!(frame_loop.state(), LoopState::Idle);
        assert_eq!(frame_loop.renderer().attached, 3);
        assert!(frame_loop.renderer().transforms.is_empty());
    }

    #[test]
    fn test_runs_until_shutdown() {
        let clock = ManualClock::default();
        let events = [Frame, Frame, Frame, Shutdown];
        let mut frame_loop = build_loop(&clock, CountingRenderer::default(), &events, 0.1);

        frame_loop.run().unwrap();
        let stopped = LoopState::Stopped(StopReason::Shutdown);
        assert_eq!(frame_loop.state(), stopped);
        assert_eq!(frame_loop.frame_count(), 3);
        assert_eq!(frame_loop.renderer().renders, 3);
        assert_eq!(frame_loop.renderer().transforms.len(), 9);
        let last_tick = frame_loop.scene().last_tick().unwrap();
        assert!((last_tick - 0.3).abs() < 1e-9);

        // Shutdown is terminal.
        frame_loop.run().unwrap();
        assert_eq!(frame_loop.frame_count(), 3);
    }

    #[test]
    fn test_render_failure_stops_for_good() {
        let clock = ManualClock::default();
        let renderer = CountingRenderer {
            fail_on: Some(1),
            ..Default::default()
        };
        let mut frame_loop = build_loop(&clock, renderer, &[Frame; 4], 0.016);

        let err = frame_loop.run().unwrap_err();
        assert!(matches!(err, FrameLoopError::Render { frame: 1, .. }));
        let stopped = LoopState::Stopped(StopReason::RenderFailed);
        assert_eq!(frame_loop.state(), stopped);
        assert_eq!(frame_loop.frame_count(), 1);

        let err = frame_loop.run().unwrap_err();
        assert!(matches!(err, FrameLoopError::AlreadyFailed));
        let err = frame_loop.step().unwrap_err();
        assert!(matches!(err, FrameLoopError::AlreadyFailed));
        assert_eq!(frame_loop.renderer().renders, 1);
    }

    #[test]
    fn test_resize_reaches_camera_without_rendering() {
        let clock = ManualClock::default();
        let events = [resize(1000, 500), Frame, resize(0, 500), Frame];
        let mut frame_loop = build_loop(&clock, CountingRenderer::default(), &events, 0.016);

        assert_eq!(frame_loop.step().unwrap(), LoopState::Scheduled);
        assert_eq!(frame_loop.renderer().renders, 0);
        frame_loop.run().unwrap();

        assert_eq!(frame_loop.scene().camera().viewport(), (1000, 500));
        assert_eq!(frame_loop.renderer().aspect_ratios, vec![2.0, 2.0]);
    }

    #[test]
    fn test_large_gap_is_not_clamped() {
        let clock = ManualClock::default();
        let mut frame_loop = build_loop(&clock, CountingRenderer::default(), &[Frame; 2], 10.0);
        frame_loop.run().unwrap();
        assert_eq!(frame_loop.scene().last_tick(), Some(20.0));
    }

    #[test]
    fn test_paced_scheduler_frame_limit() {
        let mut scheduler = PacedScheduler::new(0).with_frame_limit(Some(2));
        assert_eq!(scheduler.wait(), Frame);
        scheduler.request_resize(640, 480);
        assert_eq!(scheduler.wait(), resize(640, 480));
        assert_eq!(scheduler.wait(), Frame);
        assert_eq!(scheduler.wait(), Shutdown);
        assert_eq!(scheduler.frames_issued(), 2);
    }

    #[test]
    fn test_paced_scheduler_paces() {
        let mut scheduler = PacedScheduler::new(100).with_frame_limit(Some(3));
        let start = Instant::now();
        while scheduler.wait() == Frame {}
        // Three frames at 10ms spacing: the first is immediate.
        assert!(start.elapsed() >= Duration::from_millis(19));
    }
}
