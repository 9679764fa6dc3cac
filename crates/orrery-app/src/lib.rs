//! Orrery application: the frame loop, its clock and scheduler, a headless
//! render backend, and the bootstrap that ties them to configuration.

pub mod bootstrap;
pub mod clock;
pub mod frame_loop;
pub mod headless;
pub mod platform;

pub use clock::{Clock, ManualClock, SystemClock};
pub use frame_loop::{
    FrameLoop, FrameLoopError, FrameScheduler, LoopState, MAX_FRAME_GAP, PacedScheduler,
    RenderError, Renderer, SchedulerEvent, StopReason,
};
pub use headless::HeadlessRenderer;
