mod builder;
mod controller;
mod debounce;
mod session;
mod state;
mod stats;

pub use builder::ScanLoopControllerBuilder;
pub use controller::{
    camera_error_message, ScanLoopController, SkipReason, TickOutcome,
    DETECTOR_INIT_FAILED_MESSAGE, UNSUPPORTED_MESSAGE,
};
pub use debounce::DebounceFilter;
pub use session::{Session, SessionGeneration, SessionToken};
pub use state::ControllerState;
pub use stats::ScanStats;
