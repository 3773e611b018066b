//! Session lifecycle: registry, per-session display task, and the
//! scheduler facade the host drives

mod commands;
mod registry;
mod scheduler;
mod session;
mod session_task;

pub use commands::is_glucose_request;
pub use registry::SessionRegistry;
pub use scheduler::{DisplayScheduler, Services};
pub use session::{ArmedTimers, DisplayPhase, SessionEvent, SessionHandles, SessionSnapshot, SessionState};
