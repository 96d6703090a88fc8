// Cooperative tick scheduler and wake primitives
// Single core, no preemption. The firmware's periodic timer sets a wake
// flag; the main loop runs one Monitor tick per wake and idles in WFI.

pub mod clock;
pub mod scheduler;
pub mod state;
pub mod wake;

pub use clock::Instant;
pub use scheduler::{InitError, Monitor, Outputs, Phase, TICK_ORDER, TickOutcome};
pub use state::DeviceState;
