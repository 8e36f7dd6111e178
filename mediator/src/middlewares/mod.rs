/// Logs every request before and after it is handled.
mod logging;
pub use logging::*;

/// Delays every request before it is handled.
mod delay;
pub use delay::*;
