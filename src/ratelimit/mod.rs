//! Rate limiting logic and state management.

mod backend;
mod interval;
mod local;
mod registry;

pub use backend::RateLimit;
pub use interval::parse_interval;
pub use local::WindowedLimiter;
pub use registry::{Constructor, Registry, TYPE_LOCAL};
