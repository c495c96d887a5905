pub mod logging;
pub mod metrics;

pub use metrics::{metrics_handler, metrics_middleware};
