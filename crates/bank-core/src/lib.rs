pub mod artifacts;
pub mod config;
pub mod encode;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
pub mod input;
pub mod model;
pub mod pipeline;
pub mod scaler;
pub mod schema;
pub mod util;
