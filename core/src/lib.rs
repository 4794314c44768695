//! cortex-core: workflow configuration, dependency planning and execution.

pub mod api;
pub mod config;
pub mod error;
pub mod executor;
pub mod state;
pub mod util;
