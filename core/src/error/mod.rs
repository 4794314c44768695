mod code;
#[allow(clippy::module_inception)]
pub mod error;
pub mod executor;
pub mod validation;

pub use code::ErrorCode;
pub use error::{AgentError, CliError, ConfigError, StoreError};
pub use executor::ExecutorError;
pub use validation::{ValidationError, ValidationErrors};
