pub mod claude;
pub mod opencode;
pub mod process;
pub mod shell;

pub use claude::ClaudeCodeAgent;
pub use opencode::OpenCodeAgent;
pub use shell::ShellAgent;
