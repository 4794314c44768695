/// Stable error codes, shared with the CLI as process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    Success = 0,
    WorkflowFailed = 1,
    ValidationError = 2,
    ConfigError = 11,
    CircularDependency = 12,
    IoError = 20,
    SpawnError = 21,
    Internal = 50,
    Cancelled = 130,
}

impl ErrorCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn exit_code(self) -> i32 {
        self as i32
    }
}
