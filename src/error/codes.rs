/// Error code registry for Hoist
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 4000-4999: Execution errors (deployment tool subprocess)
/// - 6000-6999: Cloud provider errors
/// - 8000-8999: Monitor errors (stack, logs, health)
/// - 9000-9999: Other errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;
    pub const CONFIG_PATH_ERROR: u16 = 1006;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_COMMAND_NOT_FOUND: u16 = 4001;
    pub const EXEC_SUBPROCESS_FAILED: u16 = 4003;
    pub const EXEC_SIGNAL_RECEIVED: u16 = 4005;
    pub const EXEC_SPAWN_FAILED: u16 = 4007;
    pub const EXEC_OUTPUT_ERROR: u16 = 4008;

    // Cloud provider errors (6000-6999)
    pub const CLOUD_GENERIC: u16 = 6000;
    pub const CLOUD_REQUEST_FAILED: u16 = 6001;
    pub const CLOUD_NOT_FOUND: u16 = 6002;
    pub const CLOUD_UNAVAILABLE: u16 = 6003;

    // Monitor errors (8000-8999)
    pub const MONITOR_GENERIC: u16 = 8000;
    pub const MONITOR_STACK_DELETE_FAILED: u16 = 8001;
    pub const MONITOR_STACK_UNEXPECTED_STATUS: u16 = 8002;
    pub const MONITOR_STATUS_QUERY_FAILED: u16 = 8003;
    pub const MONITOR_LOG_QUERY_FAILED: u16 = 8004;
    pub const MONITOR_HEALTH_TIMEOUT: u16 = 8005;
    pub const MONITOR_DEPLOY_FAILED: u16 = 8006;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
}

/// Describe an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_INVALID_TOML => "Configuration file is not valid TOML",
        ErrorCode::CONFIG_INVALID_VALUE => "Configuration value is out of range",
        ErrorCode::CONFIG_PATH_ERROR => "Configuration path could not be resolved",

        ErrorCode::EXEC_GENERIC => "General execution error",
        ErrorCode::EXEC_COMMAND_NOT_FOUND => "Deployment tool not found on PATH",
        ErrorCode::EXEC_SUBPROCESS_FAILED => "Deployment tool exited with a failure code",
        ErrorCode::EXEC_SIGNAL_RECEIVED => "Deployment tool was terminated by a signal",
        ErrorCode::EXEC_SPAWN_FAILED => "Deployment tool could not be started",
        ErrorCode::EXEC_OUTPUT_ERROR => "Deployment tool output could not be read",

        ErrorCode::CLOUD_GENERIC => "General cloud provider error",
        ErrorCode::CLOUD_REQUEST_FAILED => "Cloud provider request failed",
        ErrorCode::CLOUD_NOT_FOUND => "Cloud resource not found",
        ErrorCode::CLOUD_UNAVAILABLE => "Cloud service unavailable",

        ErrorCode::MONITOR_GENERIC => "General monitor error",
        ErrorCode::MONITOR_STACK_DELETE_FAILED => "Stack deletion failed",
        ErrorCode::MONITOR_STACK_UNEXPECTED_STATUS => "Stack reached an unexpected status",
        ErrorCode::MONITOR_STATUS_QUERY_FAILED => "Stack status query failed",
        ErrorCode::MONITOR_LOG_QUERY_FAILED => "Log query failed",
        ErrorCode::MONITOR_HEALTH_TIMEOUT => "Service did not become healthy in time",
        ErrorCode::MONITOR_DEPLOY_FAILED => "Deployment run failed",

        ErrorCode::OTHER_GENERIC => "General error",
        _ => "Unknown error code",
    }
}
