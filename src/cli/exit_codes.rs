//! exit codes for pactl commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general error, or a negative answer from `version-in`
pub const ERROR: i32 = 1;

/// invalid command-line arguments
pub const INVALID_ARGS: i32 = 2;

/// profile-set file missing, unreadable or invalid
pub const CONFIG_ERROR: i32 = 3;

/// expression failed to evaluate, or selection reported errors
pub const EVALUATION_ERROR: i32 = 4;

/// `${project.rootDirectory}` referenced without a known root
pub const ROOT_NOT_FOUND: i32 = 5;
