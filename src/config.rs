use serde::{Deserialize, Serialize};

/// Status set by the default error handler.
pub const DEFAULT_FAILURE_STATUS: u16 = 422;

/// Largest request body the axum binding buffers, in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Settings shared by every guard a [`Validator`](crate::middleware::Validator) produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Response status used by [`DefaultErrorHandler`](crate::middleware::DefaultErrorHandler).
    pub failure_status: u16,
    /// Bodies longer than this are read as empty.
    pub max_body_bytes: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            failure_status: DEFAULT_FAILURE_STATUS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
