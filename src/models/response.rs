use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body shared by every failing route.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub err: String,
}

/// Acknowledgement body for update, delete and the liveness probe.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn ok() -> Self {
        Self { msg: "OK".to_string() }
    }
}
