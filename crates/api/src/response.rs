//! Response envelope types for API handlers.
//!
//! Allow-list administration and the small auth helpers answer with
//! `{ "success": true, "data": ... }`; ticket resources return bare JSON.

use serde::Serialize;

/// `{ "success": true, "data": T }` envelope.
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(entries)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
