// SPDX-License-Identifier: GPL-3.0-or-later
pub mod resolve;
pub mod tracks;

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// `debug=1` turns on the decision trace; any other value leaves it off.
pub(crate) fn debug_enabled(flag: Option<&str>) -> bool {
    flag == Some("1")
}
