use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    /// Machine-readable error kind, set only on failures.
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn success_with_message(data: Option<T>, message: &str) -> Self {
        Self {
            success: true,
            data,
            error: None,
            message: Some(message.to_string()),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(kind: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(kind.to_string()),
            message: Some(message.to_string()),
        }
    }
}
