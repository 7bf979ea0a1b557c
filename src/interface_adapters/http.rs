// Shared HTTP response types for the internal routes.

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    // Human-readable error string; every non-2xx route answers with this shape.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
