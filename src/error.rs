use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("這本書已經在館藏裡囉！")]
    DuplicateIsbn,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DuplicateIsbn | Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for CatalogError {
    fn from(r: JsonRejection) -> Self {
        Self::Validation(r.body_text())
    }
}

impl axum::response::IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(serde_json::json!({ "success": false, "message": self.to_string() }));
        (status, body).into_response()
    }
}
