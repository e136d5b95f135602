use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mongodb::error::ErrorKind;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The store could not be reached, or the connection dropped mid-request.
    #[error("Connectivity error: {0}")]
    Connectivity(anyhow::Error),

    /// Malformed identifier, rejected write, or a document that could not be cast.
    #[error("Query error: {0}")]
    Query(anyhow::Error),

    /// The request body was not valid JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Name reported in the `error` field of a failure response.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Connectivity(_) => "ConnectivityError",
            AppError::Query(_) => "QueryError",
            AppError::Parse(_) => "ParseError",
            AppError::ConfigError(_) => "ConfigError",
            AppError::InternalError(_) => "InternalError",
        }
    }

    /// Store-level failures and body parse failures all surface as 400; the API
    /// does not distinguish client faults from infrastructure faults.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Connectivity(_) | AppError::Query(_) | AppError::Parse(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::ConfigError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        let connectivity = matches!(
            *err.kind,
            ErrorKind::ServerSelection { .. }
                | ErrorKind::Io(_)
                | ErrorKind::ConnectionPoolCleared { .. }
                | ErrorKind::DnsResolve { .. }
                | ErrorKind::Authentication { .. }
        );

        if connectivity {
            AppError::Connectivity(anyhow::Error::new(err))
        } else {
            AppError::Query(anyhow::Error::new(err))
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Syntax | Category::Eof | Category::Io => AppError::Parse(err.to_string()),
            Category::Data => AppError::Query(anyhow::anyhow!("Cast failed: {}", err)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
            message: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let status = self.status_code();
        let kind = self.kind();

        let (message, details) = match self {
            AppError::Connectivity(err) => (
                "Database unavailable".to_string(),
                Some(format!("{:#}", err)),
            ),
            AppError::Query(err) => (err.to_string(), None),
            AppError::Parse(msg) => ("Malformed JSON body".to_string(), Some(msg)),
            AppError::ConfigError(err) => (
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
            AppError::InternalError(err) => (
                "Internal server error".to_string(),
                Some(format!("{:#?}", err)),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: kind,
                message,
                details,
            }),
        )
            .into_response()
    }
}
