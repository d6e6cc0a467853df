use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Remote settings unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Malformed stored value: {0}")]
    MalformedStoredValue(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// 对外展示的错误信息；内部错误不暴露细节
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::UploadRejected(msg) => msg.clone(),
            AppError::RemoteUnavailable(_) | AppError::ReqwestError(_) => {
                "Settings service unavailable".to_string()
            }
            _ => "Internal server error".to_string(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::UploadRejected(_) => "UPLOAD_REJECTED",
            AppError::RemoteUnavailable(_) | AppError::ReqwestError(_) => "REMOTE_UNAVAILABLE",
            _ => "INTERNAL_ERROR",
        }
    }

    /// 记录日志：客户端错误 warn，服务端错误 error
    pub fn log(&self) {
        if self.status_code().is_client_error() {
            log::warn!("{self}");
        } else {
            log::error!("{self}");
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::UploadRejected(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RemoteUnavailable(_) | AppError::ReqwestError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": self.error_code(),
                "message": self.public_message()
            }
        }))
    }
}
