use super::banner::MediaKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `POST /api/upload` 的响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn stored(url: String, kind: MediaKind) -> Self {
        let message = match kind {
            MediaKind::Image => "Image uploaded successfully",
            MediaKind::Video => "Video uploaded successfully",
        };
        Self {
            success: true,
            url: Some(url),
            kind: Some(kind),
            message: Some(message.to_string()),
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            url: None,
            kind: None,
            message: None,
            error: Some(error),
        }
    }
}

/// 从 multipart 表单中取出的文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
