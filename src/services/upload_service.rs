use crate::config::{UploadConfig, UploadMode};
use crate::error::{AppError, AppResult};
use crate::models::{MediaKind, UploadResponse, UploadedFile};
use crate::utils::IdGenerator;
use base64::Engine;
use std::path::PathBuf;

const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];
const ALLOWED_VIDEO_TYPES: [&str; 3] = ["video/mp4", "video/webm", "video/quicktime"];

pub fn file_too_large(max_bytes: u64) -> AppError {
    AppError::UploadRejected(format!(
        "File size must not exceed {}MB",
        max_bytes / (1024 * 1024)
    ))
}

/// 按顺序校验：空文件、大小、类型缺失、非图片/视频、不支持的子类型
pub fn validate_media(content_type: Option<&str>, size: u64, max_bytes: u64) -> AppResult<MediaKind> {
    if size == 0 {
        return Err(AppError::UploadRejected("Empty file".to_string()));
    }
    if size > max_bytes {
        return Err(file_too_large(max_bytes));
    }

    let content_type = content_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::UploadRejected("Cannot determine file type".to_string()))?;

    if content_type.starts_with("image/") {
        if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
            return Err(AppError::UploadRejected(
                "Only JPG, PNG, GIF and WebP images are allowed".to_string(),
            ));
        }
        Ok(MediaKind::Image)
    } else if content_type.starts_with("video/") {
        if !ALLOWED_VIDEO_TYPES.contains(&content_type) {
            return Err(AppError::UploadRejected(
                "Only MP4, WebM and MOV videos are allowed".to_string(),
            ));
        }
        Ok(MediaKind::Video)
    } else {
        Err(AppError::UploadRejected(
            "Only image or video files can be uploaded".to_string(),
        ))
    }
}

/// 文件名只保留字母数字与 `.-_`
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_start_matches('.');
    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized.to_string()
    }
}

#[derive(Clone)]
pub struct UploadService {
    config: UploadConfig,
    // 文件名前缀，同一毫秒内的上传也不会重名
    ids: IdGenerator,
}

impl UploadService {
    pub fn new(config: UploadConfig) -> Self {
        Self {
            config,
            ids: IdGenerator::new(),
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.config.max_file_size_bytes()
    }

    pub async fn store(&self, file: UploadedFile) -> AppResult<UploadResponse> {
        let kind = validate_media(
            file.content_type.as_deref(),
            file.bytes.len() as u64,
            self.max_file_size_bytes(),
        )?;
        let mime = file.content_type.as_deref().unwrap_or_default().trim();

        let url = match self.config.mode {
            UploadMode::Base64 => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&file.bytes);
                format!("data:{mime};base64,{encoded}")
            }
            UploadMode::Disk => self.write_to_disk(&file, kind).await?,
        };

        log::info!(
            "Stored {:?} upload ({} bytes, {mime}) via {:?}",
            kind,
            file.bytes.len(),
            self.config.mode
        );
        Ok(UploadResponse::stored(url, kind))
    }

    async fn write_to_disk(&self, file: &UploadedFile, kind: MediaKind) -> AppResult<String> {
        let folder = match kind {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        };
        let name = format!(
            "{}_{}",
            self.ids.next_id(),
            sanitize_file_name(file.file_name.as_deref().unwrap_or("upload"))
        );

        let dir: PathBuf = self.config.upload_dir.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create {}: {e}", dir.display())))?;
        let path = dir.join(&name);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to write {}: {e}", path.display())))?;

        Ok(format!(
            "{}/{folder}/{name}",
            self.config.public_prefix.trim_end_matches('/')
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn file(content_type: Option<&str>, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: Some("my photo (1).png".to_string()),
            content_type: content_type.map(str::to_string),
            bytes: bytes.to_vec(),
        }
    }

    fn rejection(result: AppResult<MediaKind>) -> String {
        match result {
            Err(AppError::UploadRejected(msg)) => msg,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_order() {
        // 空文件优先于类型检查
        assert_eq!(rejection(validate_media(None, 0, 50 * MB)), "Empty file");
        assert_eq!(
            rejection(validate_media(Some("text/plain"), 51 * MB, 50 * MB)),
            "File size must not exceed 50MB"
        );
        assert_eq!(
            rejection(validate_media(None, 10, 50 * MB)),
            "Cannot determine file type"
        );
        assert!(rejection(validate_media(Some("application/pdf"), 10, 50 * MB)).contains("image or video"));
        assert!(rejection(validate_media(Some("image/bmp"), 10, 50 * MB)).contains("JPG"));
        assert!(rejection(validate_media(Some("video/avi"), 10, 50 * MB)).contains("MP4"));
    }

    #[test]
    fn test_accepted_types() {
        assert_eq!(validate_media(Some("image/webp"), 1, MB).unwrap(), MediaKind::Image);
        assert_eq!(validate_media(Some("video/quicktime"), MB, MB).unwrap(), MediaKind::Video);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("..."), "upload");
        assert_eq!(sanitize_file_name("배너.jpg"), "__.jpg");
    }

    #[tokio::test]
    async fn test_base64_mode_returns_data_url() {
        let service = UploadService::new(UploadConfig::default());
        let response = service.store(file(Some("image/png"), b"png")).await.unwrap();
        assert!(response.success);
        assert_eq!(response.kind, Some(MediaKind::Image));
        assert_eq!(response.url.as_deref(), Some("data:image/png;base64,cG5n"));
    }

    #[tokio::test]
    async fn test_disk_mode_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(UploadConfig {
            mode: UploadMode::Disk,
            upload_dir: dir.path().to_path_buf(),
            public_prefix: "/uploads/".to_string(),
            ..UploadConfig::default()
        });

        let response = service.store(file(Some("video/mp4"), b"mp4 bytes")).await.unwrap();
        let url = response.url.unwrap();
        assert!(url.starts_with("/uploads/videos/"));
        assert!(url.ends_with("_my_photo__1_.png"));

        let name = url.rsplit('/').next().unwrap();
        let written = std::fs::read(dir.path().join("videos").join(name)).unwrap();
        assert_eq!(written, b"mp4 bytes");
    }

    #[tokio::test]
    async fn test_disk_mode_same_name_uploads_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(UploadConfig {
            mode: UploadMode::Disk,
            upload_dir: dir.path().to_path_buf(),
            ..UploadConfig::default()
        });

        let first = service.store(file(Some("image/png"), b"first")).await.unwrap();
        let second = service.clone().store(file(Some("image/png"), b"second")).await.unwrap();
        let first = first.url.unwrap();
        let second = second.url.unwrap();
        assert_ne!(first, second);

        let read = |url: &str| std::fs::read(dir.path().join("images").join(url.rsplit('/').next().unwrap())).unwrap();
        assert_eq!(read(&first), b"first");
        assert_eq!(read(&second), b"second");
    }

    #[tokio::test]
    async fn test_disk_failure_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let service = UploadService::new(UploadConfig {
            mode: UploadMode::Disk,
            upload_dir: blocker,
            ..UploadConfig::default()
        });
        let result = service.store(file(Some("image/jpeg"), b"jpg")).await;
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }
}
