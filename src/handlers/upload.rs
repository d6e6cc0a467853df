use crate::error::AppError;
use crate::models::{UploadResponse, UploadedFile};
use crate::services::{UploadService, file_too_large};
use actix_multipart::Multipart;
use actix_web::{HttpResponse, ResponseError, Result, web};
use futures_util::StreamExt;

const FILE_FIELD: &str = "file";

/// 上传接口的错误使用 `{ success: false, error: "<message>" }` 格式
fn upload_error(e: AppError) -> HttpResponse {
    e.log();
    HttpResponse::build(e.status_code()).json(UploadResponse::failure(e.public_message()))
}

/// 读取名为 `file` 的字段；超过上限时边读边拒绝
async fn read_file_field(mut payload: Multipart, max_bytes: u64) -> Result<UploadedFile, AppError> {
    let form_error = |e: actix_multipart::MultipartError| {
        AppError::UploadRejected(format!("Cannot parse form data: {e}"))
    };

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(form_error)?;
        if field.name() != Some(FILE_FIELD) {
            // 忽略其他字段，但要读完
            while let Some(chunk) = field.next().await {
                chunk.map_err(form_error)?;
            }
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.essence_str().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(form_error)?;
            if (bytes.len() + chunk.len()) as u64 > max_bytes {
                return Err(file_too_large(max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AppError::UploadRejected("No file in request".to_string()))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    request_body(content = Object, content_type = "multipart/form-data", description = "表单字段 `file`：图片或视频"),
    responses(
        (status = 200, description = "上传成功", body = UploadResponse),
        (status = 400, description = "文件缺失、为空、过大或类型不支持", body = UploadResponse),
        (status = 500, description = "保存失败", body = UploadResponse)
    )
)]
pub async fn upload_file(
    upload_service: web::Data<UploadService>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let file = match read_file_field(payload, upload_service.max_file_size_bytes()).await {
        Ok(file) => file,
        Err(e) => return Ok(upload_error(e)),
    };

    log::info!(
        "Upload received: name={:?} type={:?} size={}",
        file.file_name,
        file.content_type,
        file.bytes.len()
    );

    match upload_service.store(file).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(upload_error(e)),
    }
}

pub fn upload_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", web::post().to(upload_file));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;
    use crate::models::MediaKind;
    use actix_web::{App, http::StatusCode, http::header, test};
    use serde_json::Value;

    const BOUNDARY: &str = "----infinitygym-test-boundary";

    fn multipart_body(field: &str, file_name: &str, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n")
                .as_bytes(),
        );
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn call(config: UploadConfig, body: Vec<u8>) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(UploadService::new(config)))
                .service(web::scope("/api").configure(upload_config)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/upload")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_image_upload_returns_data_url() {
        let (status, body) = call(
            UploadConfig::default(),
            multipart_body("file", "banner.png", Some("image/png"), b"png"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response: UploadResponse = serde_json::from_value(body).unwrap();
        assert!(response.success);
        assert_eq!(response.kind, Some(MediaKind::Image));
        assert_eq!(response.url.as_deref(), Some("data:image/png;base64,cG5n"));
    }

    #[actix_web::test]
    async fn test_missing_file_field() {
        let (status, body) = call(
            UploadConfig::default(),
            multipart_body("avatar", "a.png", Some("image/png"), b"png"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "No file in request");
    }

    #[actix_web::test]
    async fn test_rejections_use_upload_error_shape() {
        let (status, body) =
            call(UploadConfig::default(), multipart_body("file", "empty.png", Some("image/png"), b"")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Empty file");

        let (status, body) = call(
            UploadConfig::default(),
            multipart_body("file", "doc.pdf", Some("application/pdf"), b"%PDF"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body.get("url").is_none());
    }

    #[actix_web::test]
    async fn test_oversized_file_is_rejected_while_streaming() {
        let config = UploadConfig {
            max_file_size_mb: 1,
            ..UploadConfig::default()
        };
        let data = vec![0u8; 1024 * 1024 + 1];
        let (status, body) = call(config, multipart_body("file", "big.mp4", Some("video/mp4"), &data)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File size must not exceed 1MB");
    }
}
