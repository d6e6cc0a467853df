use crate::error::AppError;
use crate::models::Snapshot;
use crate::services::SettingsService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::{Value, json};

/// 文档中可能内嵌 data: URL，放宽 JSON 请求体上限
pub const MAX_DOCUMENT_BYTES: usize = 64 * 1024 * 1024;

#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    responses(
        (status = 200, description = "完整设置文档（key -> 值）", body = Object)
    )
)]
pub async fn get_settings(settings_service: web::Data<SettingsService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(settings_service.snapshot().await))
}

#[utoipa::path(
    post,
    path = "/settings",
    tag = "settings",
    request_body(content = Object, description = "完整设置文档，整体替换"),
    responses(
        (status = 200, description = "保存成功"),
        (status = 400, description = "请求体不是 JSON 对象")
    )
)]
pub async fn save_settings(
    settings_service: web::Data<SettingsService>,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    let snapshot: Snapshot = match body.into_inner() {
        Value::Object(map) => map.into_iter().collect(),
        other => {
            let kind = match other {
                Value::Array(_) => "array",
                Value::String(_) => "string",
                Value::Number(_) => "number",
                Value::Bool(_) => "boolean",
                _ => "null",
            };
            return Ok(AppError::ValidationError(format!(
                "Settings document must be a JSON object, got {kind}"
            ))
            .error_response());
        }
    };

    match settings_service.replace(snapshot).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn settings_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/settings")
            .app_data(web::JsonConfig::default().limit(MAX_DOCUMENT_BYTES))
            .route(web::get().to(get_settings))
            .route(web::post().to(save_settings)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};

    #[actix_web::test]
    async fn test_post_then_get_round_trip() {
        let service = SettingsService::in_memory();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service.clone()))
                .service(web::scope("/api").configure(settings_config)),
        )
        .await;

        let document = json!({
            "baseStats": { "totalReservations": 3, "totalRegistered": 1 },
            "reviews": []
        });
        let req = test::TestRequest::post()
            .uri("/api/settings")
            .set_json(&document)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true }));

        let req = test::TestRequest::get().uri("/api/settings").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, document);
    }

    #[actix_web::test]
    async fn test_non_object_body_is_rejected() {
        let service = SettingsService::in_memory();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service.clone()))
                .service(web::scope("/api").configure(settings_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/settings")
            .set_json(json!([1, 2, 3]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(service.snapshot().await.is_empty());
    }

    #[actix_web::test]
    async fn test_get_on_empty_document() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SettingsService::in_memory()))
                .service(web::scope("/api").configure(settings_config)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/settings").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({}));
    }
}
