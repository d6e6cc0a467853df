use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use infinitygym_backend::{
    config::Config,
    handlers,
    middlewares::create_cors,
    services::{SettingsService, UploadService},
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 设置文档（可选文件持久化）
    let settings_service = match &config.settings.document_path {
        Some(path) => SettingsService::open(path.clone())
            .await
            .expect("Failed to open settings document"),
        None => {
            log::warn!("SETTINGS_DOCUMENT_PATH not set, settings document is kept in memory only");
            SettingsService::in_memory()
        }
    };

    // 以下配置只供库使用（SettingsStore::from_config / PaymentService），服务端不构造它们
    log::info!(
        "Store remote {} and mirror {} are client-side settings, not used by the server",
        config.settings.remote_base_url,
        config.settings.mirror_path.display()
    );
    log::info!(
        "Payment section (origin {}) is client-side, not used by the server",
        config.payment.site_origin
    );

    let upload_service = UploadService::new(config.upload.clone());
    log::info!(
        "Uploads: mode={:?} max={}MB",
        config.upload.mode,
        config.upload.max_file_size_mb
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(settings_service.clone()))
            .app_data(web::Data::new(upload_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api")
                    .configure(handlers::settings_config)
                    .configure(handlers::upload_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
