//! Settings store against a live `/api/settings` server.

use actix_web::{App, HttpServer, web};
use infinitygym_backend::config::SettingsConfig;
use infinitygym_backend::handlers;
use infinitygym_backend::models::{Reservation, ReservationStatus, Snapshot};
use infinitygym_backend::services::{AdminService, SettingsService};
use infinitygym_backend::store::{
    FileMirror, HttpSettingsRemote, LocalMirror, Persisted, RemoteSettings, SettingsStore,
};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

/// 在随机端口启动设置服务，返回 base URL
fn spawn_settings_server(service: SettingsService) -> String {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(service.clone()))
            .service(web::scope("/api").configure(handlers::settings_config))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let port = server.addrs()[0].port();
    actix_web::rt::spawn(server.run());
    format!("http://127.0.0.1:{port}")
}

fn store_for(base_url: &str, mirror_path: &Path) -> SettingsStore {
    let remote = HttpSettingsRemote::new(base_url).unwrap();
    let mirror = FileMirror::open(mirror_path).unwrap();
    SettingsStore::new(Arc::new(remote), Arc::new(mirror))
}

fn reservation(id: i64, name: &str, status: ReservationStatus) -> Reservation {
    Reservation {
        id,
        time: "09:00".to_string(),
        date: "2024-01-20".to_string(),
        customer_name: name.to_string(),
        customer_phone: "010-1234-5678".to_string(),
        program: "자세교정".to_string(),
        trainer: "김트레이너".to_string(),
        status,
    }
}

#[actix_web::test]
async fn http_remote_round_trip() {
    let service = SettingsService::in_memory();
    let base_url = spawn_settings_server(service.clone());
    let remote = HttpSettingsRemote::new(&base_url).unwrap();

    let snapshot = Snapshot::from([
        ("baseStats".to_string(), json!({ "totalReservations": 5, "totalRegistered": 2 })),
        ("reviews".to_string(), json!([])),
    ]);
    remote.save(&snapshot).await.unwrap();

    assert_eq!(service.snapshot().await, snapshot);
    assert_eq!(remote.load().await.unwrap(), snapshot);
}

#[actix_web::test]
async fn confirmed_reservation_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let base_url = spawn_settings_server(SettingsService::in_memory());

    let store = Arc::new(store_for(&base_url, &dir.path().join("tab-a.json")));
    let admin = AdminService::new(store.clone());
    let initial = vec![
        reservation(1, "김민수", ReservationStatus::Pending),
        reservation(2, "이영희", ReservationStatus::Cancelled),
    ];
    assert_eq!(store.save(&initial).unwrap().await, Persisted::Remote);

    admin
        .update_reservation_status(1, ReservationStatus::Confirmed)
        .await
        .unwrap();

    // 新标签页：空镜像，从服务器加载
    let reloaded = store_for(&base_url, &dir.path().join("tab-b.json"));
    reloaded.load_from_server().await;
    let reservations: Vec<Reservation> = reloaded.load();

    assert_eq!(reservations.len(), 2);
    let confirmed: Vec<_> = reservations
        .iter()
        .filter(|r| r.status == ReservationStatus::Confirmed)
        .collect();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, 1);
    let other = reservations.iter().find(|r| r.id == 2).unwrap();
    assert_eq!(other.status, ReservationStatus::Cancelled);
}

#[actix_web::test]
async fn unreachable_remote_falls_back_to_file_mirror() {
    let dir = tempfile::tempdir().unwrap();
    let mirror_path = dir.path().join("mirror.json");
    // 端口 9 (discard) 上没有服务
    let offline = "http://127.0.0.1:9";

    let store = store_for(offline, &mirror_path);
    let outcome = store
        .persist("baseStats", json!({ "totalReservations": 7, "totalRegistered": 0 }))
        .await;
    assert_eq!(outcome, Persisted::LocalOnly);

    let mirror = FileMirror::open(&mirror_path).unwrap();
    assert!(mirror.get_item("baseStats").unwrap().is_some());

    let reopened = store_for(offline, &mirror_path);
    reopened.load_from_server().await;
    assert_eq!(
        reopened.get("baseStats", Value::Null),
        json!({ "totalReservations": 7, "totalRegistered": 0 })
    );
}

#[actix_web::test]
async fn store_from_config_uses_http_remote() {
    let dir = tempfile::tempdir().unwrap();
    let service = SettingsService::in_memory();
    let base_url = spawn_settings_server(service.clone());

    let config = SettingsConfig {
        document_path: None,
        remote_base_url: base_url,
        mirror_path: dir.path().join("mirror.json"),
    };
    let store = SettingsStore::from_config(&config).unwrap();
    assert_eq!(store.persist("members", json!([])).await, Persisted::Remote);
    assert_eq!(service.snapshot().await.get("members"), Some(&json!([])));
}
