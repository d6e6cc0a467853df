use crate::error::{AppError, AppResult};
use crate::models::Snapshot;
use async_trait::async_trait;
use reqwest::Client;

/// 远端设置存储：整体读取、整体覆盖，没有局部更新
#[async_trait]
pub trait RemoteSettings: Send + Sync {
    async fn load(&self) -> AppResult<Snapshot>;
    async fn save(&self, snapshot: &Snapshot) -> AppResult<()>;
}

/// 通过 `GET/POST {base}/api/settings` 访问的远端存储
#[derive(Clone)]
pub struct HttpSettingsRemote {
    http: Client,
    endpoint: String,
}

impl HttpSettingsRemote {
    pub fn new(base_url: &str) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent("infinitygym-backend/settings")
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/settings", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteSettings for HttpSettingsRemote {
    async fn load(&self) -> AppResult<Snapshot> {
        let resp = self.http.get(&self.endpoint).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::RemoteUnavailable(format!(
                "GET {} returned HTTP {}",
                self.endpoint,
                status.as_u16()
            )));
        }
        Ok(resp.json().await?)
    }

    async fn save(&self, snapshot: &Snapshot) -> AppResult<()> {
        let resp = self.http.post(&self.endpoint).json(snapshot).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::RemoteUnavailable(format!(
                "POST {} returned HTTP {}: {body}",
                self.endpoint,
                status.as_u16()
            )));
        }
        Ok(())
    }
}
