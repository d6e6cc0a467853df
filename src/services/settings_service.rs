use crate::error::{AppError, AppResult};
use crate::models::Snapshot;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// `/api/settings` 背后的单个 JSON 文档
#[derive(Clone)]
pub struct SettingsService {
    document: Arc<RwLock<Snapshot>>,
    path: Option<PathBuf>,
}

impl SettingsService {
    /// 仅保存在内存
    pub fn in_memory() -> Self {
        Self {
            document: Arc::new(RwLock::new(Snapshot::new())),
            path: None,
        }
    }

    /// 从文件加载；文件不存在时从空文档开始
    pub async fn open(path: PathBuf) -> AppResult<Self> {
        let document = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str::<Snapshot>(&raw).map_err(|e| {
                AppError::ConfigError(format!(
                    "Settings document {} is not a JSON object: {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Settings document {} not found, starting empty", path.display());
                Snapshot::new()
            }
            Err(e) => return Err(e.into()),
        };

        log::info!(
            "Loaded settings document {} ({} keys)",
            path.display(),
            document.len()
        );
        Ok(Self {
            document: Arc::new(RwLock::new(document)),
            path: Some(path),
        })
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.document.read().await.clone()
    }

    /// 整体替换文档（不支持部分更新）
    pub async fn replace(&self, snapshot: Snapshot) -> AppResult<()> {
        let mut document = self.document.write().await;
        if let Some(path) = &self.path {
            write_atomically(path, &snapshot).await?;
        }
        *document = snapshot;
        log::debug!("Settings document replaced ({} keys)", document.len());
        Ok(())
    }
}

async fn write_atomically(path: &Path, snapshot: &Snapshot) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, serde_json::to_vec_pretty(snapshot)?).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
