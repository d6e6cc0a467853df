use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// 设置快照：key -> 值，对应 `GET /api/settings` 的完整文档
pub type Snapshot = BTreeMap<String, Value>;

/// 缓存与本地镜像中的存储单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SettingsEntry {
    pub key: String,
    /// 写入时间（毫秒时间戳）
    pub timestamp: i64,
    #[schema(value_type = Object)]
    pub value: Value,
}

impl SettingsEntry {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            value,
        }
    }
}
