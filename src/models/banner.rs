use super::common::{ensure_not_blank, ensure_unique_ids};
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use utoipa::ToSchema;

/// 轮播间隔（毫秒）
pub const INTERVAL_RANGE_MS: RangeInclusive<u64> = 1_000..=60_000;
/// 横幅高度（像素）
pub const HEIGHT_RANGE_PX: RangeInclusive<u32> = 300..=800;
/// 内联 data: URL 总大小上限（浏览器本地存储预算）
pub const MAX_INLINE_MEDIA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BannerItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BannerSettings {
    pub interval: u64,
    pub height: u32,
    pub items: Vec<BannerItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BannerItemInput {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    pub title: String,
    pub description: String,
}

pub fn clamp_interval(interval_ms: u64) -> u64 {
    interval_ms.clamp(*INTERVAL_RANGE_MS.start(), *INTERVAL_RANGE_MS.end())
}

pub fn clamp_height(height_px: u32) -> u32 {
    height_px.clamp(*HEIGHT_RANGE_PX.start(), *HEIGHT_RANGE_PX.end())
}

impl BannerSettings {
    /// 编辑界面的取值范围约束
    pub fn clamped(mut self) -> Self {
        self.interval = clamp_interval(self.interval);
        self.height = clamp_height(self.height);
        self
    }

    pub fn inline_media_bytes(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.url.starts_with("data:"))
            .map(|item| item.url.len())
            .sum()
    }

    pub fn validate(&self) -> AppResult<()> {
        ensure_unique_ids(&self.items, |item| item.id, "banner item")?;
        self.items
            .iter()
            .try_for_each(|item| ensure_not_blank(&item.url, "url"))?;

        let inline = self.inline_media_bytes();
        if inline > MAX_INLINE_MEDIA_BYTES {
            return Err(AppError::ValidationError(format!(
                "Banner media is too large ({inline} bytes inline, limit {MAX_INLINE_MEDIA_BYTES})"
            )));
        }
        Ok(())
    }

    pub fn seed() -> Self {
        Self {
            interval: 5_000,
            height: 500,
            items: vec![BannerItem {
                id: 1,
                kind: MediaKind::Image,
                url: "/banner-default.jpg".to_string(),
                title: "모든 운동은 Total Check 이후 시작됩니다.".to_string(),
                description: "인피니티짐 PCU 시스템, 체형 AI 분석, 동작 자세 AI를 통해\n구체적이고 체계적인 분석 결과를 제시하여 철저하고 안전한 운동을 약속합니다."
                    .to_string(),
            }],
        }
    }
}
