use super::common::{ensure_not_blank, ensure_unique_ids};
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Approved,
    Pending,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: i64,
    pub name: String,
    pub program: String,
    pub rating: u8,
    pub content: String,
    pub date: String,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewReview {
    pub name: String,
    pub program: String,
    pub rating: u8,
    pub content: String,
}

impl Review {
    pub fn validate(&self) -> AppResult<()> {
        ensure_not_blank(&self.name, "name")?;
        ensure_not_blank(&self.content, "content")?;
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(AppError::ValidationError(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}, got {}",
                self.rating
            )));
        }
        Ok(())
    }

    pub fn validate_list(items: &[Review]) -> AppResult<()> {
        ensure_unique_ids(items, |r| r.id, "review")?;
        items.iter().try_for_each(Review::validate)
    }

    pub fn seed() -> Vec<Review> {
        vec![
            Review {
                id: 1,
                name: "김사라".to_string(),
                program: "자세교정".to_string(),
                rating: 5,
                content: "AI 분석이 정말 놀라웠어요! 2개월 만에 자세가 극적으로 개선되었습니다."
                    .to_string(),
                date: "2024-01-15".to_string(),
                status: ReviewStatus::Approved,
            },
            Review {
                id: 2,
                name: "박민수".to_string(),
                program: "벌크업".to_string(),
                rating: 5,
                content: "건강을 위한 최고의 투자였습니다. 개인 맞춤 프로그램이 정말 효과적이에요."
                    .to_string(),
                date: "2024-01-10".to_string(),
                status: ReviewStatus::Pending,
            },
        ]
    }
}
