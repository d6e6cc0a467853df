use super::common::{ensure_not_blank, ensure_unique_ids};
use crate::error::AppResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub program: String,
    pub join_date: String,
    pub status: MemberStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewMember {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub program: String,
}

impl Member {
    pub fn validate_list(items: &[Member]) -> AppResult<()> {
        ensure_unique_ids(items, |m| m.id, "member")?;
        items
            .iter()
            .try_for_each(|m| ensure_not_blank(&m.name, "name"))
    }

    pub fn seed() -> Vec<Member> {
        vec![
            Member {
                id: 1,
                name: "김민수".to_string(),
                phone: "010-1234-5678".to_string(),
                email: "kim@email.com".to_string(),
                program: "자세교정".to_string(),
                join_date: "2024-01-01".to_string(),
                status: MemberStatus::Active,
            },
            Member {
                id: 2,
                name: "정미영".to_string(),
                phone: "010-2345-6789".to_string(),
                email: "jung@email.com".to_string(),
                program: "산후관리".to_string(),
                join_date: "2024-01-05".to_string(),
                status: MemberStatus::Active,
            },
        ]
    }
}
