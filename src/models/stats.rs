use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 后台手动维护的基准统计，与实际记录数相加后展示
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseStats {
    pub total_reservations: u64,
    pub total_registered: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_reservations: u64,
    pub total_registered: u64,
    pub today_reservations: u64,
    pub confirmed_reservations: u64,
}
