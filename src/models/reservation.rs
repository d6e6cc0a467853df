use super::common::{ensure_not_blank, ensure_unique_ids};
use crate::error::AppResult;
use crate::utils::validate_kr_phone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i64,
    pub time: String,
    pub date: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    pub program: String,
    pub trainer: String,
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub time: String,
    pub date: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub program: String,
    pub trainer: String,
}

impl Reservation {
    pub fn validate(&self) -> AppResult<()> {
        ensure_not_blank(&self.customer_name, "customerName")?;
        if !self.customer_phone.is_empty() {
            validate_kr_phone(&self.customer_phone)?;
        }
        Ok(())
    }

    pub fn validate_list(items: &[Reservation]) -> AppResult<()> {
        ensure_unique_ids(items, |r| r.id, "reservation")?;
        items.iter().try_for_each(Reservation::validate)
    }

    pub fn seed() -> Vec<Reservation> {
        vec![
            Reservation {
                id: 1,
                time: "09:00".to_string(),
                date: "2024-01-20".to_string(),
                customer_name: "김민수".to_string(),
                customer_phone: "010-1234-5678".to_string(),
                program: "자세교정".to_string(),
                trainer: "김트레이너".to_string(),
                status: ReservationStatus::Confirmed,
            },
            Reservation {
                id: 2,
                time: "16:00".to_string(),
                date: "2024-01-20".to_string(),
                customer_name: "정미영".to_string(),
                customer_phone: "010-2345-6789".to_string(),
                program: "산후관리".to_string(),
                trainer: "박트레이너".to_string(),
                status: ReservationStatus::Pending,
            },
        ]
    }
}
