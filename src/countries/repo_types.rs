use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const NAME_MAX: usize = 100;
pub const CAPITAL_MAX: usize = 100;
pub const REGION_MAX: usize = 100;
pub const POPULATION_MAX: usize = 50;

/// One accepted spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: Uuid,
    pub name: String,
    pub capital: String,
    pub region: String,
    pub population: String,
    pub uploaded_by_user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
}
