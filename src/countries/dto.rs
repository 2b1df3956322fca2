use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::countries::repo_types::Country;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub countries_uploaded: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
    pub uploaded_by_user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CountryList {
    pub success: bool,
    pub count: usize,
    pub countries: Vec<Country>,
}

impl From<Vec<Country>> for CountryList {
    fn from(countries: Vec<Country>) -> Self {
        Self {
            success: true,
            count: countries.len(),
            countries,
        }
    }
}
