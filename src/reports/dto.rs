use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub report_date: Option<OffsetDateTime>,
}
