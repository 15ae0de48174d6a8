use serde::{Deserialize, Serialize};

use super::OpeningHours;
use crate::errors::ScheduleError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barbershop {
    #[serde(alias = "barbershop_id", deserialize_with = "super::id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Either a JSON object or a JSON-encoded string, depending on the endpoint.
    #[serde(alias = "jam_operasional", default)]
    pub opening_hours: serde_json::Value,
}

impl Barbershop {
    pub fn schedule(&self) -> Result<OpeningHours, ScheduleError> {
        OpeningHours::from_value(&self.opening_hours)
    }
}
