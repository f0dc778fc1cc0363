use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub usage: f64,
    pub duration: f64,
    pub device: String,
}

// Missing and null fields both decode to the zero value; the validator
// reports an absent usage or device.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnergyRecordInput {
    #[serde(deserialize_with = "null_as_default")]
    pub usage: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub duration: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub device: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl EnergyRecordInput {
    pub fn new(usage: f64, duration: f64, device: impl Into<String>) -> Self {
        Self {
            usage,
            duration,
            device: device.into(),
        }
    }
}
