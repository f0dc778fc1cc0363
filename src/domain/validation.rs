use thiserror::Error;

use crate::domain::models::EnergyRecordInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("usage is required and must be greater than 0")]
    UsageNotPositive,
    #[error("device is required")]
    DeviceMissing,
}

pub fn validate(record: &EnergyRecordInput) -> Result<(), ValidationError> {
    if record.usage.is_nan() || record.usage <= 0.0 {
        return Err(ValidationError::UsageNotPositive);
    }

    if record.device.trim().is_empty() {
        return Err(ValidationError::DeviceMissing);
    }

    Ok(())
}
