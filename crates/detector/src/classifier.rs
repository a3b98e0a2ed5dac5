//! Deviation classification against a fixed threshold

use serde::{Deserialize, Serialize};

use feedcheck_core::{ValidationError, ValidationResult, ValidationStatus};

/// Deviation and the resulting status
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub deviation_percent: f64,
    pub status: ValidationStatus,
}

/// `|reference - local| / |reference| * 100`
pub fn deviation_percent(local: f64, reference: f64) -> ValidationResult<f64> {
    if !local.is_finite() || !reference.is_finite() {
        return Err(ValidationError::NonFinite { local, reference });
    }
    if reference == 0.0 {
        return Err(ValidationError::ZeroReference);
    }

    // Scale before dividing so whole-percent deviations stay exact
    Ok((reference - local).abs() * 100.0 / reference.abs())
}

/// `NotOk` only when the deviation is strictly above the threshold
pub fn classify(local: f64, reference: f64, threshold_percent: f64) -> ValidationResult<Classification> {
    let deviation_percent = deviation_percent(local, reference)?;

    let status = if deviation_percent > threshold_percent {
        ValidationStatus::NotOk
    } else {
        ValidationStatus::Ok
    };

    Ok(Classification {
        deviation_percent,
        status,
    })
}
