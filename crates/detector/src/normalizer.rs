//! Fixed-point answer normalization

use alloy_primitives::I256;

use feedcheck_core::{ValidationError, ValidationResult};

/// Largest scale an `int256` answer can carry (its decimal digit count)
pub const MAX_DECIMALS: u32 = 77;

/// `raw / 10^decimals` as a real price
pub fn normalize(raw: I256, decimals: u32) -> ValidationResult<f64> {
    if decimals > MAX_DECIMALS {
        return Err(ValidationError::InvalidDecimals(decimals));
    }

    // One correctly rounded parse of the exact decimal value
    scaled_decimal(raw, decimals)
        .parse()
        .map_err(|_| ValidationError::UnrepresentableAnswer(raw.to_string()))
}

/// Exact decimal rendering of `raw / 10^decimals`
fn scaled_decimal(raw: I256, decimals: u32) -> String {
    let scale = decimals as usize;
    let mut digits = raw.unsigned_abs().to_string();
    if digits.len() <= scale {
        digits.insert_str(0, &"0".repeat(scale + 1 - digits.len()));
    }

    let sign = if raw.is_negative() { "-" } else { "" };
    if scale == 0 {
        return format!("{sign}{digits}");
    }
    let (whole, fraction) = digits.split_at(digits.len() - scale);
    format!("{sign}{whole}.{fraction}")
}
