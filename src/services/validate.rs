use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::{ServiceError, ServiceResult};

const MAX_TEXT_LEN: usize = 2000;

/// Dates outside this range of years are rejected.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

/// Largest value a `NUMERIC(12, 2)` money column holds.
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Trimmed, non-empty text.
pub fn required_text(field: &'static str, value: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::invalid(field, "is required"));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ServiceError::invalid(field, "is too long"));
    }
    Ok(value.to_string())
}

/// Trimmed text; blank input becomes `None`.
pub fn optional_text(field: &'static str, value: Option<&str>) -> ServiceResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > MAX_TEXT_LEN => Err(ServiceError::invalid(field, "is too long")),
        Some(v) => Ok(Some(v.to_string())),
    }
}

pub fn optional_email(value: Option<&str>) -> ServiceResult<Option<String>> {
    let email = optional_text("email", value)?;
    if let Some(email) = &email {
        if !is_plausible_email(email) {
            return Err(ServiceError::invalid("email", "is not a valid address"));
        }
    }
    Ok(email)
}

/// Non-negative decimal with at most two fractional digits, no larger than `max`.
pub fn cents(field: &'static str, value: Decimal, max: Decimal) -> ServiceResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(ServiceError::invalid(field, "must not be negative"));
    }
    if value.normalize().scale() > 2 {
        return Err(ServiceError::invalid(field, "must have at most 2 decimal places"));
    }
    if value > max {
        return Err(ServiceError::invalid(field, format!("must not exceed {}", max)));
    }
    Ok(value)
}

pub fn date_in_range(field: &'static str, date: NaiveDate) -> ServiceResult<NaiveDate> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(ServiceError::invalid(
            field,
            format!("year must be between {} and {}", MIN_YEAR, MAX_YEAR),
        ));
    }
    Ok(date)
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !email.contains(char::is_whitespace)
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}
