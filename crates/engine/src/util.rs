//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use std::str::FromStr;

use chrono::Weekday;
use rust_decimal::Decimal;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Generates `as_str` and `TryFrom<&str>` for a fieldless enum persisted as
/// text.
macro_rules! impl_str_enum {
    ($ty:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl TryFrom<&str> for $ty {
            type Error = $crate::EngineError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::EngineError::InvalidState(format!(
                        concat!("invalid ", $label, ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

pub(crate) use impl_str_enum;

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

pub(crate) fn parse_optional_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    value.map(|v| parse_uuid(v, label)).transpose()
}

/// Parse a decimal stored as text (percentages, ratios).
pub(crate) fn parse_decimal(value: &str, label: &str) -> ResultEngine<Decimal> {
    Decimal::from_str(value).map_err(|_| EngineError::InvalidAmount(format!("invalid {label}")))
}

/// Weekdays are stored as days from Monday (`0..=6`).
pub(crate) fn weekday_from_db(value: Option<i32>) -> ResultEngine<Option<Weekday>> {
    value
        .map(|day| {
            u8::try_from(day)
                .ok()
                .and_then(|day| Weekday::try_from(day).ok())
                .ok_or_else(|| EngineError::InvalidState(format!("invalid allowance day: {day}")))
        })
        .transpose()
}

pub(crate) fn weekday_to_db(value: Option<Weekday>) -> Option<i32> {
    value.map(|day| day.num_days_from_monday() as i32)
}

/// Canonical form of a spending category used for budget lookups:
/// NFKC, trimmed, lowercase.
pub(crate) fn normalize_category(value: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfkc().collect::<String>().to_lowercase();
    if normalized.is_empty() {
        return Err(EngineError::InvalidAmount(
            "category must not be empty".to_string(),
        ));
    }
    Ok(normalized)
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_case_and_width_insensitive() {
        assert_eq!(normalize_category("  Snacks ").unwrap(), "snacks");
        // Fullwidth letters fold to ASCII under NFKC.
        assert_eq!(normalize_category("ＧＡＭＥＳ").unwrap(), "games");
        assert!(normalize_category("   ").is_err());
    }

    #[test]
    fn weekday_round_trips_through_storage_form() {
        assert_eq!(weekday_to_db(Some(Weekday::Sat)), Some(5));
        assert_eq!(weekday_from_db(Some(5)).unwrap(), Some(Weekday::Sat));
        assert!(weekday_from_db(Some(9)).is_err());
    }
}
