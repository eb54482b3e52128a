use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ValidationError;

/// A bookable service offered by exactly one salon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Service {
    pub id: i64,
    pub salon_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
}

impl Service {
    /// # Errors
    ///
    /// Returns every violated invariant: blank name, missing salon, negative
    /// prices, an inverted price range, or a non-positive duration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.name.trim().is_empty() {
            errors.push("name", "must not be empty");
        }
        if self.salon_id <= 0 {
            errors.push("salon_id", "must reference a salon");
        }
        if self.price_min.is_some_and(|p| p.is_sign_negative() && !p.is_zero()) {
            errors.push("price_min", "must not be negative");
        }
        if self.price_max.is_some_and(|p| p.is_sign_negative() && !p.is_zero()) {
            errors.push("price_max", "must not be negative");
        }
        if let (Some(min), Some(max)) = (self.price_min, self.price_max) {
            if min > max {
                errors.push("price_min", "must not exceed price_max");
            }
        }
        if self.duration_minutes.is_some_and(|d| d <= 0) {
            errors.push("duration_minutes", "must be positive");
        }

        errors.into_result()
    }

    /// Human-readable price, e.g. `"$30.00 - $50.00"` or `"From $30.00"`.
    #[must_use]
    pub fn price_display(&self) -> String {
        match (self.price_min, self.price_max) {
            (Some(min), Some(max)) if min == max => format!("${min:.2}"),
            (Some(min), Some(max)) => format!("${min:.2} - ${max:.2}"),
            (Some(min), None) => format!("From ${min:.2}"),
            (None, Some(max)) => format!("Up to ${max:.2}"),
            (None, None) => "Price varies".to_string(),
        }
    }

    /// Human-readable duration, e.g. `"1 hr 30 min"`. Empty when unknown.
    #[must_use]
    pub fn duration_display(&self) -> String {
        let Some(minutes) = self.duration_minutes.filter(|m| *m > 0) else {
            return String::new();
        };

        let hours = minutes / 60;
        let rest = minutes % 60;
        match (hours, rest) {
            (0, m) => format!("{m} min"),
            (h, 0) => format!("{h} hr"),
            (h, m) => format!("{h} hr {m} min"),
        }
    }
}
