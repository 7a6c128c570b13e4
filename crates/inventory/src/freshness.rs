//! Freshness classification: days-until-expiry to an urgency status and a
//! normalized freshness fraction.
//!
//! Everything here is pure and total. Out-of-range inputs are clamped, never
//! rejected.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use freshguard_core::{DomainError, DomainResult};

/// Largest day count still classified as urgent (inclusive).
pub const URGENT_MAX_DAYS: i32 = 2;

/// Largest day count still classified as "soon" (inclusive).
pub const SOON_MAX_DAYS: i32 = 5;

/// Urgency classification, ordered by increasing urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Fresh,
    Soon,
    DueToday,
    Urgent,
    Expired,
}

impl Status {
    /// All statuses in urgency order.
    pub const ALL: [Status; 5] = [
        Status::Fresh,
        Status::Soon,
        Status::DueToday,
        Status::Urgent,
        Status::Expired,
    ];

    /// Short display label.
    pub fn label(self) -> &'static str {
        match self {
            Status::Fresh => "OK",
            Status::Soon => "Soon",
            Status::DueToday => "Today",
            Status::Urgent => "Urgent",
            Status::Expired => "Expired",
        }
    }

    /// Due today or worse: the statuses a digest reports.
    pub fn needs_attention(self) -> bool {
        self >= Status::DueToday
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = DomainError;

    /// Accepts display labels and snake_case names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ok" | "fresh" => Ok(Status::Fresh),
            "soon" => Ok(Status::Soon),
            "today" | "due_today" | "due-today" => Ok(Status::DueToday),
            "urgent" => Ok(Status::Urgent),
            "expired" => Ok(Status::Expired),
            other => Err(DomainError::invalid_field(format!("unknown status: {other}"))),
        }
    }
}

/// Policy thresholds for [`classify`], overridable per inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessThresholds {
    /// `1..=urgent_max_days` days remaining is urgent.
    pub urgent_max_days: i32,
    /// `urgent_max_days+1..=soon_max_days` days remaining is soon.
    pub soon_max_days: i32,
}

impl FreshnessThresholds {
    pub const DEFAULT: Self = Self {
        urgent_max_days: URGENT_MAX_DAYS,
        soon_max_days: SOON_MAX_DAYS,
    };

    /// Validated override. Requires `0 <= urgent_max_days < soon_max_days`.
    pub fn new(urgent_max_days: i32, soon_max_days: i32) -> DomainResult<Self> {
        if urgent_max_days < 0 {
            return Err(DomainError::invalid_field("urgent threshold cannot be negative"));
        }
        if soon_max_days <= urgent_max_days {
            return Err(DomainError::invalid_field(
                "soon threshold must be greater than the urgent threshold",
            ));
        }
        Ok(Self {
            urgent_max_days,
            soon_max_days,
        })
    }

    pub fn classify(&self, days_remaining: i32) -> Status {
        match days_remaining {
            d if d < 0 => Status::Expired,
            0 => Status::DueToday,
            d if d <= self.urgent_max_days => Status::Urgent,
            d if d <= self.soon_max_days => Status::Soon,
            _ => Status::Fresh,
        }
    }

    /// Status for an optional day count.
    ///
    /// Unknown dates are never classified by date: they take the status set
    /// explicitly at creation, or `Fresh`.
    pub fn resolve(&self, days_remaining: Option<i32>, explicit: Option<Status>) -> Status {
        match days_remaining {
            Some(days) => self.classify(days),
            None => explicit.unwrap_or(Status::Fresh),
        }
    }
}

impl Default for FreshnessThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Classify with the default thresholds.
pub fn classify(days_remaining: i32) -> Status {
    FreshnessThresholds::DEFAULT.classify(days_remaining)
}

/// Linear freshness fraction: 1 = just stocked, 0 = expired.
///
/// `clamp(days_remaining / window_days, 0, 1)`. A non-positive window has no
/// falloff: anything with days left is fully fresh.
pub fn progress(days_remaining: i32, window_days: i32) -> f64 {
    if window_days <= 0 {
        return if days_remaining > 0 { 1.0 } else { 0.0 };
    }
    (f64::from(days_remaining) / f64::from(window_days)).clamp(0.0, 1.0)
}
