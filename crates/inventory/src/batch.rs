//! Multi-unit batches and the unit arithmetic behind use/split/merge.

use serde::{Deserialize, Serialize};

use freshguard_core::{BatchId, DomainError, DomainResult, Entity, LocationId};

use crate::freshness::{self, FreshnessThresholds, Status};
use crate::item::clean_shelf;
use crate::location::validated_name;

/// Unit noun used in count labels when none is given.
pub const DEFAULT_UNIT: &str = "units";

/// Opened/total unit counts of a batch. Invariant: `opened <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawUnitCounts")]
pub struct UnitCounts {
    opened: u32,
    total: u32,
}

/// Unchecked wire form of [`UnitCounts`].
#[derive(Deserialize)]
struct RawUnitCounts {
    opened: u32,
    total: u32,
}

impl TryFrom<RawUnitCounts> for UnitCounts {
    type Error = DomainError;

    fn try_from(raw: RawUnitCounts) -> Result<Self, Self::Error> {
        if raw.opened > raw.total {
            return Err(DomainError::invalid_quantity(format!(
                "opened ({}) exceeds total ({})",
                raw.opened, raw.total
            )));
        }
        Ok(Self {
            opened: raw.opened,
            total: raw.total,
        })
    }
}

impl UnitCounts {
    /// Build counts, raising `total` to `opened` if needed.
    pub fn new(opened: u32, total: u32) -> Self {
        Self {
            opened,
            total: total.max(opened),
        }
    }

    pub fn opened(&self) -> u32 {
        self.opened
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_depleted(&self) -> bool {
        self.total == 0
    }

    /// Consume `amount` units.
    ///
    /// Removes `min(amount, total)` units; opened grows by the same amount but
    /// never beyond the new total. Returns the units actually removed.
    pub fn after_use(self, amount: u32) -> DomainResult<(u32, UnitCounts)> {
        if amount < 1 {
            return Err(DomainError::invalid_quantity("use amount must be at least 1"));
        }
        let used = amount.min(self.total);
        let total = self.total - used;
        let opened = self.opened.saturating_add(used).min(total);
        Ok((used, UnitCounts { opened, total }))
    }

    /// Split `amount` units off. Returns `(remaining, split_off)`.
    ///
    /// Requires `1 <= amount < total`. The split-off part takes as many of the
    /// opened units as it can hold.
    pub fn split(self, amount: u32) -> DomainResult<(UnitCounts, UnitCounts)> {
        if amount < 1 || amount >= self.total {
            return Err(DomainError::invalid_quantity(format!(
                "split amount must be between 1 and {} (got {amount})",
                self.total.saturating_sub(1)
            )));
        }
        let moved_opened = self.opened.min(amount);
        let remaining = UnitCounts {
            opened: self.opened - moved_opened,
            total: self.total - amount,
        };
        let split_off = UnitCounts {
            opened: moved_opened,
            total: amount,
        };
        Ok((remaining, split_off))
    }

    pub fn merged(self, other: UnitCounts) -> DomainResult<UnitCounts> {
        let total = self
            .total
            .checked_add(other.total)
            .ok_or_else(|| DomainError::invalid_quantity("merged total overflows"))?;
        Ok(UnitCounts {
            opened: self.opened + other.opened,
            total,
        })
    }
}

/// Fields accepted when adding a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBatch {
    pub name: String,
    pub unit: Option<String>,
    pub location_id: LocationId,
    pub shelf: Option<String>,
    pub nearest_days: i32,
    pub opened: u32,
    pub total: u32,
    /// Shelf-life window for progress; defaults from the location kind.
    pub window_days: Option<i32>,
}

impl NewBatch {
    pub fn new(name: impl Into<String>, location_id: LocationId, total: u32, nearest_days: i32) -> Self {
        Self {
            name: name.into(),
            unit: None,
            location_id,
            shelf: None,
            nearest_days,
            opened: 0,
            total,
            window_days: None,
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn on_shelf(mut self, shelf: impl Into<String>) -> Self {
        self.shelf = Some(shelf.into());
        self
    }

    pub fn opened(mut self, opened: u32) -> Self {
        self.opened = opened;
        self
    }

    pub fn window_days(mut self, days: i32) -> Self {
        self.window_days = Some(days);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    id: BatchId,
    name: String,
    unit: String,
    location_id: LocationId,
    shelf: Option<String>,
    nearest_days: i32,
    counts: UnitCounts,
    window_days: i32,
}

impl Batch {
    /// Validate and build.
    ///
    /// Rejects empty names and a zero total; clamps `nearest_days` to `>= 0`
    /// and the progress window to `>= 1`.
    pub fn create(id: BatchId, fields: &NewBatch, default_window_days: i32) -> DomainResult<Self> {
        let name = validated_name(&fields.name)?;
        if fields.total == 0 {
            return Err(DomainError::invalid_field("batch total must be at least 1"));
        }
        let unit = fields
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_UNIT)
            .to_string();

        Ok(Self {
            id,
            name,
            unit,
            location_id: fields.location_id,
            shelf: clean_shelf(fields.shelf.as_deref()),
            nearest_days: fields.nearest_days.max(0),
            counts: UnitCounts::new(fields.opened, fields.total),
            window_days: fields.window_days.unwrap_or(default_window_days).max(1),
        })
    }

    pub fn id_typed(&self) -> BatchId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Display count, e.g. "4 packs". Always derived from `total`.
    pub fn count_label(&self) -> String {
        format!("{} {}", self.counts.total, self.unit)
    }

    pub fn location_id(&self) -> LocationId {
        self.location_id
    }

    pub fn shelf(&self) -> Option<&str> {
        self.shelf.as_deref()
    }

    pub fn nearest_days(&self) -> i32 {
        self.nearest_days
    }

    pub fn counts(&self) -> UnitCounts {
        self.counts
    }

    pub fn opened(&self) -> u32 {
        self.counts.opened
    }

    pub fn total(&self) -> u32 {
        self.counts.total
    }

    pub fn window_days(&self) -> i32 {
        self.window_days
    }

    pub fn status_with(&self, thresholds: &FreshnessThresholds) -> Status {
        thresholds.classify(self.nearest_days)
    }

    pub fn status(&self) -> Status {
        self.status_with(&FreshnessThresholds::DEFAULT)
    }

    /// Date-based freshness fraction; consumption does not move it.
    pub fn progress(&self) -> f64 {
        freshness::progress(self.nearest_days, self.window_days)
    }

    /// New batch holding `amount` units taken from this one, plus the counts
    /// this batch keeps.
    pub(crate) fn split_off(&self, new_id: BatchId, amount: u32) -> DomainResult<(UnitCounts, Batch)> {
        let (remaining, taken) = self.counts.split(amount)?;
        let part = Batch {
            id: new_id,
            counts: taken,
            ..self.clone()
        };
        Ok((remaining, part))
    }

    /// Combine two batches of the same product in the same location.
    ///
    /// The earliest-expiring unit dominates: the merged batch keeps the
    /// smaller `nearest_days` (and that batch's progress window).
    pub(crate) fn merged_with(&self, other: &Batch, merged_id: BatchId) -> DomainResult<Batch> {
        if self.id == other.id {
            return Err(DomainError::incompatible("cannot merge a batch with itself"));
        }
        if self.location_id != other.location_id {
            return Err(DomainError::incompatible(format!(
                "{} and {} are stored in different locations",
                self.id, other.id
            )));
        }
        if self.name != other.name {
            return Err(DomainError::incompatible(format!(
                "product names differ ({:?} vs {:?})",
                self.name, other.name
            )));
        }

        let soonest = if other.nearest_days < self.nearest_days { other } else { self };
        Ok(Batch {
            id: merged_id,
            name: self.name.clone(),
            unit: self.unit.clone(),
            location_id: self.location_id,
            shelf: self.shelf.clone().or_else(|| other.shelf.clone()),
            nearest_days: soonest.nearest_days,
            counts: self.counts.merged(other.counts)?,
            window_days: soonest.window_days,
        })
    }

    pub(crate) fn set_counts(&mut self, counts: UnitCounts) {
        self.counts = counts;
    }

    pub(crate) fn set_location(&mut self, location_id: LocationId) {
        self.location_id = location_id;
    }
}

impl Entity for Batch {
    type Id = BatchId;
    const KIND: &'static str = "batch";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
