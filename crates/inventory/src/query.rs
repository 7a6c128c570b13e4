//! Read-side projections: entry snapshots, filtering, status counts and
//! per-location summaries.
//!
//! Nothing here mutates; every view is recomputed from the current entities.

use std::collections::BTreeMap;

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use freshguard_core::{BatchId, DomainError, ItemId, LocationId};

use crate::batch::Batch;
use crate::freshness::Status;
use crate::inventory::Inventory;
use crate::item::Item;
use crate::location::{Location, LocationKind};

/// Anything with a name and an expiry classification.
pub trait Perishable {
    fn name(&self) -> &str;

    /// Days until expiry, `None` when unknown.
    fn days_remaining(&self) -> Option<i32>;

    fn status(&self) -> Status;
}

impl<T: Perishable + ?Sized> Perishable for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn days_remaining(&self) -> Option<i32> {
        (**self).days_remaining()
    }

    fn status(&self) -> Status {
        (**self).status()
    }
}

impl Perishable for Item {
    fn name(&self) -> &str {
        Item::name(self)
    }

    fn days_remaining(&self) -> Option<i32> {
        self.days_to_expire()
    }

    fn status(&self) -> Status {
        Item::status(self)
    }
}

impl Perishable for Batch {
    fn name(&self) -> &str {
        Batch::name(self)
    }

    fn days_remaining(&self) -> Option<i32> {
        Some(self.nearest_days())
    }

    fn status(&self) -> Status {
        Batch::status(self)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntryId {
    Item(ItemId),
    Batch(BatchId),
}

/// Classified snapshot of one item or batch, as handed to presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub location_id: LocationId,
    pub location_path: String,
    pub days_remaining: Option<i32>,
    pub status: Status,
    /// Freshness fraction; batches only.
    pub progress: Option<f64>,
    /// Item quantity, or batch total.
    pub quantity: u32,
    /// Whether the item is opened, or how many batch units are.
    pub opened: u32,
}

impl Perishable for Entry {
    fn name(&self) -> &str {
        &self.name
    }

    fn days_remaining(&self) -> Option<i32> {
        self.days_remaining
    }

    fn status(&self) -> Status {
        self.status
    }
}

/// Status filter used by list views; `All` matches everything.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    /// Filter chips in display order.
    pub const CHOICES: [StatusFilter; 6] = [
        StatusFilter::All,
        StatusFilter::Only(Status::Fresh),
        StatusFilter::Only(Status::Soon),
        StatusFilter::Only(Status::DueToday),
        StatusFilter::Only(Status::Urgent),
        StatusFilter::Only(Status::Expired),
    ];

    pub fn matches(self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

impl From<Status> for StatusFilter {
    fn from(status: Status) -> Self {
        StatusFilter::Only(status)
    }
}

impl FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

/// Filter entities by status and case-insensitive name substring.
///
/// The result borrows `entities` and can be iterated any number of times;
/// each pass yields matches in their original order.
pub fn filter<'a, T: Perishable>(entities: &'a [T], status: StatusFilter, search: &str) -> Filtered<'a, T> {
    Filtered {
        source: entities,
        status,
        needle: search.trim().to_lowercase(),
    }
}

/// Lazy, restartable filtered view. See [`filter`].
#[derive(Debug, Clone)]
pub struct Filtered<'a, T> {
    source: &'a [T],
    status: StatusFilter,
    needle: String,
}

impl<'a, T: Perishable> Filtered<'a, T> {
    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        let source = self.source;
        source.iter().filter(move |e| self.accepts(*e))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn accepts(&self, entity: &T) -> bool {
        self.status.matches(entity.status())
            && (self.needle.is_empty() || entity.name().to_lowercase().contains(&self.needle))
    }
}

/// Counts used to label filter chips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub all: usize,
    pub by_status: BTreeMap<Status, usize>,
}

impl StatusCounts {
    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Only(status) => self.by_status.get(&status).copied().unwrap_or(0),
        }
    }
}

/// Count entities per status. Every status is present, zero or not.
pub fn counts_by_status<T: Perishable>(entities: &[T]) -> StatusCounts {
    let mut by_status: BTreeMap<Status, usize> = Status::ALL.iter().map(|s| (*s, 0)).collect();
    for entity in entities {
        *by_status.entry(entity.status()).or_insert(0) += 1;
    }
    StatusCounts {
        all: entities.len(),
        by_status,
    }
}

/// Per-location totals for the locations list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub location_id: LocationId,
    pub name: String,
    pub kind: LocationKind,
    pub temperature: Option<String>,
    pub items: usize,
    pub batches: usize,
    /// Item quantities plus batch totals.
    pub units: u64,
    /// Entries due today or worse.
    pub needs_attention: usize,
}

impl Inventory {
    /// Snapshot every item then every batch, classified with this
    /// inventory's thresholds.
    pub fn entries(&self) -> Vec<Entry> {
        let thresholds = self.thresholds();
        let items = self.items().iter().map(|item| Entry {
            id: EntryId::Item(item.id_typed()),
            name: item.name().to_string(),
            location_id: item.location_id(),
            location_path: self.location_path(item.location_id(), item.shelf()),
            days_remaining: item.days_to_expire(),
            status: item.status_with(thresholds),
            progress: None,
            quantity: item.quantity(),
            opened: u32::from(item.is_opened()),
        });
        let batches = self.batches().iter().map(|batch| Entry {
            id: EntryId::Batch(batch.id_typed()),
            name: batch.name().to_string(),
            location_id: batch.location_id(),
            location_path: self.location_path(batch.location_id(), batch.shelf()),
            days_remaining: Some(batch.nearest_days()),
            status: batch.status_with(thresholds),
            progress: Some(batch.progress()),
            quantity: batch.total(),
            opened: batch.opened(),
        });
        items.chain(batches).collect()
    }

    /// Locations whose name contains `search`, case-insensitively.
    pub fn search_locations(&self, search: &str) -> Vec<&Location> {
        let needle = search.trim().to_lowercase();
        self.locations()
            .iter()
            .filter(|l| needle.is_empty() || l.name().to_lowercase().contains(&needle))
            .collect()
    }

    pub fn location_summaries(&self) -> Vec<LocationSummary> {
        let entries = self.entries();
        self.locations()
            .iter()
            .map(|location| {
                let here = entries.iter().filter(|e| e.location_id == location.id_typed());
                let mut summary = LocationSummary {
                    location_id: location.id_typed(),
                    name: location.name().to_string(),
                    kind: location.kind(),
                    temperature: location.temperature_label(),
                    items: 0,
                    batches: 0,
                    units: 0,
                    needs_attention: 0,
                };
                for entry in here {
                    match entry.id {
                        EntryId::Item(_) => summary.items += 1,
                        EntryId::Batch(_) => summary.batches += 1,
                    }
                    summary.units += u64::from(entry.quantity);
                    if entry.status.needs_attention() {
                        summary.needs_attention += 1;
                    }
                }
                summary
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::NewBatch;
    use crate::freshness::FreshnessThresholds;
    use crate::item::NewItem;
    use crate::location::NewLocation;

    fn stocked() -> Inventory {
        let mut inv = Inventory::new();
        let fridge = inv
            .add_location(NewLocation::new("Fridge — Kitchen", LocationKind::Refrigerated).with_target_temp(4))
            .unwrap();
        let freezer = inv
            .add_location(NewLocation::new("Freezer — Drawer", LocationKind::Frozen).with_target_temp(-18))
            .unwrap();
        inv.add_item(NewItem::new("Greek Yogurt", fridge).quantity(4).expires_in(1).opened())
            .unwrap();
        inv.add_item(NewItem::new("Chicken Breast", freezer).quantity(2).expires_in(7))
            .unwrap();
        inv.add_batch(NewBatch::new("Strawberries", fridge, 3, 1).opened(1).on_shelf("Box A"))
            .unwrap();
        inv.add_batch(NewBatch::new("Yogurt drinks", fridge, 6, 2)).unwrap();
        inv.add_batch(NewBatch::new("Mozzarella", fridge, 5, 3)).unwrap();
        inv
    }

    #[test]
    fn filter_matches_status_and_search_in_order() {
        let entries = stocked().entries();
        let view = filter(&entries, StatusFilter::Only(Status::Urgent), "YOG");
        let names: Vec<&str> = view.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Greek Yogurt", "Yogurt drinks"]);
    }

    #[test]
    fn filtered_view_is_restartable() {
        let entries = stocked().entries();
        let view = filter(&entries, StatusFilter::All, "");
        assert_eq!(view.count(), 5);
        assert_eq!(view.iter().count(), 5);
        assert!(!view.is_empty());
        assert!(filter(&entries, StatusFilter::All, "kale").is_empty());
    }

    #[test]
    fn filter_works_on_raw_entities() {
        let inv = stocked();
        let soon: Vec<&Batch> = filter(inv.batches(), StatusFilter::Only(Status::Soon), "").iter().collect();
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].name(), "Mozzarella");
    }

    #[test]
    fn counts_include_all_and_every_status() {
        let counts = counts_by_status(&stocked().entries());
        assert_eq!(counts.all, 5);
        assert_eq!(counts.get(StatusFilter::Only(Status::Urgent)), 3);
        assert_eq!(counts.get(StatusFilter::Only(Status::Soon)), 1);
        assert_eq!(counts.get(StatusFilter::Only(Status::Fresh)), 1);
        assert_eq!(counts.get(StatusFilter::Only(Status::Expired)), 0);
        assert_eq!(counts.by_status.len(), Status::ALL.len());
    }

    #[test]
    fn entries_use_inventory_thresholds() {
        let mut inv = Inventory::with_thresholds(FreshnessThresholds::new(0, 10).unwrap());
        let loc = inv
            .add_location(NewLocation::new("Pantry", LocationKind::AmbientPantry))
            .unwrap();
        inv.add_item(NewItem::new("Bread", loc).expires_in(2)).unwrap();
        let entries = inv.entries();
        assert_eq!(entries[0].status, Status::Soon);
        assert_eq!(inv.items()[0].status(), Status::Urgent);
    }

    #[test]
    fn status_filter_parses_chip_labels() {
        assert_eq!("All".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "Today".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(Status::DueToday)
        );
        assert_eq!(StatusFilter::CHOICES[1].label(), "OK");
    }

    #[test]
    fn location_summaries_count_entries_and_units() {
        let inv = stocked();
        let summaries = inv.location_summaries();
        let fridge = &summaries[0];
        assert_eq!(fridge.items, 1);
        assert_eq!(fridge.batches, 3);
        assert_eq!(fridge.units, 4 + 3 + 6 + 5);
        assert_eq!(fridge.needs_attention, 3);
        assert_eq!(fridge.temperature.as_deref(), Some("+4°C"));
        assert_eq!(summaries[1].units, 2);
    }

    #[test]
    fn location_search_is_case_insensitive() {
        let inv = stocked();
        let found: Vec<&str> = inv.search_locations("fREEZ").iter().map(|l| l.name()).collect();
        assert_eq!(found, vec!["Freezer — Drawer"]);
        assert_eq!(inv.search_locations("").len(), 2);
    }

    #[test]
    fn entry_carries_path_and_progress() {
        let entries = stocked().entries();
        let strawberries = entries.iter().find(|e| e.name == "Strawberries").unwrap();
        assert_eq!(strawberries.location_path, "Fridge — Kitchen · Box A");
        assert_eq!(strawberries.opened, 1);
        let p = strawberries.progress.unwrap();
        assert!((p - 1.0 / 7.0).abs() < 1e-9);
    }
}
