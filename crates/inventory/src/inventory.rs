//! The inventory owner: locations, items and batches, mutated only through
//! commands.
//!
//! `handle` validates a command against the current state and returns the
//! events it would produce; `apply` evolves state from an event and cannot
//! fail. A rejected command therefore never leaves partial changes behind.

use freshguard_core::{
    Aggregate, AggregateRoot, BatchId, DomainError, DomainResult, Entity, InventoryId, ItemId,
    LocationId, entity::position,
};
use freshguard_events::Event;

use crate::batch::{Batch, NewBatch};
use crate::command::{InventoryAction, InventoryCommand};
use crate::event::{InventoryChange, InventoryEvent, Removal};
use crate::freshness::FreshnessThresholds;
use crate::item::{Item, NewItem};
use crate::location::{Location, NewLocation};

/// Aggregate root: Inventory.
#[derive(Debug, Clone)]
pub struct Inventory {
    id: InventoryId,
    thresholds: FreshnessThresholds,
    locations: Vec<Location>,
    items: Vec<Item>,
    batches: Vec<Batch>,
    version: u64,
    recording: bool,
    pending: Vec<InventoryEvent>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self::with_thresholds(FreshnessThresholds::DEFAULT)
    }

    pub fn with_thresholds(thresholds: FreshnessThresholds) -> Self {
        Self {
            id: InventoryId::new(),
            thresholds,
            locations: Vec::new(),
            items: Vec::new(),
            batches: Vec::new(),
            version: 0,
            recording: false,
            pending: Vec::new(),
        }
    }

    /// Keep applied events until [`Inventory::take_pending`] drains them.
    ///
    /// Off by default; an owner that never drains must not accumulate events.
    pub fn recording(mut self) -> Self {
        self.set_recording(true);
        self
    }

    /// Turning recording off discards events not yet taken.
    pub fn set_recording(&mut self, on: bool) {
        self.recording = on;
        if !on {
            self.pending.clear();
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn id_typed(&self) -> InventoryId {
        self.id
    }

    pub fn thresholds(&self) -> &FreshnessThresholds {
        &self.thresholds
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        find(&self.locations, &id).ok()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        find(&self.items, &id).ok()
    }

    pub fn batch(&self, id: BatchId) -> Option<&Batch> {
        find(&self.batches, &id).ok()
    }

    /// Items and batches stored in a location.
    pub fn references(&self, location_id: LocationId) -> usize {
        self.items.iter().filter(|i| i.location_id() == location_id).count()
            + self.batches.iter().filter(|b| b.location_id() == location_id).count()
    }

    /// Display path, e.g. "Fridge — Kitchen · Top shelf".
    pub fn location_path(&self, location_id: LocationId, shelf: Option<&str>) -> String {
        let base = self
            .location(location_id)
            .map(|l| l.name().to_string())
            .unwrap_or_else(|| "Unassigned".to_string());
        match shelf {
            Some(shelf) => format!("{base} · {shelf}"),
            None => base,
        }
    }

    /// Run an action now. Applied events are returned, and also kept for
    /// [`Inventory::take_pending`] while recording.
    pub fn dispatch(&mut self, action: InventoryAction) -> DomainResult<Vec<InventoryEvent>> {
        let command = InventoryCommand::now(action);
        match self.execute(&command) {
            Ok(events) => {
                for event in &events {
                    tracing::debug!(
                        event_type = event.event_type(),
                        version = self.version,
                        "applied inventory change"
                    );
                }
                if self.recording {
                    self.pending.extend(events.iter().cloned());
                }
                Ok(events)
            }
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "inventory command rejected");
                Err(err)
            }
        }
    }

    /// Drain events applied since the last call.
    pub fn take_pending(&mut self) -> Vec<InventoryEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn add_location(&mut self, location: NewLocation) -> DomainResult<LocationId> {
        let location_id = LocationId::new();
        self.dispatch(InventoryAction::AddLocation { location_id, location })?;
        Ok(location_id)
    }

    pub fn rename_location(&mut self, location_id: LocationId, name: &str) -> DomainResult<Location> {
        self.dispatch(InventoryAction::UpdateLocation {
            location_id,
            name: Some(name.to_string()),
            target_temp_c: None,
        })?;
        find(&self.locations, &location_id).cloned()
    }

    pub fn retarget_location(
        &mut self,
        location_id: LocationId,
        target_temp_c: Option<i16>,
    ) -> DomainResult<Location> {
        self.dispatch(InventoryAction::UpdateLocation {
            location_id,
            name: None,
            target_temp_c: Some(target_temp_c),
        })?;
        find(&self.locations, &location_id).cloned()
    }

    /// Delete a location. Rejected with `LocationInUse` while anything is stored there.
    pub fn remove_location(&mut self, location_id: LocationId) -> DomainResult<()> {
        self.dispatch(InventoryAction::RemoveLocation { location_id })?;
        Ok(())
    }

    pub fn add_item(&mut self, item: NewItem) -> DomainResult<ItemId> {
        let item_id = ItemId::new();
        self.dispatch(InventoryAction::AddItem { item_id, item })?;
        Ok(item_id)
    }

    /// Consume `amount` of an item. Returns `None` once the item is used up.
    pub fn use_item(&mut self, item_id: ItemId, amount: u32) -> DomainResult<Option<Item>> {
        self.dispatch(InventoryAction::UseItem { item_id, amount })?;
        Ok(self.item(item_id).cloned())
    }

    pub fn set_item_opened(&mut self, item_id: ItemId, opened: bool) -> DomainResult<Item> {
        self.dispatch(InventoryAction::SetItemOpened { item_id, opened })?;
        find(&self.items, &item_id).cloned()
    }

    pub fn move_item(&mut self, item_id: ItemId, location_id: LocationId) -> DomainResult<Item> {
        self.dispatch(InventoryAction::MoveItem { item_id, location_id })?;
        find(&self.items, &item_id).cloned()
    }

    pub fn remove_item(&mut self, item_id: ItemId) -> DomainResult<()> {
        self.dispatch(InventoryAction::RemoveItem { item_id })?;
        Ok(())
    }

    pub fn add_batch(&mut self, batch: NewBatch) -> DomainResult<BatchId> {
        let batch_id = BatchId::new();
        self.dispatch(InventoryAction::AddBatch { batch_id, batch })?;
        Ok(batch_id)
    }

    /// Use `amount` units. Returns `None` when the batch is depleted and removed.
    pub fn use_batch(&mut self, batch_id: BatchId, amount: u32) -> DomainResult<Option<Batch>> {
        self.dispatch(InventoryAction::UseBatch { batch_id, amount })?;
        Ok(self.batch(batch_id).cloned())
    }

    /// Split `amount` units into a new batch. Returns `(source, new)`.
    pub fn split_batch(&mut self, batch_id: BatchId, amount: u32) -> DomainResult<(Batch, Batch)> {
        let new_batch_id = BatchId::new();
        self.dispatch(InventoryAction::SplitBatch {
            batch_id,
            amount,
            new_batch_id,
        })?;
        Ok((
            find(&self.batches, &batch_id).cloned()?,
            find(&self.batches, &new_batch_id).cloned()?,
        ))
    }

    /// Merge two batches into one with a fresh identity.
    pub fn merge_batches(&mut self, first: BatchId, second: BatchId) -> DomainResult<Batch> {
        let merged_id = BatchId::new();
        self.dispatch(InventoryAction::MergeBatches {
            first,
            second,
            merged_id,
        })?;
        find(&self.batches, &merged_id).cloned()
    }

    pub fn move_batch(&mut self, batch_id: BatchId, location_id: LocationId) -> DomainResult<Batch> {
        self.dispatch(InventoryAction::MoveBatch { batch_id, location_id })?;
        find(&self.batches, &batch_id).cloned()
    }

    pub fn remove_batch(&mut self, batch_id: BatchId) -> DomainResult<()> {
        self.dispatch(InventoryAction::RemoveBatch { batch_id })?;
        Ok(())
    }
}

impl AggregateRoot for Inventory {
    type Id = InventoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Inventory {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match &event.change {
            InventoryChange::LocationAdded(location) => self.locations.push(location.clone()),
            InventoryChange::LocationUpdated(location) => {
                if let Some(idx) = position(&self.locations, location.id()) {
                    self.locations[idx] = location.clone();
                }
            }
            InventoryChange::LocationRemoved { location_id } => {
                self.locations.retain(|l| l.id() != location_id);
            }
            InventoryChange::ItemAdded(item) => self.items.push(item.clone()),
            InventoryChange::ItemUsed { item_id, remaining, .. } => {
                if let Some(item) = self.item_mut(item_id) {
                    item.set_quantity(*remaining);
                }
            }
            InventoryChange::ItemOpenedChanged { item_id, opened } => {
                if let Some(item) = self.item_mut(item_id) {
                    item.set_opened(*opened);
                }
            }
            InventoryChange::ItemMoved { item_id, to, .. } => {
                if let Some(item) = self.item_mut(item_id) {
                    item.set_location(*to);
                }
            }
            InventoryChange::ItemRemoved { item_id, .. } => {
                self.items.retain(|i| i.id() != item_id);
            }
            InventoryChange::BatchAdded(batch) => self.batches.push(batch.clone()),
            InventoryChange::BatchUsed { batch_id, counts, .. } => {
                if let Some(batch) = self.batch_mut(batch_id) {
                    batch.set_counts(*counts);
                }
            }
            InventoryChange::BatchSplit {
                source_id,
                remaining,
                split_off,
            } => match position(&self.batches, source_id) {
                Some(idx) => {
                    self.batches[idx].set_counts(*remaining);
                    self.batches.insert(idx + 1, split_off.clone());
                }
                None => self.batches.push(split_off.clone()),
            },
            InventoryChange::BatchesMerged { sources, merged } => {
                // The merged batch takes the place of whichever source came first.
                let idx = sources
                    .iter()
                    .filter_map(|id| position(&self.batches, id))
                    .min()
                    .unwrap_or(self.batches.len());
                self.batches.retain(|b| !sources.contains(b.id()));
                let idx = idx.min(self.batches.len());
                self.batches.insert(idx, merged.clone());
            }
            InventoryChange::BatchMoved { batch_id, to, .. } => {
                if let Some(batch) = self.batch_mut(batch_id) {
                    batch.set_location(*to);
                }
            }
            InventoryChange::BatchRemoved { batch_id, .. } => {
                self.batches.retain(|b| b.id() != batch_id);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let changes = match &command.action {
            InventoryAction::AddLocation { location_id, location } => {
                self.ensure_new(&self.locations, location_id)?;
                vec![InventoryChange::LocationAdded(Location::create(*location_id, location)?)]
            }
            InventoryAction::UpdateLocation {
                location_id,
                name,
                target_temp_c,
            } => {
                let location = find(&self.locations, location_id)?;
                vec![InventoryChange::LocationUpdated(
                    location.edited(name.as_deref(), *target_temp_c)?,
                )]
            }
            InventoryAction::RemoveLocation { location_id } => {
                let location = find(&self.locations, location_id)?;
                let references = self.references(*location_id);
                if references > 0 {
                    return Err(DomainError::location_in_use(location.name(), references));
                }
                vec![InventoryChange::LocationRemoved {
                    location_id: *location_id,
                }]
            }
            InventoryAction::AddItem { item_id, item } => {
                self.ensure_new(&self.items, item_id)?;
                find(&self.locations, &item.location_id)?;
                vec![InventoryChange::ItemAdded(Item::create(*item_id, item)?)]
            }
            InventoryAction::UseItem { item_id, amount } => {
                let item = find(&self.items, item_id)?;
                if *amount < 1 {
                    return Err(DomainError::invalid_quantity("use amount must be at least 1"));
                }
                let used = (*amount).min(item.quantity());
                let remaining = item.quantity() - used;
                let mut changes = vec![InventoryChange::ItemUsed {
                    item_id: *item_id,
                    used,
                    remaining,
                }];
                if remaining == 0 {
                    changes.push(InventoryChange::ItemRemoved {
                        item_id: *item_id,
                        reason: Removal::Depleted,
                    });
                }
                changes
            }
            InventoryAction::SetItemOpened { item_id, opened } => {
                find(&self.items, item_id)?;
                vec![InventoryChange::ItemOpenedChanged {
                    item_id: *item_id,
                    opened: *opened,
                }]
            }
            InventoryAction::MoveItem { item_id, location_id } => {
                let item = find(&self.items, item_id)?;
                find(&self.locations, location_id)?;
                vec![InventoryChange::ItemMoved {
                    item_id: *item_id,
                    from: item.location_id(),
                    to: *location_id,
                }]
            }
            InventoryAction::RemoveItem { item_id } => {
                find(&self.items, item_id)?;
                vec![InventoryChange::ItemRemoved {
                    item_id: *item_id,
                    reason: Removal::Deleted,
                }]
            }
            InventoryAction::AddBatch { batch_id, batch } => {
                self.ensure_new(&self.batches, batch_id)?;
                let location = find(&self.locations, &batch.location_id)?;
                let window = location.kind().default_window_days();
                vec![InventoryChange::BatchAdded(Batch::create(*batch_id, batch, window)?)]
            }
            InventoryAction::UseBatch { batch_id, amount } => {
                let batch = find(&self.batches, batch_id)?;
                let (used, counts) = batch.counts().after_use(*amount)?;
                let mut changes = vec![InventoryChange::BatchUsed {
                    batch_id: *batch_id,
                    used,
                    counts,
                }];
                if counts.is_depleted() {
                    changes.push(InventoryChange::BatchRemoved {
                        batch_id: *batch_id,
                        reason: Removal::Depleted,
                    });
                }
                changes
            }
            InventoryAction::SplitBatch {
                batch_id,
                amount,
                new_batch_id,
            } => {
                let batch = find(&self.batches, batch_id)?;
                self.ensure_new(&self.batches, new_batch_id)?;
                let (remaining, split_off) = batch.split_off(*new_batch_id, *amount)?;
                vec![InventoryChange::BatchSplit {
                    source_id: *batch_id,
                    remaining,
                    split_off,
                }]
            }
            InventoryAction::MergeBatches {
                first,
                second,
                merged_id,
            } => {
                let a = find(&self.batches, first)?;
                let b = find(&self.batches, second)?;
                self.ensure_new(&self.batches, merged_id)?;
                vec![InventoryChange::BatchesMerged {
                    sources: [*first, *second],
                    merged: a.merged_with(b, *merged_id)?,
                }]
            }
            InventoryAction::MoveBatch { batch_id, location_id } => {
                let batch = find(&self.batches, batch_id)?;
                find(&self.locations, location_id)?;
                vec![InventoryChange::BatchMoved {
                    batch_id: *batch_id,
                    from: batch.location_id(),
                    to: *location_id,
                }]
            }
            InventoryAction::RemoveBatch { batch_id } => {
                find(&self.batches, batch_id)?;
                vec![InventoryChange::BatchRemoved {
                    batch_id: *batch_id,
                    reason: Removal::Deleted,
                }]
            }
        };

        Ok(changes
            .into_iter()
            .map(|change| InventoryEvent {
                change,
                occurred_at: command.occurred_at,
            })
            .collect())
    }
}

impl Inventory {
    fn ensure_new<E: Entity>(&self, entities: &[E], id: &E::Id) -> DomainResult<()> {
        if position(entities, id).is_some() {
            return Err(DomainError::invalid_id(format!("{} {id} already exists", E::KIND)));
        }
        Ok(())
    }

    fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id() == id)
    }

    fn batch_mut(&mut self, id: &BatchId) -> Option<&mut Batch> {
        self.batches.iter_mut().find(|b| b.id() == id)
    }
}

fn find<'a, E: Entity>(entities: &'a [E], id: &E::Id) -> DomainResult<&'a E> {
    position(entities, id)
        .map(|idx| &entities[idx])
        .ok_or_else(|| DomainError::not_found(E::KIND, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness::Status;
    use crate::location::LocationKind;
    use proptest::prelude::*;

    fn fridge(inv: &mut Inventory) -> LocationId {
        inv.add_location(NewLocation::new("Fridge — Kitchen", LocationKind::Refrigerated).with_target_temp(4))
            .unwrap()
    }

    fn yogurt(inv: &mut Inventory, location: LocationId, total: u32, opened: u32, days: i32) -> BatchId {
        inv.add_batch(
            NewBatch::new("Greek Yogurt", location, total, days)
                .opened(opened)
                .unit("packs"),
        )
        .unwrap()
    }

    #[test]
    fn use_split_scenario_follows_allocation_rule() {
        let mut inv = Inventory::new();
        let loc = fridge(&mut inv);
        let id = yogurt(&mut inv, loc, 4, 0, 1);

        let after_use = inv.use_batch(id, 1).unwrap().unwrap();
        assert_eq!((after_use.total(), after_use.opened()), (3, 1));
        assert_eq!(after_use.status(), Status::Urgent);

        let (source, split) = inv.split_batch(id, 2).unwrap();
        assert_eq!((split.total(), split.opened()), (2, 1));
        assert_eq!((source.total(), source.opened()), (1, 0));
        assert_eq!(split.nearest_days(), 1);
        assert_eq!(split.location_id(), loc);
        assert_eq!(split.name(), "Greek Yogurt");
    }

    #[test]
    fn split_places_new_batch_after_source() {
        let mut inv = Inventory::new();
        let loc = fridge(&mut inv);
        let first = yogurt(&mut inv, loc, 4, 0, 3);
        let last = yogurt(&mut inv, loc, 2, 0, 3);

        let (_, split) = inv.split_batch(first, 1).unwrap();
        let order: Vec<BatchId> = inv.batches().iter().map(Batch::id_typed).collect();
        assert_eq!(order, vec![first, split.id_typed(), last]);
    }

    #[test]
    fn using_whole_batch_removes_it() {
        let mut inv = Inventory::new().recording();
        let loc = fridge(&mut inv);
        let id = yogurt(&mut inv, loc, 3, 0, 2);

        assert_eq!(inv.use_batch(id, 3).unwrap(), None);
        assert!(inv.batch(id).is_none());

        let pending = inv.take_pending();
        let types: Vec<&str> = pending.iter().map(|e| e.event_type()).collect();
        assert!(types.ends_with(&["inventory.batch.used", "inventory.batch.depleted"]));

        for err in [
            inv.use_batch(id, 1).unwrap_err(),
            inv.split_batch(id, 1).unwrap_err(),
            inv.move_batch(id, loc).unwrap_err(),
            inv.remove_batch(id).unwrap_err(),
        ] {
            assert!(matches!(err, DomainError::NotFound { entity: "batch", .. }));
        }
    }

    #[test]
    fn events_are_kept_only_while_recording() {
        let mut inv = Inventory::new();
        let loc = fridge(&mut inv);
        let id = yogurt(&mut inv, loc, 5, 0, 3);
        for _ in 0..3 {
            inv.use_batch(id, 1).unwrap();
        }
        assert!(!inv.is_recording());
        assert!(inv.take_pending().is_empty());

        inv.set_recording(true);
        let events = inv.dispatch(InventoryAction::UseBatch { batch_id: id, amount: 1 }).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(inv.take_pending(), events);

        inv.use_batch(id, 1).unwrap();
        inv.set_recording(false);
        assert!(inv.take_pending().is_empty());
    }

    #[test]
    fn use_rejects_zero_without_changes() {
        let mut inv = Inventory::new();
        let loc = fridge(&mut inv);
        let id = yogurt(&mut inv, loc, 3, 1, 2);
        let version = inv.version();

        let err = inv.use_batch(id, 0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity(_)));
        assert_eq!(inv.version(), version);
        assert_eq!(inv.batch(id).unwrap().total(), 3);
    }

    #[test]
    fn merge_restores_split_and_takes_first_position() {
        let mut inv = Inventory::new();
        let loc = fridge(&mut inv);
        let before = yogurt(&mut inv, loc, 1, 0, 9);
        let id = yogurt(&mut inv, loc, 5, 2, 4);

        let (source, split) = inv.split_batch(id, 3).unwrap();
        let merged = inv.merge_batches(split.id_typed(), source.id_typed()).unwrap();

        assert_eq!((merged.total(), merged.opened(), merged.nearest_days()), (5, 2, 4));
        assert_ne!(merged.id_typed(), id);
        assert!(inv.batch(id).is_none());
        let order: Vec<BatchId> = inv.batches().iter().map(Batch::id_typed).collect();
        assert_eq!(order, vec![before, merged.id_typed()]);
    }

    #[test]
    fn merge_rejects_different_locations() {
        let mut inv = Inventory::new();
        let fridge_id = fridge(&mut inv);
        let freezer = inv
            .add_location(NewLocation::new("Freezer — Drawer", LocationKind::Frozen))
            .unwrap();
        let a = yogurt(&mut inv, fridge_id, 2, 0, 2);
        let b = yogurt(&mut inv, freezer, 2, 0, 2);

        let err = inv.merge_batches(a, b).unwrap_err();
        assert!(matches!(err, DomainError::IncompatibleBatches(_)));
        assert_eq!(inv.batches().len(), 2);
    }

    #[test]
    fn merge_rejects_different_names_without_changes() {
        let mut inv = Inventory::new().recording();
        let loc = fridge(&mut inv);
        let a = yogurt(&mut inv, loc, 2, 1, 2);
        let b = inv
            .add_batch(NewBatch::new("Mozzarella", loc, 3, 4).unit("pcs"))
            .unwrap();
        inv.take_pending();
        let before = inv.batches().to_vec();
        let version = inv.version();

        let err = inv.merge_batches(a, b).unwrap_err();
        assert!(matches!(err, DomainError::IncompatibleBatches(_)));
        assert_eq!(inv.batches(), &before[..]);
        assert_eq!(inv.version(), version);
        assert!(inv.take_pending().is_empty());
    }

    #[test]
    fn move_only_changes_location() {
        let mut inv = Inventory::new();
        let fridge_id = fridge(&mut inv);
        let freezer = inv
            .add_location(NewLocation::new("Freezer — Drawer", LocationKind::Frozen))
            .unwrap();
        let id = yogurt(&mut inv, fridge_id, 4, 2, 1);
        let before = inv.batch(id).unwrap().clone();

        let moved = inv.move_batch(id, freezer).unwrap();
        assert_eq!(moved.location_id(), freezer);
        assert_eq!(moved.counts(), before.counts());
        assert_eq!(moved.nearest_days(), before.nearest_days());
        assert_eq!(moved.window_days(), before.window_days());

        let err = inv.move_batch(id, LocationId::new()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "location", .. }));
    }

    #[test]
    fn batch_window_defaults_from_location_kind() {
        let mut inv = Inventory::new();
        let pantry = inv
            .add_location(NewLocation::new("Pantry — Hall", LocationKind::AmbientPantry))
            .unwrap();
        let id = inv.add_batch(NewBatch::new("Rice", pantry, 2, 15)).unwrap();
        let batch = inv.batch(id).unwrap();
        assert_eq!(batch.window_days(), 30);
        assert_eq!(batch.progress(), 0.5);
    }

    #[test]
    fn add_requires_known_location() {
        let mut inv = Inventory::new();
        let err = inv.add_batch(NewBatch::new("Milk", LocationId::new(), 1, 3)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "location", .. }));
        let err = inv.add_item(NewItem::new("Milk", LocationId::new())).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "location", .. }));
    }

    #[test]
    fn location_in_use_cannot_be_removed() {
        let mut inv = Inventory::new();
        let loc = fridge(&mut inv);
        let item = inv.add_item(NewItem::new("Mozzarella", loc).quantity(3)).unwrap();

        let err = inv.remove_location(loc).unwrap_err();
        assert_eq!(err, DomainError::location_in_use("Fridge — Kitchen", 1));

        inv.remove_item(item).unwrap();
        inv.remove_location(loc).unwrap();
        assert!(inv.locations().is_empty());
    }

    #[test]
    fn location_can_be_renamed_and_retargeted() {
        let mut inv = Inventory::new();
        let loc = fridge(&mut inv);
        let renamed = inv.rename_location(loc, "Fridge — Garage").unwrap();
        assert_eq!(renamed.name(), "Fridge — Garage");
        assert_eq!(renamed.target_temp_c(), Some(4));

        let retargeted = inv.retarget_location(loc, Some(2)).unwrap();
        assert_eq!(retargeted.target_temp_c(), Some(2));
        assert!(matches!(
            inv.rename_location(loc, "  "),
            Err(DomainError::InvalidField(_))
        ));
    }

    #[test]
    fn item_use_decrements_and_removes_at_zero() {
        let mut inv = Inventory::new();
        let loc = fridge(&mut inv);
        let id = inv.add_item(NewItem::new("Chicken Breast", loc).quantity(2).expires_in(7)).unwrap();

        let item = inv.use_item(id, 1).unwrap().unwrap();
        assert_eq!(item.quantity(), 1);
        assert_eq!(inv.use_item(id, 5).unwrap(), None);
        assert!(matches!(
            inv.use_item(id, 1),
            Err(DomainError::NotFound { entity: "item", .. })
        ));
    }

    #[test]
    fn item_can_be_opened_and_moved() {
        let mut inv = Inventory::new();
        let loc = fridge(&mut inv);
        let pantry = inv
            .add_location(NewLocation::new("Pantry — Hall", LocationKind::AmbientPantry))
            .unwrap();
        let id = inv.add_item(NewItem::new("Crackers", loc)).unwrap();

        assert!(inv.set_item_opened(id, true).unwrap().is_opened());
        assert_eq!(inv.move_item(id, pantry).unwrap().location_id(), pantry);
        assert_eq!(inv.references(loc), 0);
    }

    #[test]
    fn location_path_includes_shelf() {
        let mut inv = Inventory::new();
        let loc = fridge(&mut inv);
        assert_eq!(inv.location_path(loc, Some("Top shelf")), "Fridge — Kitchen · Top shelf");
        assert_eq!(inv.location_path(LocationId::new(), None), "Unassigned");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut inv = Inventory::new();
        let loc = fridge(&mut inv);
        let id = yogurt(&mut inv, loc, 4, 0, 3);
        let err = inv
            .dispatch(InventoryAction::SplitBatch {
                batch_id: id,
                amount: 1,
                new_batch_id: id,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Use(usize, u32),
        Split(usize, u32),
        Merge(usize, usize),
        Move(usize, bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..8, 0u32..6).prop_map(|(i, n)| Op::Use(i, n)),
            (0usize..8, 0u32..8).prop_map(|(i, n)| Op::Split(i, n)),
            (0usize..8, 0usize..8).prop_map(|(a, b)| Op::Merge(a, b)),
            (0usize..8, any::<bool>()).prop_map(|(i, f)| Op::Move(i, f)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: `opened <= total` holds after every operation, and a
        /// failed operation leaves every batch untouched.
        #[test]
        fn lifecycle_preserves_invariants(
            seeds in prop::collection::vec((1u32..6, 0u32..6, 0i32..10), 1..5),
            ops in prop::collection::vec(op(), 1..30)
        ) {
            let mut inv = Inventory::new();
            let fridge_id = fridge(&mut inv);
            let freezer = inv
                .add_location(NewLocation::new("Freezer", LocationKind::Frozen))
                .unwrap();
            for (total, opened, days) in seeds {
                yogurt(&mut inv, fridge_id, total, opened.min(total), days);
            }

            let units = |inv: &Inventory| inv.batches().iter().map(|b| u64::from(b.total())).sum::<u64>();

            for op in ops {
                let before = inv.batches().to_vec();
                let units_before = units(&inv);
                let pick = |i: usize| before.get(i % before.len().max(1)).map(Batch::id_typed).unwrap_or_default();

                let result = match op {
                    Op::Use(i, n) => inv.use_batch(pick(i), n).map(|_| ()),
                    Op::Split(i, n) => inv.split_batch(pick(i), n).map(|_| ()),
                    Op::Merge(a, b) => inv.merge_batches(pick(a), pick(b)).map(|_| ()),
                    Op::Move(i, to_freezer) => {
                        let to = if to_freezer { freezer } else { fridge_id };
                        inv.move_batch(pick(i), to).map(|_| ())
                    }
                };

                for b in inv.batches() {
                    prop_assert!(b.opened() <= b.total());
                    prop_assert!(b.total() >= 1);
                }
                match (result, op) {
                    (Err(_), _) => prop_assert_eq!(inv.batches(), &before[..]),
                    (Ok(()), Op::Use(..)) => prop_assert!(units(&inv) < units_before),
                    (Ok(()), _) => prop_assert_eq!(units(&inv), units_before),
                }
            }
        }
    }
}
