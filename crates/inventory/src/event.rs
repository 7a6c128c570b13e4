use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use freshguard_core::{BatchId, ItemId, LocationId};
use freshguard_events::Event;

use crate::batch::{Batch, UnitCounts};
use crate::item::Item;
use crate::location::Location;

/// Why an item or batch left the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Removal {
    /// Quantity reached zero through use.
    Depleted,
    /// Explicitly deleted.
    Deleted,
}

/// Event: a change that was applied to the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEvent {
    pub change: InventoryChange,
    pub occurred_at: DateTime<Utc>,
}

/// Changes carry resulting state so that applying them cannot fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryChange {
    LocationAdded(Location),
    LocationUpdated(Location),
    LocationRemoved {
        location_id: LocationId,
    },
    ItemAdded(Item),
    ItemUsed {
        item_id: ItemId,
        used: u32,
        remaining: u32,
    },
    ItemOpenedChanged {
        item_id: ItemId,
        opened: bool,
    },
    ItemMoved {
        item_id: ItemId,
        from: LocationId,
        to: LocationId,
    },
    ItemRemoved {
        item_id: ItemId,
        reason: Removal,
    },
    BatchAdded(Batch),
    BatchUsed {
        batch_id: BatchId,
        used: u32,
        counts: UnitCounts,
    },
    BatchSplit {
        source_id: BatchId,
        remaining: UnitCounts,
        split_off: Batch,
    },
    BatchesMerged {
        sources: [BatchId; 2],
        merged: Batch,
    },
    BatchMoved {
        batch_id: BatchId,
        from: LocationId,
        to: LocationId,
    },
    BatchRemoved {
        batch_id: BatchId,
        reason: Removal,
    },
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match &self.change {
            InventoryChange::LocationAdded(_) => "inventory.location.added",
            InventoryChange::LocationUpdated(_) => "inventory.location.updated",
            InventoryChange::LocationRemoved { .. } => "inventory.location.removed",
            InventoryChange::ItemAdded(_) => "inventory.item.added",
            InventoryChange::ItemUsed { .. } => "inventory.item.used",
            InventoryChange::ItemOpenedChanged { .. } => "inventory.item.opened_changed",
            InventoryChange::ItemMoved { .. } => "inventory.item.moved",
            InventoryChange::ItemRemoved { reason: Removal::Depleted, .. } => "inventory.item.depleted",
            InventoryChange::ItemRemoved { .. } => "inventory.item.removed",
            InventoryChange::BatchAdded(_) => "inventory.batch.added",
            InventoryChange::BatchUsed { .. } => "inventory.batch.used",
            InventoryChange::BatchSplit { .. } => "inventory.batch.split",
            InventoryChange::BatchesMerged { .. } => "inventory.batch.merged",
            InventoryChange::BatchMoved { .. } => "inventory.batch.moved",
            InventoryChange::BatchRemoved { reason: Removal::Depleted, .. } => "inventory.batch.depleted",
            InventoryChange::BatchRemoved { .. } => "inventory.batch.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
