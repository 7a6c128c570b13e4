use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use freshguard_core::{BatchId, ItemId, LocationId};

use crate::batch::NewBatch;
use crate::item::NewItem;
use crate::location::NewLocation;

/// Command: one requested change to the inventory, stamped with wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryCommand {
    pub action: InventoryAction,
    pub occurred_at: DateTime<Utc>,
}

impl InventoryCommand {
    pub fn new(action: InventoryAction, occurred_at: DateTime<Utc>) -> Self {
        Self { action, occurred_at }
    }

    pub fn now(action: InventoryAction) -> Self {
        Self::new(action, Utc::now())
    }
}

/// What a command asks for. Ids of entities it creates are chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryAction {
    AddLocation {
        location_id: LocationId,
        location: NewLocation,
    },
    /// `target_temp_c: Some(None)` clears the temperature.
    UpdateLocation {
        location_id: LocationId,
        name: Option<String>,
        target_temp_c: Option<Option<i16>>,
    },
    RemoveLocation {
        location_id: LocationId,
    },
    AddItem {
        item_id: ItemId,
        item: NewItem,
    },
    UseItem {
        item_id: ItemId,
        amount: u32,
    },
    SetItemOpened {
        item_id: ItemId,
        opened: bool,
    },
    MoveItem {
        item_id: ItemId,
        location_id: LocationId,
    },
    RemoveItem {
        item_id: ItemId,
    },
    AddBatch {
        batch_id: BatchId,
        batch: NewBatch,
    },
    UseBatch {
        batch_id: BatchId,
        amount: u32,
    },
    SplitBatch {
        batch_id: BatchId,
        amount: u32,
        new_batch_id: BatchId,
    },
    MergeBatches {
        first: BatchId,
        second: BatchId,
        merged_id: BatchId,
    },
    MoveBatch {
        batch_id: BatchId,
        location_id: LocationId,
    },
    RemoveBatch {
        batch_id: BatchId,
    },
}
