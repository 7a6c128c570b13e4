//! Perishable inventory domain.
//!
//! Freshness classification, the item/batch/location model, the batch
//! lifecycle (use, split, merge, move) and the read-side queries built on top.
//! Pure, deterministic domain logic: no IO.

pub mod batch;
pub mod command;
pub mod event;
pub mod freshness;
pub mod inventory;
pub mod item;
pub mod location;
pub mod query;
pub mod shared;

pub use batch::{Batch, NewBatch, UnitCounts};
pub use command::{InventoryAction, InventoryCommand};
pub use event::{InventoryChange, InventoryEvent, Removal};
pub use freshness::{FreshnessThresholds, Status, classify, progress};
pub use inventory::Inventory;
pub use item::{Item, NewItem};
pub use location::{Location, LocationKind, NewLocation};
pub use query::{Entry, EntryId, Filtered, LocationSummary, Perishable, StatusCounts, StatusFilter, counts_by_status, filter};
pub use shared::SharedInventory;
