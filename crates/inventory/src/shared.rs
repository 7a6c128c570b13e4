//! Lock-guarded inventory handle.
//!
//! One writer at a time: every mutation takes the write lock, so no two
//! operations can observe or change the same batch concurrently. Reads share
//! the read lock and always see a consistent snapshot.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use freshguard_core::DomainResult;
use freshguard_events::{Event, EventBus, Subscription};

use crate::event::InventoryEvent;
use crate::inventory::Inventory;

/// Cloneable handle to a single inventory plus the bus its changes are published on.
#[derive(Debug)]
pub struct SharedInventory<B> {
    inner: Arc<RwLock<Inventory>>,
    bus: Arc<B>,
}

impl<B> Clone for SharedInventory<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            bus: Arc::clone(&self.bus),
        }
    }
}

impl<B> SharedInventory<B>
where
    B: EventBus<InventoryEvent>,
{
    /// Takes ownership of `inventory` and turns on event recording so every
    /// mutation can be published.
    pub fn new(mut inventory: Inventory, bus: B) -> Self {
        inventory.set_recording(true);
        Self {
            inner: Arc::new(RwLock::new(inventory)),
            bus: Arc::new(bus),
        }
    }

    /// Run a read-only query against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&Inventory) -> R) -> R {
        f(&self.read_guard())
    }

    /// Run one mutation under the write lock, then publish what it applied.
    ///
    /// Changes are published even when `f` returns an error after an earlier
    /// operation inside it succeeded; a single operation either applies
    /// completely or not at all.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Inventory) -> DomainResult<R>) -> DomainResult<R> {
        let (result, applied) = {
            let mut inventory = self.write_guard();
            let result = f(&mut inventory);
            (result, inventory.take_pending())
        };

        for event in applied {
            let event_type = event.event_type();
            if let Err(err) = self.bus.publish(event) {
                tracing::warn!(event_type, error = %err, "failed to publish inventory change");
            }
        }

        result
    }

    pub fn subscribe(&self) -> Subscription<InventoryEvent> {
        self.bus.subscribe()
    }

    // The inventory is never left half-mutated (see `Aggregate::apply`), so a
    // poisoned lock still guards valid state.
    fn read_guard(&self) -> RwLockReadGuard<'_, Inventory> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Inventory> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
