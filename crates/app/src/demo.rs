//! Sample household inventory.

use freshguard_core::DomainResult;
use freshguard_inventory::{Inventory, LocationKind, NewBatch, NewItem, NewLocation};

/// Populate `inventory` with three locations, four items and four batches.
pub fn seed(inventory: &mut Inventory) -> DomainResult<()> {
    let fridge = inventory.add_location(
        NewLocation::new("Fridge — Kitchen", LocationKind::Refrigerated).with_target_temp(4),
    )?;
    let freezer = inventory.add_location(
        NewLocation::new("Freezer — Drawer", LocationKind::Frozen).with_target_temp(-18),
    )?;
    inventory.add_location(NewLocation::new("Pantry — Hall", LocationKind::AmbientPantry))?;

    inventory.add_item(
        NewItem::new("Greek Yogurt", fridge)
            .quantity(4)
            .expires_in(1)
            .on_shelf("Top shelf")
            .opened(),
    )?;
    inventory.add_item(
        NewItem::new("Chicken Breast", freezer)
            .quantity(2)
            .expires_in(7)
            .on_shelf("Drawer B"),
    )?;
    inventory.add_item(
        NewItem::new("Strawberries", fridge)
            .expires_in(0)
            .on_shelf("Box A")
            .opened(),
    )?;
    inventory.add_item(
        NewItem::new("Mozzarella", fridge)
            .quantity(3)
            .expires_in(3)
            .on_shelf("Door"),
    )?;

    inventory.add_batch(
        NewBatch::new("Greek Yogurt", fridge, 4, 0)
            .unit("packs")
            .opened(2)
            .on_shelf("Top shelf"),
    )?;
    inventory.add_batch(
        NewBatch::new("Chicken Breast", freezer, 4, 14)
            .unit("packs")
            .on_shelf("Drawer B"),
    )?;
    inventory.add_batch(
        NewBatch::new("Strawberries", fridge, 3, 1)
            .unit("boxes")
            .opened(1)
            .on_shelf("Box A"),
    )?;
    inventory.add_batch(
        NewBatch::new("Mozzarella", fridge, 5, 3)
            .unit("pcs")
            .on_shelf("Door"),
    )?;

    tracing::debug!(
        locations = inventory.locations().len(),
        items = inventory.items().len(),
        batches = inventory.batches().len(),
        "demo inventory seeded"
    );
    Ok(())
}
