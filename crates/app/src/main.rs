use std::sync::Arc;

use freshguard_app::{AppConfig, LoggingScheduler, demo};
use freshguard_core::DomainError;
use freshguard_digest::{
    InMemorySettingsStore, SettingsChanged, SettingsController, SettingsPersister, apply_plan, plan_digest,
};
use freshguard_events::{Event, InMemoryEventBus};
use freshguard_inventory::{Inventory, SharedInventory, counts_by_status};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    freshguard_observability::logging::init(config.log_format, "info");

    let store = Arc::new(InMemorySettingsStore::new());
    let controller = SettingsController::load(
        store.as_ref(),
        config.default_settings,
        Arc::new(InMemoryEventBus::<SettingsChanged>::new()),
    )?;
    let persister = SettingsPersister::new(Arc::clone(&store), controller.subscribe());

    let mut inventory = Inventory::with_thresholds(config.thresholds);
    demo::seed(&mut inventory)?;

    let shared = SharedInventory::new(inventory, InMemoryEventBus::new());
    let changes = shared.subscribe();

    shared.read(|inv| {
        for summary in inv.location_summaries() {
            tracing::info!(
                location = %summary.name,
                kind = %summary.kind,
                items = summary.items,
                batches = summary.batches,
                needs_attention = summary.needs_attention,
                "location"
            );
        }
    });

    // Eat one of the soonest-expiring batch.
    shared.mutate(|inv| {
        let soonest = inv
            .batches()
            .iter()
            .min_by_key(|b| b.nearest_days())
            .map(|b| b.id_typed())
            .ok_or_else(|| DomainError::invalid_field("no batches to use"))?;
        inv.use_batch(soonest, 1)
    })?;
    for event in changes.drain() {
        tracing::info!(event_type = event.event_type(), "inventory changed");
    }

    persister.sync()?;

    let entries = shared.read(Inventory::entries);
    let counts = counts_by_status(&entries);
    tracing::info!(total = counts.all, "inventory classified");

    let now = chrono::Local::now().naive_local();
    let plan = plan_digest(&controller.settings(), now, &entries);
    let scheduler = LoggingScheduler::new();
    apply_plan(&plan, &scheduler)?;

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
