//! Single writer for digest settings; every effective change is published.

use chrono::Utc;

use freshguard_events::{EventBus, Subscription};

use crate::settings::{DigestSettings, SettingsChanged};
use crate::store::{SettingsStore, SettingsStoreError, load_settings};

#[derive(Debug)]
pub struct SettingsController<B> {
    settings: DigestSettings,
    bus: B,
}

impl<B> SettingsController<B>
where
    B: EventBus<SettingsChanged>,
{
    pub fn new(settings: DigestSettings, bus: B) -> Self {
        Self { settings, bus }
    }

    /// Start from whatever the store holds, `fallback` for missing keys.
    pub fn load<S: SettingsStore + ?Sized>(
        store: &S,
        fallback: DigestSettings,
        bus: B,
    ) -> Result<Self, SettingsStoreError> {
        let settings = load_settings(store, fallback)?;
        tracing::info!(
            push_enabled = settings.push_enabled(),
            digest_enabled = settings.digest_enabled(),
            time = %settings.time_label(),
            "digest settings loaded"
        );
        Ok(Self::new(settings, bus))
    }

    pub fn settings(&self) -> DigestSettings {
        self.settings
    }

    pub fn subscribe(&self) -> Subscription<SettingsChanged> {
        self.bus.subscribe()
    }

    pub fn set_push_enabled(&mut self, on: bool) -> bool {
        self.update(|s| s.set_push_enabled(on))
    }

    /// Ignored (returns `false`) while push notifications are off.
    pub fn set_digest_enabled(&mut self, on: bool) -> bool {
        self.update(|s| s.set_digest_enabled(on))
    }

    pub fn set_digest_time(&mut self, hour: u8, minute: u8) -> bool {
        self.update(|s| s.set_digest_time(hour, minute))
    }

    /// Back to push off, digest off, 09:00.
    pub fn reset(&mut self) -> bool {
        self.update(|s| {
            let before = *s;
            *s = DigestSettings::default();
            *s != before
        })
    }

    fn update(&mut self, f: impl FnOnce(&mut DigestSettings) -> bool) -> bool {
        let previous = self.settings;
        if !f(&mut self.settings) {
            return false;
        }

        let change = SettingsChanged {
            previous,
            settings: self.settings,
            occurred_at: Utc::now(),
        };
        if let Err(err) = self.bus.publish(change) {
            tracing::warn!(error = %err, "failed to publish settings change");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use freshguard_events::InMemoryEventBus;

    use super::*;
    use crate::store::{InMemorySettingsStore, SettingsPersister};

    fn controller() -> SettingsController<Arc<InMemoryEventBus<SettingsChanged>>> {
        SettingsController::new(DigestSettings::default(), Arc::new(InMemoryEventBus::new()))
    }

    #[test]
    fn effective_changes_are_published_once() {
        let mut c = controller();
        let sub = c.subscribe();

        assert!(c.set_push_enabled(true));
        assert!(!c.set_push_enabled(true));
        assert!(c.set_digest_enabled(true));

        let changes = sub.drain();
        assert_eq!(changes.len(), 2);
        assert!(changes[1].settings.is_armed());
        assert!(!changes[1].previous.digest_enabled());
    }

    #[test]
    fn rejected_digest_toggle_publishes_nothing() {
        let mut c = controller();
        let sub = c.subscribe();
        assert!(!c.set_digest_enabled(true));
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn reset_restores_defaults_and_notifies() {
        let mut c = controller();
        c.set_push_enabled(true);
        c.set_digest_enabled(true);
        c.set_digest_time(18, 15);
        let sub = c.subscribe();

        assert!(c.reset());
        assert_eq!(c.settings(), DigestSettings::default());
        assert_eq!(sub.drain().len(), 1);
        assert!(!c.reset());
    }

    #[test]
    fn persister_saves_latest_state_and_controller_reloads_it() {
        let store = Arc::new(InMemorySettingsStore::new());
        let mut c = controller();
        let persister = SettingsPersister::new(Arc::clone(&store), c.subscribe());

        c.set_push_enabled(true);
        c.set_digest_enabled(true);
        c.set_digest_time(7, 5);
        assert_eq!(persister.sync().unwrap(), 3);
        assert_eq!(persister.sync().unwrap(), 0);

        let reloaded = SettingsController::load(
            store.as_ref(),
            DigestSettings::default(),
            Arc::new(InMemoryEventBus::<SettingsChanged>::new()),
        )
        .unwrap();
        assert_eq!(reloaded.settings(), c.settings());
    }
}
