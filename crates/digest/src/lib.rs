//! Daily expiry digest: settings, persistence, scheduling and content.

pub mod content;
pub mod controller;
pub mod plan;
pub mod schedule;
pub mod settings;
pub mod store;

pub use content::{DigestLine, digest_content, render};
pub use controller::SettingsController;
pub use plan::{DigestPlan, NotificationScheduler, apply_plan, plan_digest};
pub use schedule::next_fire_time;
pub use settings::{DEFAULT_DIGEST_HOUR, DEFAULT_DIGEST_MINUTE, DigestSettings, SettingsChanged};
pub use store::{InMemorySettingsStore, SettingsPersister, SettingsStore, SettingsStoreError, load_settings, save_settings};
