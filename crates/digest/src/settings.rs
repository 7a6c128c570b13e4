//! Daily digest settings and their toggle rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use freshguard_events::Event;

pub const DEFAULT_DIGEST_HOUR: u8 = 9;
pub const DEFAULT_DIGEST_MINUTE: u8 = 0;

/// Push/digest configuration.
///
/// Invariant: `digest_enabled` implies `push_enabled`. Every setter keeps it,
/// and deserialization goes through [`DigestSettings::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawDigestSettings")]
pub struct DigestSettings {
    push_enabled: bool,
    digest_enabled: bool,
    hour: u8,
    minute: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDigestSettings {
    push_enabled: bool,
    digest_enabled: bool,
    hour: u8,
    minute: u8,
}

impl From<RawDigestSettings> for DigestSettings {
    fn from(raw: RawDigestSettings) -> Self {
        Self::new(raw.push_enabled, raw.digest_enabled, raw.hour, raw.minute)
    }
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            push_enabled: false,
            digest_enabled: false,
            hour: DEFAULT_DIGEST_HOUR,
            minute: DEFAULT_DIGEST_MINUTE,
        }
    }
}

impl DigestSettings {
    /// Normalizing constructor: digest is forced off without push, and the
    /// time is clamped to 0..=23 / 0..=59.
    pub fn new(push_enabled: bool, digest_enabled: bool, hour: u8, minute: u8) -> Self {
        Self {
            push_enabled,
            digest_enabled: digest_enabled && push_enabled,
            hour: hour.min(23),
            minute: minute.min(59),
        }
    }

    pub fn push_enabled(&self) -> bool {
        self.push_enabled
    }

    pub fn digest_enabled(&self) -> bool {
        self.digest_enabled
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Both toggles on: a digest should be scheduled.
    pub fn is_armed(&self) -> bool {
        self.push_enabled && self.digest_enabled
    }

    /// "HH:MM".
    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// Returns whether anything changed. Turning push off also turns the digest off.
    pub fn set_push_enabled(&mut self, on: bool) -> bool {
        let before = *self;
        self.push_enabled = on;
        if !on {
            self.digest_enabled = false;
        }
        *self != before
    }

    /// Returns whether anything changed. Enabling is ignored while push is off.
    pub fn set_digest_enabled(&mut self, on: bool) -> bool {
        if on && !self.push_enabled {
            tracing::debug!("digest toggle ignored: push notifications are off");
            return false;
        }
        let before = self.digest_enabled;
        self.digest_enabled = on;
        before != on
    }

    /// Returns whether anything changed. Out-of-range values are clamped.
    pub fn set_digest_time(&mut self, hour: u8, minute: u8) -> bool {
        let before = (self.hour, self.minute);
        self.hour = hour.min(23);
        self.minute = minute.min(59);
        before != (self.hour, self.minute)
    }
}

/// Event: digest settings changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsChanged {
    pub previous: DigestSettings,
    pub settings: DigestSettings,
    pub occurred_at: DateTime<Utc>,
}

impl Event for SettingsChanged {
    fn event_type(&self) -> &'static str {
        "settings.digest.changed"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_launch() {
        let s = DigestSettings::default();
        assert!(!s.push_enabled());
        assert!(!s.digest_enabled());
        assert_eq!(s.time_label(), "09:00");
    }

    #[test]
    fn disabling_push_forces_digest_off() {
        let mut s = DigestSettings::new(true, true, 9, 0);
        assert!(s.set_push_enabled(false));
        assert!(!s.digest_enabled());
        assert!(!s.is_armed());
    }

    #[test]
    fn digest_cannot_be_enabled_without_push() {
        let mut s = DigestSettings::default();
        assert!(!s.set_digest_enabled(true));
        assert!(!s.digest_enabled());

        s.set_push_enabled(true);
        assert!(s.set_digest_enabled(true));
        assert!(s.is_armed());
    }

    #[test]
    fn new_normalizes_inputs() {
        let s = DigestSettings::new(false, true, 99, 75);
        assert!(!s.digest_enabled());
        assert_eq!((s.hour(), s.minute()), (23, 59));
    }

    #[test]
    fn deserialization_normalizes() {
        let s: DigestSettings =
            serde_json::from_str(r#"{"pushEnabled":false,"digestEnabled":true,"hour":9,"minute":0}"#).unwrap();
        assert!(!s.digest_enabled());

        let s: DigestSettings =
            serde_json::from_str(r#"{"pushEnabled":true,"digestEnabled":true,"hour":99,"minute":75}"#).unwrap();
        assert_eq!(s, DigestSettings::new(true, true, 23, 59));

        let now = chrono::NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert!(crate::schedule::next_fire_time(&s, now).is_some());
    }

    #[test]
    fn settings_changed_round_trips_through_json() {
        let change = SettingsChanged {
            previous: DigestSettings::default(),
            settings: DigestSettings::new(true, true, 7, 30),
            occurred_at: Utc::now(),
        };
        let json = serde_json::to_string(&change).unwrap();
        assert!(json.contains(r#""pushEnabled":true"#));
        assert_eq!(serde_json::from_str::<SettingsChanged>(&json).unwrap(), change);
    }

    #[test]
    fn set_time_reports_changes_only() {
        let mut s = DigestSettings::default();
        assert!(!s.set_digest_time(9, 0));
        assert!(s.set_digest_time(7, 30));
        assert_eq!(s.time_label(), "07:30");
    }
}
