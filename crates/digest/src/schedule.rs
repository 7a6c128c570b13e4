//! When the next digest fires.

use chrono::{NaiveDateTime, NaiveTime};

use crate::settings::DigestSettings;

/// Next local time the digest should fire, strictly after `now`.
///
/// `None` unless both push and digest are enabled. Today's slot is used if
/// it is still ahead, otherwise tomorrow's.
pub fn next_fire_time(settings: &DigestSettings, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if !settings.is_armed() {
        return None;
    }

    let at = NaiveTime::from_hms_opt(u32::from(settings.hour()), u32::from(settings.minute()), 0)?;
    let today = now.date().and_time(at);
    if today > now {
        Some(today)
    } else {
        now.date().succ_opt().map(|tomorrow| tomorrow.and_time(at))
    }
}
