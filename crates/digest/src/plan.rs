//! Turning settings and inventory state into an armed (or cancelled) digest.

use core::fmt::{Debug, Display};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use freshguard_inventory::Perishable;

use crate::content::{DigestLine, digest_content, render};
use crate::schedule::next_fire_time;
use crate::settings::DigestSettings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DigestPlan {
    Unscheduled,
    Scheduled {
        fire_at: NaiveDateTime,
        lines: Vec<DigestLine>,
    },
}

impl DigestPlan {
    pub fn fire_at(&self) -> Option<NaiveDateTime> {
        match self {
            DigestPlan::Unscheduled => None,
            DigestPlan::Scheduled { fire_at, .. } => Some(*fire_at),
        }
    }
}

pub fn plan_digest<T: Perishable>(settings: &DigestSettings, now: NaiveDateTime, entities: &[T]) -> DigestPlan {
    match next_fire_time(settings, now) {
        None => DigestPlan::Unscheduled,
        Some(fire_at) => DigestPlan::Scheduled {
            fire_at,
            lines: digest_content(entities),
        },
    }
}

/// Platform notification scheduler (outbound port).
///
/// At most one digest is pending at a time: `arm` replaces any earlier one.
pub trait NotificationScheduler {
    type Error: Debug + Display;

    fn arm(&self, fire_at: NaiveDateTime, title: &str, body: &str) -> Result<(), Self::Error>;

    fn cancel(&self) -> Result<(), Self::Error>;
}

pub fn apply_plan<S: NotificationScheduler + ?Sized>(plan: &DigestPlan, scheduler: &S) -> Result<(), S::Error> {
    match plan {
        DigestPlan::Unscheduled => {
            tracing::debug!("digest cancelled");
            scheduler.cancel()
        }
        DigestPlan::Scheduled { fire_at, lines } => {
            let (title, body) = render(lines);
            tracing::info!(%fire_at, lines = lines.len(), "digest armed");
            scheduler.arm(*fire_at, &title, &body)
        }
    }
}
