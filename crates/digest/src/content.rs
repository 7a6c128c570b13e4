//! What the digest says.

use serde::{Deserialize, Serialize};

use freshguard_inventory::{Perishable, Status};

/// One line of the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestLine {
    pub name: String,
    pub status: Status,
    pub days_remaining: Option<i32>,
}

impl DigestLine {
    /// e.g. "Greek Yogurt: Today", "Milk: 2d left", "Ham: expired 3d ago".
    pub fn describe(&self) -> String {
        let when = match self.days_remaining {
            Some(0) => "Today".to_string(),
            Some(d) if d < 0 => format!("expired {}d ago", -d),
            Some(d) => format!("{d}d left"),
            None => self.status.label().to_string(),
        };
        format!("{}: {when}", self.name)
    }
}

/// Entities due today or sooner, soonest first, ties broken by name.
/// Unknown expiry sorts last.
pub fn digest_content<T: Perishable>(entities: &[T]) -> Vec<DigestLine> {
    let mut lines: Vec<DigestLine> = entities
        .iter()
        .filter(|e| e.status() >= Status::DueToday)
        .map(|e| DigestLine {
            name: e.name().to_string(),
            status: e.status(),
            days_remaining: e.days_remaining(),
        })
        .collect();

    lines.sort_by(|a, b| {
        (a.days_remaining.is_none(), a.days_remaining, &a.name).cmp(&(
            b.days_remaining.is_none(),
            b.days_remaining,
            &b.name,
        ))
    });
    lines
}

/// Notification title and body for a set of lines.
pub fn render(lines: &[DigestLine]) -> (String, String) {
    match lines.len() {
        0 => ("FreshGuard".to_string(), "Nothing needs attention today.".to_string()),
        n => {
            let title = if n == 1 {
                "1 item needs attention".to_string()
            } else {
                format!("{n} items need attention")
            };
            let body = lines.iter().map(DigestLine::describe).collect::<Vec<_>>().join("\n");
            (title, body)
        }
    }
}
