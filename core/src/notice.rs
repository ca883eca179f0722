//! Per-participant allocation result messages.

use crate::types::{Allocation, EventOption, OptionId, SubmissionId};
use serde::Serialize;
use std::collections::HashMap;

/// A rendered allocation result for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationNotice {
    /// Recipient email.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Whether the participant got a seat.
    pub assigned: bool,
    /// Name of the assigned option.
    #[serde(skip)]
    pub option_name: Option<String>,
}

impl AllocationNotice {
    /// Render the notice for `to`. `option_name` is `None` for unassigned
    /// participants.
    #[must_use]
    pub fn render(to: &str, event_title: &str, option_name: Option<&str>) -> Self {
        let title = escape_html(event_title);
        let html = match option_name {
            Some(option) => format!(
                "<p>Good news! You have been allocated to <strong>{}</strong> for the event <em>{title}</em>.</p>",
                escape_html(option)
            ),
            None => format!(
                "<p>Unfortunately, you were not allocated to any option for the event <em>{title}</em>.</p>"
            ),
        };

        Self {
            to: to.to_string(),
            subject: allocation_subject(event_title),
            html,
            assigned: option_name.is_some(),
            option_name: option_name.map(str::to_string),
        }
    }

    /// One notice per allocation row whose submission still resolves in
    /// `emails`, in row order.
    #[must_use]
    pub fn for_allocations(
        event_title: &str,
        options: &[EventOption],
        allocations: &[Allocation],
        emails: &HashMap<SubmissionId, String>,
    ) -> Vec<Self> {
        let names: HashMap<OptionId, &str> =
            options.iter().map(|o| (o.id, o.name.as_str())).collect();

        allocations
            .iter()
            .filter_map(|row| {
                let to = emails.get(&row.submission_id)?;
                let option_name = row.option_id.and_then(|id| names.get(&id).copied());
                Some(Self::render(to, event_title, option_name))
            })
            .collect()
    }
}

/// Subject line for allocation results.
#[must_use]
pub fn allocation_subject(event_title: &str) -> String {
    format!("Your allocation result for \"{event_title}\"")
}

/// Subject line for verification codes.
#[must_use]
pub fn verification_subject(event_title: &str) -> String {
    format!("Your verification code for \"{event_title}\"")
}

/// Minimal escaping for text interpolated into HTML bodies.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
