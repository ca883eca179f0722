//! Console notifier for development and testing.

use super::Notifier;
use allocateme_core::Result;
use allocateme_core::notice::{AllocationNotice, allocation_subject, verification_subject};
use chrono::{DateTime, Utc};
use tracing::info;

/// Console notifier.
///
/// Logs messages and prints them to stdout instead of sending them. Useful
/// when running locally without an SMTP relay.
#[derive(Clone, Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a new console notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn print_box(heading: &str, to: &str, subject: &str, body: &[String]) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║ {heading:<61}║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║ To: {to:<57}║");
    println!("║ Subject: {subject:<52}║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    for line in body {
        println!("║ {line:<61}║");
    }
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

impl Notifier for ConsoleNotifier {
    async fn send_verification_code(
        &self,
        to: &str,
        event_title: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let expires_minutes = (expires_at - Utc::now()).num_minutes();

        info!(
            to = %to,
            code = %code,
            expires_in = %expires_minutes,
            "📧 Verification code (development mode)"
        );
        print_box(
            "VERIFICATION CODE",
            to,
            &verification_subject(event_title),
            &[
                format!("Your code: {code}"),
                format!("It expires in {expires_minutes} minutes."),
            ],
        );

        Ok(())
    }

    async fn send_allocation_result(
        &self,
        to: &str,
        event_title: &str,
        option_name: Option<&str>,
    ) -> Result<()> {
        let notice = AllocationNotice::render(to, event_title, option_name);

        info!(
            to = %to,
            assigned = notice.assigned,
            "📧 Allocation result (development mode)"
        );
        let line = option_name.map_or_else(
            || "No option could be assigned.".to_string(),
            |name| format!("Assigned to: {name}"),
        );
        print_box("ALLOCATION RESULT", to, &allocation_subject(event_title), &[line]);

        Ok(())
    }
}
