//! SMTP notifier using Lettre.

use super::Notifier;
use allocateme_core::notice::{AllocationNotice, escape_html, verification_subject};
use allocateme_core::{Result, SignupError};
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// SMTP notifier.
///
/// Sends real emails through an SMTP relay.
///
/// # Configuration
///
/// - `smtp_server`: relay host (e.g. "smtp.example.com")
/// - `smtp_port`: usually 587 (STARTTLS) or 465 (TLS)
/// - `smtp_username` / `smtp_password`: relay credentials
/// - `from_email` / `from_name`: sender
#[derive(Clone)]
pub struct SmtpNotifier {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("from_email", &self.from_email)
            .finish_non_exhaustive()
    }
}

impl SmtpNotifier {
    /// Create a new SMTP notifier.
    #[must_use]
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from_email: String,
        from_name: String,
    ) -> Self {
        Self {
            smtp_server,
            smtp_port,
            credentials: Credentials::new(smtp_username, smtp_password),
            from_email,
            from_name,
        }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.smtp_server)
                .map_err(|e| SignupError::Delivery(format!("SMTP relay error: {e}")))?
                .port(self.smtp_port)
                .credentials(self.credentials.clone())
                .build(),
        )
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    async fn send_html(&self, to: &str, subject: &str, html_body: String) -> Result<()> {
        let email = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| SignupError::Delivery(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| SignupError::Delivery(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| SignupError::Delivery(format!("Failed to build email: {e}")))?;

        self.transport()?
            .send(email)
            .await
            .map_err(|e| SignupError::Delivery(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}

fn wrap(title: &str, inner: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        {inner}
    </div>
</body>
</html>"#,
        title = escape_html(title),
    )
}

impl Notifier for SmtpNotifier {
    async fn send_verification_code(
        &self,
        to: &str,
        event_title: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let subject = verification_subject(event_title);
        let expires_minutes = (expires_at - Utc::now()).num_minutes();
        let inner = format!(
            r#"<h2 style="color: #2563eb;">Confirm your email</h2>
        <p>Enter this code to continue signing up for <em>{title}</em>:</p>
        <p style="font-size: 28px; letter-spacing: 6px; font-weight: bold;">{code}</p>
        <p style="color: #666; font-size: 14px;">The code expires in {expires_minutes} minutes. If you didn't request it, you can ignore this email.</p>"#,
            title = escape_html(event_title),
        );

        self.send_html(to, &subject, wrap(&subject, &inner)).await
    }

    async fn send_allocation_result(
        &self,
        to: &str,
        event_title: &str,
        option_name: Option<&str>,
    ) -> Result<()> {
        let notice = AllocationNotice::render(to, event_title, option_name);
        self.send_html(to, &notice.subject, wrap(&notice.subject, &notice.html))
            .await
    }
}
