//! Transactional email
//!
//! Password reset links and change notifications go through the [`Mailer`]
//! trait. Production uses [`SesMailer`]; development and tests use
//! [`LogMailer`], which only records the message in the trace log.

mod ses;

pub use ses::SesMailer;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Rendered email ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}

/// Mailer that writes to the log instead of sending
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        info!(to = %message.to, subject = %message.subject, "Email delivery disabled, logging only");
        tracing::debug!(body = %message.text);
        Ok(())
    }
}

// ============================================================================
// Templates
// ============================================================================

fn greeting_name(name: Option<&str>) -> &str {
    name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("there")
}

pub fn password_reset_email(
    to: &str,
    name: Option<&str>,
    frontend_url: &str,
    token: &str,
) -> EmailMessage {
    let name = greeting_name(name);
    let link = format!(
        "{}/reset-password?token={}",
        frontend_url.trim_end_matches('/'),
        token
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Reset Your Password - FitTrack".to_string(),
        html: format!(
            "<h2>Hello {name},</h2>\
             <p>We received a request to reset your password. Use the button below to choose a new one:</p>\
             <p><a href=\"{link}\" style=\"padding: 10px 20px; background-color: #5E58D5; color: white; \
             text-decoration: none; border-radius: 5px;\">Reset Password</a></p>\
             <p>The link expires in 1 hour.</p>\
             <p>If you did not ask for this, you can ignore this email.</p>\
             <p>FitTrack Team</p>"
        ),
        text: format!(
            "Hello {name},\n\nReset your FitTrack password here: {link}\n\
             The link expires in 1 hour. If you did not ask for this, ignore this email.\n\nFitTrack Team"
        ),
    }
}

pub fn password_changed_email(to: &str, name: Option<&str>) -> EmailMessage {
    let name = greeting_name(name);
    EmailMessage {
        to: to.to_string(),
        subject: "Password Successfully Changed - FitTrack".to_string(),
        html: format!(
            "<h2>Hello {name},</h2>\
             <p>Your password has been changed.</p>\
             <p>If this was not you, contact our support team immediately.</p>\
             <p>FitTrack Team</p>"
        ),
        text: format!(
            "Hello {name},\n\nYour FitTrack password has been changed. \
             If this was not you, contact support immediately.\n\nFitTrack Team"
        ),
    }
}
