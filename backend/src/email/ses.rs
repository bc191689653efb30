//! AWS SES v2 delivery

use super::{EmailMessage, Mailer};
use crate::config::EmailConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_sdk_sesv2::{
    config::Region,
    types::{Body, Content, Destination, EmailContent, Message},
    Client,
};
use tracing::info;

const CHARSET: &str = "UTF-8";

#[derive(Clone)]
pub struct SesMailer {
    client: Client,
    sender: String,
}

impl SesMailer {
    /// Build a client from the default credential chain
    pub async fn new(config: &EmailConfig) -> Self {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        Self {
            client: Client::new(&shared),
            sender: config.sender.clone(),
        }
    }

    fn content(data: &str) -> Result<Content> {
        Content::builder()
            .data(data)
            .charset(CHARSET)
            .build()
            .context("Failed to build email content")
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let body = Body::builder()
            .html(Self::content(&message.html)?)
            .text(Self::content(&message.text)?)
            .build();
        let simple = Message::builder()
            .subject(Self::content(&message.subject)?)
            .body(body)
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&self.sender)
            .destination(Destination::builder().to_addresses(&message.to).build())
            .content(EmailContent::builder().simple(simple).build())
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("SES send failed: {}", e))?;

        info!(
            to = %message.to,
            message_id = output.message_id().unwrap_or_default(),
            "Email sent"
        );
        Ok(())
    }
}
