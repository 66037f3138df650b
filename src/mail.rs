use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Serialize, Clone, Debug)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Error, Debug)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("mail relay rejected message: {0}")]
    Rejected(StatusCode),
}

/// Outbound mail through an HTTP relay endpoint.
///
/// Delivery is fire-and-forget: the triggering request never waits on it and
/// failures surface only in the logs.
pub struct Mailer {
    client: Client,
    relay_url: Option<String>,
    from: String,
}

impl Mailer {
    pub fn new(relay_url: Option<String>, from: String) -> Self {
        Self {
            client: Client::new(),
            relay_url,
            from,
        }
    }

    pub fn dispatch(&self, message: MailMessage) {
        let Some(url) = self.relay_url.clone() else {
            debug!("No mail relay configured, dropping message to {}", message.to);
            return;
        };

        let client = self.client.clone();
        let from = self.from.clone();

        tokio::spawn(async move {
            if let Err(e) = send(&client, &url, &from, &message).await {
                warn!("Failed to send mail to {}: {e}", message.to);
            }
        });
    }
}

async fn send(
    client: &Client,
    url: &str,
    from: &str,
    message: &MailMessage,
) -> Result<(), MailError> {
    let response = client
        .post(url)
        .json(&serde_json::json!({
            "from": from,
            "to": message.to,
            "subject": message.subject,
            "text": message.text,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(MailError::Rejected(response.status()));
    }

    Ok(())
}
