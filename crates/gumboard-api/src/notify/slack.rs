use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Outbound chat client.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, channel: &str, text: &str) -> Result<()>;
}

/// Posts through Slack's `chat.postMessage` with a bot token.
pub struct SlackMessenger {
    bot_token: String,
    url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackMessenger {
    pub fn new(bot_token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            bot_token: bot_token.into(),
            url: SLACK_POST_MESSAGE_URL.to_string(),
            client,
        })
    }

    fn payload(channel: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "channel": channel,
            "text": text,
            "unfurl_links": false,
        })
    }
}

#[async_trait]
impl Messenger for SlackMessenger {
    async fn send_message(&self, channel: &str, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.bot_token)
            .json(&Self::payload(channel, text))
            .send()
            .await
            .map_err(|e| anyhow!("Slack request failed: {}", e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("Slack returned status {}", status));
        }

        // Slack reports most failures as 200 with ok=false
        let body: SlackResponse = resp.json().await?;
        if !body.ok {
            return Err(anyhow!(
                "Slack rejected message: {}",
                body.error.unwrap_or_else(|| "unknown error".into())
            ));
        }
        Ok(())
    }
}

/// Used when no bot token is configured: messages are logged and dropped.
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    async fn send_message(&self, channel: &str, text: &str) -> Result<()> {
        debug!("Slack disabled; dropping message for {}: {}", channel, text);
        Ok(())
    }
}
