//! Chat webhook notifications for cost spikes.

use crate::analytics::Delta;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Request timeout for webhook delivery.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Attachments rendered per message.
pub const MAX_ATTACHMENTS: usize = 5;

/// Webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackMessage {
    /// Fallback text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Layout blocks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<SlackBlock>,
    /// One attachment per top mover.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<SlackAttachment>,
}

/// Layout block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackBlock {
    /// Block type (`header`, `section`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Block text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<SlackText>,
}

/// Text object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackText {
    /// `plain_text` or `mrkdwn`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Content.
    pub text: String,
}

/// Coloured attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackAttachment {
    /// `good`, `warning` or `danger`.
    pub color: String,
    /// Grouping key.
    pub title: String,
    /// Cost figures.
    pub fields: Vec<SlackField>,
}

/// Attachment field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackField {
    /// Label.
    pub title: String,
    /// Value.
    pub value: String,
    /// Render side by side.
    pub short: bool,
}

impl SlackField {
    fn short(title: &str, value: String) -> Self {
        Self {
            title: title.to_string(),
            value,
            short: true,
        }
    }
}

fn attachment_color(absolute_delta: f64) -> &'static str {
    if absolute_delta > 500.0 {
        "danger"
    } else if absolute_delta > 100.0 {
        "warning"
    } else {
        "good"
    }
}

fn attachment(d: &Delta) -> SlackAttachment {
    let mut fields = vec![
        SlackField::short("Current Cost", format!("${:.2}", d.current_cost)),
        SlackField::short("Delta", format!("${:.2}", d.absolute_delta)),
        SlackField::short("Change", format!("{:.1}%", d.percent_change)),
        SlackField::short("Prior Cost", format!("${:.2}", d.prior_cost)),
    ];
    if d.is_new_spender {
        fields.push(SlackField {
            title: "Status".to_string(),
            value: "🆕 New Spender".to_string(),
            short: false,
        });
    }

    SlackAttachment {
        color: attachment_color(d.absolute_delta).to_string(),
        title: d.key.clone(),
        fields,
    }
}

/// Build the spike alert for the first `top_n` deltas (0 = all).
pub fn build_spike_message(deltas: &[Delta], top_n: usize) -> Result<SlackMessage> {
    if deltas.is_empty() {
        return Err(Error::Notify("no data to send".to_string()));
    }

    let selected = if top_n > 0 && deltas.len() > top_n { &deltas[..top_n] } else { deltas };

    Ok(SlackMessage {
        text: ":warning: *AWS Cost Spike Alert*".to_string(),
        blocks: vec![
            SlackBlock {
                kind: "header".to_string(),
                text: Some(SlackText {
                    kind: "plain_text".to_string(),
                    text: "AWS Cost Spike Detected".to_string(),
                }),
            },
            SlackBlock {
                kind: "section".to_string(),
                text: Some(SlackText {
                    kind: "mrkdwn".to_string(),
                    text: format!("Detected {} cost changes. Top movers:", selected.len()),
                }),
            },
        ],
        attachments: selected.iter().take(MAX_ATTACHMENTS).map(attachment).collect(),
    })
}

/// Posts messages to incoming webhooks.
pub struct SlackNotifier {
    client: reqwest::Client,
}

impl SlackNotifier {
    /// Creates a notifier with the default timeout.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Post `message` to `webhook_url`. Any non-success status is an error.
    pub async fn send(&self, webhook_url: &str, message: &SlackMessage) -> Result<()> {
        let response = self.client.post(webhook_url).json(message).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Webhook rejected message");
            return Err(Error::Notify(format!("webhook returned status {}: {}", status, body)));
        }

        info!(attachments = message.attachments.len(), "Sent webhook notification");
        Ok(())
    }
}
