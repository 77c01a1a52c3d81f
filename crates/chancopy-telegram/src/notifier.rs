use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use chancopy_core::{config::Config, domain::Permalink, ports::NotifierPort};

/// Bot API notifier: one `sendMessage` per successfully copied post.
///
/// Strictly fire-and-forget. A failed notification is logged and swallowed,
/// it never changes the copier's outcome for the post.
pub struct BotNotifier {
    http: reqwest::Client,
    url: String,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
}

impl BotNotifier {
    pub fn new(cfg: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: endpoint_url(&cfg.notify_api_base, &cfg.bot_token),
            chat_id: cfg.notify_chat_id.clone(),
        }
    }
}

fn endpoint_url(base: &str, token: &str) -> String {
    format!("{}/bot{token}/sendMessage", base.trim_end_matches('/'))
}

#[async_trait]
impl NotifierPort for BotNotifier {
    async fn notify_copied(&self, permalink: &Permalink) {
        let text = format!("✅ New post copied: {permalink}");
        let body = SendMessageBody {
            chat_id: &self.chat_id,
            text: &text,
        };

        match self.http.post(&self.url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(link = %permalink, "sent link to operator");
            }
            Ok(resp) => {
                warn!(status = %resp.status(), link = %permalink, "notification rejected");
            }
            Err(e) => {
                warn!(error = %e, link = %permalink, "could not send notification");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_embeds_token() {
        assert_eq!(
            endpoint_url("https://api.telegram.org", "123:abc"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        // A trailing slash on the base must not double up.
        assert_eq!(
            endpoint_url("https://api.telegram.org/", "t"),
            "https://api.telegram.org/bott/sendMessage"
        );
    }

    #[test]
    fn body_serializes_to_bot_api_shape() {
        let body = SendMessageBody {
            chat_id: "7598595878",
            text: "hi",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"chat_id": "7598595878", "text": "hi"})
        );
    }
}
