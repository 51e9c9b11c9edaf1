use crate::notify::{Messenger, NotifyError, PhotoSource};
use async_trait::async_trait;
use common::config::TelegramConfig;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Telegram Bot API client for one destination chat.
///
/// Constructed once at startup and injected wherever a `Messenger` is
/// needed; the `reqwest::Client` inside is the long-lived connection pool.
pub struct TelegramMessenger {
    client: reqwest::Client,
    api_url: String,
    token: String,
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramMessenger {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn check(response: reqwest::Response) -> Result<(), NotifyError> {
        let status = response.status();
        let body: ApiResponse = response.json().await?;
        if body.ok {
            Ok(())
        } else {
            Err(NotifyError::Api(
                body.description
                    .unwrap_or_else(|| format!("http status {status}")),
            ))
        }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        debug!("Sending text message to chat {}", self.chat_id);
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await?;
        Self::check(response).await
    }

    async fn send_photo(&self, photo: PhotoSource, caption: &str) -> Result<(), NotifyError> {
        debug!("Sending photo to chat {}", self.chat_id);
        let request = self.client.post(self.method_url("sendPhoto"));
        let response = match photo {
            // Telegram fetches http(s) references itself
            PhotoSource::Url(url) => {
                request
                    .json(&json!({
                        "chat_id": self.chat_id,
                        "photo": url,
                        "caption": caption,
                        "parse_mode": "HTML",
                    }))
                    .send()
                    .await?
            }
            // Local media files go up as multipart uploads
            PhotoSource::Path(path) => {
                let bytes = tokio::fs::read(&path).await?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "photo".to_string());
                let form = Form::new()
                    .text("chat_id", self.chat_id.clone())
                    .text("caption", caption.to_string())
                    .text("parse_mode", "HTML")
                    .part("photo", Part::bytes(bytes).file_name(file_name));
                request.multipart(form).send().await?
            }
        };
        Self::check(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messenger() -> TelegramMessenger {
        TelegramMessenger::new(&TelegramConfig {
            token: "123:abc".to_string(),
            chat_id: "-100500".to_string(),
            api_url: "https://api.telegram.org/".to_string(),
        })
    }

    #[test]
    fn test_method_url_shape() {
        let m = messenger();
        assert_eq!(
            m.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
