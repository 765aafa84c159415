//! Chat-transport seam: inbound update payloads, the outbound `ChatApi`
//! capability, and the HTTP Bot-API client implementing it.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{BotError, BotResult};

/// The transport caps messages around 4096 chars; long listings are split.
pub const MESSAGE_CHUNK: usize = 4000;

// ===== inbound payloads =====

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<Sender>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Chat {
    pub fn is_private(&self) -> bool {
        self.kind == "private"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: Sender,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub data: Option<String>,
}

// ===== callback payloads =====

/// Tagged action-and-target payload carried in inline buttons, encoded as
/// `"<verb>_<id>"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Approve(i64),
    Disapprove(i64),
    Ban(i64),
    Unban(i64),
    Promote(i64),
    Demote(i64),
    SelectUser(i64),
    SelectProduct(i64),
    EditProductName(i64),
    EditProductQuantity(i64),
    EditProductCategory(i64),
    DeleteProduct(i64),
}

impl CallbackAction {
    pub fn encode(self) -> String {
        let (verb, id) = match self {
            Self::Approve(id) => ("approve", id),
            Self::Disapprove(id) => ("disapprove", id),
            Self::Ban(id) => ("ban", id),
            Self::Unban(id) => ("unban", id),
            Self::Promote(id) => ("promote", id),
            Self::Demote(id) => ("demote", id),
            Self::SelectUser(id) => ("user", id),
            Self::SelectProduct(id) => ("product", id),
            Self::EditProductName(id) => ("pname", id),
            Self::EditProductQuantity(id) => ("pqty", id),
            Self::EditProductCategory(id) => ("pcat", id),
            Self::DeleteProduct(id) => ("pdel", id),
        };
        format!("{verb}_{id}")
    }

    pub fn decode(data: &str) -> Option<Self> {
        let (verb, id) = data.rsplit_once('_')?;
        let id: i64 = id.parse().ok()?;
        let action = match verb {
            "approve" => Self::Approve(id),
            "disapprove" => Self::Disapprove(id),
            "ban" => Self::Ban(id),
            "unban" => Self::Unban(id),
            "promote" => Self::Promote(id),
            "demote" => Self::Demote(id),
            "user" => Self::SelectUser(id),
            "product" => Self::SelectProduct(id),
            "pname" => Self::EditProductName(id),
            "pqty" => Self::EditProductQuantity(id),
            "pcat" => Self::EditProductCategory(id),
            "pdel" => Self::DeleteProduct(id),
            _ => return None,
        };
        Some(action)
    }
}

// ===== outbound =====

#[derive(Debug, Clone)]
pub struct InlineButton {
    pub text: String,
    pub callback: CallbackAction,
}

#[derive(Debug, Clone)]
pub enum ReplyMarkup {
    /// Reply keyboard built from button-label rows.
    Keyboard(Vec<Vec<String>>),
    Inline(Vec<Vec<InlineButton>>),
    Remove,
}

impl ReplyMarkup {
    fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Keyboard(rows) => {
                let keyboard: Vec<Vec<_>> = rows
                    .iter()
                    .map(|row| row.iter().map(|text| json!({ "text": text })).collect())
                    .collect();
                json!({ "keyboard": keyboard, "resize_keyboard": true })
            }
            Self::Inline(rows) => {
                let keyboard: Vec<Vec<_>> = rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|b| {
                                json!({ "text": b.text, "callback_data": b.callback.encode() })
                            })
                            .collect()
                    })
                    .collect();
                json!({ "inline_keyboard": keyboard })
            }
            Self::Remove => json!({ "remove_keyboard": true }),
        }
    }
}

/// Outbound capability of the chat transport. Production uses [`BotClient`];
/// tests substitute a recording mock.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> BotResult<()>;

    async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> BotResult<()>;

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> BotResult<()>;

    /// Split an over-long listing into transport-sized chunks; the markup, if
    /// any, rides on the final chunk.
    async fn send_chunked(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> BotResult<()> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= MESSAGE_CHUNK {
            return self.send_message(chat_id, text, markup).await;
        }
        let mut start = 0;
        while start < chars.len() {
            let end = (start + MESSAGE_CHUNK).min(chars.len());
            let chunk: String = chars[start..end].iter().collect();
            let last = end == chars.len();
            self.send_message(chat_id, &chunk, if last { markup.clone() } else { None })
                .await?;
            start = end;
        }
        Ok(())
    }
}

/// HTTP client for the bot transport API.
#[derive(Clone)]
pub struct BotClient {
    http: reqwest::Client,
    base_url: String,
}

impl BotClient {
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("https://api.telegram.org/bot{token}"),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call(&self, method: &str, payload: serde_json::Value) -> BotResult<()> {
        let resp = self
            .http
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::BadRequest(format!(
                "transport call {method} failed: {status}: {body}"
            )));
        }
        Ok(())
    }

    pub async fn set_webhook(&self, url: &str) -> BotResult<()> {
        self.call("setWebhook", json!({ "url": url })).await
    }
}

#[async_trait]
impl ChatApi for BotClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> BotResult<()> {
        let mut payload = json!({ "chat_id": chat_id, "text": text });
        if let Some(markup) = markup {
            payload["reply_markup"] = markup.to_value();
        }
        self.call("sendMessage", payload).await
    }

    async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> BotResult<()> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);
        let resp = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(BotError::BadRequest(format!(
                "transport call sendDocument failed: {status}"
            )));
        }
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> BotResult<()> {
        let mut payload = json!({ "callback_query_id": callback_id });
        if let Some(text) = text {
            payload["text"] = json!(text);
        }
        self.call("answerCallbackQuery", payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::CallbackAction;

    #[test]
    fn callback_payloads_round_trip() {
        let actions = [
            CallbackAction::Approve(42),
            CallbackAction::Disapprove(1),
            CallbackAction::Ban(7),
            CallbackAction::SelectUser(7873867301),
            CallbackAction::EditProductQuantity(12),
            CallbackAction::DeleteProduct(3),
        ];
        for action in actions {
            assert_eq!(CallbackAction::decode(&action.encode()), Some(action));
        }
    }

    #[test]
    fn unknown_or_malformed_payloads_decode_to_none() {
        assert_eq!(CallbackAction::decode("frobnicate_3"), None);
        assert_eq!(CallbackAction::decode("approve_notanumber"), None);
        assert_eq!(CallbackAction::decode("approve"), None);
        assert_eq!(CallbackAction::decode(""), None);
    }
}
