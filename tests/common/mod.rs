#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database};

use shiftstock::config::AppConfig;
use shiftstock::db;
use shiftstock::entity::users::ActiveModel as UserActive;
use shiftstock::error::BotResult;
use shiftstock::router;
use shiftstock::session::{Flow, SessionStore};
use shiftstock::state::AppState;
use shiftstock::telegram::{
    CallbackQuery, Chat, ChatApi, IncomingMessage, ReplyMarkup, Sender, Update,
};

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat: i64,
    pub text: String,
}

/// Transport mock that records everything the bot sends.
#[derive(Default)]
pub struct RecordingApi {
    pub messages: Mutex<Vec<SentMessage>>,
    pub documents: Mutex<Vec<(i64, String)>>,
    pub callback_answers: Mutex<Vec<Option<String>>>,
}

impl RecordingApi {
    pub fn texts_to(&self, chat: i64) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.chat == chat)
            .map(|m| m.text.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
        self.documents.lock().unwrap().clear();
        self.callback_answers.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChatApi for RecordingApi {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        _markup: Option<ReplyMarkup>,
    ) -> BotResult<()> {
        self.messages.lock().unwrap().push(SentMessage {
            chat: chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        _bytes: Vec<u8>,
        _caption: &str,
    ) -> BotResult<()> {
        self.documents
            .lock()
            .unwrap()
            .push((chat_id, filename.to_string()));
        Ok(())
    }

    async fn answer_callback(&self, _callback_id: &str, text: Option<&str>) -> BotResult<()> {
        self.callback_answers
            .lock()
            .unwrap()
            .push(text.map(|t| t.to_string()));
        Ok(())
    }
}

pub async fn setup_state() -> anyhow::Result<(AppState, Arc<RecordingApi>)> {
    // a pooled in-memory sqlite needs a single connection or every checkout
    // sees a different database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let orm = Database::connect(options).await?;
    db::run_migrations(&orm).await?;

    let api = Arc::new(RecordingApi::default());
    let state = AppState {
        orm,
        config: AppConfig::for_tests(),
        api: api.clone(),
        sessions: Arc::new(SessionStore::new()),
    };
    Ok((state, api))
}

pub async fn seed_user(
    state: &AppState,
    id: i64,
    approved: bool,
    admin: bool,
    banned: bool,
) -> anyhow::Result<()> {
    UserActive {
        id: Set(id),
        username: Set(Some(format!("user{id}"))),
        first_name: Set(Some(format!("User {id}"))),
        is_admin: Set(admin),
        is_banned: Set(banned),
        is_approved: Set(approved),
        added_at: Set(Utc::now()),
        last_action_at: Set(None),
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

pub fn private_text(user_id: i64, text: &str) -> Update {
    Update {
        update_id: 1,
        message: Some(IncomingMessage {
            message_id: 1,
            from: Some(Sender {
                id: user_id,
                username: Some(format!("user{user_id}")),
                first_name: Some(format!("User {user_id}")),
            }),
            chat: Chat {
                id: user_id,
                kind: "private".to_string(),
            },
            text: Some(text.to_string()),
        }),
        callback_query: None,
    }
}

pub fn callback(user_id: i64, data: &str) -> Update {
    Update {
        update_id: 1,
        message: None,
        callback_query: Some(CallbackQuery {
            id: "cb-1".to_string(),
            from: Sender {
                id: user_id,
                username: Some(format!("user{user_id}")),
                first_name: Some(format!("User {user_id}")),
            },
            message: Some(IncomingMessage {
                message_id: 2,
                from: None,
                chat: Chat {
                    id: user_id,
                    kind: "private".to_string(),
                },
                text: None,
            }),
            data: Some(data.to_string()),
        }),
    }
}

pub async fn send(state: &AppState, user_id: i64, text: &str) {
    router::handle_update(state, private_text(user_id, text)).await;
}

pub async fn send_callback(state: &AppState, user_id: i64, data: &str) {
    router::handle_update(state, callback(user_id, data)).await;
}

pub async fn active_flow(state: &AppState, user_id: i64) -> Option<Flow> {
    let session = state.sessions.session(user_id);
    let session = session.lock().await;
    session.flow.clone()
}
