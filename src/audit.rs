//! Append-only action log and the notification relay fed by it.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};

use crate::config::PRINCIPAL_ADMIN_ID;
use crate::entity::notification_settings::{ActiveModel as SettingActive, Column as SettingCol};
use crate::entity::users::{ActiveModel as UserActive, Column as UserCol};
use crate::entity::{action_logs, NotificationSettings, Users};
use crate::error::BotResult;
use crate::models::NotificationSetting;
use crate::state::AppState;

pub const NOTIFY_ACTIONS: &str = "actions";
pub const NOTIFY_REPORTS: &str = "reports";

/// Destination chat for a notification kind; absence falls back to the
/// principal admin rather than erroring.
pub async fn get_notification_chat(state: &AppState, kind: &str) -> i64 {
    let found = NotificationSettings::find()
        .filter(SettingCol::Kind.eq(kind))
        .one(&state.orm)
        .await;
    match found {
        Ok(Some(setting)) => setting.chat_id,
        Ok(None) => PRINCIPAL_ADMIN_ID,
        Err(err) => {
            tracing::warn!(error = %err, kind, "notification chat lookup failed");
            PRINCIPAL_ADMIN_ID
        }
    }
}

/// Bind a notification kind to a chat, replacing any previous destination.
pub async fn set_notification_chat(state: &AppState, kind: &str, chat_id: i64) -> BotResult<()> {
    let setting = SettingActive {
        kind: Set(kind.to_string()),
        chat_id: Set(chat_id),
        ..Default::default()
    };
    NotificationSettings::insert(setting)
        .on_conflict(
            OnConflict::column(SettingCol::Kind)
                .update_column(SettingCol::ChatId)
                .to_owned(),
        )
        .exec(&state.orm)
        .await?;
    Ok(())
}

pub async fn list_notification_settings(
    state: &AppState,
) -> BotResult<Vec<NotificationSetting>> {
    let settings = NotificationSettings::find()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|s| NotificationSetting {
            kind: s.kind,
            chat_id: s.chat_id,
        })
        .collect();
    Ok(settings)
}

/// Append an audit entry, touch the actor's last-action timestamp, and relay
/// a notification to the actions destination unless the actor is the
/// principal admin. Relay failure is logged, never propagated.
pub async fn log_action(state: &AppState, actor: i64, action: &str, details: &str) -> BotResult<()> {
    let entry = action_logs::ActiveModel {
        user_id: Set(actor),
        action: Set(action.to_string()),
        details: Set(details.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    entry.insert(&state.orm).await?;
    tracing::info!(user_id = actor, action, details, "action logged");

    let touch = UserActive {
        last_action_at: Set(Some(Utc::now())),
        ..Default::default()
    };
    if let Err(err) = Users::update_many()
        .set(touch)
        .filter(UserCol::Id.eq(actor))
        .exec(&state.orm)
        .await
    {
        tracing::warn!(error = %err, user_id = actor, "failed to touch last action timestamp");
    }

    if actor != PRINCIPAL_ADMIN_ID {
        let actor_row = Users::find_by_id(actor).one(&state.orm).await.ok().flatten();
        let (name, username) = actor_row
            .map(|u| {
                (
                    u.first_name.unwrap_or_else(|| "Unknown".to_string()),
                    u.username
                        .map(|u| format!("@{u}"))
                        .unwrap_or_else(|| "(no username)".to_string()),
                )
            })
            .unwrap_or_else(|| ("Unknown".to_string(), "(no username)".to_string()));

        let notification = format!(
            "User action:\n{name} ({username})\nid: {actor}\naction: {action}\ndetails: {details}\ntime: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
        );
        let chat = get_notification_chat(state, NOTIFY_ACTIONS).await;
        if let Err(err) = state.api.send_message(chat, &notification, None).await {
            tracing::warn!(error = %err, chat, "failed to relay action notification");
        }
    }

    Ok(())
}
