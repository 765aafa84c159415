//! Access-control ledger and the gate consulted before every dispatch.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, EntityTrait};

use crate::config::PRINCIPAL_ADMIN_ID;
use crate::entity::users::{ActiveModel as UserActive, Model as UserModel};
use crate::entity::Users;
use crate::error::BotResult;
use crate::state::AppState;
use crate::telegram::Sender;

/// Outcome of the gate: either the handler runs, or the user gets the reason
/// it does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Admitted,
    Denied(&'static str),
}

pub const DENIED_BANNED: &str = "Your access to the bot has been revoked.";
pub const DENIED_PENDING: &str =
    "Your access is awaiting admin approval. You will be notified once it is granted.";
pub const DENIED_NOT_ADMIN: &str = "This action requires admin rights.";

pub async fn lookup(state: &AppState, user_id: i64) -> BotResult<Option<UserModel>> {
    Ok(Users::find_by_id(user_id).one(&state.orm).await?)
}

pub async fn is_registered(state: &AppState, user_id: i64) -> BotResult<bool> {
    Ok(lookup(state, user_id).await?.is_some())
}

pub async fn is_banned(state: &AppState, user_id: i64) -> BotResult<bool> {
    Ok(lookup(state, user_id)
        .await?
        .map(|u| u.is_banned)
        .unwrap_or(false))
}

/// The principal admin is approved whether or not a row exists.
pub async fn is_approved(state: &AppState, user_id: i64) -> BotResult<bool> {
    if user_id == PRINCIPAL_ADMIN_ID {
        return Ok(true);
    }
    Ok(lookup(state, user_id)
        .await?
        .map(|u| u.is_approved)
        .unwrap_or(false))
}

/// Admin standing requires the flag and an unbanned row; the principal admin
/// short-circuits to true.
pub async fn is_admin(state: &AppState, user_id: i64) -> BotResult<bool> {
    if user_id == PRINCIPAL_ADMIN_ID {
        return Ok(true);
    }
    Ok(lookup(state, user_id)
        .await?
        .map(|u| u.is_admin && !u.is_banned)
        .unwrap_or(false))
}

/// Insert a row for an unseen sender. The principal id is seeded
/// admin+approved, everyone else starts unapproved. Returns whether a
/// registration actually happened. The principal admin is told about every
/// new registration, best-effort.
pub async fn register_if_needed(state: &AppState, sender: &Sender) -> BotResult<bool> {
    if is_registered(state, sender.id).await? {
        return Ok(false);
    }

    let principal = sender.id == PRINCIPAL_ADMIN_ID;
    let user = UserActive {
        id: Set(sender.id),
        username: Set(sender.username.clone()),
        first_name: Set(sender.first_name.clone()),
        is_admin: Set(principal),
        is_approved: Set(principal),
        is_banned: Set(false),
        added_at: Set(Utc::now()),
        last_action_at: Set(None),
    };
    user.insert(&state.orm).await?;
    tracing::info!(
        user_id = sender.id,
        admin = principal,
        "registered new user"
    );

    if !principal {
        let notification = format!(
            "New user registered:\nid: {}\nname: {}\nusername: {}\n\nApprove access from the admin panel.",
            sender.id,
            sender.first_name.as_deref().unwrap_or("Unknown"),
            sender.username.as_deref().unwrap_or("(none)"),
        );
        if let Err(err) = state
            .api
            .send_message(PRINCIPAL_ADMIN_ID, &notification, None)
            .await
        {
            tracing::warn!(error = %err, "failed to notify principal admin of registration");
        }
    }

    Ok(true)
}

/// The gate for ordinary handlers: ban check, then approval check. The
/// caller is expected to have auto-registered the sender already.
pub async fn check_access(state: &AppState, user_id: i64) -> BotResult<Decision> {
    if is_banned(state, user_id).await? {
        return Ok(Decision::Denied(DENIED_BANNED));
    }
    if !is_approved(state, user_id).await? {
        return Ok(Decision::Denied(DENIED_PENDING));
    }
    Ok(Decision::Admitted)
}

/// The gate for admin-only handlers: the access checks plus the role check.
pub async fn check_admin(state: &AppState, user_id: i64) -> BotResult<Decision> {
    match check_access(state, user_id).await? {
        Decision::Admitted => {}
        denied => return Ok(denied),
    }
    if !is_admin(state, user_id).await? {
        return Ok(Decision::Denied(DENIED_NOT_ADMIN));
    }
    Ok(Decision::Admitted)
}
