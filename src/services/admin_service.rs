use chrono::{Duration, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::audit::log_action;
use crate::config::PRINCIPAL_ADMIN_ID;
use crate::entity::action_logs::Column as LogCol;
use crate::entity::products::Column as ProductCol;
use crate::entity::users::{ActiveModel as UserActive, Column as UserCol, Model as UserModel};
use crate::entity::{ActionLogs, Products, ShiftReports, Users};
use crate::error::{BotError, BotResult};
use crate::models::{ActionLogEntry, User};
use crate::state::AppState;

/// Idempotent single-flag mutations an admin can apply to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMutation {
    Approve,
    Disapprove,
    Ban,
    Unban,
    Promote,
    Demote,
}

impl AccessMutation {
    pub fn action_label(self) -> &'static str {
        match self {
            Self::Approve => "access approved",
            Self::Disapprove => "access revoked",
            Self::Ban => "user banned",
            Self::Unban => "user unbanned",
            Self::Promote => "admin granted",
            Self::Demote => "admin revoked",
        }
    }

    /// What the affected user is told, best-effort.
    fn target_notice(self) -> &'static str {
        match self {
            Self::Approve => "Your access has been approved. Welcome!",
            Self::Disapprove => "Your access has been revoked by an admin.",
            Self::Ban => "Your access to the bot has been revoked.",
            Self::Unban => "Your access to the bot has been restored.",
            Self::Promote => "You have been granted admin rights.",
            Self::Demote => "Your admin rights have been revoked.",
        }
    }
}

/// Apply one access mutation: principal-guarded, idempotent, audited, with a
/// best-effort notification to the target.
pub async fn apply_mutation(
    state: &AppState,
    actor: i64,
    target: i64,
    mutation: AccessMutation,
) -> BotResult<User> {
    if target == PRINCIPAL_ADMIN_ID {
        return Err(BotError::PrincipalProtected);
    }

    let existing = Users::find_by_id(target).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(BotError::NotFound),
    };

    let mut active: UserActive = existing.into();
    match mutation {
        AccessMutation::Approve => active.is_approved = Set(true),
        AccessMutation::Disapprove => active.is_approved = Set(false),
        AccessMutation::Ban => active.is_banned = Set(true),
        AccessMutation::Unban => active.is_banned = Set(false),
        AccessMutation::Promote => active.is_admin = Set(true),
        AccessMutation::Demote => active.is_admin = Set(false),
    }
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_action(
        state,
        actor,
        mutation.action_label(),
        &format!("target user {target}"),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    if let Err(err) = state
        .api
        .send_message(target, mutation.target_notice(), None)
        .await
    {
        tracing::warn!(error = %err, target, "failed to notify target user");
    }

    Ok(user_from_entity(updated))
}

/// Everyone in the ledger, newest registrations first.
pub async fn list_users(state: &AppState) -> BotResult<Vec<User>> {
    let users = Users::find()
        .order_by_desc(UserCol::AddedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();
    Ok(users)
}

/// Registered users still waiting for approval.
pub async fn pending_users(state: &AppState) -> BotResult<Vec<User>> {
    let users = Users::find()
        .filter(UserCol::IsApproved.eq(false))
        .filter(UserCol::IsBanned.eq(false))
        .order_by_desc(UserCol::AddedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();
    Ok(users)
}

pub async fn get_user(state: &AppState, id: i64) -> BotResult<User> {
    match Users::find_by_id(id).one(&state.orm).await? {
        Some(u) => Ok(user_from_entity(u)),
        None => Err(BotError::NotFound),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Stats {
    pub total_users: u64,
    pub admins: u64,
    pub banned: u64,
    pub total_products: u64,
    pub low_stock: u64,
    pub total_reports: u64,
    pub actions_24h: u64,
}

pub async fn stats(state: &AppState) -> BotResult<Stats> {
    let total_users = Users::find().count(&state.orm).await?;
    let admins = Users::find()
        .filter(UserCol::IsAdmin.eq(true))
        .count(&state.orm)
        .await?;
    let banned = Users::find()
        .filter(UserCol::IsBanned.eq(true))
        .count(&state.orm)
        .await?;
    let total_products = Products::find().count(&state.orm).await?;
    let low_stock = Products::find()
        .filter(ProductCol::Quantity.lt(state.config.low_stock_threshold))
        .count(&state.orm)
        .await?;
    let total_reports = ShiftReports::find().count(&state.orm).await?;
    let actions_24h = ActionLogs::find()
        .filter(LogCol::CreatedAt.gte(Utc::now() - Duration::days(1)))
        .count(&state.orm)
        .await?;

    Ok(Stats {
        total_users,
        admins,
        banned,
        total_products,
        low_stock,
        total_reports,
        actions_24h,
    })
}

/// Most recent audit entries joined to their actors, newest first.
pub async fn recent_logs(
    state: &AppState,
    limit: u64,
) -> BotResult<Vec<(ActionLogEntry, Option<User>)>> {
    let rows = ActionLogs::find()
        .find_also_related(Users)
        .order_by_desc(LogCol::CreatedAt)
        .limit(limit)
        .all(&state.orm)
        .await?;

    let entries = rows
        .into_iter()
        .map(|(log, user)| {
            (
                ActionLogEntry {
                    id: log.id,
                    user_id: log.user_id,
                    action: log.action,
                    details: log.details,
                    created_at: log.created_at,
                },
                user.map(user_from_entity),
            )
        })
        .collect();
    Ok(entries)
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        username: model.username,
        first_name: model.first_name,
        is_admin: model.is_admin,
        is_banned: model.is_banned,
        is_approved: model.is_approved,
        added_at: model.added_at,
        last_action_at: model.last_action_at,
    }
}
