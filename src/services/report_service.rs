use chrono::{NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::audit::{self, NOTIFY_REPORTS};
use crate::entity::shift_reports::{ActiveModel, Column, Model as ReportModel};
use crate::entity::ShiftReports;
use crate::error::{BotError, BotResult};
use crate::models::ShiftReport;
use crate::session::ReportValues;
use crate::state::AppState;

pub async fn find_report(
    state: &AppState,
    user_id: i64,
    date: NaiveDate,
) -> BotResult<Option<ShiftReport>> {
    let report = ShiftReports::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::ReportDate.eq(date))
        .one(&state.orm)
        .await?
        .map(report_from_entity);
    Ok(report)
}

/// Insert the single report for (user, date). The flow pre-checks for an
/// existing row; the check here keeps the one-per-day invariant even if the
/// flow is bypassed.
pub async fn create_report(
    state: &AppState,
    user_id: i64,
    date: NaiveDate,
    values: &ReportValues,
) -> BotResult<ShiftReport> {
    if find_report(state, user_id, date).await?.is_some() {
        return Err(BotError::BadRequest(format!(
            "a report for {date} already exists"
        )));
    }

    let starting_cash = state.config.shift_starting_cash;
    let balance = starting_cash + values.cash - values.expenses;
    let active = ActiveModel {
        user_id: Set(user_id),
        report_date: Set(date),
        total: Set(values.total),
        cash: Set(values.cash),
        card: Set(values.card),
        bar: Set(values.bar),
        hookah_count: Set(values.hookah_count),
        expenses: Set(values.expenses),
        starting_cash: Set(starting_cash),
        balance: Set(balance),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let report = active.insert(&state.orm).await?;
    Ok(report_from_entity(report))
}

/// Update the existing (user, date) row in place, recomputing the balance
/// from the stored starting cash.
pub async fn update_report(
    state: &AppState,
    user_id: i64,
    date: NaiveDate,
    values: &ReportValues,
) -> BotResult<ShiftReport> {
    let existing = ShiftReports::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::ReportDate.eq(date))
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(BotError::NotFound),
    };

    let balance = existing.starting_cash + values.cash - values.expenses;
    let mut active: ActiveModel = existing.into();
    active.total = Set(values.total);
    active.cash = Set(values.cash);
    active.card = Set(values.card);
    active.bar = Set(values.bar);
    active.hookah_count = Set(values.hookah_count);
    active.expenses = Set(values.expenses);
    active.balance = Set(balance);
    let report = active.update(&state.orm).await?;
    Ok(report_from_entity(report))
}

/// Last reports of one user, newest first.
pub async fn history(state: &AppState, user_id: i64, limit: u64) -> BotResult<Vec<ShiftReport>> {
    let reports = ShiftReports::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::ReportDate)
        .limit(limit)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(report_from_entity)
        .collect();
    Ok(reports)
}

pub fn summary_text(report: &ShiftReport) -> String {
    format!(
        "Shift report for {}\n\n\
         Total revenue: {}\n\
         Cash: {}\n\
         Card: {}\n\
         Bar revenue: {}\n\
         Hookahs sold: {}\n\
         Expenses: {}\n\
         Till balance: {}\n\n\
         Net profit: {}",
        report.report_date,
        report.total,
        report.cash,
        report.card,
        report.bar,
        report.hookah_count,
        report.expenses,
        report.balance,
        report.net_profit(),
    )
}

/// Push the finished report to the reports destination. Returns whether the
/// push went through; failure is logged and left to the caller to surface as
/// a non-fatal warning.
pub async fn push_summary(state: &AppState, report: &ShiftReport) -> bool {
    let chat = audit::get_notification_chat(state, NOTIFY_REPORTS).await;
    match state
        .api
        .send_message(chat, &summary_text(report), None)
        .await
    {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, chat, "failed to push report summary");
            false
        }
    }
}

fn report_from_entity(model: ReportModel) -> ShiftReport {
    ShiftReport {
        id: model.id,
        user_id: model.user_id,
        report_date: model.report_date,
        total: model.total,
        cash: model.cash,
        card: model.card,
        bar: model.bar,
        hookah_count: model.hookah_count,
        expenses: model.expenses,
        starting_cash: model.starting_cash,
        balance: model.balance,
        created_at: model.created_at,
    }
}
