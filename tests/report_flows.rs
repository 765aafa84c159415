mod common;

use chrono::Local;
use common::{active_flow, send, seed_user, setup_state};
use sea_orm::{EntityTrait, PaginatorTrait};

use shiftstock::audit;
use shiftstock::entity::ShiftReports;
use shiftstock::keyboards as kb;
use shiftstock::services::report_service;
use shiftstock::session::ReportValues;

#[tokio::test]
async fn create_flow_stores_balance_from_starting_cash() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    send(&state, 100, kb::BTN_CREATE_REPORT).await;
    // total, cash (comma separator), card, bar, hookah count, expenses
    for input in ["10000", "4500,50", "5500", "3000", "12", "1500"] {
        send(&state, 100, input).await;
    }

    let report = ShiftReports::find().one(&state.orm).await?.unwrap();
    assert_eq!(report.user_id, 100);
    assert_eq!(report.cash, 4500.5);
    assert_eq!(report.hookah_count, 12);
    assert_eq!(report.starting_cash, 4000.0);
    assert_eq!(report.balance, 4000.0 + 4500.5 - 1500.0);

    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("Shift report for")));
    assert!(active_flow(&state, 100).await.is_none());
    Ok(())
}

#[tokio::test]
async fn second_same_day_create_is_rejected_before_any_prompt() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    let today = Local::now().date_naive();
    report_service::create_report(&state, 100, today, &ReportValues::default()).await?;

    send(&state, 100, kb::BTN_CREATE_REPORT).await;

    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("already exists")));
    assert!(active_flow(&state, 100).await.is_none());
    assert_eq!(ShiftReports::find().count(&state.orm).await?, 1);
    Ok(())
}

#[tokio::test]
async fn update_flow_skips_keep_stored_values_and_never_duplicate() -> anyhow::Result<()> {
    let (state, _api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    let today = Local::now().date_naive();
    let values = ReportValues {
        total: 9000.0,
        cash: 4000.0,
        card: 5000.0,
        bar: 2500.0,
        hookah_count: 8,
        expenses: 1000.0,
    };
    report_service::create_report(&state, 100, today, &values).await?;

    send(&state, 100, kb::BTN_UPDATE_REPORT).await;
    // skip total, change cash, skip the rest
    for input in [
        kb::BTN_SKIP,
        "5000",
        kb::BTN_SKIP,
        kb::BTN_SKIP,
        kb::BTN_SKIP,
        kb::BTN_SKIP,
    ] {
        send(&state, 100, input).await;
    }

    assert_eq!(ShiftReports::find().count(&state.orm).await?, 1);
    let report = ShiftReports::find().one(&state.orm).await?.unwrap();
    assert_eq!(report.total, 9000.0);
    assert_eq!(report.cash, 5000.0);
    assert_eq!(report.card, 5000.0);
    assert_eq!(report.hookah_count, 8);
    assert_eq!(report.balance, 4000.0 + 5000.0 - 1000.0);
    Ok(())
}

#[tokio::test]
async fn update_without_an_existing_report_is_refused() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    send(&state, 100, kb::BTN_UPDATE_REPORT).await;

    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("No report for today")));
    assert!(active_flow(&state, 100).await.is_none());
    Ok(())
}

#[tokio::test]
async fn hookah_count_rejects_decimals_and_reprompts() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    send(&state, 100, kb::BTN_CREATE_REPORT).await;
    for input in ["10000", "4500", "5500", "3000"] {
        send(&state, 100, input).await;
    }

    send(&state, 100, "2.5").await;
    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("Invalid input")));
    assert!(active_flow(&state, 100).await.is_some());

    // an integer gets the flow moving again
    send(&state, 100, "3").await;
    send(&state, 100, "1500").await;
    let report = ShiftReports::find().one(&state.orm).await?.unwrap();
    assert_eq!(report.hookah_count, 3);
    Ok(())
}

#[tokio::test]
async fn finished_reports_are_pushed_to_the_bound_destination() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;
    audit::set_notification_chat(&state, audit::NOTIFY_REPORTS, 555).await?;

    send(&state, 100, kb::BTN_CREATE_REPORT).await;
    for input in ["10000", "4500", "5500", "3000", "12", "1500"] {
        send(&state, 100, input).await;
    }

    let pushed = api.texts_to(555);
    assert!(pushed.iter().any(|t| t.contains("Shift report for")));
    Ok(())
}

#[tokio::test]
async fn skip_is_not_accepted_while_creating() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    send(&state, 100, kb::BTN_CREATE_REPORT).await;
    send(&state, 100, kb::BTN_SKIP).await;

    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("Invalid input")));
    assert!(active_flow(&state, 100).await.is_some());
    Ok(())
}
