mod common;

use common::{active_flow, send, send_callback, seed_user, setup_state};
use sea_orm::EntityTrait;

use shiftstock::access;
use shiftstock::config::PRINCIPAL_ADMIN_ID;
use shiftstock::entity::{ActionLogs, Users};
use shiftstock::keyboards as kb;

#[tokio::test]
async fn principal_resolves_to_admin_regardless_of_stored_flags() -> anyhow::Result<()> {
    let (state, _api) = setup_state().await?;

    // no row at all
    assert!(access::is_admin(&state, PRINCIPAL_ADMIN_ID).await?);
    assert!(access::is_approved(&state, PRINCIPAL_ADMIN_ID).await?);

    // a row with every flag off does not demote the principal
    seed_user(&state, PRINCIPAL_ADMIN_ID, false, false, false).await?;
    assert!(access::is_admin(&state, PRINCIPAL_ADMIN_ID).await?);
    assert!(access::is_approved(&state, PRINCIPAL_ADMIN_ID).await?);
    assert_eq!(
        access::check_admin(&state, PRINCIPAL_ADMIN_ID).await?,
        access::Decision::Admitted
    );
    Ok(())
}

#[tokio::test]
async fn fresh_sender_is_auto_enrolled_and_left_pending() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;

    send(&state, 100, kb::BTN_WAREHOUSE).await;

    // the row now exists and the user was told to wait
    assert!(access::is_registered(&state, 100).await?);
    let texts = api.texts_to(100);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("approve"), "got: {}", texts[0]);

    // the principal admin heard about the registration
    let to_principal = api.texts_to(PRINCIPAL_ADMIN_ID);
    assert!(to_principal.iter().any(|t| t.contains("New user registered")));

    // the second message hits the approval stop, not a second registration
    api.clear();
    send(&state, 100, kb::BTN_WAREHOUSE).await;
    let texts = api.texts_to(100);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("awaiting admin approval"));
    Ok(())
}

#[tokio::test]
async fn banned_sender_is_stopped_before_dispatch() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, true).await?;

    send(&state, 100, kb::BTN_WAREHOUSE).await;

    let texts = api.texts_to(100);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("revoked"));
    Ok(())
}

#[tokio::test]
async fn approved_sender_reaches_the_menu() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    send(&state, 100, kb::BTN_WAREHOUSE).await;

    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("Warehouse management")));
    Ok(())
}

#[tokio::test]
async fn admin_entries_are_denied_to_non_admins() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    send(&state, 100, kb::BTN_ADMIN_PANEL).await;

    let texts = api.texts_to(100);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("admin rights"));
    Ok(())
}

#[tokio::test]
async fn promote_flow_on_missing_id_reports_not_found_and_clears_state() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 500, true, true, false).await?;

    send(&state, 500, kb::BTN_PROMOTE_USER).await;
    assert!(active_flow(&state, 500).await.is_some());

    send(&state, 500, "42").await;
    let texts = api.texts_to(500);
    assert!(texts.iter().any(|t| t.contains("User not found")));
    assert!(active_flow(&state, 500).await.is_none());
    Ok(())
}

#[tokio::test]
async fn promote_flow_sets_flag_audits_and_notifies_target() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 500, true, true, false).await?;
    seed_user(&state, 42, true, false, false).await?;

    send(&state, 500, kb::BTN_PROMOTE_USER).await;
    send(&state, 500, "42").await;

    let target = Users::find_by_id(42_i64).one(&state.orm).await?.unwrap();
    assert!(target.is_admin);

    let logs = ActionLogs::find().all(&state.orm).await?;
    assert!(logs.iter().any(|l| l.action == "admin granted"));

    let to_target = api.texts_to(42);
    assert!(to_target.iter().any(|t| t.contains("admin rights")));
    assert!(active_flow(&state, 500).await.is_none());
    Ok(())
}

#[tokio::test]
async fn non_numeric_target_id_reprompts_without_clearing_state() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 500, true, true, false).await?;

    send(&state, 500, kb::BTN_BAN_USER).await;
    send(&state, 500, "forty-two").await;

    let texts = api.texts_to(500);
    assert!(texts.iter().any(|t| t.contains("valid numeric user id")));
    assert!(active_flow(&state, 500).await.is_some());
    Ok(())
}

#[tokio::test]
async fn banning_the_principal_is_rejected_with_no_mutation() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 500, true, true, false).await?;

    send(&state, 500, kb::BTN_BAN_USER).await;
    send(&state, 500, &PRINCIPAL_ADMIN_ID.to_string()).await;

    let texts = api.texts_to(500);
    assert!(texts.iter().any(|t| t.contains("cannot be modified")));
    // no row was created, let alone banned
    assert!(Users::find_by_id(PRINCIPAL_ADMIN_ID)
        .one(&state.orm)
        .await?
        .is_none());

    // the callback path refuses the same way
    api.clear();
    send_callback(&state, 500, &format!("ban_{PRINCIPAL_ADMIN_ID}")).await;
    let answers = api.callback_answers.lock().unwrap().clone();
    assert!(answers
        .iter()
        .any(|a| a.as_deref().is_some_and(|t| t.contains("cannot be modified"))));
    Ok(())
}

#[tokio::test]
async fn unknown_private_text_resets_to_the_main_menu() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    send(&state, 100, "what is this").await;

    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("Unknown command")));

    let logs = ActionLogs::find().all(&state.orm).await?;
    assert!(logs.iter().any(|l| l.action == "unknown command"));
    Ok(())
}
