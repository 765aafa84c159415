mod common;

use common::{active_flow, send, send_callback, seed_user, setup_state};
use sea_orm::EntityTrait;

use shiftstock::entity::Products;
use shiftstock::keyboards as kb;
use shiftstock::services::inventory_service;
use shiftstock::session::Flow;

#[tokio::test]
async fn low_quantity_add_warns_exactly_once() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    send(&state, 100, kb::BTN_ADD_PRODUCT).await;
    send(&state, 100, "Coal").await;
    send(&state, 100, "5").await;
    send(&state, 100, kb::BTN_SKIP).await;

    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("Product added")));
    let warnings = texts.iter().filter(|t| t.contains("low stock")).count();
    assert_eq!(warnings, 1);
    assert!(active_flow(&state, 100).await.is_none());

    // a healthy quantity produces no warning
    api.clear();
    send(&state, 100, kb::BTN_ADD_PRODUCT).await;
    send(&state, 100, "Mint tea").await;
    send(&state, 100, "50").await;
    send(&state, 100, "drinks").await;

    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("Product added")));
    assert_eq!(texts.iter().filter(|t| t.contains("low stock")).count(), 0);
    Ok(())
}

#[tokio::test]
async fn non_numeric_quantity_reprompts_without_advancing() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    send(&state, 100, kb::BTN_ADD_PRODUCT).await;
    send(&state, 100, "Coal").await;
    send(&state, 100, "lots").await;

    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("Invalid input")));
    match active_flow(&state, 100).await {
        Some(Flow::AddingProduct(draft)) => assert!(draft.quantity.is_none()),
        other => panic!("expected the add flow to stay on quantity, got {other:?}"),
    }

    // a valid retry advances to the category prompt
    send(&state, 100, "7").await;
    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("category")));
    Ok(())
}

#[tokio::test]
async fn search_is_case_insensitive_over_name_and_category() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;
    inventory_service::create_product(&state, "Coal".into(), 25, Some("Hookah".into())).await?;
    inventory_service::create_product(&state, "Charcoal".into(), 5, None).await?;
    inventory_service::create_product(&state, "Mint tea".into(), 40, Some("Drinks".into())).await?;

    // name substring, case-insensitive, two hits
    send(&state, 100, kb::BTN_SEARCH_PRODUCT).await;
    send(&state, 100, "coal").await;
    let texts = api.texts_to(100);
    let results = texts.iter().find(|t| t.contains("Search results")).unwrap();
    assert!(results.contains("Coal") && results.contains("Charcoal"));
    assert!(!results.contains("Mint tea"));
    assert!(active_flow(&state, 100).await.is_none());

    // category substring
    api.clear();
    send(&state, 100, kb::BTN_SEARCH_PRODUCT).await;
    send(&state, 100, "drink").await;
    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("Mint tea")));

    // no match terminates the flow with a not-found reply
    api.clear();
    send(&state, 100, kb::BTN_SEARCH_PRODUCT).await;
    send(&state, 100, "zzz").await;
    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("No products match")));
    assert!(active_flow(&state, 100).await.is_none());
    Ok(())
}

#[tokio::test]
async fn cancel_clears_every_flow() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 500, true, true, false).await?;

    for start in [
        kb::BTN_ADD_PRODUCT,
        kb::BTN_SEARCH_PRODUCT,
        kb::BTN_CREATE_REPORT,
        kb::BTN_PROMOTE_USER,
        kb::BTN_BAN_USER,
    ] {
        api.clear();
        send(&state, 500, start).await;
        assert!(
            active_flow(&state, 500).await.is_some(),
            "flow did not start for {start}"
        );
        send(&state, 500, kb::BTN_CANCEL).await;
        let texts = api.texts_to(500);
        assert!(
            texts.iter().any(|t| t.contains("Action cancelled")),
            "no cancel reply for {start}"
        );
        assert!(active_flow(&state, 500).await.is_none());
    }
    Ok(())
}

#[tokio::test]
async fn quantity_edit_retriggers_the_low_stock_warning() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;
    let product =
        inventory_service::create_product(&state, "Coal".into(), 50, Some("Hookah".into())).await?;

    send_callback(&state, 100, &format!("pqty_{}", product.id)).await;
    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("new quantity")));

    send(&state, 100, "3").await;
    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("low on stock")));

    let stored = inventory_service::get_product(&state, product.id).await?;
    assert_eq!(stored.quantity, 3);
    Ok(())
}

#[tokio::test]
async fn category_edit_accepts_the_remove_sentinel() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;
    let product =
        inventory_service::create_product(&state, "Coal".into(), 25, Some("Hookah".into())).await?;

    send_callback(&state, 100, &format!("pcat_{}", product.id)).await;
    send(&state, 100, "remove").await;

    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("Category removed")));
    let stored = inventory_service::get_product(&state, product.id).await?;
    assert!(stored.category.is_none());
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_row_and_stale_buttons_report_not_found() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;
    let product = inventory_service::create_product(&state, "Coal".into(), 25, None).await?;

    send_callback(&state, 100, &format!("pdel_{}", product.id)).await;
    let texts = api.texts_to(100);
    assert!(texts.iter().any(|t| t.contains("Product deleted")));
    assert_eq!(Products::find().all(&state.orm).await?.len(), 0);

    // pressing the same stale button again
    api.clear();
    send_callback(&state, 100, &format!("pdel_{}", product.id)).await;
    let answers = api.callback_answers.lock().unwrap().clone();
    assert!(answers
        .iter()
        .any(|a| a.as_deref().is_some_and(|t| t.contains("not found"))));
    Ok(())
}

#[tokio::test]
async fn export_sends_a_document_unless_the_warehouse_is_empty() -> anyhow::Result<()> {
    let (state, api) = setup_state().await?;
    seed_user(&state, 100, true, false, false).await?;

    send(&state, 100, kb::BTN_EXPORT).await;
    assert!(api.documents.lock().unwrap().is_empty());
    assert!(api
        .texts_to(100)
        .iter()
        .any(|t| t.contains("Nothing to export")));

    inventory_service::create_product(&state, "Coal".into(), 25, None).await?;
    api.clear();
    send(&state, 100, kb::BTN_EXPORT).await;
    let documents = api.documents.lock().unwrap().clone();
    assert_eq!(documents.len(), 1);
    assert!(documents[0].1.ends_with(".xlsx"));
    Ok(())
}
