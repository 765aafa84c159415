//! Dispatch: every inbound update passes the access gate, then goes to the
//! active flow, a menu handler, or a callback handler. No error escapes past
//! [`handle_update`]; failures become a generic reply plus a log line.

use chrono::Local;

use crate::access::{self, Decision};
use crate::audit::{self, NOTIFY_ACTIONS, NOTIFY_REPORTS};
use crate::config::PRINCIPAL_ADMIN_ID;
use crate::error::{BotError, BotResult};
use crate::flows;
use crate::keyboards::{self, Menu};
use crate::models::Product;
use crate::services::{admin_service, export_service, inventory_service, report_service};
use crate::services::admin_service::AccessMutation;
use crate::session::{Flow, Session, UserAction};
use crate::state::AppState;
use crate::telegram::{
    CallbackAction, CallbackQuery, IncomingMessage, InlineButton, ReplyMarkup, Update,
};
use crate::views;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

pub async fn handle_update(state: &AppState, update: Update) {
    if let Some(message) = update.message {
        let chat = message.chat.id;
        if let Err(err) = handle_message(state, &message).await {
            tracing::error!(error = %err, chat, "message handler failed");
            if let Err(err) = state.api.send_message(chat, GENERIC_FAILURE, None).await {
                tracing::warn!(error = %err, chat, "failed to deliver failure notice");
            }
        }
    } else if let Some(callback) = update.callback_query {
        let callback_id = callback.id.clone();
        if let Err(err) = handle_callback(state, &callback).await {
            tracing::error!(error = %err, "callback handler failed");
            if let Err(err) = state
                .api
                .answer_callback(&callback_id, Some(GENERIC_FAILURE))
                .await
            {
                tracing::warn!(error = %err, "failed to answer callback");
            }
        }
    }
}

async fn handle_message(state: &AppState, message: &IncomingMessage) -> BotResult<()> {
    let from = match &message.from {
        Some(from) => from,
        None => return Ok(()),
    };
    let chat = message.chat.id;
    let text = message.text.as_deref().unwrap_or("");

    // /id is an ungated utility so group chats can discover their id for
    // notification bindings
    if text == "/id" || text.starts_with("/id@") {
        return state
            .api
            .send_message(chat, &format!("Chat id: {chat}"), None)
            .await;
    }

    if text == "/start" || text.starts_with("/start@") {
        return handle_start(state, message).await;
    }

    // group chats only react to explicit menu presses
    if !message.chat.is_private() && !is_menu_label(text) {
        return Ok(());
    }

    // the gate: auto-enroll, then ban / approval stops
    let registered_now = access::register_if_needed(state, from).await?;
    if registered_now && from.id != PRINCIPAL_ADMIN_ID {
        return state
            .api
            .send_message(
                chat,
                "You are registered. An admin has to approve your access before you can continue.",
                None,
            )
            .await;
    }
    match access::check_access(state, from.id).await? {
        Decision::Admitted => {}
        Decision::Denied(reason) => {
            return state.api.send_message(chat, reason, None).await;
        }
    }

    let session_arc = state.sessions.session(from.id);
    let mut session = session_arc.lock().await;

    if session.flow.is_some() {
        return flows::advance(state, chat, from.id, &mut session, text).await;
    }

    match text {
        keyboards::BTN_WAREHOUSE => show_menu(state, chat, Menu::Warehouse).await,
        keyboards::BTN_SHIFT_REPORTS => show_menu(state, chat, Menu::Reports).await,
        keyboards::BTN_EXPORT => export_warehouse(state, chat, from.id).await,
        keyboards::BTN_BACK_MAIN => show_main_menu(state, chat, from.id).await,
        keyboards::BTN_CANCEL => {
            state
                .api
                .send_message(
                    chat,
                    "Nothing to cancel.",
                    Some(keyboards::main_menu(access::is_admin(state, from.id).await?)),
                )
                .await
        }

        keyboards::BTN_ADD_PRODUCT => flows::start_add_product(state, chat, &mut session).await,
        keyboards::BTN_SEARCH_PRODUCT => flows::start_search(state, chat, &mut session).await,
        keyboards::BTN_VIEW_WAREHOUSE => view_warehouse(state, chat).await,
        keyboards::BTN_CHECK_LOW_STOCK => check_low_stock(state, chat).await,
        keyboards::BTN_EDIT_PRODUCT => product_picker(state, chat, PickerPurpose::Edit).await,
        keyboards::BTN_DELETE_PRODUCT => product_picker(state, chat, PickerPurpose::Delete).await,

        keyboards::BTN_CREATE_REPORT => {
            flows::start_report_create(state, chat, from.id, &mut session).await
        }
        keyboards::BTN_UPDATE_REPORT => {
            flows::start_report_update(state, chat, from.id, &mut session).await
        }
        keyboards::BTN_REPORT_HISTORY => report_history(state, chat, from.id).await,

        keyboards::BTN_ADMIN_PANEL => {
            admin_gated(state, chat, from.id, show_menu(state, chat, Menu::AdminPanel)).await
        }
        keyboards::BTN_BACK_ADMIN => {
            admin_gated(state, chat, from.id, show_menu(state, chat, Menu::AdminPanel)).await
        }
        keyboards::BTN_MANAGE_USERS => {
            admin_gated(state, chat, from.id, show_menu(state, chat, Menu::UserManagement)).await
        }
        keyboards::BTN_NOTIFICATIONS => {
            admin_gated(state, chat, from.id, show_menu(state, chat, Menu::Notifications)).await
        }
        keyboards::BTN_STATISTICS => {
            admin_gated(state, chat, from.id, show_stats(state, chat)).await
        }
        keyboards::BTN_ACTION_LOGS => {
            admin_gated(state, chat, from.id, show_logs(state, chat)).await
        }
        keyboards::BTN_LIST_USERS => {
            admin_gated(state, chat, from.id, list_users(state, chat)).await
        }
        keyboards::BTN_PENDING_APPROVALS => {
            admin_gated(state, chat, from.id, pending_users(state, chat)).await
        }
        keyboards::BTN_SHOW_DESTINATIONS => {
            admin_gated(state, chat, from.id, show_destinations(state, chat)).await
        }
        keyboards::BTN_BIND_REPORTS_HERE => {
            match access::check_admin(state, from.id).await? {
                Decision::Admitted => {
                    bind_destination(state, chat, from.id, NOTIFY_REPORTS).await
                }
                Decision::Denied(reason) => state.api.send_message(chat, reason, None).await,
            }
        }
        keyboards::BTN_BIND_ACTIONS_HERE => {
            match access::check_admin(state, from.id).await? {
                Decision::Admitted => {
                    bind_destination(state, chat, from.id, NOTIFY_ACTIONS).await
                }
                Decision::Denied(reason) => state.api.send_message(chat, reason, None).await,
            }
        }

        keyboards::BTN_PROMOTE_USER => {
            start_user_flow(state, chat, from.id, &mut session, UserAction::Promote).await
        }
        keyboards::BTN_DEMOTE_USER => {
            start_user_flow(state, chat, from.id, &mut session, UserAction::Demote).await
        }
        keyboards::BTN_BAN_USER => {
            start_user_flow(state, chat, from.id, &mut session, UserAction::Ban).await
        }
        keyboards::BTN_UNBAN_USER => {
            start_user_flow(state, chat, from.id, &mut session, UserAction::Unban).await
        }

        _ => {
            if message.chat.is_private() {
                session.flow = None;
                state
                    .api
                    .send_message(
                        chat,
                        "Unknown command. Returning to the main menu.",
                        Some(keyboards::main_menu(access::is_admin(state, from.id).await?)),
                    )
                    .await?;
                if let Err(err) = audit::log_action(
                    state,
                    from.id,
                    "unknown command",
                    &format!("text: \"{text}\""),
                )
                .await
                {
                    tracing::warn!(error = %err, "audit log failed");
                }
            }
            Ok(())
        }
    }
}

async fn handle_start(state: &AppState, message: &IncomingMessage) -> BotResult<()> {
    let from = match &message.from {
        Some(from) => from,
        None => return Ok(()),
    };
    let chat = message.chat.id;

    let registered_now = access::register_if_needed(state, from).await?;
    if registered_now {
        if let Err(err) = audit::log_action(state, from.id, "new user", "first contact").await {
            tracing::warn!(error = %err, "audit log failed");
        }
    }

    if access::is_banned(state, from.id).await? {
        return state
            .api
            .send_message(chat, access::DENIED_BANNED, None)
            .await;
    }
    if !access::is_approved(state, from.id).await? {
        return state
            .api
            .send_message(
                chat,
                "You are registered. An admin has to approve your access before you can continue.",
                None,
            )
            .await;
    }

    let session_arc = state.sessions.session(from.id);
    session_arc.lock().await.flow = None;

    let mut welcome = "Welcome to the warehouse bot!\n".to_string();
    if registered_now {
        welcome.push_str("You have been registered.\n");
    }
    welcome.push_str("Pick an action from the menu below.");
    state
        .api
        .send_message(
            chat,
            &welcome,
            Some(keyboards::main_menu(access::is_admin(state, from.id).await?)),
        )
        .await
}

async fn handle_callback(state: &AppState, callback: &CallbackQuery) -> BotResult<()> {
    let from = &callback.from;
    let chat = callback
        .message
        .as_ref()
        .map(|m| m.chat.id)
        .unwrap_or(from.id);

    let action = match callback.data.as_deref().and_then(CallbackAction::decode) {
        Some(action) => action,
        None => {
            return state
                .api
                .answer_callback(&callback.id, Some("Unknown action."))
                .await;
        }
    };

    let result = match action {
        CallbackAction::SelectProduct(_)
        | CallbackAction::EditProductName(_)
        | CallbackAction::EditProductQuantity(_)
        | CallbackAction::EditProductCategory(_)
        | CallbackAction::DeleteProduct(_) => access::check_access(state, from.id).await?,
        _ => access::check_admin(state, from.id).await?,
    };
    if let Decision::Denied(reason) = result {
        return state.api.answer_callback(&callback.id, Some(reason)).await;
    }

    match action {
        CallbackAction::SelectProduct(id) => select_product(state, chat, id, callback).await,
        CallbackAction::EditProductName(id) => {
            begin_product_edit(state, chat, from.id, id, callback, EditField::Name).await
        }
        CallbackAction::EditProductQuantity(id) => {
            begin_product_edit(state, chat, from.id, id, callback, EditField::Quantity).await
        }
        CallbackAction::EditProductCategory(id) => {
            begin_product_edit(state, chat, from.id, id, callback, EditField::Category).await
        }
        CallbackAction::DeleteProduct(id) => {
            delete_product(state, chat, from.id, id, callback).await
        }
        CallbackAction::SelectUser(id) => select_user(state, chat, id, callback).await,
        CallbackAction::Approve(id) => {
            apply_user_mutation(state, chat, from.id, id, AccessMutation::Approve, callback).await
        }
        CallbackAction::Disapprove(id) => {
            apply_user_mutation(state, chat, from.id, id, AccessMutation::Disapprove, callback)
                .await
        }
        CallbackAction::Ban(id) => {
            apply_user_mutation(state, chat, from.id, id, AccessMutation::Ban, callback).await
        }
        CallbackAction::Unban(id) => {
            apply_user_mutation(state, chat, from.id, id, AccessMutation::Unban, callback).await
        }
        CallbackAction::Promote(id) => {
            apply_user_mutation(state, chat, from.id, id, AccessMutation::Promote, callback).await
        }
        CallbackAction::Demote(id) => {
            apply_user_mutation(state, chat, from.id, id, AccessMutation::Demote, callback).await
        }
    }
}

// ===== message handlers =====

fn is_menu_label(text: &str) -> bool {
    matches!(
        text,
        keyboards::BTN_WAREHOUSE
            | keyboards::BTN_SHIFT_REPORTS
            | keyboards::BTN_EXPORT
            | keyboards::BTN_ADMIN_PANEL
            | keyboards::BTN_ADD_PRODUCT
            | keyboards::BTN_VIEW_WAREHOUSE
            | keyboards::BTN_SEARCH_PRODUCT
            | keyboards::BTN_EDIT_PRODUCT
            | keyboards::BTN_DELETE_PRODUCT
            | keyboards::BTN_CHECK_LOW_STOCK
            | keyboards::BTN_CREATE_REPORT
            | keyboards::BTN_UPDATE_REPORT
            | keyboards::BTN_REPORT_HISTORY
            | keyboards::BTN_MANAGE_USERS
            | keyboards::BTN_STATISTICS
            | keyboards::BTN_ACTION_LOGS
            | keyboards::BTN_NOTIFICATIONS
            | keyboards::BTN_LIST_USERS
            | keyboards::BTN_PENDING_APPROVALS
            | keyboards::BTN_PROMOTE_USER
            | keyboards::BTN_DEMOTE_USER
            | keyboards::BTN_BAN_USER
            | keyboards::BTN_UNBAN_USER
            | keyboards::BTN_SHOW_DESTINATIONS
            | keyboards::BTN_BIND_REPORTS_HERE
            | keyboards::BTN_BIND_ACTIONS_HERE
            | keyboards::BTN_BACK_MAIN
            | keyboards::BTN_BACK_ADMIN
            | keyboards::BTN_CANCEL
            | keyboards::BTN_SKIP
    )
}

async fn admin_gated(
    state: &AppState,
    chat: i64,
    user_id: i64,
    handler: impl Future<Output = BotResult<()>>,
) -> BotResult<()> {
    match access::check_admin(state, user_id).await? {
        Decision::Admitted => handler.await,
        Decision::Denied(reason) => state.api.send_message(chat, reason, None).await,
    }
}

async fn show_menu(state: &AppState, chat: i64, menu: Menu) -> BotResult<()> {
    state
        .api
        .send_message(chat, menu.title(), Some(menu.markup(false)))
        .await
}

async fn show_main_menu(state: &AppState, chat: i64, user_id: i64) -> BotResult<()> {
    state
        .api
        .send_message(
            chat,
            Menu::Main.title(),
            Some(keyboards::main_menu(access::is_admin(state, user_id).await?)),
        )
        .await
}

async fn start_user_flow(
    state: &AppState,
    chat: i64,
    user_id: i64,
    session: &mut Session,
    action: UserAction,
) -> BotResult<()> {
    match access::check_admin(state, user_id).await? {
        Decision::Admitted => flows::start_user_action(state, chat, session, action).await,
        Decision::Denied(reason) => state.api.send_message(chat, reason, None).await,
    }
}

async fn view_warehouse(state: &AppState, chat: i64) -> BotResult<()> {
    let products = inventory_service::list_products(state).await?;
    if products.is_empty() {
        return state
            .api
            .send_message(chat, "The warehouse is empty.", Some(Menu::Warehouse.markup(false)))
            .await;
    }
    let listing = views::warehouse_listing(&products, state.config.low_stock_threshold);
    state
        .api
        .send_chunked(chat, &listing, Some(Menu::Warehouse.markup(false)))
        .await
}

async fn check_low_stock(state: &AppState, chat: i64) -> BotResult<()> {
    let threshold = state.config.low_stock_threshold;
    let products = inventory_service::low_stock(state, threshold).await?;
    if products.is_empty() {
        return state
            .api
            .send_message(
                chat,
                &format!("All products are sufficiently stocked ({threshold}+ each)."),
                Some(Menu::Warehouse.markup(false)),
            )
            .await;
    }
    state
        .api
        .send_chunked(
            chat,
            &views::low_stock_listing(&products),
            Some(Menu::Warehouse.markup(false)),
        )
        .await
}

enum PickerPurpose {
    Edit,
    Delete,
}

async fn product_picker(state: &AppState, chat: i64, purpose: PickerPurpose) -> BotResult<()> {
    let products = inventory_service::list_products(state).await?;
    if products.is_empty() {
        let text = match purpose {
            PickerPurpose::Edit => "The warehouse is empty. Nothing to edit.",
            PickerPurpose::Delete => "The warehouse is empty. Nothing to delete.",
        };
        return state
            .api
            .send_message(chat, text, Some(Menu::Warehouse.markup(false)))
            .await;
    }

    let buttons: Vec<Vec<InlineButton>> = products
        .iter()
        .map(|p| {
            vec![match purpose {
                PickerPurpose::Edit => InlineButton {
                    text: format!("{} (id {}, qty {})", p.name, p.id, p.quantity),
                    callback: CallbackAction::SelectProduct(p.id),
                },
                PickerPurpose::Delete => InlineButton {
                    text: format!("Delete {} (id {})", p.name, p.id),
                    callback: CallbackAction::DeleteProduct(p.id),
                },
            }]
        })
        .collect();

    let prompt = match purpose {
        PickerPurpose::Edit => "Pick a product to edit:",
        PickerPurpose::Delete => "Pick a product to delete:",
    };
    state
        .api
        .send_message(chat, prompt, Some(ReplyMarkup::Inline(buttons)))
        .await
}

async fn export_warehouse(state: &AppState, chat: i64, user_id: i64) -> BotResult<()> {
    let products = inventory_service::list_products(state).await?;
    if products.is_empty() {
        return state
            .api
            .send_message(chat, "The warehouse is empty. Nothing to export.", None)
            .await;
    }

    let bytes = export_service::products_workbook(&products)?;
    let filename = format!("warehouse_{}.xlsx", Local::now().format("%Y-%m-%d_%H-%M"));
    state
        .api
        .send_document(chat, &filename, bytes, "Warehouse export")
        .await?;
    if let Err(err) = audit::log_action(
        state,
        user_id,
        "warehouse exported",
        &format!("{} products", products.len()),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
    Ok(())
}

async fn report_history(state: &AppState, chat: i64, user_id: i64) -> BotResult<()> {
    let reports = report_service::history(state, user_id, 10).await?;
    if reports.is_empty() {
        return state
            .api
            .send_message(chat, "You have no saved reports yet.", None)
            .await;
    }
    state
        .api
        .send_chunked(
            chat,
            &views::report_history(&reports),
            Some(Menu::Reports.markup(false)),
        )
        .await
}

async fn show_stats(state: &AppState, chat: i64) -> BotResult<()> {
    let stats = admin_service::stats(state).await?;
    state
        .api
        .send_message(chat, &views::stats_text(&stats), None)
        .await
}

async fn show_logs(state: &AppState, chat: i64) -> BotResult<()> {
    let entries = admin_service::recent_logs(state, 20).await?;
    if entries.is_empty() {
        return state
            .api
            .send_message(chat, "The action log is empty.", None)
            .await;
    }
    state
        .api
        .send_chunked(chat, &views::logs_listing(&entries), None)
        .await
}

async fn list_users(state: &AppState, chat: i64) -> BotResult<()> {
    let users = admin_service::list_users(state).await?;
    if users.is_empty() {
        return state
            .api
            .send_message(chat, "No users in the ledger.", None)
            .await;
    }

    state
        .api
        .send_chunked(chat, &views::user_listing(&users), None)
        .await?;
    let buttons: Vec<Vec<InlineButton>> = users
        .iter()
        .map(|u| {
            vec![InlineButton {
                text: format!("{} ({})", u.display_name(), u.id),
                callback: CallbackAction::SelectUser(u.id),
            }]
        })
        .collect();
    state
        .api
        .send_message(chat, "Pick a user to manage:", Some(ReplyMarkup::Inline(buttons)))
        .await
}

async fn pending_users(state: &AppState, chat: i64) -> BotResult<()> {
    let users = admin_service::pending_users(state).await?;
    if users.is_empty() {
        return state
            .api
            .send_message(chat, "No users awaiting approval.", None)
            .await;
    }

    let buttons: Vec<Vec<InlineButton>> = users
        .iter()
        .map(|u| {
            vec![InlineButton {
                text: format!("Approve {} ({})", u.display_name(), u.id),
                callback: CallbackAction::Approve(u.id),
            }]
        })
        .collect();
    state
        .api
        .send_message(
            chat,
            "Users awaiting approval:",
            Some(ReplyMarkup::Inline(buttons)),
        )
        .await
}

async fn show_destinations(state: &AppState, chat: i64) -> BotResult<()> {
    let settings = audit::list_notification_settings(state).await?;
    if settings.is_empty() {
        return state
            .api
            .send_message(
                chat,
                "No destinations bound yet; everything goes to the principal admin.",
                None,
            )
            .await;
    }
    let mut text = "Notification destinations:\n\n".to_string();
    for setting in settings {
        text.push_str(&format!("{}: chat {}\n", setting.kind, setting.chat_id));
    }
    state.api.send_message(chat, &text, None).await
}

async fn bind_destination(
    state: &AppState,
    chat: i64,
    user_id: i64,
    kind: &str,
) -> BotResult<()> {
    audit::set_notification_chat(state, kind, chat).await?;
    state
        .api
        .send_message(
            chat,
            &format!("This chat now receives \"{kind}\" notifications."),
            None,
        )
        .await?;
    if let Err(err) = audit::log_action(
        state,
        user_id,
        "notification destination bound",
        &format!("{kind} -> chat {chat}"),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
    Ok(())
}

// ===== callback handlers =====

enum EditField {
    Name,
    Quantity,
    Category,
}

async fn select_product(
    state: &AppState,
    chat: i64,
    id: i64,
    callback: &CallbackQuery,
) -> BotResult<()> {
    let product = match inventory_service::get_product(state, id).await {
        Ok(p) => p,
        Err(BotError::NotFound) => {
            return state
                .api
                .answer_callback(&callback.id, Some("Product not found."))
                .await;
        }
        Err(err) => return Err(err),
    };

    let card = views::product_block(&product, state.config.low_stock_threshold, true);
    let buttons = vec![
        vec![InlineButton {
            text: "Change name".to_string(),
            callback: CallbackAction::EditProductName(id),
        }],
        vec![InlineButton {
            text: "Change quantity".to_string(),
            callback: CallbackAction::EditProductQuantity(id),
        }],
        vec![InlineButton {
            text: "Change category".to_string(),
            callback: CallbackAction::EditProductCategory(id),
        }],
    ];
    state
        .api
        .send_message(
            chat,
            &format!("{card}\nWhat do you want to change?"),
            Some(ReplyMarkup::Inline(buttons)),
        )
        .await?;
    state.api.answer_callback(&callback.id, None).await
}

async fn begin_product_edit(
    state: &AppState,
    chat: i64,
    user_id: i64,
    product_id: i64,
    callback: &CallbackQuery,
    field: EditField,
) -> BotResult<()> {
    let product = match inventory_service::get_product(state, product_id).await {
        Ok(p) => p,
        Err(BotError::NotFound) => {
            return state
                .api
                .answer_callback(&callback.id, Some("Product not found."))
                .await;
        }
        Err(err) => return Err(err),
    };

    let flow = match field {
        EditField::Name => Flow::EditingProductName { product_id },
        EditField::Quantity => Flow::EditingProductQuantity {
            product_id,
            name: product.name.clone(),
        },
        EditField::Category => Flow::EditingProductCategory { product_id },
    };

    let session_arc = state.sessions.session(user_id);
    let mut session = session_arc.lock().await;
    flows::start_edit_field(state, chat, &mut session, flow).await?;
    state.api.answer_callback(&callback.id, None).await
}

async fn delete_product(
    state: &AppState,
    chat: i64,
    user_id: i64,
    product_id: i64,
    callback: &CallbackQuery,
) -> BotResult<()> {
    match inventory_service::delete_product(state, product_id).await {
        Ok(removed) => {
            state
                .api
                .send_message(
                    chat,
                    &format!("Product deleted.\n{}", removed_block(&removed)),
                    Some(Menu::Warehouse.markup(false)),
                )
                .await?;
            if let Err(err) = audit::log_action(
                state,
                user_id,
                "product deleted",
                &format!("{} (id {}, quantity {})", removed.name, removed.id, removed.quantity),
            )
            .await
            {
                tracing::warn!(error = %err, "audit log failed");
            }
            state.api.answer_callback(&callback.id, None).await
        }
        Err(BotError::NotFound) => {
            state
                .api
                .answer_callback(&callback.id, Some("Product not found."))
                .await
        }
        Err(err) => Err(err),
    }
}

fn removed_block(product: &Product) -> String {
    format!(
        "id: {}\nname: {}\nquantity: {}\ncategory: {}",
        product.id,
        product.name,
        product.quantity,
        product.category.as_deref().unwrap_or("none"),
    )
}

async fn select_user(
    state: &AppState,
    chat: i64,
    id: i64,
    callback: &CallbackQuery,
) -> BotResult<()> {
    let user = match admin_service::get_user(state, id).await {
        Ok(u) => u,
        Err(BotError::NotFound) => {
            return state
                .api
                .answer_callback(&callback.id, Some("User not found."))
                .await;
        }
        Err(err) => return Err(err),
    };

    let mut buttons: Vec<Vec<InlineButton>> = Vec::new();
    if user.is_approved {
        buttons.push(vec![InlineButton {
            text: "Revoke access".to_string(),
            callback: CallbackAction::Disapprove(id),
        }]);
    } else {
        buttons.push(vec![InlineButton {
            text: "Approve access".to_string(),
            callback: CallbackAction::Approve(id),
        }]);
    }
    if user.is_banned {
        buttons.push(vec![InlineButton {
            text: "Unban".to_string(),
            callback: CallbackAction::Unban(id),
        }]);
    } else {
        buttons.push(vec![InlineButton {
            text: "Ban".to_string(),
            callback: CallbackAction::Ban(id),
        }]);
    }
    if user.is_admin {
        buttons.push(vec![InlineButton {
            text: "Demote".to_string(),
            callback: CallbackAction::Demote(id),
        }]);
    } else {
        buttons.push(vec![InlineButton {
            text: "Promote".to_string(),
            callback: CallbackAction::Promote(id),
        }]);
    }

    state
        .api
        .send_message(chat, &views::user_card(&user), Some(ReplyMarkup::Inline(buttons)))
        .await?;
    state.api.answer_callback(&callback.id, None).await
}

async fn apply_user_mutation(
    state: &AppState,
    chat: i64,
    actor: i64,
    target: i64,
    mutation: AccessMutation,
    callback: &CallbackQuery,
) -> BotResult<()> {
    match admin_service::apply_mutation(state, actor, target, mutation).await {
        Ok(user) => {
            state
                .api
                .send_message(
                    chat,
                    &format!(
                        "{}: {} {}",
                        mutation.action_label(),
                        user.display_name(),
                        user.handle(),
                    ),
                    None,
                )
                .await?;
            state.api.answer_callback(&callback.id, None).await
        }
        Err(BotError::NotFound) => {
            state
                .api
                .answer_callback(&callback.id, Some("User not found."))
                .await
        }
        Err(BotError::PrincipalProtected) => {
            state
                .api
                .answer_callback(&callback.id, Some("The principal admin cannot be modified."))
                .await
        }
        Err(err) => Err(err),
    }
}
