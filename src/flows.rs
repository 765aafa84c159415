//! The conversational state machine: one pending flow per user, advanced one
//! message at a time until its save step fires or the user cancels.

use chrono::Local;

use crate::audit::log_action;
use crate::config::PRINCIPAL_ADMIN_ID;
use crate::error::{BotError, BotResult};
use crate::keyboards::{self, Menu};
use crate::services::admin_service::{self, AccessMutation};
use crate::services::{inventory_service, report_service};
use crate::session::{
    ControlToken, Flow, ProductDraft, ReportDraft, ReportField, ReportValues, Session, UserAction,
};
use crate::state::AppState;
use crate::views;

/// Category input that clears the category instead of setting it.
const REMOVE_CATEGORY: &str = "remove";

// ===== flow starts =====

pub async fn start_add_product(
    state: &AppState,
    chat: i64,
    session: &mut Session,
) -> BotResult<()> {
    session.flow = Some(Flow::AddingProduct(ProductDraft::default()));
    state
        .api
        .send_message(chat, "Enter the product name:", Some(keyboards::cancel_keyboard()))
        .await
}

pub async fn start_search(state: &AppState, chat: i64, session: &mut Session) -> BotResult<()> {
    session.flow = Some(Flow::SearchingProduct);
    state
        .api
        .send_message(
            chat,
            "Enter a product name or category to search for:",
            Some(keyboards::cancel_keyboard()),
        )
        .await
}

/// Entered from a product-field callback; the target id rides in the flow.
pub async fn start_edit_field(
    state: &AppState,
    chat: i64,
    session: &mut Session,
    flow: Flow,
) -> BotResult<()> {
    let prompt = match &flow {
        Flow::EditingProductName { .. } => "Enter the new name:",
        Flow::EditingProductQuantity { .. } => "Enter the new quantity:",
        Flow::EditingProductCategory { .. } => {
            "Enter the new category, or \"remove\" to clear it:"
        }
        _ => return Err(BotError::BadRequest("not an edit flow".into())),
    };
    session.flow = Some(flow);
    state
        .api
        .send_message(chat, prompt, Some(keyboards::cancel_keyboard()))
        .await
}

pub async fn start_report_create(
    state: &AppState,
    chat: i64,
    user_id: i64,
    session: &mut Session,
) -> BotResult<()> {
    let today = Local::now().date_naive();
    if report_service::find_report(state, user_id, today).await?.is_some() {
        return state
            .api
            .send_message(
                chat,
                "A report for today already exists. Use \"Update report\" instead.",
                None,
            )
            .await;
    }

    let draft = ReportDraft::new(today);
    let first = ReportField::ORDER[0];
    session.flow = Some(Flow::ReportCreate(draft));
    state
        .api
        .send_message(
            chat,
            &format!("Creating the report for {today}.\nEnter the {}:", first.prompt_label()),
            Some(keyboards::cancel_keyboard()),
        )
        .await
}

pub async fn start_report_update(
    state: &AppState,
    chat: i64,
    user_id: i64,
    session: &mut Session,
) -> BotResult<()> {
    let today = Local::now().date_naive();
    let existing = match report_service::find_report(state, user_id, today).await? {
        Some(r) => r,
        None => {
            return state
                .api
                .send_message(
                    chat,
                    "No report for today yet. Use \"Create report\" first.",
                    None,
                )
                .await;
        }
    };

    let values = ReportValues {
        total: existing.total,
        cash: existing.cash,
        card: existing.card,
        bar: existing.bar,
        hookah_count: existing.hookah_count,
        expenses: existing.expenses,
    };
    let draft = ReportDraft::with_values(today, values);
    let first = ReportField::ORDER[0];
    let current = draft.values.display(first);
    session.flow = Some(Flow::ReportUpdate(draft));
    state
        .api
        .send_message(
            chat,
            &format!(
                "Updating the report for {today}.\nCurrent {}: {}\nEnter a new value or press \"Skip\":",
                first.prompt_label(),
                current,
            ),
            Some(keyboards::skip_keyboard()),
        )
        .await
}

pub async fn start_user_action(
    state: &AppState,
    chat: i64,
    session: &mut Session,
    action: UserAction,
) -> BotResult<()> {
    session.flow = Some(Flow::ManagingUser(action));
    state
        .api
        .send_message(chat, action.prompt(), Some(keyboards::cancel_keyboard()))
        .await
}

// ===== flow continuation =====

/// Advance the active flow with one message. The caller holds the session
/// lock and has already passed the access gate.
pub async fn advance(
    state: &AppState,
    chat: i64,
    user_id: i64,
    session: &mut Session,
    text: &str,
) -> BotResult<()> {
    let flow = match session.flow.clone() {
        Some(flow) => flow,
        None => return Ok(()),
    };

    // control tokens run before any field parsing
    if ControlToken::parse(text) == Some(ControlToken::Cancel) {
        let menu = flow.parent_menu();
        session.flow = None;
        return state
            .api
            .send_message(chat, "Action cancelled.", Some(menu.markup(false)))
            .await;
    }

    match flow {
        Flow::AddingProduct(draft) => advance_add_product(state, chat, user_id, session, draft, text).await,
        Flow::EditingProductName { product_id } => {
            finish_edit_name(state, chat, user_id, session, product_id, text).await
        }
        Flow::EditingProductQuantity { product_id, name } => {
            finish_edit_quantity(state, chat, user_id, session, product_id, &name, text).await
        }
        Flow::EditingProductCategory { product_id } => {
            finish_edit_category(state, chat, user_id, session, product_id, text).await
        }
        Flow::SearchingProduct => finish_search(state, chat, user_id, session, text).await,
        Flow::ReportCreate(draft) => {
            advance_report(state, chat, user_id, session, draft, text, false).await
        }
        Flow::ReportUpdate(draft) => {
            advance_report(state, chat, user_id, session, draft, text, true).await
        }
        Flow::ManagingUser(action) => {
            finish_user_action(state, chat, user_id, session, action, text).await
        }
    }
}

async fn advance_add_product(
    state: &AppState,
    chat: i64,
    user_id: i64,
    session: &mut Session,
    mut draft: ProductDraft,
    text: &str,
) -> BotResult<()> {
    if draft.name.is_none() {
        draft.name = Some(text.trim().to_string());
        session.flow = Some(Flow::AddingProduct(draft));
        return state
            .api
            .send_message(chat, "Enter the quantity:", Some(keyboards::cancel_keyboard()))
            .await;
    }

    if draft.quantity.is_none() {
        let quantity: i32 = match text.trim().parse() {
            Ok(q) if q >= 0 => q,
            _ => {
                return state
                    .api
                    .send_message(
                        chat,
                        "Invalid input. Enter a non-negative whole number for the quantity.",
                        Some(keyboards::cancel_keyboard()),
                    )
                    .await;
            }
        };
        draft.quantity = Some(quantity);
        session.flow = Some(Flow::AddingProduct(draft));
        return state
            .api
            .send_message(
                chat,
                "Enter the category (or press \"Skip\"):",
                Some(keyboards::skip_keyboard()),
            )
            .await;
    }

    // category step — the skip token leaves it empty
    let category = if ControlToken::parse(text) == Some(ControlToken::Skip) {
        None
    } else {
        Some(text.trim().to_string())
    };
    let name = draft.name.clone().unwrap_or_default();
    let quantity = draft.quantity.unwrap_or(1);
    session.flow = None;

    match inventory_service::create_product(state, name.clone(), quantity, category).await {
        Ok(product) => {
            state
                .api
                .send_message(
                    chat,
                    &format!(
                        "Product added.\nname: {}\nquantity: {}\ncategory: {}",
                        product.name,
                        product.quantity,
                        product.category.as_deref().unwrap_or("none"),
                    ),
                    Some(Menu::Warehouse.markup(false)),
                )
                .await?;
            if product.quantity < state.config.low_stock_threshold {
                state
                    .api
                    .send_message(
                        chat,
                        &format!(
                            "Warning: \"{}\" was added with low stock: {} left.",
                            product.name, product.quantity,
                        ),
                        None,
                    )
                    .await?;
            }
            if let Err(err) = log_action(
                state,
                user_id,
                "product added",
                &format!("{} (quantity {})", product.name, product.quantity),
            )
            .await
            {
                tracing::warn!(error = %err, "audit log failed");
            }
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to add product");
            state
                .api
                .send_message(
                    chat,
                    "Something went wrong while adding the product.",
                    Some(Menu::Warehouse.markup(false)),
                )
                .await
        }
    }
}

async fn finish_edit_name(
    state: &AppState,
    chat: i64,
    user_id: i64,
    session: &mut Session,
    product_id: i64,
    text: &str,
) -> BotResult<()> {
    session.flow = None;
    match inventory_service::rename_product(state, product_id, text.trim().to_string()).await {
        Ok(product) => {
            state
                .api
                .send_message(
                    chat,
                    &format!("Name changed to: {}", product.name),
                    Some(Menu::Warehouse.markup(false)),
                )
                .await?;
            if let Err(err) = log_action(
                state,
                user_id,
                "product renamed",
                &format!("id {product_id} -> {}", product.name),
            )
            .await
            {
                tracing::warn!(error = %err, "audit log failed");
            }
            Ok(())
        }
        Err(BotError::NotFound) => {
            state
                .api
                .send_message(chat, "Product not found.", Some(Menu::Warehouse.markup(false)))
                .await
        }
        Err(err) => Err(err),
    }
}

async fn finish_edit_quantity(
    state: &AppState,
    chat: i64,
    user_id: i64,
    session: &mut Session,
    product_id: i64,
    name: &str,
    text: &str,
) -> BotResult<()> {
    let quantity: i32 = match text.trim().parse() {
        Ok(q) if q >= 0 => q,
        _ => {
            return state
                .api
                .send_message(
                    chat,
                    "Invalid input. Enter a non-negative whole number.",
                    Some(keyboards::cancel_keyboard()),
                )
                .await;
        }
    };

    session.flow = None;
    match inventory_service::set_quantity(state, product_id, quantity).await {
        Ok(product) => {
            let mut reply = format!("Quantity changed to: {}", product.quantity);
            if product.quantity < state.config.low_stock_threshold {
                reply.push_str(&format!(
                    "\nWarning: \"{name}\" is now low on stock: {} left.",
                    product.quantity,
                ));
            }
            state
                .api
                .send_message(chat, &reply, Some(Menu::Warehouse.markup(false)))
                .await?;
            if let Err(err) = log_action(
                state,
                user_id,
                "product quantity changed",
                &format!("id {product_id} -> {}", product.quantity),
            )
            .await
            {
                tracing::warn!(error = %err, "audit log failed");
            }
            Ok(())
        }
        Err(BotError::NotFound) => {
            state
                .api
                .send_message(chat, "Product not found.", Some(Menu::Warehouse.markup(false)))
                .await
        }
        Err(err) => Err(err),
    }
}

async fn finish_edit_category(
    state: &AppState,
    chat: i64,
    user_id: i64,
    session: &mut Session,
    product_id: i64,
    text: &str,
) -> BotResult<()> {
    session.flow = None;
    let category = if text.trim().eq_ignore_ascii_case(REMOVE_CATEGORY) {
        None
    } else {
        Some(text.trim().to_string())
    };
    let removed = category.is_none();

    match inventory_service::set_category(state, product_id, category).await {
        Ok(product) => {
            let reply = if removed {
                "Category removed.".to_string()
            } else {
                format!(
                    "Category changed to: {}",
                    product.category.as_deref().unwrap_or("none")
                )
            };
            state
                .api
                .send_message(chat, &reply, Some(Menu::Warehouse.markup(false)))
                .await?;
            if let Err(err) = log_action(
                state,
                user_id,
                "product category changed",
                &format!("id {product_id}"),
            )
            .await
            {
                tracing::warn!(error = %err, "audit log failed");
            }
            Ok(())
        }
        Err(BotError::NotFound) => {
            state
                .api
                .send_message(chat, "Product not found.", Some(Menu::Warehouse.markup(false)))
                .await
        }
        Err(err) => Err(err),
    }
}

async fn finish_search(
    state: &AppState,
    chat: i64,
    user_id: i64,
    session: &mut Session,
    text: &str,
) -> BotResult<()> {
    session.flow = None;
    let term = text.trim();
    let found = inventory_service::search_products(state, term).await?;

    if found.is_empty() {
        return state
            .api
            .send_message(
                chat,
                &format!("No products match \"{term}\"."),
                Some(Menu::Warehouse.markup(false)),
            )
            .await;
    }

    let listing = views::search_results(term, &found, state.config.low_stock_threshold);
    state
        .api
        .send_chunked(chat, &listing, Some(Menu::Warehouse.markup(false)))
        .await?;
    if let Err(err) = log_action(
        state,
        user_id,
        "product search",
        &format!("term \"{term}\", {} found", found.len()),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
    Ok(())
}

async fn advance_report(
    state: &AppState,
    chat: i64,
    user_id: i64,
    session: &mut Session,
    mut draft: ReportDraft,
    text: &str,
    updating: bool,
) -> BotResult<()> {
    let field = match draft.current_field() {
        Some(f) => f,
        None => {
            // cursor past the end means a save already fired; drop the flow
            session.flow = None;
            return Ok(());
        }
    };

    if ControlToken::parse(text) == Some(ControlToken::Skip) {
        if updating {
            draft.cursor += 1;
        } else {
            return state
                .api
                .send_message(
                    chat,
                    "Invalid input. Enter a non-negative number.",
                    Some(keyboards::cancel_keyboard()),
                )
                .await;
        }
    } else {
        match field.parse(text) {
            Ok(value) => {
                draft.values.set(field, value);
                draft.cursor += 1;
            }
            Err(()) => {
                let mut error = "Invalid input. Enter a non-negative number.".to_string();
                let markup = if updating {
                    error.push_str("\nOr press \"Skip\" to keep the current value.");
                    keyboards::skip_keyboard()
                } else {
                    keyboards::cancel_keyboard()
                };
                return state.api.send_message(chat, &error, Some(markup)).await;
            }
        }
    }

    if let Some(next) = draft.current_field() {
        let prompt = if updating {
            format!(
                "Current {}: {}\nEnter a new value or press \"Skip\":",
                next.prompt_label(),
                draft.values.display(next),
            )
        } else {
            format!("Enter the {}:", next.prompt_label())
        };
        let markup = if updating {
            keyboards::skip_keyboard()
        } else {
            keyboards::cancel_keyboard()
        };
        session.flow = Some(if updating {
            Flow::ReportUpdate(draft)
        } else {
            Flow::ReportCreate(draft)
        });
        return state.api.send_message(chat, &prompt, Some(markup)).await;
    }

    // all fields gathered, save
    session.flow = None;
    let saved = if updating {
        report_service::update_report(state, user_id, draft.date, &draft.values).await
    } else {
        report_service::create_report(state, user_id, draft.date, &draft.values).await
    };

    match saved {
        Ok(report) => {
            let verb = if updating { "updated" } else { "created" };
            state
                .api
                .send_message(
                    chat,
                    &report_service::summary_text(&report),
                    Some(Menu::Reports.markup(false)),
                )
                .await?;
            if let Err(err) = log_action(
                state,
                user_id,
                &format!("report {verb}"),
                &format!("date {}", report.report_date),
            )
            .await
            {
                tracing::warn!(error = %err, "audit log failed");
            }
            if !report_service::push_summary(state, &report).await {
                state
                    .api
                    .send_message(
                        chat,
                        "Note: the report could not be delivered to the reports channel.",
                        None,
                    )
                    .await?;
            }
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to save shift report");
            state
                .api
                .send_message(
                    chat,
                    "Something went wrong while saving the report.",
                    Some(Menu::Reports.markup(false)),
                )
                .await
        }
    }
}

async fn finish_user_action(
    state: &AppState,
    chat: i64,
    user_id: i64,
    session: &mut Session,
    action: UserAction,
    text: &str,
) -> BotResult<()> {
    let target: i64 = match text.trim().parse() {
        Ok(id) => id,
        Err(_) => {
            return state
                .api
                .send_message(
                    chat,
                    "Enter a valid numeric user id.",
                    Some(keyboards::cancel_keyboard()),
                )
                .await;
        }
    };

    // state clears whether or not the mutation succeeds
    session.flow = None;

    if target == PRINCIPAL_ADMIN_ID {
        return state
            .api
            .send_message(
                chat,
                "The principal admin cannot be modified.",
                Some(Menu::UserManagement.markup(false)),
            )
            .await;
    }

    let mutation = match action {
        UserAction::Promote => AccessMutation::Promote,
        UserAction::Demote => AccessMutation::Demote,
        UserAction::Ban => AccessMutation::Ban,
        UserAction::Unban => AccessMutation::Unban,
    };

    match admin_service::apply_mutation(state, user_id, target, mutation).await {
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
                    Some(Menu::UserManagement.markup(false)),
                )
                .await
        }
        Err(BotError::NotFound) => {
            state
                .api
                .send_message(
                    chat,
                    "User not found.",
                    Some(Menu::UserManagement.markup(false)),
                )
                .await
        }
        Err(err) => Err(err),
    }
}
