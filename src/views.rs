//! Reply-text shaping for listings and summaries.

use crate::models::{ActionLogEntry, Product, ShiftReport, User};
use crate::services::admin_service::Stats;

pub fn product_block(product: &Product, threshold: i32, with_added: bool) -> String {
    let mut block = format!(
        "id: {}\nname: {}\nquantity: {}{}\ncategory: {}\n",
        product.id,
        product.name,
        product.quantity,
        if product.quantity < threshold {
            " (low stock)"
        } else {
            ""
        },
        product.category.as_deref().unwrap_or("none"),
    );
    if with_added {
        block.push_str(&format!(
            "added: {}\n",
            product.added_at.format("%Y-%m-%d %H:%M")
        ));
    }
    block
}

pub fn warehouse_listing(products: &[Product], threshold: i32) -> String {
    let mut text = String::new();

    let low: Vec<&Product> = products.iter().filter(|p| p.quantity < threshold).collect();
    if !low.is_empty() {
        text.push_str("Running low:\n");
        for p in &low {
            text.push_str(&format!("- {} (id {}): {} left\n", p.name, p.id, p.quantity));
        }
        text.push('\n');
    }

    text.push_str("Products:\n\n");
    for p in products {
        text.push_str(&product_block(p, threshold, true));
        text.push('\n');
    }
    text
}

pub fn search_results(term: &str, products: &[Product], threshold: i32) -> String {
    let mut text = format!("Search results for \"{term}\":\n\n");
    for p in products {
        text.push_str(&product_block(p, threshold, false));
        text.push('\n');
    }
    text
}

pub fn low_stock_listing(products: &[Product]) -> String {
    let mut text = "Products running low:\n\n".to_string();
    for p in products {
        text.push_str(&format!(
            "id: {}\nname: {}\nleft: {}\ncategory: {}\n\n",
            p.id,
            p.name,
            p.quantity,
            p.category.as_deref().unwrap_or("none"),
        ));
    }
    text
}

pub fn user_flags(user: &User) -> String {
    let mut flags = Vec::new();
    if user.is_admin {
        flags.push("admin");
    }
    if user.is_banned {
        flags.push("banned");
    }
    if user.is_approved {
        flags.push("approved");
    } else {
        flags.push("pending");
    }
    flags.join(", ")
}

pub fn user_listing(users: &[User]) -> String {
    let mut text = "Users:\n\n".to_string();
    for user in users {
        text.push_str(&format!(
            "{} {}\nid: {}\nflags: {}\nregistered: {}\n\n",
            user.display_name(),
            user.handle(),
            user.id,
            user_flags(user),
            user.added_at.format("%Y-%m-%d %H:%M"),
        ));
    }
    text
}

pub fn user_card(user: &User) -> String {
    format!(
        "{} {}\nid: {}\nflags: {}\nregistered: {}\nlast action: {}",
        user.display_name(),
        user.handle(),
        user.id,
        user_flags(user),
        user.added_at.format("%Y-%m-%d %H:%M"),
        user.last_action_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string()),
    )
}

pub fn stats_text(stats: &Stats) -> String {
    format!(
        "Bot statistics:\n\n\
         Users: {} total, {} admins, {} banned\n\
         Products: {} total, {} running low\n\
         Shift reports: {}\n\
         Actions in the last 24h: {}",
        stats.total_users,
        stats.admins,
        stats.banned,
        stats.total_products,
        stats.low_stock,
        stats.total_reports,
        stats.actions_24h,
    )
}

pub fn logs_listing(entries: &[(ActionLogEntry, Option<User>)]) -> String {
    let mut text = format!("Last {} actions:\n\n", entries.len());
    for (entry, user) in entries {
        let who = match user {
            Some(u) => format!("{} {}", u.display_name(), u.handle()),
            None => format!("user {}", entry.user_id),
        };
        text.push_str(&format!(
            "{}\nby {}\n{}\nat {}\n\n",
            entry.action,
            who,
            entry.details,
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    text
}

pub fn report_history(reports: &[ShiftReport]) -> String {
    let mut text = format!("Last {} reports:\n\n", reports.len());
    for r in reports {
        text.push_str(&format!(
            "{}\n  total: {}\n  cash: {}\n  card: {}\n  bar: {}\n  hookahs: {}\n  expenses: {}\n  balance: {}\n\n",
            r.report_date, r.total, r.cash, r.card, r.bar, r.hookah_count, r.expenses, r.balance,
        ));
    }
    text
}
