//! Button labels and keyboard builders. Exact label text doubles as the
//! router's dispatch key, so every label lives here as a named constant.

use crate::telegram::ReplyMarkup;

// main menu
pub const BTN_WAREHOUSE: &str = "Warehouse";
pub const BTN_SHIFT_REPORTS: &str = "Shift reports";
pub const BTN_EXPORT: &str = "Export to Excel";
pub const BTN_ADMIN_PANEL: &str = "Admin panel";

// warehouse menu
pub const BTN_ADD_PRODUCT: &str = "Add product";
pub const BTN_VIEW_WAREHOUSE: &str = "View warehouse";
pub const BTN_SEARCH_PRODUCT: &str = "Search product";
pub const BTN_EDIT_PRODUCT: &str = "Edit product";
pub const BTN_DELETE_PRODUCT: &str = "Delete product";
pub const BTN_CHECK_LOW_STOCK: &str = "Check low stock";

// report menu
pub const BTN_CREATE_REPORT: &str = "Create report";
pub const BTN_UPDATE_REPORT: &str = "Update report";
pub const BTN_REPORT_HISTORY: &str = "Report history";

// admin panel
pub const BTN_MANAGE_USERS: &str = "Manage users";
pub const BTN_STATISTICS: &str = "Statistics";
pub const BTN_ACTION_LOGS: &str = "Action logs";
pub const BTN_NOTIFICATIONS: &str = "Notification settings";

// user management
pub const BTN_LIST_USERS: &str = "List users";
pub const BTN_PENDING_APPROVALS: &str = "Pending approvals";
pub const BTN_PROMOTE_USER: &str = "Promote to admin";
pub const BTN_DEMOTE_USER: &str = "Demote admin";
pub const BTN_BAN_USER: &str = "Ban user";
pub const BTN_UNBAN_USER: &str = "Unban user";

// notification settings
pub const BTN_SHOW_DESTINATIONS: &str = "Show destinations";
pub const BTN_BIND_REPORTS_HERE: &str = "Use this chat for reports";
pub const BTN_BIND_ACTIONS_HERE: &str = "Use this chat for actions";

// navigation & control tokens
pub const BTN_BACK_MAIN: &str = "Back to main menu";
pub const BTN_BACK_ADMIN: &str = "Back to admin panel";
pub const BTN_CANCEL: &str = "Cancel";
pub const BTN_SKIP: &str = "Skip";

/// Parent menus a flow can fall back to on cancel or completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Main,
    Warehouse,
    Reports,
    AdminPanel,
    UserManagement,
    Notifications,
}

impl Menu {
    pub fn title(self) -> &'static str {
        match self {
            Self::Main => "Main menu:",
            Self::Warehouse => "Warehouse management. Pick an action:",
            Self::Reports => "Shift reports. Pick an action:",
            Self::AdminPanel => "Admin panel. Pick an action:",
            Self::UserManagement => "User management. Pick an action:",
            Self::Notifications => "Notification settings. Pick an action:",
        }
    }

    /// Keyboard for the menu. The main menu shows the admin entry only to
    /// admins, so it needs the caller's role.
    pub fn markup(self, is_admin: bool) -> ReplyMarkup {
        match self {
            Self::Main => main_menu(is_admin),
            Self::Warehouse => warehouse_menu(),
            Self::Reports => report_menu(),
            Self::AdminPanel => admin_menu(),
            Self::UserManagement => user_management_menu(),
            Self::Notifications => notification_menu(),
        }
    }
}

fn rows(rows: &[&[&str]]) -> ReplyMarkup {
    ReplyMarkup::Keyboard(
        rows.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
}

pub fn main_menu(is_admin: bool) -> ReplyMarkup {
    let mut keyboard = vec![
        vec![BTN_WAREHOUSE.to_string()],
        vec![BTN_SHIFT_REPORTS.to_string()],
        vec![BTN_EXPORT.to_string()],
    ];
    if is_admin {
        keyboard.push(vec![BTN_ADMIN_PANEL.to_string()]);
    }
    ReplyMarkup::Keyboard(keyboard)
}

pub fn warehouse_menu() -> ReplyMarkup {
    rows(&[
        &[BTN_ADD_PRODUCT],
        &[BTN_VIEW_WAREHOUSE, BTN_SEARCH_PRODUCT],
        &[BTN_EDIT_PRODUCT, BTN_DELETE_PRODUCT],
        &[BTN_CHECK_LOW_STOCK],
        &[BTN_BACK_MAIN],
    ])
}

pub fn report_menu() -> ReplyMarkup {
    rows(&[
        &[BTN_CREATE_REPORT],
        &[BTN_UPDATE_REPORT],
        &[BTN_REPORT_HISTORY],
        &[BTN_BACK_MAIN],
    ])
}

pub fn admin_menu() -> ReplyMarkup {
    rows(&[
        &[BTN_MANAGE_USERS],
        &[BTN_STATISTICS, BTN_ACTION_LOGS],
        &[BTN_NOTIFICATIONS],
        &[BTN_BACK_MAIN],
    ])
}

pub fn user_management_menu() -> ReplyMarkup {
    rows(&[
        &[BTN_LIST_USERS, BTN_PENDING_APPROVALS],
        &[BTN_PROMOTE_USER, BTN_DEMOTE_USER],
        &[BTN_BAN_USER, BTN_UNBAN_USER],
        &[BTN_BACK_ADMIN],
    ])
}

pub fn notification_menu() -> ReplyMarkup {
    rows(&[
        &[BTN_SHOW_DESTINATIONS],
        &[BTN_BIND_REPORTS_HERE, BTN_BIND_ACTIONS_HERE],
        &[BTN_BACK_ADMIN],
    ])
}

pub fn cancel_keyboard() -> ReplyMarkup {
    rows(&[&[BTN_CANCEL]])
}

pub fn skip_keyboard() -> ReplyMarkup {
    rows(&[&[BTN_SKIP], &[BTN_CANCEL]])
}
