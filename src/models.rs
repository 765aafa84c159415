use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub is_admin: bool,
    pub is_banned: bool,
    pub is_approved: bool,
    pub added_at: DateTime<Utc>,
    pub last_action_at: Option<DateTime<Utc>>,
}

impl User {
    /// Display handle: "@name" or a placeholder when the transport gave none.
    pub fn handle(&self) -> String {
        match &self.username {
            Some(u) => format!("@{u}"),
            None => "(no username)".to_string(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub quantity: i32,
    pub category: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftReport {
    pub id: i64,
    pub user_id: i64,
    pub report_date: NaiveDate,
    pub total: f64,
    pub cash: f64,
    pub card: f64,
    pub bar: f64,
    pub hookah_count: i32,
    pub expenses: f64,
    pub starting_cash: f64,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

impl ShiftReport {
    /// Display-only figure, never persisted.
    pub fn net_profit(&self) -> f64 {
        self.total - self.expenses
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSetting {
    pub kind: String,
    pub chat_id: i64,
}
