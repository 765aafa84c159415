//! Per-user conversation state: the active flow, its scratch payload, and the
//! store that serializes access per user.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::keyboards::{self, Menu};

/// Control tokens recognized before any field parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlToken {
    Cancel,
    Skip,
}

impl ControlToken {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            keyboards::BTN_CANCEL => Some(Self::Cancel),
            keyboards::BTN_SKIP => Some(Self::Skip),
            _ => None,
        }
    }
}

/// Ordered fields of a shift report, one prompt each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    Total,
    Cash,
    Card,
    Bar,
    HookahCount,
    Expenses,
}

impl ReportField {
    pub const ORDER: [ReportField; 6] = [
        Self::Total,
        Self::Cash,
        Self::Card,
        Self::Bar,
        Self::HookahCount,
        Self::Expenses,
    ];

    pub fn prompt_label(self) -> &'static str {
        match self {
            Self::Total => "total revenue",
            Self::Cash => "cash amount",
            Self::Card => "card amount",
            Self::Bar => "bar revenue",
            Self::HookahCount => "number of hookahs sold",
            Self::Expenses => "expenses",
        }
    }

    /// Count-like fields take integers; the rest take decimals with a
    /// comma-or-dot separator.
    pub fn parse(self, text: &str) -> Result<FieldValue, ()> {
        match self {
            Self::HookahCount => {
                let n: i32 = text.trim().parse().map_err(|_| ())?;
                if n < 0 {
                    return Err(());
                }
                Ok(FieldValue::Count(n))
            }
            _ => {
                let normalized = text.trim().replace(',', ".");
                let v: f64 = normalized.parse().map_err(|_| ())?;
                if v < 0.0 || !v.is_finite() {
                    return Err(());
                }
                Ok(FieldValue::Money(v))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Money(f64),
    Count(i32),
}

/// Field values of a report being entered or updated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReportValues {
    pub total: f64,
    pub cash: f64,
    pub card: f64,
    pub bar: f64,
    pub hookah_count: i32,
    pub expenses: f64,
}

impl ReportValues {
    pub fn set(&mut self, field: ReportField, value: FieldValue) {
        match (field, value) {
            (ReportField::Total, FieldValue::Money(v)) => self.total = v,
            (ReportField::Cash, FieldValue::Money(v)) => self.cash = v,
            (ReportField::Card, FieldValue::Money(v)) => self.card = v,
            (ReportField::Bar, FieldValue::Money(v)) => self.bar = v,
            (ReportField::HookahCount, FieldValue::Count(n)) => self.hookah_count = n,
            (ReportField::Expenses, FieldValue::Money(v)) => self.expenses = v,
            // parse() keyed the value off the same field, so this is unreachable
            _ => {}
        }
    }

    pub fn display(&self, field: ReportField) -> String {
        match field {
            ReportField::Total => format!("{}", self.total),
            ReportField::Cash => format!("{}", self.cash),
            ReportField::Card => format!("{}", self.card),
            ReportField::Bar => format!("{}", self.bar),
            ReportField::HookahCount => format!("{}", self.hookah_count),
            ReportField::Expenses => format!("{}", self.expenses),
        }
    }
}

/// Scratch payload of a report flow: the day being reported, the cursor into
/// [`ReportField::ORDER`], and the values gathered so far.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
    pub date: NaiveDate,
    pub cursor: usize,
    pub values: ReportValues,
}

impl ReportDraft {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            cursor: 0,
            values: ReportValues::default(),
        }
    }

    pub fn with_values(date: NaiveDate, values: ReportValues) -> Self {
        Self {
            date,
            cursor: 0,
            values,
        }
    }

    pub fn current_field(&self) -> Option<ReportField> {
        ReportField::ORDER.get(self.cursor).copied()
    }
}

/// Scratch payload for the add-product flow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub quantity: Option<i32>,
}

/// Admin flows that prompt for a single numeric user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Promote,
    Demote,
    Ban,
    Unban,
}

impl UserAction {
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Promote => "Enter the user id to promote to admin:",
            Self::Demote => "Enter the user id to demote:",
            Self::Ban => "Enter the user id to ban:",
            Self::Unban => "Enter the user id to unban:",
        }
    }
}

/// One pending multi-step flow per user.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    AddingProduct(ProductDraft),
    EditingProductName { product_id: i64 },
    EditingProductQuantity { product_id: i64, name: String },
    EditingProductCategory { product_id: i64 },
    SearchingProduct,
    ReportCreate(ReportDraft),
    ReportUpdate(ReportDraft),
    ManagingUser(UserAction),
}

impl Flow {
    /// Menu shown again when the flow is cancelled or completes.
    pub fn parent_menu(&self) -> Menu {
        match self {
            Self::AddingProduct(_)
            | Self::EditingProductName { .. }
            | Self::EditingProductQuantity { .. }
            | Self::EditingProductCategory { .. }
            | Self::SearchingProduct => Menu::Warehouse,
            Self::ReportCreate(_) | Self::ReportUpdate(_) => Menu::Reports,
            Self::ManagingUser(_) => Menu::UserManagement,
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub flow: Option<Flow>,
}

/// Process-wide session map. Each user id owns an `Arc<Mutex<Session>>`; the
/// router holds the lock for the whole unit of work, so two in-flight
/// messages from the same user cannot interleave on the scratch payload.
#[derive(Default)]
pub struct SessionStore {
    map: DashMap<i64, Arc<Mutex<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, user_id: i64) -> Arc<Mutex<Session>> {
        self.map
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(Session::default())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_tokens_match_button_labels_exactly() {
        assert_eq!(ControlToken::parse("Cancel"), Some(ControlToken::Cancel));
        assert_eq!(ControlToken::parse("Skip"), Some(ControlToken::Skip));
        assert_eq!(ControlToken::parse("cancel"), None);
        assert_eq!(ControlToken::parse(" Cancel"), None);
    }

    #[test]
    fn money_fields_accept_comma_or_dot() {
        let parsed = ReportField::Cash.parse("1234,56").unwrap();
        assert_eq!(parsed, FieldValue::Money(1234.56));
        let parsed = ReportField::Cash.parse("1234.56").unwrap();
        assert_eq!(parsed, FieldValue::Money(1234.56));
    }

    #[test]
    fn negative_and_garbage_inputs_are_rejected() {
        assert!(ReportField::Total.parse("-1").is_err());
        assert!(ReportField::Total.parse("abc").is_err());
        assert!(ReportField::HookahCount.parse("2.5").is_err());
        assert!(ReportField::HookahCount.parse("-3").is_err());
    }

    #[test]
    fn hookah_count_is_an_integer_field() {
        assert_eq!(
            ReportField::HookahCount.parse("7"),
            Ok(FieldValue::Count(7))
        );
    }
}
