pub mod action_logs;
pub mod notification_settings;
pub mod products;
pub mod shift_reports;
pub mod users;

pub use action_logs::Entity as ActionLogs;
pub use notification_settings::Entity as NotificationSettings;
pub use products::Entity as Products;
pub use shift_reports::Entity as ShiftReports;
pub use users::Entity as Users;
