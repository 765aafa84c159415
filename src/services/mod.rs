pub mod admin_service;
pub mod export_service;
pub mod inventory_service;
pub mod report_service;
