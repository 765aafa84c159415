use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::OrmConn;
use crate::session::SessionStore;
use crate::telegram::ChatApi;

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub config: AppConfig,
    pub api: Arc<dyn ChatApi>,
    pub sessions: Arc<SessionStore>,
}
