use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("the principal admin cannot be modified")]
    PrincipalProtected,

    #[error("database error")]
    Orm(#[from] sea_orm::DbErr),

    #[error("transport error")]
    Transport(#[from] reqwest::Error),

    #[error("spreadsheet error")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub type BotResult<T> = Result<T, BotError>;
