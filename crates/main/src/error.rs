use rocket::{
    http::Status,
    response::{self, Responder},
    Request,
};

/// Errors a request handler can end with. Expected outcomes (a missing
/// entity, a disabled feature) become 4xx responses; the rest are logged and
/// answered with a 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl<'r, 'o: 'r> Responder<'r, 'o> for AppError {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'o> {
        match self {
            AppError::NotFound => Err(Status::NotFound),
            AppError::Forbidden => Err(Status::Forbidden),
            AppError::Database(_) | AppError::PasswordHash(_) => {
                tracing::error!("request failed: {self}");
                Err(Status::InternalServerError)
            }
        }
    }
}

/// Turns a lookup result into `NotFound` when nothing matched.
pub trait OrNotFound<T> {
    fn or_not_found(self) -> AppResult<T>;
}

impl<T> OrNotFound<T> for Option<T> {
    fn or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}
