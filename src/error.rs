use log::{debug, error};
use mongodb::error::Error as DbError;
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::{json, Json},
    Request,
};
use thiserror::Error;

use crate::model::common::resolution::ResolutionError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Conflict(_) => Status::Conflict,
            Self::Db(_) | Self::Unexpected(_) => Status::InternalServerError,
        }
    }
}

impl From<ResolutionError> for Error {
    fn from(err: ResolutionError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        // Server-side failures are not described to the client.
        let message = if status.class() == StatusClass::ServerError {
            error!("{self}");
            "Internal Server Error".to_string()
        } else {
            debug!("{self}");
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).respond_to(req)
    }
}
