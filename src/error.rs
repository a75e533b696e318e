use argon2::Error as Argon2Error;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use log::{error, warn};
use mongodb::error::Error as DbError;
use rocket::{
    http::{Status, StatusClass},
    response::Responder,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{1}")]
    Status(Status, String),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
}

impl Error {
    /// Something that should have existed did not.
    pub fn not_found(what: String) -> Self {
        Self::Status(Status::NotFound, format!("Not found: {what}"))
    }

    /// The request was understood but is malformed.
    pub fn bad_request(reason: String) -> Self {
        Self::Status(Status::BadRequest, reason)
    }

    /// A submission failed verification and nothing was written.
    pub fn not_acceptable(reason: String) -> Self {
        Self::Status(Status::NotAcceptable, reason)
    }

    /// The status this error is reported to the client with.
    pub fn status(&self) -> Status {
        match self {
            Self::Status(status, _) => *status,
            Self::Db(_) => Status::InternalServerError,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::Argon2(_) => Status::BadRequest,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        match status.class() {
            StatusClass::ServerError => error!("{self}"),
            _ => warn!("{self}"),
        }
        Err(status)
    }
}
