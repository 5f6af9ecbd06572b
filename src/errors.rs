use failure::{Context, Error as FailureError};
use hyper::StatusCode;

use models::FieldErrors;

/// Classification of failures, attached to errors as context by every layer
#[derive(Debug, Clone, Fail)]
pub enum Error {
    #[fail(display = "Not found")]
    NotFound,
    #[fail(display = "Parse error")]
    Parse,
    #[fail(display = "Validation error: {}", _0)]
    Validate(FieldErrors),
    #[fail(display = "Server is refusing to fullfil the request")]
    Forbidden,
    #[fail(display = "R2D2 connection error")]
    Connection,
    #[fail(display = "Internal error")]
    Internal,
}

impl Error {
    pub fn code(&self) -> StatusCode {
        match *self {
            Error::NotFound => StatusCode::NotFound,
            Error::Validate(_) => StatusCode::BadRequest,
            Error::Parse => StatusCode::UnprocessableEntity,
            Error::Forbidden => StatusCode::Forbidden,
            Error::Connection | Error::Internal => StatusCode::InternalServerError,
        }
    }
}

/// Finds the outermost `Error` classification in the cause chain
pub fn classify(err: &FailureError) -> Option<Error> {
    err.iter_chain()
        .filter_map(|cause| {
            cause
                .downcast_ref::<Context<Error>>()
                .map(|context| context.get_context().clone())
                .or_else(|| cause.downcast_ref::<Error>().cloned())
        }).next()
}

/// Field errors carried by a validation failure, if the failure is one
pub fn field_errors_of(err: &FailureError) -> Option<FieldErrors> {
    match classify(err) {
        Some(Error::Validate(errors)) => Some(errors),
        _ => None,
    }
}

/// Message of the whole cause chain, outermost first
pub fn error_chain_message(err: &FailureError) -> String {
    err.iter_chain().map(|cause| cause.to_string()).collect::<Vec<_>>().join(": ")
}
