use failure::Error as FailureError;
use futures::future::Future;

/// Json body of a response, or the error to be rendered
pub type ControllerFuture = Box<Future<Item = String, Error = FailureError>>;
