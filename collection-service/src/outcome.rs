//! Operation outcomes and error capture
//!
//! Every public operation produces exactly one [`Outcome`]: a status code plus
//! the response resource. The resource is absent only for `204 No Content`.
//!
//! [`capture`] runs an operation body against a mutable outcome and translates
//! whatever the body fails with into that outcome, so no failure escapes to the
//! caller. Partial mutations made by the body before it failed are kept,
//! except for projected items: a failed outcome carries the error and the
//! echoed template only.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use http::StatusCode;

use crate::error::{Error, Result, ServiceError};
use crate::model::{Collection, CollectionError, Resource};

/// Title of the generic internal error
pub const INTERNAL_ERROR_TITLE: &str = "Internal Server Error";

/// Code of the generic internal error
pub const INTERNAL_ERROR_CODE: &str = "500";

/// Message of the generic internal error
pub const INTERNAL_ERROR_MESSAGE: &str =
    "The server has encountered an error, please wait and try again.";

/// Status-coded result of one public operation
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<R> {
    /// Status code of the operation
    pub status: StatusCode,
    /// Response resource, `None` only for no-content outcomes
    pub resource: Option<R>,
}

impl<R: Resource> Outcome<R> {
    /// Create a new outcome
    pub fn new(status: StatusCode, resource: Option<R>) -> Self {
        Self { status, resource }
    }

    /// Whether this is the bodiless `204 No Content` outcome
    pub fn is_no_content(&self) -> bool {
        self.status == StatusCode::NO_CONTENT
    }

    /// Borrow the response collection, if there is a resource
    pub fn collection(&self) -> Option<&R::Collection> {
        self.resource.as_ref().map(Resource::collection)
    }

    /// Mutably borrow the response collection, if there is a resource
    pub fn collection_mut(&mut self) -> Option<&mut R::Collection> {
        self.resource.as_mut().map(Resource::collection_mut)
    }

    /// The collection error, if one was recorded
    pub fn error(&self) -> Option<&CollectionError> {
        self.collection().and_then(Collection::error)
    }

    /// Split into status and resource
    pub fn into_parts(self) -> (StatusCode, Option<R>) {
        (self.status, self.resource)
    }

    fn record(&mut self, status: StatusCode, error: CollectionError) {
        if let Some(collection) = self.collection_mut() {
            collection.clear_items();
            collection.set_error(error);
        }
        self.status = status;
    }

    fn fail(&mut self, err: &ServiceError) {
        self.record(err.status, err.to_collection_error());
    }

    fn fail_internal(&mut self) {
        self.record(
            StatusCode::INTERNAL_SERVER_ERROR,
            CollectionError::new(
                INTERNAL_ERROR_TITLE,
                INTERNAL_ERROR_CODE,
                INTERNAL_ERROR_MESSAGE,
            ),
        );
    }
}

/// Run `operation` against a fresh outcome and capture its failures
///
/// - `Ok(())`: the outcome is returned as the operation left it.
/// - [`Error::Recoverable`]: the error is written onto the collection (when
///   there is a resource) and its status replaces the outcome status.
///   Items projected before the failure are dropped; the template stays.
/// - Any other error, or a panic: a generic internal error is written, the
///   status becomes 500 and the failure is logged.
///
/// # Example
///
/// ```rust
/// use collection_service::error::ServiceError;
/// use collection_service::memory::KeyValueResource;
/// use collection_service::outcome::capture;
/// use http::StatusCode;
///
/// let outcome = capture(StatusCode::OK, Some(KeyValueResource::default()), |_| {
///     Err(ServiceError::not_found().into())
/// });
/// assert_eq!(outcome.status, StatusCode::NOT_FOUND);
/// assert_eq!(outcome.error().map(|e| e.title.as_str()), Some("Not Found"));
/// ```
pub fn capture<R, F>(status: StatusCode, resource: Option<R>, operation: F) -> Outcome<R>
where
    R: Resource,
    F: FnOnce(&mut Outcome<R>) -> Result<()>,
{
    let mut outcome = Outcome::new(status, resource);

    match panic::catch_unwind(AssertUnwindSafe(|| operation(&mut outcome))) {
        Ok(Ok(())) => {}
        Ok(Err(Error::Recoverable(err))) => {
            tracing::debug!(status = err.status.as_u16(), title = %err.title, "Recoverable error");
            outcome.fail(&err);
        }
        Ok(Err(err)) => {
            tracing::error!(error = %err, "Error creating result");
            outcome.fail_internal();
        }
        Err(payload) => {
            tracing::error!(panic = %panic_message(payload.as_ref()), "Panic creating result");
            outcome.fail_internal();
        }
    }

    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}
