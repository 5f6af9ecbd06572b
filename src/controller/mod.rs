//! `Controller` is a top layer that handles all http-related
//! stuff like reading bodies, parsing params, forming a response.
//! Basically it provides inputs to `Service` layer and converts outputs
//! of `Service` layer to http responses

pub mod context;
pub mod routes;
pub mod types;
pub mod utils;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use failure::Fail;
use futures::future;
use futures::Future;
use hyper;
use hyper::header::{ContentLength, ContentType};
use hyper::server::{Request, Response, Service as HyperService};
use hyper::{Delete, Get, Post, Put, StatusCode};
use r2d2::ManageConnection;
use serde_json;

use self::context::{DynamicContext, StaticContext};
use self::routes::Route;
use self::types::ControllerFuture;
use self::utils::{parse_body, query_param, query_params, user_id_of};
use errors::{classify, error_chain_message, Error};
use form::{BusinessDispatcher, CategorySchemaProvider};
use models::*;
use repos::repo_factory::*;
use services::*;

/// Default page size of business listings
const DEFAULT_COUNT: i64 = 20;

/// Handles a request and returns the json body of the answer
pub trait Controller {
    fn call(&self, req: Request) -> ControllerFuture;
}

/// Controller handles route parsing and calling `Service` layer
pub struct ControllerImpl<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub static_context: StaticContext<T, M, F>,
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > ControllerImpl<T, M, F>
{
    /// Create a new controller based on services
    pub fn new(static_context: StaticContext<T, M, F>) -> Self {
        Self { static_context }
    }
}

macro_rules! serialize_future {
    ($e:expr) => {
        Box::new($e.and_then(|resp| serde_json::to_string(&resp).map_err(|e| FailureError::from(e.context(Error::Internal)))))
    };
}

fn failed<T: 'static>(e: FailureError) -> Box<Future<Item = T, Error = FailureError>> {
    Box::new(future::err(e))
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > Controller for ControllerImpl<T, M, F>
{
    /// Handle a request and get future response
    fn call(&self, req: Request) -> ControllerFuture {
        let dynamic_context = DynamicContext::new(user_id_of(req.headers()));
        let service = Service::new(self.static_context.clone(), dynamic_context);

        let method = req.method().clone();
        let path = req.path().to_string();
        let params = query_params(req.query());
        let route = self.static_context.route_parser.test(&path);

        match (&method, route) {
            // GET /healthcheck
            (&Get, Some(Route::Healthcheck)) => serialize_future!(future::ok::<_, FailureError>("Ok")),

            // GET /categories
            (&Get, Some(Route::Categories)) => match query_param::<bool>(&params, "all") {
                Ok(all) => serialize_future!(service.list_categories(all.unwrap_or(false))),
                Err(e) => failed(e),
            },

            // POST /categories
            (&Post, Some(Route::Categories)) => {
                serialize_future!(parse_body::<NewCategory>(req.body()).and_then(move |payload| service.create_category(payload)))
            }

            // GET /categories/<category_id>
            (&Get, Some(Route::Category(category_id))) => serialize_future!(service.get_category(category_id)),

            // PUT /categories/<category_id>
            (&Put, Some(Route::Category(category_id))) => serialize_future!(
                parse_body::<UpdateCategory>(req.body()).and_then(move |payload| service.update_category(category_id, payload))
            ),

            // DELETE /categories/<category_id>
            (&Delete, Some(Route::Category(category_id))) => serialize_future!(service.deactivate_category(category_id)),

            // GET /categories/<category_id>/schema
            (&Get, Some(Route::CategorySchema(category_id))) => serialize_future!(service.category_schema(category_id)),

            // POST /categories/<category_id>/subcategories
            (&Post, Some(Route::CategorySubcategories(category_id))) => serialize_future!(
                parse_body::<NewSubcategory>(req.body()).and_then(move |payload| service.create_subcategory(category_id, payload))
            ),

            // PUT /subcategories/<subcategory_id>
            (&Put, Some(Route::Subcategory(subcategory_id))) => serialize_future!(
                parse_body::<UpdateSubcategory>(req.body())
                    .and_then(move |payload| service.update_subcategory(subcategory_id, payload))
            ),

            // POST /categories/<category_id>/attributes
            (&Post, Some(Route::CategoryAttributes(category_id))) => serialize_future!(
                parse_body::<NewAttributeDefinition>(req.body()).and_then(move |payload| service.create_attribute(category_id, payload))
            ),

            // PUT /attributes/<attribute_id>
            (&Put, Some(Route::Attribute(attribute_id))) => serialize_future!(
                parse_body::<UpdateAttributeDefinition>(req.body())
                    .and_then(move |payload| service.update_attribute(attribute_id, payload))
            ),

            // DELETE /attributes/<attribute_id>
            (&Delete, Some(Route::Attribute(attribute_id))) => serialize_future!(service.delete_attribute(attribute_id)),

            // GET /businesses
            (&Get, Some(Route::Businesses)) => {
                let terms = query_param::<CategoryId>(&params, "category_id").and_then(|category_id| {
                    query_param::<SubcategoryId>(&params, "subcategory_id").map(|subcategory_id| BusinessesSearchTerms {
                        category_id,
                        subcategory_id,
                        ..Default::default()
                    })
                });
                match (terms, page_of(&params)) {
                    (Ok(terms), Ok((from, count))) => serialize_future!(service.list_businesses(terms, from, count)),
                    (Err(e), _) | (_, Err(e)) => failed(e),
                }
            }

            // GET /businesses/by_owner
            (&Get, Some(Route::BusinessesByOwner)) => match page_of(&params) {
                Ok((from, count)) => serialize_future!(service.list_owned_businesses(from, count)),
                Err(e) => failed(e),
            },

            // POST /businesses
            (&Post, Some(Route::Businesses)) => {
                serialize_future!(parse_body::<BusinessPayload>(req.body()).and_then(move |payload| service.create_business(payload)))
            }

            // GET /businesses/<business_id>
            (&Get, Some(Route::Business(business_id))) => serialize_future!(service.get_business(business_id)),

            // PUT /businesses/<business_id>
            (&Put, Some(Route::Business(business_id))) => serialize_future!(
                parse_body::<BusinessPayload>(req.body()).and_then(move |payload| service.update_business(business_id, payload))
            ),

            // DELETE /businesses/<business_id>
            (&Delete, Some(Route::Business(business_id))) => serialize_future!(service.deactivate_business(business_id)),

            // Fallback
            (m, _) => failed(
                format_err!("Request to non existing endpoint in directory microservice! {:?} {}", m, path)
                    .context(Error::NotFound)
                    .into(),
            ),
        }
    }
}

/// `from` and `count` of a listing, defaults to the first page
fn page_of(params: &::std::collections::HashMap<String, String>) -> Result<(BusinessId, i64), FailureError> {
    let from = query_param::<BusinessId>(params, "from")?.unwrap_or_default();
    let count = query_param::<i64>(params, "count")?.unwrap_or(DEFAULT_COUNT);
    Ok((from, count))
}

/// Failure answer: `{ code, description, payload }`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorMessage {
    pub code: u16,
    pub description: String,
    pub payload: Option<serde_json::Value>,
}

impl ErrorMessage {
    /// Renders error classified by the layers below, unknown errors are internal
    pub fn from_error(err: &FailureError) -> (StatusCode, ErrorMessage) {
        let classified = classify(err).unwrap_or(Error::Internal);
        let status = classified.code();
        let payload = match classified {
            Error::Validate(ref errors) => serde_json::to_value(errors).ok(),
            _ => None,
        };
        let description = match classified {
            Error::Internal | Error::Connection => "Internal server error".to_string(),
            ref other => other.to_string(),
        };
        (
            status,
            ErrorMessage {
                code: status.as_u16(),
                description,
                payload,
            },
        )
    }
}

/// Hyper service turning controller futures into json responses
pub struct Application<C: Controller> {
    pub controller: C,
}

impl<C: Controller> Application<C> {
    pub fn new(controller: C) -> Self {
        Self { controller }
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    Response::new()
        .with_status(status)
        .with_header(ContentLength(body.len() as u64))
        .with_header(ContentType::json())
        .with_body(body)
}

impl<C: Controller> HyperService for Application<C> {
    type Request = Request;
    type Response = Response;
    type Error = hyper::Error;
    type Future = Box<Future<Item = Response, Error = hyper::Error>>;

    fn call(&self, req: Request) -> Self::Future {
        debug!("Received request: {} {}", req.method(), req.path());
        Box::new(self.controller.call(req).then(|result| match result {
            Ok(body) => future::ok(json_response(StatusCode::Ok, body)),
            Err(err) => {
                let (status, message) = ErrorMessage::from_error(&err);
                if status == StatusCode::InternalServerError {
                    error!("{}", error_chain_message(&err));
                } else {
                    debug!("{}", error_chain_message(&err));
                }
                let body = serde_json::to_string(&message).unwrap_or_else(|_| "{}".to_string());
                future::ok(json_response(status, body))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_sent_as_payload() {
        let errors = validation_errors!({"zip_code": ["zip_code" => "Invalid zip code"]});
        let err: FailureError = format_err!("Business payload is invalid").context(Error::Validate(errors)).into();
        let (status, message) = ErrorMessage::from_error(&err);
        assert_eq!(status, StatusCode::BadRequest);
        assert_eq!(message.code, 400);
        assert_eq!(message.payload.unwrap()["zip_code"][0]["message"], json!("Invalid zip code"));
    }

    #[test]
    fn unclassified_errors_are_internal() {
        let (status, message) = ErrorMessage::from_error(&format_err!("connection reset"));
        assert_eq!(status, StatusCode::InternalServerError);
        assert_eq!(message.description, "Internal server error");
        assert_eq!(message.payload, None);
    }
}
