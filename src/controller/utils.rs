use std::collections::HashMap;
use std::str::FromStr;

use failure::Error as FailureError;
use failure::Fail;
use futures::{Future, Stream};
use hyper::header::Authorization;
use hyper::{Body, Headers};
use serde::de::DeserializeOwned;
use serde_json;

use errors::Error;
use models::UserId;

fn parse_error<E: Fail>(e: E) -> FailureError {
    e.context(Error::Parse).into()
}

/// Reads the whole body and deserializes it as json
pub fn parse_body<T>(body: Body) -> Box<Future<Item = T, Error = FailureError>>
where
    T: DeserializeOwned + 'static,
{
    Box::new(
        body.concat2()
            .map_err(parse_error)
            .and_then(|chunk| serde_json::from_slice::<T>(&chunk).map_err(parse_error)),
    )
}

/// User id forwarded by the gateway in the `Authorization` header
pub fn user_id_of(headers: &Headers) -> Option<UserId> {
    headers
        .get::<Authorization<String>>()
        .and_then(|auth| auth.0.trim().parse::<UserId>().ok())
}

/// Splits `a=1&b=2` into pairs, later keys win
pub fn query_params(query: Option<&str>) -> HashMap<String, String> {
    query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next().unwrap_or_default().to_string();
            let value = parts.next().unwrap_or_default().to_string();
            (key, value)
        }).collect()
}

/// Typed query param, absent or empty params are `None`
pub fn query_param<T>(params: &HashMap<String, String>, key: &str) -> Result<Option<T>, FailureError>
where
    T: FromStr,
    T::Err: ::std::fmt::Display,
{
    match params.get(key).map(|value| value.trim()).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|e| {
            format_err!("Query param {} = '{}' is malformed: {}", key, value, e)
                .context(Error::Parse)
                .into()
        }),
    }
}
