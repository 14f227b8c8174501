//! Form extraction for browser submissions.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::web::error::ApiError;

/// A form extractor accepting `application/x-www-form-urlencoded` and
/// `multipart/form-data` bodies.
///
/// Only text fields are read from multipart bodies. When a field repeats,
/// the first value wins.
///
/// # Example
///
/// ```ignore
/// async fn login(FormData(form): FormData<LoginForm>) -> StatusCode {
///     // form.username, form.password
/// }
/// ```
pub struct FormData<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for FormData<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid form: {}", e)))?;
            return Ok(FormData(value));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid form: {}", e)))?;

        let mut fields = Map::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid form: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid form field: {}", e)))?;
            fields.entry(name).or_insert(Value::String(text));
        }

        let value = serde_json::from_value(Value::Object(fields))
            .map_err(|e| ApiError::bad_request(format!("Invalid form: {}", e)))?;
        Ok(FormData(value))
    }
}
