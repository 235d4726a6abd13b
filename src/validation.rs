//! Request validation that runs before any handler body.
//!
//! Each request type implements [`Validate`] as a straight sequence of field
//! rules over a [`Payload`]; the first failing rule becomes a
//! [`AppError::Validation`] whose message quotes the offending field. The
//! [`ValidJson`], [`ValidQuery`] and [`ValidPath`] extractors reject the
//! request before the handler is entered.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use url::{Host, Url};

use crate::{
    error::{AppError, AppResult},
    id::{ObjectId, OBJECT_ID_LEN},
};

pub trait Validate: Sized {
    fn validate(payload: &Payload) -> AppResult<Self>;
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::Validation(message.into())
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Absolute http(s) URL whose host is an IP or a dotted domain name.
pub(crate) fn is_http_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host() {
        Some(Host::Domain(domain)) => {
            domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}

/// A request segment (body, query string or path) as a flat map of fields.
#[derive(Debug, Default)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn from_json(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(invalid("\"value\" must be of type object")),
        }
    }

    pub fn from_strings(map: HashMap<String, String>) -> Self {
        Self {
            fields: map.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
        }
    }

    /// Rejects the first key not listed in `allowed`.
    pub fn allow_only(&self, allowed: &[&str]) -> AppResult<()> {
        match self.fields.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(key) => Err(invalid(format!("\"{key}\" is not allowed"))),
            None => Ok(()),
        }
    }

    pub fn field(&self, name: &'static str) -> Field<'_> {
        Field {
            name,
            value: self.fields.get(name),
            trim: false,
        }
    }
}

pub struct Field<'a> {
    name: &'static str,
    value: Option<&'a Value>,
    trim: bool,
}

impl<'a> Field<'a> {
    /// Strip surrounding whitespace before any other rule sees the value.
    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn required(self) -> AppResult<Text> {
        match self.optional()? {
            Some(text) => Ok(text),
            None => Err(invalid(format!("\"{}\" is required", self.name))),
        }
    }

    pub fn optional(&self) -> AppResult<Option<Text>> {
        let raw = match self.value {
            None => return Ok(None),
            Some(Value::String(s)) => s,
            Some(_) => return Err(invalid(format!("\"{}\" must be a string", self.name))),
        };
        let value = if self.trim { raw.trim() } else { raw.as_str() };
        if value.is_empty() {
            return Err(invalid(format!("\"{}\" is not allowed to be empty", self.name)));
        }
        Ok(Some(Text {
            name: self.name,
            value: value.to_string(),
        }))
    }
}

/// A present, non-empty string field with chainable rules.
#[derive(Debug)]
pub struct Text {
    name: &'static str,
    value: String,
}

impl Text {
    fn chars(&self) -> usize {
        self.value.chars().count()
    }

    pub fn min_len(self, min: usize) -> AppResult<Self> {
        if self.chars() < min {
            return Err(invalid(format!(
                "\"{}\" length must be at least {min} characters long",
                self.name
            )));
        }
        Ok(self)
    }

    pub fn max_len(self, max: usize) -> AppResult<Self> {
        if self.chars() > max {
            return Err(invalid(format!(
                "\"{}\" length must be less than or equal to {max} characters long",
                self.name
            )));
        }
        Ok(self)
    }

    pub fn exact_len(self, exact: usize) -> AppResult<Self> {
        if self.chars() != exact {
            return Err(invalid(format!(
                "\"{}\" length must be {exact} characters long",
                self.name
            )));
        }
        Ok(self)
    }

    pub fn hex(self) -> AppResult<Self> {
        if !self.value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid(format!(
                "\"{}\" must only contain hexadecimal characters",
                self.name
            )));
        }
        Ok(self)
    }

    pub fn email(self) -> AppResult<Self> {
        if !is_valid_email(&self.value) {
            return Err(invalid(format!("\"{}\" must be a valid email", self.name)));
        }
        Ok(self)
    }

    pub fn http_url(self) -> AppResult<Self> {
        if !is_http_url(&self.value) {
            return Err(invalid(format!("\"{}\" must be a valid uri", self.name)));
        }
        Ok(self)
    }

    pub fn lowercase(mut self) -> Self {
        self.value = self.value.to_lowercase();
        self
    }

    pub fn object_id(self) -> AppResult<ObjectId> {
        let text = self.hex()?.exact_len(OBJECT_ID_LEN)?;
        ObjectId::parse(&text.value)
            .ok_or_else(|| invalid(format!("\"{}\" must be a valid id", text.name)))
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

/// JSON body that has passed `T`'s rules.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| invalid(rejection.body_text()))?;
        let payload = Payload::from_json(value)?;
        T::validate(&payload).map(ValidJson)
    }
}

/// Query string that has passed `T`'s rules.
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: Validate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(map) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| invalid(rejection.body_text()))?;
        T::validate(&Payload::from_strings(map)).map(ValidQuery)
    }
}

/// Path parameters that have passed `T`'s rules.
#[derive(Debug)]
pub struct ValidPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    S: Send + Sync,
    T: Validate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(map) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| invalid(rejection.body_text()))?;
        T::validate(&Payload::from_strings(map)).map(ValidPath)
    }
}
