use serde::Serialize;

use crate::{
    error::AppResult,
    users::dto::PublicUser,
    validation::{Payload, Validate},
};

pub const DEFAULT_USER_NAME: &str = "User";

/// Request body for `POST /signup`.
#[derive(Debug)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Validate for SignupRequest {
    fn validate(p: &Payload) -> AppResult<Self> {
        p.allow_only(&["email", "password", "name"])?;
        let email = p.field("email").trimmed().required()?.lowercase().email()?;
        let password = p.field("password").required()?.min_len(8)?.max_len(30)?;
        let name = match p.field("name").trimmed().optional()? {
            Some(name) => name.min_len(2)?.max_len(30)?.into_string(),
            None => DEFAULT_USER_NAME.to_string(),
        };
        Ok(Self {
            email: email.into_string(),
            password: password.into_string(),
            name,
        })
    }
}

/// Request body for `POST /signin`.
#[derive(Debug)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

impl Validate for SigninRequest {
    fn validate(p: &Payload) -> AppResult<Self> {
        p.allow_only(&["email", "password"])?;
        let email = p.field("email").trimmed().required()?.lowercase().email()?;
        let password = p.field("password").required()?;
        Ok(Self {
            email: email.into_string(),
            password: password.into_string(),
        })
    }
}

/// `{ token, ...user }`
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::{json, Value};

    fn signup(body: Value) -> AppResult<SignupRequest> {
        SignupRequest::validate(&Payload::from_json(body).unwrap())
    }

    fn message(result: AppResult<impl std::fmt::Debug>) -> String {
        match result.unwrap_err() {
            AppError::Validation(m) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn signup_normalizes_email_and_defaults_name() {
        let req = signup(json!({ "email": "  A@B.com ", "password": "longenough1" })).unwrap();
        assert_eq!(req.email, "a@b.com");
        assert_eq!(req.name, DEFAULT_USER_NAME);
    }

    #[test]
    fn signup_rules_name_the_field() {
        assert_eq!(
            message(signup(json!({ "password": "TestPassword123" }))),
            "\"email\" is required"
        );
        assert_eq!(
            message(signup(json!({ "email": "invalid", "password": "TestPassword123" }))),
            "\"email\" must be a valid email"
        );
        assert_eq!(
            message(signup(json!({ "email": "new@test.com", "password": "short" }))),
            "\"password\" length must be at least 8 characters long"
        );
        assert_eq!(
            message(signup(json!({ "email": "new@test.com", "password": "x".repeat(31) }))),
            "\"password\" length must be less than or equal to 30 characters long"
        );
        assert_eq!(
            message(signup(json!({ "email": "new@test.com", "password": "longenough1", "name": "A" }))),
            "\"name\" length must be at least 2 characters long"
        );
    }

    #[test]
    fn signup_accepts_boundary_lengths() {
        let req = signup(json!({
            "email": "edge@test.com",
            "password": "x".repeat(30),
            "name": "y".repeat(30),
        }))
        .unwrap();
        assert_eq!(req.password.len(), 30);
        assert_eq!(req.name.len(), 30);
    }

    #[test]
    fn signin_requires_password_but_not_its_length() {
        let p = Payload::from_json(json!({ "email": "a@b.com", "password": "x" })).unwrap();
        assert!(SigninRequest::validate(&p).is_ok());

        let p = Payload::from_json(json!({ "email": "a@b.com" })).unwrap();
        assert_eq!(message(SigninRequest::validate(&p)), "\"password\" is required");
    }
}
