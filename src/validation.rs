// src/validation.rs - payload shapes for register, login and post creation
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email regex is valid")
});

fn looks_like_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// First violated rule of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: String) -> Self {
        Self {
            field: field.to_string(),
            message,
        }
    }
}

/// A required string field and the constraints it has to meet.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub min: usize,
    pub max: Option<usize>,
    pub email: bool,
}

impl FieldRule {
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            min: 0,
            max: None,
            email: false,
        }
    }

    pub const fn min(mut self, min: usize) -> Self {
        self.min = min;
        self
    }

    pub const fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub const fn email(mut self) -> Self {
        self.email = true;
        self
    }

    fn check<'a>(&self, payload: &'a Map<String, Value>) -> Result<&'a str, ValidationError> {
        let name = self.name;
        let value = match payload.get(name) {
            None => return Err(ValidationError::new(name, format!("\"{name}\" is required"))),
            Some(Value::String(s)) => s.as_str(),
            Some(_) => {
                return Err(ValidationError::new(name, format!("\"{name}\" must be a string")));
            }
        };

        if value.is_empty() {
            return Err(ValidationError::new(
                name,
                format!("\"{name}\" is not allowed to be empty"),
            ));
        }

        let len = value.chars().count();
        if len < self.min {
            return Err(ValidationError::new(
                name,
                format!("\"{name}\" length must be at least {} characters long", self.min),
            ));
        }

        if let Some(max) = self.max {
            if len > max {
                return Err(ValidationError::new(
                    name,
                    format!("\"{name}\" length must be less than or equal to {max} characters long"),
                ));
            }
        }

        if self.email && !looks_like_email(value) {
            return Err(ValidationError::new(name, format!("\"{name}\" must be a valid email")));
        }

        Ok(value)
    }
}

const EMAIL: FieldRule = FieldRule::string("email").min(10).max(255).email();
const PASSWORD: FieldRule = FieldRule::string("password").min(8);

pub const REGISTER_SHAPE: &[FieldRule] = &[FieldRule::string("name").min(6), EMAIL, PASSWORD];
pub const LOGIN_SHAPE: &[FieldRule] = &[EMAIL, PASSWORD];
pub const POST_SHAPE: &[FieldRule] = &[
    FieldRule::string("title").min(1),
    FieldRule::string("description").min(5),
    FieldRule::string("content").min(20),
];

/// Checks `payload` against `shape` and returns the field values in shape order.
/// Keys that the shape does not declare are rejected once every declared field passes.
pub fn validate<'a>(
    shape: &[FieldRule],
    payload: &'a Map<String, Value>,
) -> Result<Vec<&'a str>, ValidationError> {
    let values = shape
        .iter()
        .map(|rule| rule.check(payload))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(unknown) = payload
        .keys()
        .find(|key| !shape.iter().any(|rule| rule.name == key.as_str()))
    {
        return Err(ValidationError::new(unknown, format!("\"{unknown}\" is not allowed")));
    }

    Ok(values)
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationError> {
        let v = validate(REGISTER_SHAPE, payload)?;
        Ok(Self {
            name: v[0].to_string(),
            email: v[1].to_string(),
            password: v[2].to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationError> {
        let v = validate(LOGIN_SHAPE, payload)?;
        Ok(Self {
            email: v[0].to_string(),
            password: v[1].to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub description: String,
    pub content: String,
}

impl PostDraft {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationError> {
        let v = validate(POST_SHAPE, payload)?;
        Ok(Self {
            title: v[0].to_string(),
            description: v[1].to_string(),
            content: v[2].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected an object"),
        }
    }

    fn register_err(value: Value) -> String {
        Registration::from_payload(&map(value)).unwrap_err().message
    }

    #[test]
    fn accepts_valid_registration() {
        let reg = Registration::from_payload(&map(json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "password": "hunter2hunter2"
        })))
        .unwrap();
        assert_eq!(reg.name, "Jane Doe");
        assert_eq!(reg.email, "jane@example.com");
    }

    #[test]
    fn reports_first_failing_field_in_shape_order() {
        let err = Registration::from_payload(&map(json!({
            "name": "Jo",
            "email": "bad",
            "password": "x"
        })))
        .unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.message, "\"name\" length must be at least 6 characters long");
    }

    #[test]
    fn registration_rule_messages() {
        assert_eq!(
            register_err(json!({"email": "jane@example.com", "password": "password1"})),
            "\"name\" is required"
        );
        assert_eq!(
            register_err(json!({"name": 123456, "email": "jane@example.com", "password": "password1"})),
            "\"name\" must be a string"
        );
        assert_eq!(
            register_err(json!({"name": "", "email": "jane@example.com", "password": "password1"})),
            "\"name\" is not allowed to be empty"
        );
        assert_eq!(
            register_err(json!({"name": "Jane Doe", "email": "a@b.io", "password": "password1"})),
            "\"email\" length must be at least 10 characters long"
        );
        assert_eq!(
            register_err(json!({"name": "Jane Doe", "email": "not-an-email-at-all", "password": "password1"})),
            "\"email\" must be a valid email"
        );
        assert_eq!(
            register_err(json!({"name": "Jane Doe", "email": "jane@example.com", "password": "short"})),
            "\"password\" length must be at least 8 characters long"
        );
    }

    #[test]
    fn email_upper_bound() {
        let local = "a".repeat(250);
        let email = format!("{local}@example.com");
        let err = Credentials::from_payload(&map(json!({"email": email, "password": "password1"})))
            .unwrap_err();
        assert_eq!(
            err.message,
            "\"email\" length must be less than or equal to 255 characters long"
        );
    }

    #[test]
    fn rejects_unknown_keys_after_declared_fields() {
        let err = Credentials::from_payload(&map(json!({
            "email": "jane@example.com",
            "password": "password1",
            "admin": true
        })))
        .unwrap_err();
        assert_eq!(err.message, "\"admin\" is not allowed");
    }

    #[test]
    fn post_draft_minimums() {
        let ok = PostDraft::from_payload(&map(json!({
            "title": "T",
            "description": "01234",
            "content": "twenty characters ok"
        })));
        assert!(ok.is_ok());

        let err = PostDraft::from_payload(&map(json!({
            "title": "T",
            "description": "0123",
            "content": "twenty characters ok"
        })))
        .unwrap_err();
        assert_eq!(err.field, "description");

        let err = PostDraft::from_payload(&map(json!({
            "title": "T",
            "description": "01234",
            "content": "too short"
        })))
        .unwrap_err();
        assert_eq!(err.message, "\"content\" length must be at least 20 characters long");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let ok = PostDraft::from_payload(&map(json!({
            "title": "é",
            "description": "ééééé",
            "content": "éééééééééééééééééééé"
        })));
        assert!(ok.is_ok());
    }

    #[test]
    fn astral_characters_count_once() {
        // three chars, six UTF-16 units
        let err = PostDraft::from_payload(&map(json!({
            "title": "T",
            "description": "😀😀😀",
            "content": "content with at least twenty chars"
        })))
        .unwrap_err();
        assert_eq!(err.message, "\"description\" length must be at least 5 characters long");
    }

    #[test]
    fn any_alphabetic_tld_is_accepted() {
        assert!(looks_like_email("jane@example.notarealtld"));
        assert!(!looks_like_email("jane@example.c0m"));
    }
}
