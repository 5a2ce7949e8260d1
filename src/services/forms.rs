//! Form inputs, field validators, and validated records.
//!
//! DESIGN
//! ======
//! Raw submissions deserialize into `*Input` structs with every field
//! defaulted to an empty string, so a missing field is a validation error
//! rather than an extractor rejection. Validation returns either a typed
//! record or `FieldErrors` (field name -> first failing rule's message).
//! The `*Form` structs pair the raw input with those errors for re-render.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use time::Date;
use time::macros::format_description;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

pub type FieldErrors = BTreeMap<&'static str, String>;

pub const USERNAME_LEN: (usize, usize) = (2, 30);
pub const PASSWORD_LEN: (usize, usize) = (5, 25);
pub const GENDER_CHOICES: [&str; 3] = ["Male", "Female", "others"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("This field is required.")]
    Required,
    #[error("Field must be between {min} and {max} characters long.")]
    Length { min: usize, max: usize },
    #[error("Invalid email address.")]
    Email,
    #[error("Not a valid choice.")]
    Choice,
    #[error("Not a valid date value.")]
    Date,
    #[error("{0}")]
    Mismatch(&'static str),
}

// =============================================================================
// VALIDATORS
// =============================================================================

/// Reject empty or whitespace-only values; returns the trimmed value.
pub fn required(value: &str) -> Result<&str, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Required);
    }
    Ok(trimmed)
}

/// Character-count bounds, inclusive.
pub fn length(value: &str, (min, max): (usize, usize)) -> Result<&str, FieldError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(FieldError::Length { min, max });
    }
    Ok(value)
}

pub fn email(value: &str) -> Result<&str, FieldError> {
    if !EMAIL_REGEX.is_match(value) {
        return Err(FieldError::Email);
    }
    Ok(value)
}

pub fn one_of<'a>(value: &str, choices: &[&'a str]) -> Result<&'a str, FieldError> {
    choices
        .iter()
        .find(|choice| **choice == value)
        .copied()
        .ok_or(FieldError::Choice)
}

/// `YYYY-MM-DD`, as submitted by an HTML date input.
pub fn date(value: &str) -> Result<Date, FieldError> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|_| FieldError::Date)
}

pub fn equal_to<'a>(value: &'a str, other: &str, message: &'static str) -> Result<&'a str, FieldError> {
    if value != other {
        return Err(FieldError::Mismatch(message));
    }
    Ok(value)
}

/// Record the first error for `field`; yields the value on success.
fn check<T>(errors: &mut FieldErrors, field: &'static str, result: Result<T, FieldError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            errors.entry(field).or_insert_with(|| e.to_string());
            None
        }
    }
}

/// Empty optional fields are `None`; anything else must pass `rule`.
fn optional<'a, T>(value: &'a str, rule: impl FnOnce(&'a str) -> Result<T, FieldError>) -> Result<Option<T>, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    rule(trimmed).map(Some)
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub username: String,
}

/// A login that passed validation. There is deliberately no password: a
/// well-formed username is all it takes to be signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub username: String,
}

impl LoginInput {
    pub fn validate(&self) -> Result<Login, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = check(
            &mut errors,
            "username",
            required(&self.username).and_then(|v| length(v, USERNAME_LEN)),
        );

        match username {
            Some(username) if errors.is_empty() => Ok(Login { username: username.to_owned() }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct LoginForm {
    pub input: LoginInput,
    pub errors: FieldErrors,
}

impl LoginForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_errors(input: LoginInput, errors: FieldErrors) -> Self {
        Self { input, errors }
    }

    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

// =============================================================================
// SIGNUP
// =============================================================================

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub gender: String,
    pub dob: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub gender: Option<&'static str>,
    pub dob: Option<Date>,
}

impl SignupInput {
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = check(
            &mut errors,
            "username",
            required(&self.username).and_then(|v| length(v, USERNAME_LEN)),
        );
        let email = check(&mut errors, "email", required(&self.email).and_then(email));
        let gender = check(&mut errors, "gender", optional(&self.gender, |v| one_of(v, &GENDER_CHOICES)));
        let dob = check(&mut errors, "dob", optional(&self.dob, date));
        check(
            &mut errors,
            "password",
            required(&self.password).and_then(|_| length(&self.password, PASSWORD_LEN)),
        );
        check(
            &mut errors,
            "confirm_password",
            required(&self.confirm_password)
                .and_then(|_| length(&self.confirm_password, PASSWORD_LEN))
                .and_then(|v| equal_to(v, &self.password, "Passwords must match")),
        );

        match (username, email, gender, dob) {
            (Some(username), Some(email), Some(gender), Some(dob)) if errors.is_empty() => Ok(Registration {
                username: username.to_owned(),
                email: email.to_owned(),
                gender,
                dob,
            }),
            _ => Err(errors),
        }
    }
}

pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

#[derive(Debug, Default, Clone)]
pub struct SignupForm {
    pub input: SignupInput,
    pub errors: FieldErrors,
}

impl SignupForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_errors(input: SignupInput, errors: FieldErrors) -> Self {
        Self { input, errors }
    }

    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn gender_options(&self) -> Vec<SelectOption> {
        GENDER_CHOICES
            .iter()
            .map(|&value| SelectOption { value, selected: self.input.gender == value })
            .collect()
    }
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
