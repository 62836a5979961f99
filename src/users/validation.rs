use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::users::dto::UserPayload;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Invalid Email")]
    InvalidEmail,
}

/// Which rule set `validate` applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Action {
    #[default]
    Register,
    Login,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
                .unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims every field; lowercases the email; drops a blank profile image.
pub fn normalize(p: &mut UserPayload) {
    p.email = p.email.trim().to_lowercase();
    p.first_name = p.first_name.trim().to_string();
    p.last_name = p.last_name.trim().to_string();
    p.password = p.password.trim().to_string();
    p.profile_image = p
        .profile_image
        .take()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
}

/// Checks fields in a fixed order and reports the first failure.
pub fn validate(p: &UserPayload, action: Action) -> Result<(), ValidationError> {
    let required: Vec<(&'static str, &str)> = match action {
        Action::Login => vec![("Email", p.email.as_str()), ("Password", p.password.as_str())],
        Action::Register => vec![
            ("FirstName", p.first_name.as_str()),
            ("LastName", p.last_name.as_str()),
            ("Email", p.email.as_str()),
            ("Password", p.password.as_str()),
        ],
    };
    if let Some((field, _)) = required.into_iter().find(|(_, v)| v.is_empty()) {
        return Err(ValidationError::Required(field));
    }
    if action == Action::Register && !is_valid_email(&p.email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}
