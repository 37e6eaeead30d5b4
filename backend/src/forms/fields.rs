//! Field-level validators and the person creation form.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

use super::errors::{FormErrors, INVALID_CHOICE, INVALID_URL, REQUIRED};
use crate::api::{Gender, NewPerson};

pub const GITHUB_USERNAME_MAX_LENGTH: usize = 39;

const GITHUB_TOO_LONG: &str = "Maximum allowed username length is 39 characters.";
const GITHUB_INVALID: &str = "This is not a valid GitHub username.";

fn github_username_regex() -> &'static Regex {
    static GITHUB_USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    GITHUB_USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^([a-zA-Z\d](?:-?[a-zA-Z\d])*)$")
            .unwrap_or_else(|e| panic!("GitHub username regex must compile: {}", e))
    })
}

/// Validate a GitHub username: alphanumerics and single inner hyphens, at
/// most 39 characters.
pub fn validate_github_username(username: &str) -> Result<(), String> {
    if username.chars().count() > GITHUB_USERNAME_MAX_LENGTH {
        return Err(GITHUB_TOO_LONG.to_string());
    }
    if !github_username_regex().is_match(username) {
        return Err(GITHUB_INVALID.to_string());
    }
    Ok(())
}

/// Validate an absolute `http`/`https` URL with a host.
pub fn validate_url(value: &str) -> Result<(), String> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(INVALID_URL.to_string()),
    }
}

/// Parse a gender code, recording an error on `field` when invalid.
pub(crate) fn clean_gender(
    raw: Option<&str>,
    field: &str,
    errors: &mut FormErrors,
) -> Option<Gender> {
    match raw.map(str::trim) {
        None | Some("") => {
            errors.add(field, REQUIRED);
            None
        }
        Some(code) => {
            let gender = Gender::from_code(code);
            if gender.is_none() {
                errors.add(field, INVALID_CHOICE);
            }
            gender
        }
    }
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Submitted data for registering a person.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonCreateForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub personal: String,
    #[serde(default)]
    pub middle: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub gender_other: String,
    #[serde(default)]
    pub github: Option<String>,
}

impl PersonCreateForm {
    pub fn clean(&self) -> Result<NewPerson, FormErrors> {
        let mut errors = FormErrors::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        }
        let personal = self.personal.trim();
        if personal.is_empty() {
            errors.add("personal", REQUIRED);
        }

        let gender = match self.gender.as_deref() {
            None => Some(Gender::default()),
            raw => clean_gender(raw, "gender", &mut errors),
        };

        let github = non_blank(self.github.as_deref());
        if let Some(handle) = &github {
            if let Err(message) = validate_github_username(handle) {
                errors.add("github", message);
            }
        }

        let person = NewPerson {
            username: username.to_string(),
            personal: personal.to_string(),
            middle: self.middle.trim().to_string(),
            family: self.family.trim().to_string(),
            email: non_blank(self.email.as_deref()),
            gender: gender.unwrap_or_default(),
            gender_other: self.gender_other.trim().to_string(),
            github,
            ..Default::default()
        };
        errors.into_result(person)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_username_rules() {
        assert!(validate_github_username("octo-cat").is_ok());
        assert!(validate_github_username("a1").is_ok());
        assert_eq!(validate_github_username("-octo").unwrap_err(), GITHUB_INVALID);
        assert_eq!(validate_github_username("octo--cat").unwrap_err(), GITHUB_INVALID);
        assert_eq!(validate_github_username("octo-").unwrap_err(), GITHUB_INVALID);
        assert_eq!(validate_github_username("under_score").unwrap_err(), GITHUB_INVALID);
        assert!(validate_github_username(&"a".repeat(39)).is_ok());
        assert_eq!(
            validate_github_username(&"a".repeat(40)).unwrap_err(),
            GITHUB_TOO_LONG
        );
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://carpentries.org/").is_ok());
        assert!(validate_url("http://localhost:8000/x").is_ok());
        assert!(validate_url("ftp://example.org").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("/relative").is_err());
    }

    #[test]
    fn test_person_create_form() {
        let form = PersonCreateForm {
            username: " hermione ".to_string(),
            personal: "Hermione".to_string(),
            family: "Granger".to_string(),
            github: Some("hermione-g".to_string()),
            email: Some("  ".to_string()),
            ..Default::default()
        };
        let person = form.clean().unwrap();
        assert_eq!(person.username, "hermione");
        assert_eq!(person.github.as_deref(), Some("hermione-g"));
        assert_eq!(person.email, None);
        assert_eq!(person.gender, Gender::Undisclosed);
    }

    #[test]
    fn test_person_create_form_errors() {
        let form = PersonCreateForm {
            github: Some("bad_name".to_string()),
            gender: Some("X".to_string()),
            ..Default::default()
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("username"), [REQUIRED]);
        assert_eq!(errors.get("personal"), [REQUIRED]);
        assert_eq!(errors.get("github"), [GITHUB_INVALID]);
        assert_eq!(errors.get("gender"), [INVALID_CHOICE]);
    }
}
