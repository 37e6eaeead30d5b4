//! Self-service profile update.
//!
//! `username`, `email` and `github` are displayed to the person but never
//! accepted from the submission; unknown keys are ignored on deserialization.

use serde::{Deserialize, Serialize};

use super::errors::{FormErrors, REQUIRED};
use super::fields::{clean_gender, non_blank, validate_url};
use crate::api::{Gender, Person};

pub const GENDER_OTHER_MISMATCH: &str =
    "If you entered data in \"Other\" field, please select that option.";

/// Profile fields a person may edit about themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoUpdateProfileForm {
    #[serde(default)]
    pub personal: String,
    #[serde(default)]
    pub middle: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub secondary_email: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub gender_other: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub airport: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub affiliation: String,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub orcid: String,
}

/// Validated profile values, ready to be applied to a [`Person`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub personal: String,
    pub middle: String,
    pub family: String,
    pub secondary_email: String,
    pub gender: Gender,
    pub gender_other: String,
    pub country: String,
    pub airport: Option<String>,
    pub twitter: Option<String>,
    pub url: String,
    pub affiliation: String,
    pub occupation: String,
    pub orcid: String,
}

impl ProfileUpdate {
    pub fn apply(self, person: &mut Person) {
        person.personal = self.personal;
        person.middle = self.middle;
        person.family = self.family;
        person.secondary_email = self.secondary_email;
        person.gender = self.gender;
        person.gender_other = self.gender_other;
        person.country = self.country;
        person.airport = self.airport;
        person.twitter = self.twitter;
        person.url = self.url;
        person.affiliation = self.affiliation;
        person.occupation = self.occupation;
        person.orcid = self.orcid;
    }
}

impl AutoUpdateProfileForm {
    /// Prefill from a stored person.
    pub fn from_person(person: &Person) -> Self {
        Self {
            personal: person.personal.clone(),
            middle: person.middle.clone(),
            family: person.family.clone(),
            secondary_email: person.secondary_email.clone(),
            gender: Some(person.gender.as_code().to_string()),
            gender_other: person.gender_other.clone(),
            country: person.country.clone(),
            airport: person.airport.clone(),
            twitter: person.twitter.clone(),
            url: person.url.clone(),
            affiliation: person.affiliation.clone(),
            occupation: person.occupation.clone(),
            orcid: person.orcid.clone(),
        }
    }

    pub fn clean(&self) -> Result<ProfileUpdate, FormErrors> {
        let mut errors = FormErrors::new();

        let personal = self.personal.trim();
        if personal.is_empty() {
            errors.add("personal", REQUIRED);
        }

        let gender_other = self.gender_other.trim();
        let gender = clean_gender(self.gender.as_deref(), "gender", &mut errors);
        match gender {
            Some(Gender::Other) if gender_other.is_empty() => errors.add("gender", REQUIRED),
            Some(g) if g != Gender::Other && !gender_other.is_empty() => {
                errors.add("gender", GENDER_OTHER_MISMATCH)
            }
            _ => {}
        }

        let url = self.url.trim();
        if !url.is_empty() {
            if let Err(message) = validate_url(url) {
                errors.add("url", message);
            }
        }

        let update = ProfileUpdate {
            personal: personal.to_string(),
            middle: self.middle.trim().to_string(),
            family: self.family.trim().to_string(),
            secondary_email: self.secondary_email.trim().to_string(),
            gender: gender.unwrap_or_default(),
            gender_other: gender_other.to_string(),
            country: self.country.trim().to_string(),
            airport: non_blank(self.airport.as_deref()),
            twitter: non_blank(self.twitter.as_deref()),
            url: url.to_string(),
            affiliation: self.affiliation.trim().to_string(),
            occupation: self.occupation.trim().to_string(),
            orcid: self.orcid.trim().to_string(),
        };
        errors.into_result(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(gender: &str, gender_other: &str) -> AutoUpdateProfileForm {
        AutoUpdateProfileForm {
            personal: "Ron".to_string(),
            family: "Weasley".to_string(),
            gender: Some(gender.to_string()),
            gender_other: gender_other.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_other_gender_requires_text() {
        let errors = form("O", "").clean().unwrap_err();
        assert_eq!(errors.get("gender"), [REQUIRED]);
    }

    #[test]
    fn test_text_requires_other_gender() {
        let errors = form("F", "Non-binary").clean().unwrap_err();
        assert_eq!(errors.get("gender"), [GENDER_OTHER_MISMATCH]);
    }

    #[test]
    fn test_consistent_gender_passes() {
        assert_eq!(form("O", "Non-binary").clean().unwrap().gender, Gender::Other);
        assert_eq!(form("U", "").clean().unwrap().gender, Gender::Undisclosed);
    }

    #[test]
    fn test_bad_url_rejected() {
        let mut f = form("M", "");
        f.url = "carpentries".to_string();
        assert_eq!(f.clean().unwrap_err().get("url"), ["Enter a valid URL."]);
    }

    #[test]
    fn test_read_only_fields_ignored() {
        let f: AutoUpdateProfileForm = serde_json::from_value(serde_json::json!({
            "personal": "Ginny",
            "gender": "F",
            "username": "hacked",
            "github": "hacked"
        }))
        .unwrap();
        let mut person = crate::api::NewPerson::new("ginny", "G", "W")
            .into_person(crate::api::PersonId::new(1));
        person.github = Some("ginny-w".to_string());
        f.clean().unwrap().apply(&mut person);
        assert_eq!(person.personal, "Ginny");
        assert_eq!(person.username, "ginny");
        assert_eq!(person.github.as_deref(), Some("ginny-w"));
    }
}
