//! People and organizations.
//!
//! These rows belong to the wider application; the recruitment subsystem only
//! reads them and updates the self-service part of a person's profile.

use serde::{Deserialize, Serialize};

use crate::api::{OrganizationId, PersonId};

/// Name of the group whose members may be assigned to recruitment processes.
pub const ADMINISTRATORS_GROUP: &str = "administrators";

crate::define_code_enum!(
    /// Self-reported gender.
    Gender {
        Undisclosed => "U",
        Female => "F",
        Male => "M",
        Other => "O",
    }
);

impl Default for Gender {
    fn default() -> Self {
        Gender::Undisclosed
    }
}

/// A person known to the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub username: String,
    pub personal: String,
    #[serde(default)]
    pub middle: String,
    pub family: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub secondary_email: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub gender_other: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub airport: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
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
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Person {
    /// Full display name, skipping an empty middle name.
    pub fn full_name(&self) -> String {
        [self.personal.as_str(), self.middle.as_str(), self.family.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Superusers and members of the administrators group.
    pub fn is_administrator(&self) -> bool {
        self.is_superuser || self.groups.iter().any(|g| g == ADMINISTRATORS_GROUP)
    }
}

/// Data for inserting a person; the repository assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPerson {
    pub username: String,
    pub personal: String,
    #[serde(default)]
    pub middle: String,
    pub family: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub gender_other: String,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl NewPerson {
    /// Minimal person with a username and name parts.
    pub fn new(
        username: impl Into<String>,
        personal: impl Into<String>,
        family: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            personal: personal.into(),
            family: family.into(),
            ..Default::default()
        }
    }

    pub fn into_person(self, id: PersonId) -> Person {
        Person {
            id,
            username: self.username,
            personal: self.personal,
            middle: self.middle,
            family: self.family,
            email: self.email,
            secondary_email: String::new(),
            gender: self.gender,
            gender_other: self.gender_other,
            country: String::new(),
            airport: None,
            github: self.github,
            twitter: None,
            url: String::new(),
            affiliation: String::new(),
            occupation: String::new(),
            orcid: String::new(),
            is_superuser: self.is_superuser,
            groups: self.groups,
        }
    }
}

/// Host or administrator organization of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub domain: String,
    pub fullname: String,
}
