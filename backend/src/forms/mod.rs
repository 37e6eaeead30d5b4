//! Validation of submitted form data.
//!
//! Forms are plain serde structs. `clean` turns one into validated values or a
//! [`FormErrors`] map; forms never touch the repository themselves; rows they
//! depend on are looked up by the caller and passed in.

pub mod errors;
pub mod fields;
pub mod profile;
pub mod recruitment;

pub use errors::{FormErrors, NON_FIELD_ERRORS};
pub use fields::{validate_github_username, PersonCreateForm};
pub use profile::{AutoUpdateProfileForm, ProfileUpdate};
pub use recruitment::{
    AssignmentForm, CleanedRecruitment, CleanedSignup, InstructorRecruitmentCreateForm,
    InstructorRecruitmentSignupChangeStateForm, SignupAction, SignupForRecruitmentForm,
};
