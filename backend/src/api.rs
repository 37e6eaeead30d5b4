//! Public API surface for the recruitment backend.
//!
//! This file consolidates the identifier types and re-exports the domain
//! rows used by the HTTP API. All types derive Serialize/Deserialize for JSON
//! serialization.

pub use crate::models::automation::{
    EmailTrigger, NewEmailTrigger, NewScheduledJobRecord, ScheduledJobRecord, TriggerAction,
};
pub use crate::models::dates::DateRange;
pub use crate::models::events::{
    Event, NewEvent, NewWorkshopRequest, Role, Tag, Task, TaskWithEvent, WorkshopRequest,
};
pub use crate::models::people::{Gender, NewPerson, Organization, Person};
pub use crate::models::recruitment::{
    InstructorRecruitment, InstructorRecruitmentSignup, NewRecruitment, NewSignup,
    RecruitmentFilter, RecruitmentStatus, SignupInterest, SignupState,
};

crate::define_id_type!(i64, PersonId);
crate::define_id_type!(i64, OrganizationId);
crate::define_id_type!(i64, EventId);
crate::define_id_type!(i64, RoleId);
crate::define_id_type!(i64, TagId);
crate::define_id_type!(i64, TaskId);
crate::define_id_type!(i64, RecruitmentId);
crate::define_id_type!(i64, SignupId);
crate::define_id_type!(i64, WorkshopRequestId);
crate::define_id_type!(i64, TriggerId);
crate::define_id_type!(i64, ScheduledJobRecordId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_through_i64() {
        let id = PersonId::new(42);
        let raw: i64 = id.into();
        assert_eq!(raw, 42);
        assert_eq!(PersonId::from(raw), id);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_id_serializes_transparently() {
        assert_eq!(serde_json::to_string(&EventId::new(7)).unwrap(), "7");
        let id: SignupId = serde_json::from_str("120000").unwrap();
        assert_eq!(id.value(), 120000);
    }
}
