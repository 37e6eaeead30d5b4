//! Person registration and self-service profile updates.

use log::info;

use super::{ServiceError, ServiceResult};
use crate::api::{Person, PersonId};
use crate::db::repository::FullRepository;
use crate::forms::{AutoUpdateProfileForm, FormErrors, PersonCreateForm};

pub const USERNAME_TAKEN: &str = "Person with this username already exists.";

pub async fn create_person<R: FullRepository + ?Sized>(
    repo: &R,
    form: &PersonCreateForm,
) -> ServiceResult<Person> {
    let new_person = form.clean()?;
    match repo.create_person(&new_person).await {
        Ok(person) => {
            info!("Created person {} ({})", person.id, person.username);
            Ok(person)
        }
        Err(e) if e.is_conflict() => Err(FormErrors::field("username", USERNAME_TAKEN).into()),
        Err(e) => Err(e.into()),
    }
}

/// Current profile values, for pre-filling the form.
pub async fn profile_form<R: FullRepository + ?Sized>(
    repo: &R,
    person_id: PersonId,
) -> ServiceResult<AutoUpdateProfileForm> {
    let person = repo.get_person(person_id).await?;
    Ok(AutoUpdateProfileForm::from_person(&person))
}

pub async fn update_profile<R: FullRepository + ?Sized>(
    repo: &R,
    person_id: PersonId,
    form: &AutoUpdateProfileForm,
) -> ServiceResult<Person> {
    let mut person = repo.get_person(person_id).await?;
    let update = form.clean().map_err(ServiceError::Validation)?;
    update.apply(&mut person);
    Ok(repo.update_person(&person).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::DirectoryRepository;

    fn form(username: &str) -> PersonCreateForm {
        PersonCreateForm {
            username: username.to_string(),
            personal: "Luna".to_string(),
            family: "Lovegood".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_is_validation_error() {
        let repo = LocalRepository::new();
        create_person(&repo, &form("luna")).await.unwrap();
        match create_person(&repo, &form("luna")).await {
            Err(ServiceError::Validation(errors)) => {
                assert_eq!(errors.get("username"), [USERNAME_TAKEN])
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_profile_persists() {
        let repo = LocalRepository::new();
        let person = create_person(&repo, &form("luna")).await.unwrap();

        let mut profile = profile_form(&repo, person.id).await.unwrap();
        profile.gender = Some("O".to_string());
        profile.gender_other = "Nargle".to_string();
        profile.occupation = "Editor".to_string();
        update_profile(&repo, person.id, &profile).await.unwrap();

        let stored = repo.get_person(person.id).await.unwrap();
        assert_eq!(stored.gender_other, "Nargle");
        assert_eq!(stored.occupation, "Editor");
    }

    #[tokio::test]
    async fn test_update_profile_rejects_inconsistent_gender() {
        let repo = LocalRepository::new();
        let person = create_person(&repo, &form("luna")).await.unwrap();
        let mut profile = profile_form(&repo, person.id).await.unwrap();
        profile.gender = Some("O".to_string());

        let err = update_profile(&repo, person.id, &profile).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(update_profile(&repo, PersonId::new(999), &profile)
            .await
            .unwrap_err()
            .is_not_found());
    }
}
