//! Repository trait definitions for database operations.
//!
//! This module provides a collection of focused repository traits that abstract
//! database operations. By splitting responsibilities across multiple traits,
//! implementations can be more focused and testable.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`directory`]: People, organizations, events, roles and tags
//! - [`recruitment`]: Recruitment processes and signups
//! - [`tasks`]: Tasks, email triggers and scheduled job records
//!
//! # Convenience Trait Bound
//!
//! For functions that need all repository capabilities, use the [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn confirm<R: FullRepository + ?Sized>(repo: &R, signup_id: SignupId) -> RepositoryResult<()> {
//!     let signup = repo.get_signup(signup_id).await?;
//!     let recruitment = repo.get_recruitment(signup.recruitment_id).await?;
//!     let event = repo.get_event(recruitment.event_id).await?;
//!     Ok(())
//! }
//! ```

pub mod directory;
pub mod error;
pub mod recruitment;
pub mod tasks;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use directory::DirectoryRepository;
pub use recruitment::RecruitmentRepository;
pub use tasks::TaskRepository;

/// Composite trait bound for a complete repository implementation.
///
/// This trait is automatically implemented for any type that implements
/// all three repository traits.
pub trait FullRepository: DirectoryRepository + RecruitmentRepository + TaskRepository {}

// Anything implementing all three traits is a FullRepository.
impl<T> FullRepository for T where
    T: DirectoryRepository + RecruitmentRepository + TaskRepository
{
}
