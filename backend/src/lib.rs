//! # AMY Recruitment Backend
//!
//! Instructor recruitment for workshops: administrators open a recruitment
//! process for an event, people sign up to teach, and administrators confirm
//! or decline each signup.
//!
//! ## Features
//!
//! - **Conflict checks**: nobody is booked to teach two events with
//!   overlapping dates
//! - **Signup workflow**: confirming creates the instructor task, declining
//!   removes it
//! - **Automated email**: confirming may schedule a delayed notification job,
//!   cancelled again when the task goes away
//! - **Profiles**: self-service profile updates with form validation
//! - **HTTP API**: RESTful endpoints via Axum
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Identifier types and re-exported domain rows
//! - [`models`]: Domain rows and date helpers
//! - [`forms`]: Validation of submitted data
//! - [`db`]: Repository traits, local and PostgreSQL backends, configuration
//! - [`scheduler`]: Delayed job queue and automated email actions
//! - [`services`]: Business operations used by the HTTP handlers
//! - [`http`]: Axum-based HTTP server and request handlers
//! - [`config`]: Recruitment settings

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod db;
pub mod forms;
pub mod models;
pub mod scheduler;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
