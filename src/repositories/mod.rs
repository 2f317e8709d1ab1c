//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities, providing a clean API for data access
//! with organization-scoped visibility methods.

pub mod assignment;
pub mod employee;
pub mod organization;
pub mod submission;
pub mod team;
pub mod user;

pub use assignment::AssignmentRepository;
pub use employee::EmployeeRepository;
pub use organization::OrganizationRepository;
pub use submission::SubmissionRepository;
pub use team::TeamRepository;
pub use user::UserRepository;
