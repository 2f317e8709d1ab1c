//! # Data Models
//!
//! This module contains the SeaORM entity models for the Staffboard schema.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod assignment;
pub mod employee;
pub mod organization;
pub mod submission;
pub mod team;
pub mod team_member;
pub mod user;
pub mod user_assignment;

pub use assignment::Entity as Assignment;
pub use employee::Entity as Employee;
pub use organization::Entity as Organization;
pub use submission::Entity as Submission;
pub use team::Entity as Team;
pub use team_member::Entity as TeamMember;
pub use user::Entity as User;
pub use user_assignment::Entity as UserAssignment;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "staffboard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
