//! Database migrations for the Staffboard API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_06_01_000100_create_organizations;
mod m2025_06_01_000200_create_users;
mod m2025_06_01_000300_create_teams;
mod m2025_06_01_000400_create_team_members;
mod m2025_06_01_000500_create_employees;
mod m2025_06_01_000600_create_assignments;
mod m2025_06_01_000700_create_user_assignments;
mod m2025_06_01_000800_create_submissions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_06_01_000100_create_organizations::Migration),
            Box::new(m2025_06_01_000200_create_users::Migration),
            Box::new(m2025_06_01_000300_create_teams::Migration),
            Box::new(m2025_06_01_000400_create_team_members::Migration),
            Box::new(m2025_06_01_000500_create_employees::Migration),
            Box::new(m2025_06_01_000600_create_assignments::Migration),
            Box::new(m2025_06_01_000700_create_user_assignments::Migration),
            Box::new(m2025_06_01_000800_create_submissions::Migration),
        ]
    }
}
