//! Database seeding functionality
//!
//! Inserts a demo organization, accounts, a team and a few assignments so a
//! fresh install can be explored immediately. Seeding is idempotent: rows
//! keyed by email or name are skipped when they already exist.

use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::auth::{Role, Session};
use crate::models::organization;
use crate::password::hash_password;
use crate::repositories::{
    AssignmentRepository, OrganizationRepository, TeamRepository, UserRepository,
    assignment::AssignmentInput,
};
use crate::visibility::AssignmentScope;

const DEMO_PASSWORD: &str = "password123";

/// Seeds the demo organization, accounts, team and assignments.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<()> {
    let orgs = OrganizationRepository::new(db);
    let users = UserRepository::new(db);
    let teams = TeamRepository::new(db);

    let org = match organization::Entity::find()
        .filter(organization::Column::Name.eq("Test Org"))
        .one(db)
        .await?
    {
        Some(_) => {
            log::info!("Demo organization already exists, skipping seed");
            return Ok(());
        }
        None => orgs.create("Test Org").await?,
    };

    let admin = users
        .create(
            "admin@test.com",
            &hash_password(DEMO_PASSWORD),
            Role::OrgAdmin,
            Some(org.id),
        )
        .await?;
    let manager = users
        .create(
            "manager@test.com",
            &hash_password(DEMO_PASSWORD),
            Role::TeamManager,
            Some(org.id),
        )
        .await?;
    let employee1 = users
        .create(
            "employee1@test.com",
            &hash_password(DEMO_PASSWORD),
            Role::Employee,
            Some(org.id),
        )
        .await?;
    let employee2 = users
        .create(
            "employee2@test.com",
            &hash_password(DEMO_PASSWORD),
            Role::Employee,
            Some(org.id),
        )
        .await?;
    users
        .create(
            "employee3@test.com",
            &hash_password(DEMO_PASSWORD),
            Role::Employee,
            Some(org.id),
        )
        .await?;

    let team = teams.create("Dev Team", org.id, Some(manager.id)).await?;
    teams.add_member(team.id, employee1.id).await?;
    teams.add_member(team.id, employee2.id).await?;

    let admin_session = Session::for_user(&admin)?;
    let manager_session = Session::for_user(&manager)?;
    let assignments = AssignmentRepository::new(db);

    assignments
        .create(
            &admin_session,
            AssignmentInput {
                title: "General Assignment".to_string(),
                description: Some("Visible to all employees".to_string()),
                due_date: None,
                scope: AssignmentScope::General,
            },
        )
        .await?;
    assignments
        .create(
            &manager_session,
            AssignmentInput {
                title: "Team Assignment".to_string(),
                description: Some("Visible to Dev Team".to_string()),
                due_date: None,
                scope: AssignmentScope::Scoped {
                    team_id: Some(team.id),
                    target_ids: vec![],
                },
            },
        )
        .await?;
    assignments
        .create(
            &admin_session,
            AssignmentInput {
                title: "Personal Assignment".to_string(),
                description: Some("Visible to employee1@test.com only".to_string()),
                due_date: None,
                scope: AssignmentScope::Scoped {
                    team_id: None,
                    target_ids: vec![employee1.id],
                },
            },
        )
        .await?;

    log::info!("Demo data inserted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        seed_demo_data(&db).await.unwrap();
        seed_demo_data(&db).await.unwrap();

        let admin = UserRepository::new(&db)
            .find_by_email("admin@test.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, "org_admin");

        let session = Session::for_user(&admin).unwrap();
        let visible = AssignmentRepository::new(&db)
            .list_visible(&session)
            .await
            .unwrap();
        assert_eq!(visible.len(), 3);
    }
}
