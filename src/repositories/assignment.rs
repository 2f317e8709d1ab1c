//! # Assignment Repository
//!
//! Assignment lifecycle and visibility queries. Every multi-statement write
//! path (create, update, delete) runs inside one transaction so target rows
//! and the assignment row never diverge.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::auth::{Role, Session};
use crate::error::RepositoryError;
use crate::models::assignment::{self, Entity as Assignment};
use crate::models::submission::{self, Entity as Submission};
use crate::models::team::{self, Entity as Team};
use crate::models::team_member::Entity as TeamMember;
use crate::models::user::{self, Entity as User};
use crate::models::user_assignment::{self, Entity as UserAssignment};
use crate::visibility::{AssignmentScope, ViewerRelation, can_view_assignment};

/// Fields accepted when creating or replacing an assignment.
#[derive(Debug, Clone)]
pub struct AssignmentInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub scope: AssignmentScope,
}

/// An assignment row together with its individually targeted user ids.
#[derive(Debug, Clone)]
pub struct AssignmentWithTargets {
    pub assignment: assignment::Model,
    pub target_ids: Vec<i32>,
}

/// Repository for assignment operations
pub struct AssignmentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AssignmentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an assignment with its target rows in one transaction.
    pub async fn create(
        &self,
        session: &Session,
        input: AssignmentInput,
    ) -> Result<AssignmentWithTargets, RepositoryError> {
        self.validate_input(session, &input).await?;

        let txn = self.db.begin().await?;

        let model = assignment::ActiveModel {
            title: Set(input.title.trim().to_string()),
            description: Set(input.description.clone()),
            due_date: Set(input.due_date.clone()),
            is_general: Set(input.scope.is_general()),
            team_id: Set(input.scope.team_id()),
            created_by_id: Set(session.user_id),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        let created = model.insert(&txn).await?;

        for user_id in input.scope.target_ids() {
            user_assignment::ActiveModel {
                user_id: Set(*user_id),
                assignment_id: Set(created.id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        Ok(AssignmentWithTargets {
            assignment: created,
            target_ids: input.scope.target_ids().to_vec(),
        })
    }

    /// Replaces an assignment's fields and its entire target set.
    pub async fn update(
        &self,
        session: &Session,
        id: i32,
        input: AssignmentInput,
    ) -> Result<AssignmentWithTargets, RepositoryError> {
        let existing = Assignment::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Assignment not found"))?;

        self.validate_input(session, &input).await?;

        let txn = self.db.begin().await?;

        let mut active: assignment::ActiveModel = existing.into();
        active.title = Set(input.title.trim().to_string());
        active.description = Set(input.description.clone());
        active.due_date = Set(input.due_date.clone());
        active.is_general = Set(input.scope.is_general());
        active.team_id = Set(input.scope.team_id());
        let updated = active.update(&txn).await?;

        // Full replace, not a diff.
        UserAssignment::delete_many()
            .filter(user_assignment::Column::AssignmentId.eq(id))
            .exec(&txn)
            .await?;
        for user_id in input.scope.target_ids() {
            user_assignment::ActiveModel {
                user_id: Set(*user_id),
                assignment_id: Set(id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        Ok(AssignmentWithTargets {
            assignment: updated,
            target_ids: input.scope.target_ids().to_vec(),
        })
    }

    /// Deletes an assignment, cascading over submissions and targets first.
    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        Assignment::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Assignment not found"))?;

        let txn = self.db.begin().await?;

        Submission::delete_many()
            .filter(submission::Column::AssignmentId.eq(id))
            .exec(&txn)
            .await?;
        UserAssignment::delete_many()
            .filter(user_assignment::Column::AssignmentId.eq(id))
            .exec(&txn)
            .await?;
        Assignment::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Lists the assignments visible to the session, per the role rules.
    pub async fn list_visible(
        &self,
        session: &Session,
    ) -> Result<Vec<AssignmentWithTargets>, RepositoryError> {
        let Some(org_id) = session.organization_id else {
            return Ok(Vec::new());
        };

        let mut query =
            Assignment::find().filter(assignment::Column::CreatedById.is_in(self.org_user_ids(org_id).await?));

        match session.role {
            Role::OrgAdmin | Role::SuperAdmin => {}
            Role::TeamManager => {
                let managed = self.managed_team_ids(session.user_id).await?;
                query = query.filter(
                    Condition::any()
                        .add(assignment::Column::IsGeneral.eq(true))
                        .add(assignment::Column::TeamId.is_in(managed)),
                );
            }
            Role::Employee => {
                let targeted = self.targeted_assignment_ids(session.user_id).await?;
                let member_teams = self.member_team_ids(session.user_id).await?;
                query = query.filter(
                    Condition::any()
                        .add(assignment::Column::IsGeneral.eq(true))
                        .add(assignment::Column::Id.is_in(targeted))
                        .add(assignment::Column::TeamId.is_in(member_teams)),
                );
            }
        }

        let assignments = query
            .order_by_asc(assignment::Column::Id)
            .all(self.db)
            .await?;

        let ids: Vec<i32> = assignments.iter().map(|a| a.id).collect();
        let mut targets = self.load_targets(&ids).await?;

        Ok(assignments
            .into_iter()
            .map(|assignment| {
                let target_ids = targets.remove(&assignment.id).unwrap_or_default();
                AssignmentWithTargets {
                    assignment,
                    target_ids,
                }
            })
            .collect())
    }

    /// Errors with NotFound unless the assignment exists.
    pub async fn ensure_exists(&self, id: i32) -> Result<(), RepositoryError> {
        Assignment::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Assignment not found"))?;
        Ok(())
    }

    /// Fetches one assignment, enforcing the visibility predicate.
    ///
    /// Missing row is NotFound; an existing row outside the session's
    /// audience is Forbidden.
    pub async fn get_visible(
        &self,
        session: &Session,
        id: i32,
    ) -> Result<AssignmentWithTargets, RepositoryError> {
        let assignment = Assignment::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Assignment not found"))?;

        let relation = self.viewer_relation(session, &assignment).await?;
        if !can_view_assignment(session.role, relation) {
            return Err(RepositoryError::forbidden(
                "You do not have access to this assignment",
            ));
        }

        let mut targets = self.load_targets(&[assignment.id]).await?;
        let target_ids = targets.remove(&assignment.id).unwrap_or_default();

        Ok(AssignmentWithTargets {
            assignment,
            target_ids,
        })
    }

    async fn validate_input(
        &self,
        session: &Session,
        input: &AssignmentInput,
    ) -> Result<(), RepositoryError> {
        if input.title.trim().is_empty() {
            return Err(RepositoryError::validation("Title is required"));
        }

        if let Some(team_id) = input.scope.team_id() {
            let team = Team::find_by_id(team_id)
                .one(self.db)
                .await?
                .ok_or_else(|| RepositoryError::validation("Unknown team"))?;

            // A manager can only scope assignments to teams they manage.
            if session.role == Role::TeamManager && team.manager_id != Some(session.user_id) {
                return Err(RepositoryError::forbidden("You do not manage this team"));
            }
        }

        let target_ids = input.scope.target_ids();
        if !target_ids.is_empty() {
            let found: Vec<i32> = User::find()
                .select_only()
                .column(user::Column::Id)
                .filter(user::Column::Id.is_in(target_ids.to_vec()))
                .into_tuple()
                .all(self.db)
                .await?;
            if found.len() != target_ids.len() {
                return Err(RepositoryError::validation(
                    "employee_ids references unknown users",
                ));
            }
        }

        Ok(())
    }

    async fn viewer_relation(
        &self,
        session: &Session,
        assignment: &assignment::Model,
    ) -> Result<ViewerRelation, RepositoryError> {
        let creator_org = User::find_by_id(assignment.created_by_id)
            .one(self.db)
            .await?
            .and_then(|creator| creator.organization_id);
        let same_org = matches!(
            (session.organization_id, creator_org),
            (Some(a), Some(b)) if a == b
        );

        let is_target = UserAssignment::find_by_id((session.user_id, assignment.id))
            .one(self.db)
            .await?
            .is_some();

        let (manages_team, in_team) = match assignment.team_id {
            Some(team_id) => {
                let manages = Team::find_by_id(team_id)
                    .one(self.db)
                    .await?
                    .is_some_and(|t| t.manager_id == Some(session.user_id));
                let member = TeamMember::find_by_id((session.user_id, team_id))
                    .one(self.db)
                    .await?
                    .is_some();
                (manages, member)
            }
            None => (false, false),
        };

        Ok(ViewerRelation {
            same_org,
            is_general: assignment.is_general,
            is_target,
            manages_team,
            in_team,
        })
    }

    async fn org_user_ids(&self, org_id: i32) -> Result<Vec<i32>, RepositoryError> {
        Ok(User::find()
            .select_only()
            .column(user::Column::Id)
            .filter(user::Column::OrganizationId.eq(org_id))
            .into_tuple()
            .all(self.db)
            .await?)
    }

    async fn managed_team_ids(&self, user_id: i32) -> Result<Vec<i32>, RepositoryError> {
        Ok(Team::find()
            .select_only()
            .column(team::Column::Id)
            .filter(team::Column::ManagerId.eq(user_id))
            .into_tuple()
            .all(self.db)
            .await?)
    }

    async fn member_team_ids(&self, user_id: i32) -> Result<Vec<i32>, RepositoryError> {
        Ok(TeamMember::find()
            .select_only()
            .column(crate::models::team_member::Column::TeamId)
            .filter(crate::models::team_member::Column::UserId.eq(user_id))
            .into_tuple()
            .all(self.db)
            .await?)
    }

    async fn targeted_assignment_ids(&self, user_id: i32) -> Result<Vec<i32>, RepositoryError> {
        Ok(UserAssignment::find()
            .select_only()
            .column(user_assignment::Column::AssignmentId)
            .filter(user_assignment::Column::UserId.eq(user_id))
            .into_tuple()
            .all(self.db)
            .await?)
    }

    async fn load_targets(
        &self,
        assignment_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<i32>>, RepositoryError> {
        if assignment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = UserAssignment::find()
            .filter(user_assignment::Column::AssignmentId.is_in(assignment_ids.to_vec()))
            .all(self.db)
            .await?;

        let mut grouped: HashMap<i32, Vec<i32>> = HashMap::new();
        for row in rows {
            grouped.entry(row.assignment_id).or_default().push(row.user_id);
        }
        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{OrganizationRepository, TeamRepository, UserRepository};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    struct Fixture {
        db: DatabaseConnection,
        admin: Session,
        manager: Session,
        employee: Session,
        outsider: Session,
        team_id: i32,
    }

    async fn fixture() -> Fixture {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let org = OrganizationRepository::new(&db).create("Acme").await.unwrap();
        let users = UserRepository::new(&db);
        let admin = users
            .create("admin@acme.test", "h", Role::OrgAdmin, Some(org.id))
            .await
            .unwrap();
        let manager = users
            .create("manager@acme.test", "h", Role::TeamManager, Some(org.id))
            .await
            .unwrap();
        let employee = users
            .create("emp@acme.test", "h", Role::Employee, Some(org.id))
            .await
            .unwrap();
        let outsider = users
            .create("out@acme.test", "h", Role::Employee, Some(org.id))
            .await
            .unwrap();

        let team = TeamRepository::new(&db)
            .create("Dev", org.id, Some(manager.id))
            .await
            .unwrap();
        TeamRepository::new(&db)
            .add_member(team.id, employee.id)
            .await
            .unwrap();

        let session = |m: &crate::models::user::Model| Session::for_user(m).unwrap();
        Fixture {
            admin: session(&admin),
            manager: session(&manager),
            employee: session(&employee),
            outsider: session(&outsider),
            team_id: team.id,
            db,
        }
    }

    fn input(title: &str, scope: AssignmentScope) -> AssignmentInput {
        AssignmentInput {
            title: title.to_string(),
            description: None,
            due_date: None,
            scope,
        }
    }

    #[tokio::test]
    async fn general_assignment_visible_to_everyone() {
        let f = fixture().await;
        let repo = AssignmentRepository::new(&f.db);

        let created = repo
            .create(&f.admin, input("All hands", AssignmentScope::General))
            .await
            .unwrap();
        assert!(created.assignment.is_general);

        for session in [&f.admin, &f.manager, &f.employee, &f.outsider] {
            let visible = repo.list_visible(session).await.unwrap();
            assert_eq!(visible.len(), 1);
            assert!(repo.get_visible(session, created.assignment.id).await.is_ok());
        }
    }

    #[tokio::test]
    async fn team_scoped_assignment_visibility() {
        let f = fixture().await;
        let repo = AssignmentRepository::new(&f.db);

        let created = repo
            .create(
                &f.admin,
                input(
                    "Sprint work",
                    AssignmentScope::Scoped {
                        team_id: Some(f.team_id),
                        target_ids: vec![],
                    },
                ),
            )
            .await
            .unwrap();
        assert!(!created.assignment.is_general);

        // Admin, managing manager and team member see it; the outsider does not.
        assert_eq!(repo.list_visible(&f.admin).await.unwrap().len(), 1);
        assert_eq!(repo.list_visible(&f.manager).await.unwrap().len(), 1);
        assert_eq!(repo.list_visible(&f.employee).await.unwrap().len(), 1);
        assert!(repo.list_visible(&f.outsider).await.unwrap().is_empty());

        assert!(matches!(
            repo.get_visible(&f.outsider, created.assignment.id)
                .await
                .unwrap_err(),
            RepositoryError::Forbidden(_)
        ));
    }

    #[tokio::test]
    async fn individually_targeted_assignment_visibility() {
        let f = fixture().await;
        let repo = AssignmentRepository::new(&f.db);

        let created = repo
            .create(
                &f.admin,
                input(
                    "Just for you",
                    AssignmentScope::Scoped {
                        team_id: None,
                        target_ids: vec![f.outsider.user_id],
                    },
                ),
            )
            .await
            .unwrap();

        assert_eq!(repo.list_visible(&f.outsider).await.unwrap().len(), 1);
        assert!(repo.list_visible(&f.employee).await.unwrap().is_empty());
        // A manager who does not manage the (absent) team cannot see it.
        assert!(repo.list_visible(&f.manager).await.unwrap().is_empty());
        assert!(repo.get_visible(&f.admin, created.assignment.id).await.is_ok());
    }

    #[tokio::test]
    async fn manager_cannot_scope_to_foreign_team() {
        let f = fixture().await;
        let other_team = TeamRepository::new(&f.db)
            .create("Ops", f.admin.organization_id.unwrap(), None)
            .await
            .unwrap();
        let repo = AssignmentRepository::new(&f.db);

        let err = repo
            .create(
                &f.manager,
                input(
                    "Ops work",
                    AssignmentScope::Scoped {
                        team_id: Some(other_team.id),
                        target_ids: vec![],
                    },
                ),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Forbidden(_)));

        // The same guard applies on update.
        let created = repo
            .create(&f.manager, input("Mine", AssignmentScope::General))
            .await
            .unwrap();
        let err = repo
            .update(
                &f.manager,
                created.assignment.id,
                input(
                    "Mine",
                    AssignmentScope::Scoped {
                        team_id: Some(other_team.id),
                        target_ids: vec![],
                    },
                ),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Forbidden(_)));
    }

    #[tokio::test]
    async fn update_fully_replaces_target_set() {
        let f = fixture().await;
        let repo = AssignmentRepository::new(&f.db);

        let created = repo
            .create(
                &f.admin,
                input(
                    "Rotating duty",
                    AssignmentScope::Scoped {
                        team_id: None,
                        target_ids: vec![f.employee.user_id],
                    },
                ),
            )
            .await
            .unwrap();

        let updated = repo
            .update(
                &f.admin,
                created.assignment.id,
                input(
                    "Rotating duty",
                    AssignmentScope::Scoped {
                        team_id: None,
                        target_ids: vec![f.outsider.user_id],
                    },
                ),
            )
            .await
            .unwrap();
        assert_eq!(updated.target_ids, vec![f.outsider.user_id]);

        let fetched = repo.get_visible(&f.admin, created.assignment.id).await.unwrap();
        assert_eq!(fetched.target_ids, vec![f.outsider.user_id]);

        // An update clearing all selectors makes the assignment general again.
        let cleared = repo
            .update(
                &f.admin,
                created.assignment.id,
                input("Rotating duty", AssignmentScope::General),
            )
            .await
            .unwrap();
        assert!(cleared.assignment.is_general);
        assert!(cleared.target_ids.is_empty());
    }

    #[tokio::test]
    async fn delete_cascades_and_then_404s() {
        let f = fixture().await;
        let repo = AssignmentRepository::new(&f.db);

        let created = repo
            .create(
                &f.admin,
                input(
                    "Doomed",
                    AssignmentScope::Scoped {
                        team_id: None,
                        target_ids: vec![f.employee.user_id],
                    },
                ),
            )
            .await
            .unwrap();
        submission::ActiveModel {
            assignment_id: Set(created.assignment.id),
            employee_id: Set(f.employee.user_id),
            file_path: Set("uploads/x".to_string()),
            submitted_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(&f.db)
        .await
        .unwrap();

        repo.delete(created.assignment.id).await.unwrap();

        assert!(matches!(
            repo.get_visible(&f.admin, created.assignment.id)
                .await
                .unwrap_err(),
            RepositoryError::NotFound(_)
        ));
        assert!(
            Submission::find()
                .filter(submission::Column::AssignmentId.eq(created.assignment.id))
                .all(&f.db)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(matches!(
            repo.delete(created.assignment.id).await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn update_missing_assignment_is_not_found() {
        let f = fixture().await;
        let repo = AssignmentRepository::new(&f.db);

        let err = repo
            .update(&f.admin, 4242, input("Ghost", AssignmentScope::General))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_target_users_rejected() {
        let f = fixture().await;
        let repo = AssignmentRepository::new(&f.db);

        let err = repo
            .create(
                &f.admin,
                input(
                    "Phantom targets",
                    AssignmentScope::Scoped {
                        team_id: None,
                        target_ids: vec![9999],
                    },
                ),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }
}
