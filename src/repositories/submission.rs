//! # Submission Repository
//!
//! Append-only records of uploaded files. One employee may submit against
//! the same assignment multiple times.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set};

use crate::error::RepositoryError;
use crate::models::submission::{ActiveModel, Column, Entity as Submission, Model};

/// Repository for submission records
pub struct SubmissionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SubmissionRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn record(
        &self,
        assignment_id: i32,
        employee_id: i32,
        file_path: &str,
    ) -> Result<Model, RepositoryError> {
        let row = ActiveModel {
            assignment_id: Set(assignment_id),
            employee_id: Set(employee_id),
            file_path: Set(file_path.to_string()),
            submitted_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        Ok(row.insert(self.db).await?)
    }

    pub async fn list_for_assignment(
        &self,
        assignment_id: i32,
    ) -> Result<Vec<Model>, RepositoryError> {
        Ok(Submission::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .order_by_asc(Column::Id)
            .all(self.db)
            .await?)
    }
}
