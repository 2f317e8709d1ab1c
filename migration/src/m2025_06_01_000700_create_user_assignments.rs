//! Migration to create the user_assignments join table.
//!
//! Individual-visibility grants: one row gives one user visibility into one
//! assignment. Composite primary key (user_id, assignment_id).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserAssignments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserAssignments::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(UserAssignments::AssignmentId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserAssignments::UserId)
                            .col(UserAssignments::AssignmentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_assignments_user_id")
                            .from(UserAssignments::Table, UserAssignments::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_assignments_assignment_id")
                            .from(UserAssignments::Table, UserAssignments::AssignmentId)
                            .to(Assignments::Table, Assignments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_assignments_assignment_id")
                    .table(UserAssignments::Table)
                    .col(UserAssignments::AssignmentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_user_assignments_assignment_id")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(UserAssignments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserAssignments {
    Table,
    UserId,
    AssignmentId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Assignments {
    Table,
    Id,
}
