//! Migration to create the submissions table.
//!
//! Append-only upload records; one employee may submit against the same
//! assignment multiple times.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Submissions::AssignmentId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::EmployeeId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::FilePath).text().not_null())
                    .col(
                        ColumnDef::new(Submissions::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submissions_assignment_id")
                            .from(Submissions::Table, Submissions::AssignmentId)
                            .to(Assignments::Table, Assignments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submissions_employee_id")
                            .from(Submissions::Table, Submissions::EmployeeId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_assignment_id")
                    .table(Submissions::Table)
                    .col(Submissions::AssignmentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_submissions_assignment_id")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Submissions {
    Table,
    Id,
    AssignmentId,
    EmployeeId,
    FilePath,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum Assignments {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
