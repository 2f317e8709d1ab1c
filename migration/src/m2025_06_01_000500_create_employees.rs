//! Migration to create the employees directory table.
//!
//! Directory rows maintained by admins; optionally linked to a user account.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::FirstName).text().not_null())
                    .col(ColumnDef::new(Employees::LastName).text().null())
                    .col(ColumnDef::new(Employees::Email).text().null().unique_key())
                    .col(ColumnDef::new(Employees::Position).text().null())
                    .col(ColumnDef::new(Employees::Department).text().null())
                    .col(ColumnDef::new(Employees::Phone).text().null())
                    .col(ColumnDef::new(Employees::UserId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_user_id")
                            .from(Employees::Table, Employees::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Position,
    Department,
    Phone,
    UserId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
