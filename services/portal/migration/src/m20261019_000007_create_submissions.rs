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
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Submissions::AssignmentId).uuid().not_null())
                    .col(ColumnDef::new(Submissions::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Submissions::Content).text().not_null())
                    .col(ColumnDef::new(Submissions::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Submissions::Grade).double())
                    .col(ColumnDef::new(Submissions::Feedback).text())
                    .col(
                        ColumnDef::new(Submissions::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::GradedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Submissions::GradedBy).uuid())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::AssignmentId)
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One submission per (assignment, student), enforced by the database as well.
        manager
            .create_index(
                Index::create()
                    .table(Submissions::Table)
                    .col(Submissions::AssignmentId)
                    .col(Submissions::StudentId)
                    .unique()
                    .name("uq_submissions_assignment_id_student_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Submissions {
    Table,
    Id,
    AssignmentId,
    StudentId,
    Content,
    Status,
    Grade,
    Feedback,
    SubmittedAt,
    GradedAt,
    GradedBy,
}

#[derive(Iden)]
enum Assignments {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
