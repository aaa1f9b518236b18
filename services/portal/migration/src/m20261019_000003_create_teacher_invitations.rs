use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TeacherInvitations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeacherInvitations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TeacherInvitations::Email).string().not_null())
                    .col(
                        ColumnDef::new(TeacherInvitations::Token)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TeacherInvitations::InvitedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(TeacherInvitations::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeacherInvitations::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TeacherInvitations::AcceptedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(TeacherInvitations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeacherInvitations::Table, TeacherInvitations::InvitedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(TeacherInvitations::Table)
                    .col(TeacherInvitations::Email)
                    .name("idx_teacher_invitations_email")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeacherInvitations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TeacherInvitations {
    Table,
    Id,
    Email,
    Token,
    InvitedBy,
    Status,
    ExpiresAt,
    AcceptedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
