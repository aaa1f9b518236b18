use sea_orm_migration::prelude::*;

mod m20261019_000001_create_users;
mod m20261019_000002_create_one_time_codes;
mod m20261019_000003_create_teacher_invitations;
mod m20261019_000004_create_courses;
mod m20261019_000005_create_enrollments;
mod m20261019_000006_create_assignments;
mod m20261019_000007_create_submissions;
mod m20261019_000008_create_materials;
mod m20261019_000009_create_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_users::Migration),
            Box::new(m20261019_000002_create_one_time_codes::Migration),
            Box::new(m20261019_000003_create_teacher_invitations::Migration),
            Box::new(m20261019_000004_create_courses::Migration),
            Box::new(m20261019_000005_create_enrollments::Migration),
            Box::new(m20261019_000006_create_assignments::Migration),
            Box::new(m20261019_000007_create_submissions::Migration),
            Box::new(m20261019_000008_create_materials::Migration),
            Box::new(m20261019_000009_create_outbox_events::Migration),
        ]
    }
}
