//! sea-orm entities for the portal database.

pub mod assignments;
pub mod courses;
pub mod enrollments;
pub mod materials;
pub mod one_time_codes;
pub mod outbox_events;
pub mod submissions;
pub mod teacher_invitations;
pub mod users;
