pub mod admin;
pub mod assignments;
pub mod auth;
pub mod courses;
pub mod health;
pub mod materials;
