pub mod assignment;
pub mod course;
pub mod enrollment;
pub mod invitation;
pub mod login;
pub mod material;
pub mod otp;
pub mod password;
pub mod submission;
