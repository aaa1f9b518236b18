
mod course_test;
mod invitation_test;
mod material_test;
mod otp_test;
mod submission_test;
