use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use lms_core::health::healthz;
use lms_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    admin::{accept_invitation, invite_teacher, set_teacher_active},
    assignments::{
        create_assignment, grade_submission, list_assignments, list_submissions,
        submit_assignment,
    },
    auth::{
        check_role, complete_registration, login, profile, send_login_code,
        send_registration_code, verify_login_code,
    },
    courses::{
        create_course, delete_course, drop_enrollment, enroll, get_course, list_courses,
        reassign_teacher, update_course,
    },
    health::readyz,
    materials::{delete_material, list_materials, update_material, upload_material},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Authentication
        .route("/auth/check-role", post(check_role))
        .route("/auth/login", post(login))
        .route("/auth/send-otp", post(send_login_code))
        .route("/auth/verify-otp", post(verify_login_code))
        .route("/auth/register/send-otp", post(send_registration_code))
        .route("/auth/register/verify-otp", post(complete_registration))
        .route("/auth/profile", get(profile))
        // Courses
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course)
                .put(update_course)
                .post(update_course)
                .delete(delete_course),
        )
        .route("/courses/{id}/teacher", patch(reassign_teacher))
        .route("/courses/{id}/enroll", post(enroll).delete(drop_enrollment))
        .route(
            "/courses/{id}/assignments",
            get(list_assignments).post(create_assignment),
        )
        .route("/courses/{id}/materials", get(list_materials))
        // Materials
        .route("/materials/upload", post(upload_material))
        .route(
            "/materials/{id}",
            patch(update_material).delete(delete_material),
        )
        // Assignments and submissions
        .route("/assignments/{id}/submit", post(submit_assignment))
        .route("/assignments/{id}/submissions", get(list_submissions))
        .route("/submissions/{id}/grade", post(grade_submission))
        // Administration
        .route("/admin/invitations", post(invite_teacher))
        .route("/admin/teachers/{id}/active", patch(set_teacher_active))
        .route("/invitations/accept", post(accept_invitation))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
