use chrono::{Duration, Utc};

use lms_domain::submission::SubmissionStatus;
use lms_domain::user::UserRole;
use lms_portal::error::PortalError;
use lms_portal::usecase::submission::{
    GradeInput, GradeSubmissionUseCase, ListSubmissionsUseCase, SubmitAssignmentUseCase,
};

use crate::helpers::{
    MockAssignmentRepo, MockCourseRepo, MockEnrollmentRepo, MockSubmissionRepo, World, actor,
    next_week,
};

fn submit(world: &World) -> SubmitAssignmentUseCase<MockAssignmentRepo, MockEnrollmentRepo, MockSubmissionRepo> {
    SubmitAssignmentUseCase {
        assignments: world.assignments.clone(),
        enrollments: world.enrollments.clone(),
        submissions: world.submissions.clone(),
    }
}

fn grade(world: &World) -> GradeSubmissionUseCase<MockCourseRepo, MockAssignmentRepo, MockSubmissionRepo> {
    GradeSubmissionUseCase {
        courses: world.courses.clone(),
        assignments: world.assignments.clone(),
        submissions: world.submissions.clone(),
    }
}

// ── Single submission ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_second_submission_and_keep_first_untouched() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(teacher.id, None);
    let assignment = world.add_assignment(course.id, next_week());
    world.enroll(student.id, course.id);

    let first = submit(&world)
        .execute(&actor(&student), assignment.id, "first answer".to_owned())
        .await
        .unwrap();
    assert_eq!(first.status, SubmissionStatus::Submitted);

    let second = submit(&world)
        .execute(&actor(&student), assignment.id, "second answer".to_owned())
        .await;
    let err = second.unwrap_err();
    assert!(matches!(err, PortalError::AlreadySubmitted));
    assert_eq!(err.kind(), "ALREADY_SUBMITTED");

    let stored = world.submissions.submissions.lock().unwrap().clone();
    assert_eq!(stored, vec![first]);
    assert_eq!(stored[0].content, "first answer");
}

#[tokio::test]
async fn should_let_only_one_of_two_concurrent_first_submissions_win() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(teacher.id, None);
    let assignment = world.add_assignment(course.id, next_week());
    world.enroll(student.id, course.id);

    let usecase = submit(&world);
    let me = actor(&student);
    let (a, b) = tokio::join!(
        usecase.execute(&me, assignment.id, "a".to_owned()),
        usecase.execute(&me, assignment.id, "b".to_owned()),
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(world.submissions.submissions.lock().unwrap().len(), 1);
}

// ── Lateness ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_classify_by_due_date_with_due_instant_on_time() {
    let due = Utc::now() + Duration::hours(1);
    let cases = [
        (due - Duration::minutes(5), SubmissionStatus::Submitted),
        (due, SubmissionStatus::Submitted),
        (due + Duration::milliseconds(1), SubmissionStatus::Late),
    ];

    for (at, expected) in cases {
        let world = World::default();
        let teacher = world.add_user("a@school.edu", UserRole::Teacher);
        let student = world.add_user("s@example.com", UserRole::Student);
        let course = world.add_course(teacher.id, None);
        let assignment = world.add_assignment(course.id, due);
        world.enroll(student.id, course.id);

        let submission = submit(&world)
            .execute_at(&actor(&student), assignment.id, "work".to_owned(), at)
            .await
            .unwrap();
        assert_eq!(submission.status, expected, "submitted at {at}");
        assert_eq!(submission.submitted_at, at);
    }
}

// ── Who may submit ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_submission_without_active_enrollment() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(teacher.id, None);
    let assignment = world.add_assignment(course.id, next_week());

    let result = submit(&world)
        .execute(&actor(&student), assignment.id, "work".to_owned())
        .await;
    assert!(matches!(result, Err(PortalError::Forbidden)));
}

#[tokio::test]
async fn should_forbid_teacher_and_admin_submitting() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let admin = world.add_user("admin@lms.com", UserRole::Admin);
    let course = world.add_course(teacher.id, None);
    let assignment = world.add_assignment(course.id, next_week());

    for user in [&teacher, &admin] {
        let result = submit(&world)
            .execute(&actor(user), assignment.id, "work".to_owned())
            .await;
        assert!(matches!(result, Err(PortalError::Forbidden)));
    }
}

#[tokio::test]
async fn should_report_unknown_assignment() {
    let world = World::default();
    let student = world.add_user("s@example.com", UserRole::Student);

    let result = submit(&world)
        .execute(&actor(&student), uuid::Uuid::new_v4(), "work".to_owned())
        .await;
    assert!(matches!(result, Err(PortalError::AssignmentNotFound)));
}

#[tokio::test]
async fn should_reject_blank_content() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(teacher.id, None);
    let assignment = world.add_assignment(course.id, next_week());
    world.enroll(student.id, course.id);

    let result = submit(&world)
        .execute(&actor(&student), assignment.id, "   ".to_owned())
        .await;
    assert!(matches!(result, Err(PortalError::InvalidInput(_))));
    assert!(world.submissions.submissions.lock().unwrap().is_empty());
}

// ── Grading ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_grade_late_submission_and_allow_overwrite() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(teacher.id, None);
    let assignment = world.add_assignment(course.id, Utc::now() - Duration::days(1));
    world.enroll(student.id, course.id);

    let submission = submit(&world)
        .execute(&actor(&student), assignment.id, "sorry".to_owned())
        .await
        .unwrap();
    assert_eq!(submission.status, SubmissionStatus::Late);

    let graded = grade(&world)
        .execute(
            &actor(&teacher),
            submission.id,
            GradeInput {
                grade: 70.0,
                feedback: Some("late penalty".to_owned()),
            },
        )
        .await
        .unwrap();
    assert_eq!(graded.status, SubmissionStatus::Graded);
    assert_eq!(graded.grade, Some(70.0));
    assert_eq!(graded.graded_by, Some(teacher.id));

    let regraded = grade(&world)
        .execute(
            &actor(&teacher),
            submission.id,
            GradeInput {
                grade: 85.0,
                feedback: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(regraded.grade, Some(85.0));
    let stored = world.submissions.submissions.lock().unwrap()[0].clone();
    assert_eq!(stored.grade, Some(85.0));
    assert_eq!(stored.content, "sorry");
}

#[tokio::test]
async fn should_deny_grading_by_unrelated_teacher_but_allow_admin() {
    let world = World::default();
    let owner = world.add_user("a@school.edu", UserRole::Teacher);
    let outsider = world.add_user("b@school.edu", UserRole::Teacher);
    let admin = world.add_user("admin@lms.com", UserRole::Admin);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(owner.id, None);
    let assignment = world.add_assignment(course.id, next_week());
    world.enroll(student.id, course.id);
    let submission = submit(&world)
        .execute(&actor(&student), assignment.id, "work".to_owned())
        .await
        .unwrap();

    let denied = grade(&world)
        .execute(
            &actor(&outsider),
            submission.id,
            GradeInput {
                grade: 10.0,
                feedback: None,
            },
        )
        .await;
    assert!(matches!(denied, Err(PortalError::Forbidden)));

    grade(&world)
        .execute(
            &actor(&admin),
            submission.id,
            GradeInput {
                grade: 90.0,
                feedback: None,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn should_reject_grade_outside_point_range() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(teacher.id, None);
    let assignment = world.add_assignment(course.id, next_week());
    world.enroll(student.id, course.id);
    let submission = submit(&world)
        .execute(&actor(&student), assignment.id, "work".to_owned())
        .await
        .unwrap();

    for bad in [-1.0, 100.5, f64::NAN] {
        let result = grade(&world)
            .execute(
                &actor(&teacher),
                submission.id,
                GradeInput {
                    grade: bad,
                    feedback: None,
                },
            )
            .await;
        assert!(matches!(result, Err(PortalError::InvalidInput(_))), "{bad}");
    }
    let stored = world.submissions.submissions.lock().unwrap()[0].clone();
    assert_eq!(stored.status, SubmissionStatus::Submitted);
}

#[tokio::test]
async fn should_list_submissions_only_for_course_staff() {
    let world = World::default();
    let owner = world.add_user("a@school.edu", UserRole::Teacher);
    let outsider = world.add_user("b@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(owner.id, None);
    let assignment = world.add_assignment(course.id, next_week());
    world.enroll(student.id, course.id);
    submit(&world)
        .execute(&actor(&student), assignment.id, "work".to_owned())
        .await
        .unwrap();

    let usecase = ListSubmissionsUseCase {
        courses: world.courses.clone(),
        assignments: world.assignments.clone(),
        submissions: world.submissions.clone(),
    };
    assert_eq!(
        usecase
            .execute(&actor(&owner), assignment.id)
            .await
            .unwrap()
            .len(),
        1
    );
    for user in [&outsider, &student] {
        let result = usecase.execute(&actor(user), assignment.id).await;
        assert!(matches!(result, Err(PortalError::Forbidden)));
    }
}
