use chrono::Utc;
use uuid::Uuid;

use lms_domain::enrollment::EnrollmentStatus;
use lms_domain::user::UserRole;
use lms_portal::domain::repository::EnrollmentRepository;
use lms_portal::domain::types::Enrollment;
use lms_portal::error::PortalError;
use lms_portal::usecase::course::{
    CreateCourseInput, CreateCourseUseCase, DeleteCourseUseCase, ReassignTeacherUseCase,
    UpdateCourseInput, UpdateCourseUseCase,
};
use lms_portal::usecase::enrollment::{DropEnrollmentUseCase, EnrollUseCase};

use crate::helpers::{World, actor};

fn update_title(title: &str) -> UpdateCourseInput {
    UpdateCourseInput {
        title: Some(title.to_owned()),
        ..Default::default()
    }
}

fn create_input(teacher_id: Option<Uuid>) -> CreateCourseInput {
    CreateCourseInput {
        title: "Operating Systems".to_owned(),
        description: Some("Processes, memory, files".to_owned()),
        capacity: Some(40),
        teacher_id,
    }
}

// ── Ownership on course mutation ─────────────────────────────────────────────

#[tokio::test]
async fn should_deny_unrelated_teacher_and_allow_admin_to_update_course() {
    let world = World::default();
    let teacher_a = world.add_user("a@school.edu", UserRole::Teacher);
    let teacher_b = world.add_user("b@school.edu", UserRole::Teacher);
    let admin = world.add_user("admin@lms.com", UserRole::Admin);
    let course = world.add_course(teacher_a.id, None);

    let usecase = UpdateCourseUseCase {
        courses: world.courses.clone(),
        enrollments: world.enrollments.clone(),
    };

    let denied = usecase
        .execute(&actor(&teacher_b), course.id, update_title("Hijacked"))
        .await;
    assert!(matches!(denied, Err(PortalError::Forbidden)));
    assert_eq!(
        world.courses.courses.lock().unwrap()[0].title,
        "Intro to Systems"
    );

    let updated = usecase
        .execute(&actor(&admin), course.id, update_title("Systems I"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Systems I");
    assert_eq!(updated.teacher_id, teacher_a.id);
}

#[tokio::test]
async fn should_let_owner_update_and_delete_own_course() {
    let world = World::default();
    let owner = world.add_user("a@school.edu", UserRole::Teacher);
    let course = world.add_course(owner.id, None);

    UpdateCourseUseCase {
        courses: world.courses.clone(),
        enrollments: world.enrollments.clone(),
    }
    .execute(&actor(&owner), course.id, update_title("Renamed"))
    .await
    .unwrap();

    DeleteCourseUseCase {
        courses: world.courses.clone(),
    }
    .execute(&actor(&owner), course.id)
    .await
    .unwrap();
    assert!(world.courses.courses.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_deny_unrelated_teacher_deleting_course() {
    let world = World::default();
    let owner = world.add_user("a@school.edu", UserRole::Teacher);
    let outsider = world.add_user("b@school.edu", UserRole::Teacher);
    let course = world.add_course(owner.id, None);

    let result = DeleteCourseUseCase {
        courses: world.courses.clone(),
    }
    .execute(&actor(&outsider), course.id)
    .await;
    assert!(matches!(result, Err(PortalError::Forbidden)));
    assert_eq!(world.courses.courses.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_deny_student_before_looking_up_course() {
    let world = World::default();
    let student = world.add_user("s@example.com", UserRole::Student);

    // Course does not exist: role gate answers first.
    let result = UpdateCourseUseCase {
        courses: world.courses.clone(),
        enrollments: world.enrollments.clone(),
    }
    .execute(&actor(&student), Uuid::new_v4(), update_title("x"))
    .await;
    assert!(matches!(result, Err(PortalError::Forbidden)));
}

#[tokio::test]
async fn should_report_missing_course_to_staff() {
    let world = World::default();
    let admin = world.add_user("admin@lms.com", UserRole::Admin);

    let result = DeleteCourseUseCase {
        courses: world.courses.clone(),
    }
    .execute(&actor(&admin), Uuid::new_v4())
    .await;
    assert!(matches!(result, Err(PortalError::CourseNotFound)));
}

#[tokio::test]
async fn should_set_keep_and_clear_course_description() {
    let world = World::default();
    let owner = world.add_user("a@school.edu", UserRole::Teacher);
    let course = world.add_course(owner.id, None);
    let usecase = UpdateCourseUseCase {
        courses: world.courses.clone(),
        enrollments: world.enrollments.clone(),
    };
    let describe = |description: Option<Option<&str>>| UpdateCourseInput {
        description: description.map(|d| d.map(str::to_owned)),
        ..Default::default()
    };

    let set = usecase
        .execute(&actor(&owner), course.id, describe(Some(Some("Kernels and shells"))))
        .await
        .unwrap();
    assert_eq!(set.description.as_deref(), Some("Kernels and shells"));

    let untouched = usecase
        .execute(&actor(&owner), course.id, update_title("Systems II"))
        .await
        .unwrap();
    assert_eq!(untouched.description.as_deref(), Some("Kernels and shells"));

    let cleared = usecase
        .execute(&actor(&owner), course.id, describe(Some(None)))
        .await
        .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(world.courses.courses.lock().unwrap()[0].description, None);
}

#[tokio::test]
async fn should_refuse_capacity_below_current_enrollment() {
    let world = World::default();
    let owner = world.add_user("a@school.edu", UserRole::Teacher);
    let course = world.add_course(owner.id, Some(10));
    for i in 0..3 {
        let s = world.add_user(&format!("s{i}@example.com"), UserRole::Student);
        world.enroll(s.id, course.id);
    }

    let result = UpdateCourseUseCase {
        courses: world.courses.clone(),
        enrollments: world.enrollments.clone(),
    }
    .execute(
        &actor(&owner),
        course.id,
        UpdateCourseInput {
            capacity: Some(2),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(PortalError::InvalidInput(_))));
}

// ── Creation ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_make_creating_teacher_the_owner() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);

    let course = CreateCourseUseCase {
        users: world.users.clone(),
        courses: world.courses.clone(),
    }
    .execute(&actor(&teacher), create_input(None))
    .await
    .unwrap();
    assert_eq!(course.teacher_id, teacher.id);
    assert_eq!(course.capacity, Some(40));
}

#[tokio::test]
async fn should_not_let_teacher_create_course_for_someone_else() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let other = world.add_user("b@school.edu", UserRole::Teacher);

    let result = CreateCourseUseCase {
        users: world.users.clone(),
        courses: world.courses.clone(),
    }
    .execute(&actor(&teacher), create_input(Some(other.id)))
    .await;
    assert!(matches!(result, Err(PortalError::Forbidden)));
}

#[tokio::test]
async fn should_require_admin_to_name_an_existing_teacher() {
    let world = World::default();
    let admin = world.add_user("admin@lms.com", UserRole::Admin);
    let student = world.add_user("s@example.com", UserRole::Student);
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let usecase = CreateCourseUseCase {
        users: world.users.clone(),
        courses: world.courses.clone(),
    };

    let missing = usecase.execute(&actor(&admin), create_input(None)).await;
    assert!(matches!(missing, Err(PortalError::InvalidInput(_))));

    let not_teacher = usecase
        .execute(&actor(&admin), create_input(Some(student.id)))
        .await;
    assert!(matches!(not_teacher, Err(PortalError::InvalidInput(_))));

    let course = usecase
        .execute(&actor(&admin), create_input(Some(teacher.id)))
        .await
        .unwrap();
    assert_eq!(course.teacher_id, teacher.id);
}

#[tokio::test]
async fn should_forbid_student_creating_course() {
    let world = World::default();
    let student = world.add_user("s@example.com", UserRole::Student);

    let result = CreateCourseUseCase {
        users: world.users.clone(),
        courses: world.courses.clone(),
    }
    .execute(&actor(&student), create_input(None))
    .await;
    assert!(matches!(result, Err(PortalError::Forbidden)));
}

// ── Teacher reassignment ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_reserve_teacher_reassignment_to_admin() {
    let world = World::default();
    let owner = world.add_user("a@school.edu", UserRole::Teacher);
    let successor = world.add_user("b@school.edu", UserRole::Teacher);
    let admin = world.add_user("admin@lms.com", UserRole::Admin);
    let course = world.add_course(owner.id, None);
    let usecase = ReassignTeacherUseCase {
        users: world.users.clone(),
        courses: world.courses.clone(),
    };

    let by_owner = usecase
        .execute(&actor(&owner), course.id, successor.id)
        .await;
    assert!(matches!(by_owner, Err(PortalError::Forbidden)));

    let course = usecase
        .execute(&actor(&admin), course.id, successor.id)
        .await
        .unwrap();
    assert_eq!(course.teacher_id, successor.id);
    assert_eq!(
        world.courses.courses.lock().unwrap()[0].teacher_id,
        successor.id
    );
}

// ── Enrollment ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_enroll_student_once() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(teacher.id, None);
    let usecase = EnrollUseCase {
        courses: world.courses.clone(),
        enrollments: world.enrollments.clone(),
    };

    let enrollment = usecase.execute(&actor(&student), course.id).await.unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Active);

    let again = usecase.execute(&actor(&student), course.id).await;
    assert!(matches!(again, Err(PortalError::AlreadyEnrolled)));
    assert_eq!(world.enrollments.enrollments.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_let_only_one_of_two_concurrent_enrollments_win() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(teacher.id, None);
    let usecase = EnrollUseCase {
        courses: world.courses.clone(),
        enrollments: world.enrollments.clone(),
    };

    let me = actor(&student);
    let (a, b) = tokio::join!(
        usecase.execute(&me, course.id),
        usecase.execute(&me, course.id),
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(world.enrollments.enrollments.lock().unwrap().len(), 1);
}

fn active_enrollment(student_id: Uuid, course_id: Uuid) -> Enrollment {
    let now = Utc::now();
    Enrollment {
        id: Uuid::new_v4(),
        student_id,
        course_id,
        status: EnrollmentStatus::Active,
        enrolled_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn should_refuse_duplicate_pair_and_full_course_at_insert() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let first = world.add_user("s1@example.com", UserRole::Student);
    let second = world.add_user("s2@example.com", UserRole::Student);
    let course = world.add_course(teacher.id, Some(1));
    let repo = &world.enrollments;

    repo.create(&active_enrollment(first.id, course.id), Some(1))
        .await
        .unwrap();

    // Both checks hold at insert time, without the use case's early lookup.
    let duplicate = repo
        .create(&active_enrollment(first.id, course.id), None)
        .await;
    assert!(matches!(duplicate, Err(PortalError::AlreadyEnrolled)));

    let over = repo
        .create(&active_enrollment(second.id, course.id), Some(1))
        .await;
    assert!(matches!(over, Err(PortalError::CourseFull)));
    assert_eq!(repo.count_active(course.id).await.unwrap(), 1);
}

#[tokio::test]
async fn should_stop_enrollment_at_capacity() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let course = world.add_course(teacher.id, Some(2));
    let usecase = EnrollUseCase {
        courses: world.courses.clone(),
        enrollments: world.enrollments.clone(),
    };

    for i in 0..2 {
        let s = world.add_user(&format!("s{i}@example.com"), UserRole::Student);
        usecase.execute(&actor(&s), course.id).await.unwrap();
    }
    let late = world.add_user("late@example.com", UserRole::Student);
    let result = usecase.execute(&actor(&late), course.id).await;
    assert!(matches!(result, Err(PortalError::CourseFull)));
}

#[tokio::test]
async fn should_free_seat_and_allow_reenrollment_after_drop() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(teacher.id, Some(1));
    let enroll = EnrollUseCase {
        courses: world.courses.clone(),
        enrollments: world.enrollments.clone(),
    };
    let drop = DropEnrollmentUseCase {
        enrollments: world.enrollments.clone(),
    };

    enroll.execute(&actor(&student), course.id).await.unwrap();
    drop.execute(&actor(&student), course.id).await.unwrap();

    let second = drop.execute(&actor(&student), course.id).await;
    assert!(matches!(second, Err(PortalError::EnrollmentNotFound)));

    enroll.execute(&actor(&student), course.id).await.unwrap();
    let statuses: Vec<_> = world
        .enrollments
        .enrollments
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.status)
        .collect();
    assert_eq!(
        statuses,
        vec![EnrollmentStatus::Dropped, EnrollmentStatus::Active]
    );
}

#[tokio::test]
async fn should_restrict_enrollment_to_students() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let admin = world.add_user("admin@lms.com", UserRole::Admin);
    let course = world.add_course(teacher.id, None);
    let usecase = EnrollUseCase {
        courses: world.courses.clone(),
        enrollments: world.enrollments.clone(),
    };

    for user in [&teacher, &admin] {
        let result = usecase.execute(&actor(user), course.id).await;
        assert!(matches!(result, Err(PortalError::Forbidden)));
    }
}
