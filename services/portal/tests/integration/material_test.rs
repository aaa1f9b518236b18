use lms_domain::user::UserRole;
use lms_portal::error::PortalError;
use lms_portal::usecase::material::{
    DeleteMaterialUseCase, ListMaterialsUseCase, UpdateMaterialInput, UpdateMaterialUseCase,
    UploadMaterialInput, UploadMaterialUseCase,
};

use crate::helpers::{World, actor};

fn upload_input(course_id: uuid::Uuid) -> UploadMaterialInput {
    UploadMaterialInput {
        course_id,
        title: "Week 1 slides".to_owned(),
        file_name: "week1.pdf".to_owned(),
        content_type: "application/pdf".to_owned(),
        size_bytes: 48_213,
        url: "https://files.example.com/week1.pdf".to_owned(),
    }
}

fn rename(title: &str) -> UpdateMaterialInput {
    UpdateMaterialInput {
        title: Some(title.to_owned()),
        ..Default::default()
    }
}

#[tokio::test]
async fn should_let_course_teacher_upload_and_students_list() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let course = world.add_course(teacher.id, None);

    let material = UploadMaterialUseCase {
        courses: world.courses.clone(),
        materials: world.materials.clone(),
    }
    .execute(&actor(&teacher), upload_input(course.id))
    .await
    .unwrap();
    assert_eq!(material.uploaded_by, teacher.id);
    assert_eq!(material.course_id, course.id);

    let listed = ListMaterialsUseCase {
        courses: world.courses.clone(),
        materials: world.materials.clone(),
    }
    .execute(course.id)
    .await
    .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].file_name, "week1.pdf");
}

#[tokio::test]
async fn should_forbid_upload_by_student_and_unrelated_teacher() {
    let world = World::default();
    let owner = world.add_user("a@school.edu", UserRole::Teacher);
    let outsider = world.add_user("b@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let course = world.add_course(owner.id, None);
    let usecase = UploadMaterialUseCase {
        courses: world.courses.clone(),
        materials: world.materials.clone(),
    };

    for user in [&outsider, &student] {
        let result = usecase.execute(&actor(user), upload_input(course.id)).await;
        assert!(matches!(result, Err(PortalError::Forbidden)));
    }
    assert!(world.materials.materials.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_let_uploader_edit_after_course_changes_hands() {
    let world = World::default();
    let uploader = world.add_user("a@school.edu", UserRole::Teacher);
    let successor = world.add_user("b@school.edu", UserRole::Teacher);
    let course = world.add_course(uploader.id, None);
    let material = UploadMaterialUseCase {
        courses: world.courses.clone(),
        materials: world.materials.clone(),
    }
    .execute(&actor(&uploader), upload_input(course.id))
    .await
    .unwrap();

    world.courses.courses.lock().unwrap()[0].teacher_id = successor.id;

    let usecase = UpdateMaterialUseCase {
        courses: world.courses.clone(),
        materials: world.materials.clone(),
    };
    let by_uploader = usecase
        .execute(&actor(&uploader), material.id, rename("Week 1 (revised)"))
        .await
        .unwrap();
    assert_eq!(by_uploader.title, "Week 1 (revised)");

    let by_course_teacher = usecase
        .execute(&actor(&successor), material.id, rename("Week 1 final"))
        .await
        .unwrap();
    assert_eq!(by_course_teacher.title, "Week 1 final");
}

#[tokio::test]
async fn should_deny_unrelated_teacher_and_allow_admin_to_delete_material() {
    let world = World::default();
    let owner = world.add_user("a@school.edu", UserRole::Teacher);
    let outsider = world.add_user("b@school.edu", UserRole::Teacher);
    let admin = world.add_user("admin@lms.com", UserRole::Admin);
    let course = world.add_course(owner.id, None);
    let material = UploadMaterialUseCase {
        courses: world.courses.clone(),
        materials: world.materials.clone(),
    }
    .execute(&actor(&owner), upload_input(course.id))
    .await
    .unwrap();

    let usecase = DeleteMaterialUseCase {
        courses: world.courses.clone(),
        materials: world.materials.clone(),
    };
    let denied = usecase.execute(&actor(&outsider), material.id).await;
    assert!(matches!(denied, Err(PortalError::Forbidden)));

    usecase.execute(&actor(&admin), material.id).await.unwrap();
    assert!(world.materials.materials.lock().unwrap().is_empty());

    let again = usecase.execute(&actor(&admin), material.id).await;
    assert!(matches!(again, Err(PortalError::MaterialNotFound)));
}

#[tokio::test]
async fn should_reject_blank_material_title() {
    let world = World::default();
    let owner = world.add_user("a@school.edu", UserRole::Teacher);
    let course = world.add_course(owner.id, None);
    let mut input = upload_input(course.id);
    input.title = "  ".to_owned();

    let result = UploadMaterialUseCase {
        courses: world.courses.clone(),
        materials: world.materials.clone(),
    }
    .execute(&actor(&owner), input)
    .await;
    assert!(matches!(result, Err(PortalError::InvalidInput(_))));
}
