use chrono::Utc;
use uuid::Uuid;

use crate::domain::access::{Actor, Operation, ResourceOwners, authorize, check_role};
use crate::domain::repository::{CourseRepository, MaterialRepository};
use crate::domain::types::Material;
use crate::error::PortalError;
use crate::usecase::course::{load_course, load_course_for};

/// Metadata of a file already placed in blob storage.
pub struct UploadMaterialInput {
    pub course_id: Uuid,
    pub title: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub url: String,
}

pub struct UploadMaterialUseCase<C: CourseRepository, M: MaterialRepository> {
    pub courses: C,
    pub materials: M,
}

impl<C: CourseRepository, M: MaterialRepository> UploadMaterialUseCase<C, M> {
    pub async fn execute(
        &self,
        actor: &Actor,
        input: UploadMaterialInput,
    ) -> Result<Material, PortalError> {
        load_course_for(&self.courses, actor, Operation::UploadMaterial, input.course_id).await?;

        let title = input.title.trim();
        if title.is_empty() {
            return Err(PortalError::InvalidInput("title must not be empty"));
        }
        if input.file_name.trim().is_empty() || input.url.trim().is_empty() {
            return Err(PortalError::InvalidInput("file name and url are required"));
        }

        let now = Utc::now();
        let material = Material {
            id: Uuid::now_v7(),
            course_id: input.course_id,
            uploaded_by: actor.user_id,
            title: title.to_owned(),
            file_name: input.file_name,
            content_type: input.content_type,
            size_bytes: input.size_bytes,
            url: input.url,
            created_at: now,
            updated_at: now,
        };
        self.materials.create(&material).await?;
        tracing::info!(material_id = %material.id, course_id = %material.course_id, by = %actor.user_id, "material uploaded");
        Ok(material)
    }
}

/// Role gate, load material and its course, then course-teacher-or-uploader gate.
async fn load_material_for<C: CourseRepository, M: MaterialRepository>(
    courses: &C,
    materials: &M,
    actor: &Actor,
    op: Operation,
    id: Uuid,
) -> Result<Material, PortalError> {
    check_role(actor, op)?;
    let material = materials
        .find_by_id(id)
        .await?
        .ok_or(PortalError::MaterialNotFound)?;
    let course = load_course(courses, material.course_id).await?;
    authorize(
        actor,
        op,
        Some(&ResourceOwners::material(course.teacher_id, material.uploaded_by)),
    )?;
    Ok(material)
}

#[derive(Default)]
pub struct UpdateMaterialInput {
    pub title: Option<String>,
    pub url: Option<String>,
}

pub struct UpdateMaterialUseCase<C: CourseRepository, M: MaterialRepository> {
    pub courses: C,
    pub materials: M,
}

impl<C: CourseRepository, M: MaterialRepository> UpdateMaterialUseCase<C, M> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateMaterialInput,
    ) -> Result<Material, PortalError> {
        let mut material =
            load_material_for(&self.courses, &self.materials, actor, Operation::UpdateMaterial, id)
                .await?;
        if let Some(title) = input.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(PortalError::InvalidInput("title must not be empty"));
            }
            material.title = title.to_owned();
        }
        if let Some(url) = input.url {
            material.url = url;
        }
        material.updated_at = Utc::now();
        self.materials.update(&material).await?;
        Ok(material)
    }
}

pub struct DeleteMaterialUseCase<C: CourseRepository, M: MaterialRepository> {
    pub courses: C,
    pub materials: M,
}

impl<C: CourseRepository, M: MaterialRepository> DeleteMaterialUseCase<C, M> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> Result<(), PortalError> {
        load_material_for(&self.courses, &self.materials, actor, Operation::DeleteMaterial, id)
            .await?;
        if !self.materials.delete(id).await? {
            return Err(PortalError::MaterialNotFound);
        }
        tracing::info!(material_id = %id, by = %actor.user_id, "material deleted");
        Ok(())
    }
}

pub struct ListMaterialsUseCase<C: CourseRepository, M: MaterialRepository> {
    pub courses: C,
    pub materials: M,
}

impl<C: CourseRepository, M: MaterialRepository> ListMaterialsUseCase<C, M> {
    pub async fn execute(&self, course_id: Uuid) -> Result<Vec<Material>, PortalError> {
        load_course(&self.courses, course_id).await?;
        self.materials.list_by_course(course_id).await
    }
}
