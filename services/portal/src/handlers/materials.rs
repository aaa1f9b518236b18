use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lms_auth_types::identity::BearerIdentity;

use crate::domain::access::Actor;
use crate::domain::types::Material;
use crate::error::PortalError;
use crate::state::AppState;
use crate::usecase::material::{
    DeleteMaterialUseCase, ListMaterialsUseCase, UpdateMaterialInput, UpdateMaterialUseCase,
    UploadMaterialInput, UploadMaterialUseCase,
};

#[derive(Serialize)]
pub struct MaterialResponse {
    pub id: String,
    pub course_id: String,
    pub uploaded_by: String,
    pub title: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub url: String,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Material> for MaterialResponse {
    fn from(m: Material) -> Self {
        Self {
            id: m.id.to_string(),
            course_id: m.course_id.to_string(),
            uploaded_by: m.uploaded_by.to_string(),
            title: m.title,
            file_name: m.file_name,
            content_type: m.content_type,
            size_bytes: m.size_bytes,
            url: m.url,
            created_at: m.created_at,
        }
    }
}

// ── GET /courses/{id}/materials ──────────────────────────────────────────────

pub async fn list_materials(
    _identity: BearerIdentity,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<MaterialResponse>>, PortalError> {
    let usecase = ListMaterialsUseCase {
        courses: state.course_repo(),
        materials: state.material_repo(),
    };
    let materials = usecase.execute(course_id).await?;
    Ok(Json(materials.into_iter().map(Into::into).collect()))
}

// ── POST /materials/upload ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UploadMaterialRequest {
    pub course_id: Uuid,
    pub title: String,
    pub file_name: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub size_bytes: u64,
    pub url: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_owned()
}

pub async fn upload_material(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Json(body): Json<UploadMaterialRequest>,
) -> Result<(StatusCode, Json<MaterialResponse>), PortalError> {
    let usecase = UploadMaterialUseCase {
        courses: state.course_repo(),
        materials: state.material_repo(),
    };
    let material = usecase
        .execute(
            &Actor::from(identity),
            UploadMaterialInput {
                course_id: body.course_id,
                title: body.title,
                file_name: body.file_name,
                content_type: body.content_type,
                size_bytes: body.size_bytes,
                url: body.url,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(material.into())))
}

// ── PATCH /materials/{id} ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMaterialRequest {
    pub title: Option<String>,
    pub url: Option<String>,
}

pub async fn update_material(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMaterialRequest>,
) -> Result<Json<MaterialResponse>, PortalError> {
    let usecase = UpdateMaterialUseCase {
        courses: state.course_repo(),
        materials: state.material_repo(),
    };
    let material = usecase
        .execute(
            &Actor::from(identity),
            id,
            UpdateMaterialInput {
                title: body.title,
                url: body.url,
            },
        )
        .await?;
    Ok(Json(material.into()))
}

// ── DELETE /materials/{id} ───────────────────────────────────────────────────

pub async fn delete_material(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, PortalError> {
    let usecase = DeleteMaterialUseCase {
        courses: state.course_repo(),
        materials: state.material_repo(),
    };
    usecase.execute(&Actor::from(identity), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
