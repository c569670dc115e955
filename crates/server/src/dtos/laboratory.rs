use database::{
    entities::laboratories,
    services::laboratory::{LaboratoryChanges, NewLaboratory},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct LaboratoryResponse {
    pub id: i32,
    pub name: String,
    pub location: Option<String>,
}

impl From<laboratories::Model> for LaboratoryResponse {
    fn from(lab: laboratories::Model) -> Self {
        Self {
            id: lab.id,
            name: lab.name,
            location: lab.location,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLaboratoryRequest {
    pub name: String,
    pub location: Option<String>,
}

impl From<CreateLaboratoryRequest> for NewLaboratory {
    fn from(request: CreateLaboratoryRequest) -> Self {
        Self {
            name: request.name,
            location: request.location,
        }
    }
}

/// Omitted fields are left unchanged
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLaboratoryRequest {
    pub name: Option<String>,
    pub location: Option<String>,
}

impl From<UpdateLaboratoryRequest> for LaboratoryChanges {
    fn from(request: UpdateLaboratoryRequest) -> Self {
        Self {
            name: request.name,
            location: request.location,
        }
    }
}
