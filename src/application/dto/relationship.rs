use serde::{Deserialize, Serialize};

use crate::application::services::{CreateRelationshipRequest, UpdateRelationshipRequest};
use crate::domain::entities::{Relationship, RelationshipStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRelationshipRequestDto {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "level")]
    pub relationship_level: Option<u8>,
    #[serde(default)]
    pub is_alive: Option<bool>,
}

impl From<CreateRelationshipRequestDto> for CreateRelationshipRequest {
    fn from(dto: CreateRelationshipRequestDto) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            level: dto.relationship_level,
            is_alive: dto.is_alive,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRelationshipRequestDto {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "level")]
    pub relationship_level: Option<u8>,
    pub is_alive: Option<bool>,
}

impl From<UpdateRelationshipRequestDto> for UpdateRelationshipRequest {
    fn from(dto: UpdateRelationshipRequestDto) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            level: dto.relationship_level,
            is_alive: dto.is_alive,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdjustLevelRequestDto {
    pub delta: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipResponseDto {
    #[serde(flatten)]
    pub relationship: Relationship,
    pub status: RelationshipStatus,
}

impl From<Relationship> for RelationshipResponseDto {
    fn from(relationship: Relationship) -> Self {
        Self {
            status: relationship.status(),
            relationship,
        }
    }
}
