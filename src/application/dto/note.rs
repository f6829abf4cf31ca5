use serde::Deserialize;

use crate::application::services::{CreateNoteRequest, UpdateNoteRequest};
use crate::domain::entities::NoteCategory;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequestDto {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: NoteCategory,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub quest: Option<String>,
    #[serde(default)]
    pub lore: Option<String>,
}

impl From<CreateNoteRequestDto> for CreateNoteRequest {
    fn from(dto: CreateNoteRequestDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
            category: dto.category,
            location: dto.location,
            item: dto.item,
            quest: dto.quest,
            lore: dto.lore,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateNoteRequestDto {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<NoteCategory>,
    pub location: Option<String>,
    pub item: Option<String>,
    pub quest: Option<String>,
    pub lore: Option<String>,
}

impl From<UpdateNoteRequestDto> for UpdateNoteRequest {
    fn from(dto: UpdateNoteRequestDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
            category: dto.category,
            location: dto.location,
            item: dto.item,
            quest: dto.quest,
            lore: dto.lore,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteListQueryDto {
    #[serde(default)]
    pub category: Option<String>,
}
