use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ExportQueryDto {
    #[serde(default)]
    pub format: Option<String>,
}
