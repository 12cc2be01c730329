use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopAppDto {
    pub basename: String,
    pub full_path: String,
    pub app_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_exec: Option<String>,
    pub is_customized: bool,
}
