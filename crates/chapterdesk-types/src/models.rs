use serde::{Deserialize, Serialize};

/// Editable content of a single chapter page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContent {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub activities: Vec<Activity>,
    pub member_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: u64,
    pub title: String,
    pub description: String,
}
