use chapterdesk_types::models::{Activity, ChapterContent};

/// Local, unsaved form state for a chapter page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDraft {
    content: ChapterContent,
    next_activity_id: u64,
}

impl Default for ChapterDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl ChapterDraft {
    pub fn new() -> Self {
        Self::from_content(ChapterContent::default())
    }

    pub fn from_content(content: ChapterContent) -> Self {
        let next_activity_id = content.activities.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        Self {
            content,
            next_activity_id,
        }
    }

    pub fn content(&self) -> &ChapterContent {
        &self.content
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.content.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.content.description = description.into();
    }

    pub fn set_image_url(&mut self, image_url: impl Into<String>) {
        self.content.image_url = image_url.into();
    }

    pub fn set_member_count(&mut self, member_count: u32) {
        self.content.member_count = member_count;
    }

    pub fn activities(&self) -> &[Activity] {
        &self.content.activities
    }

    /// Append an activity and return its id.
    pub fn add_activity(&mut self, title: impl Into<String>, description: impl Into<String>) -> u64 {
        let id = self.next_activity_id;
        self.next_activity_id += 1;
        self.content.activities.push(Activity {
            id,
            title: title.into(),
            description: description.into(),
        });
        id
    }

    /// Returns false if no activity has this id.
    pub fn update_activity(
        &mut self,
        id: u64,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> bool {
        match self.content.activities.iter_mut().find(|a| a.id == id) {
            Some(activity) => {
                activity.title = title.into();
                activity.description = description.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_activity(&mut self, id: u64) -> bool {
        let before = self.content.activities.len();
        self.content.activities.retain(|a| a.id != id);
        self.content.activities.len() != before
    }
}
