use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShowImage {
    pub medium: String,
    pub original: String,
}

/// Display data for one show, as returned by the lookup service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShowRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub image: Option<ShowImage>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub cast: Vec<String>,
}

impl ShowRecord {
    /// Summary text if present. Only an empty string counts as absent.
    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_deref().filter(|s| !s.is_empty())
    }
}
