use serde::{Deserialize, Serialize};

use crate::playlist::{GroupSummary, PlaylistEntry};

/// response of the parse endpoint: all entries in file order plus the group
/// summary in first-encountered order
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsePlaylistResponse {
    pub entries: Vec<PlaylistEntry>,
    pub total_count: usize,
    pub groups: Vec<GroupSummary>,
}

/// body of the download endpoint: already-structured entries, not raw text
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlaylistRequest {
    pub entries: Vec<PlaylistEntry>,
    #[serde(default)]
    pub filename: Option<String>,
}
