use serde::{Deserialize, Serialize};

/// default category for entries whose #EXTINF carries no group-title
pub const DEFAULT_GROUP: &str = "Other";

/// fallback title for entries that have neither a trailing title nor tvg-name
pub const UNKNOWN_NAME: &str = "Unknown";

/// one playlist item, fixed schema on purpose - no attribute map, anything we
/// don't recognize in the source file is dropped at parse time
///
/// these go straight over the wire as json so the field names are the
/// camelCase ones the frontend reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    // dense per parse run: entry-0, entry-1, ... never reused across runs
    pub id: String,
    pub display_name: String,
    // raw tvg-name, kept separately because it can differ from the display
    // name and filenames prefer this form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    // never empty once the entry exists, defaults to DEFAULT_GROUP
    pub group_name: String,
    pub media_url: String,
}

/// per-group entry count, rebuilt from the entry list whenever needed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    pub count: usize,
}

impl GroupSummary {
    /// summarize groups in first-encountered order. alphabetical sorting, if
    /// anyone wants it, belongs to the presentation layer
    pub fn from_entries(entries: &[PlaylistEntry]) -> Vec<GroupSummary> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();

        for entry in entries {
            if !counts.contains_key(entry.group_name.as_str()) {
                order.push(entry.group_name.clone());
            }
            *counts.entry(entry.group_name.as_str()).or_insert(0) += 1;
        }

        order
            .into_iter()
            .map(|name| {
                let count = counts.get(name.as_str()).copied().unwrap_or(0);
                GroupSummary { name, count }
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(group: &str) -> PlaylistEntry {
        PlaylistEntry {
            id: "entry-0".to_string(),
            display_name: "A".to_string(),
            attribute_name: None,
            logo_url: None,
            external_id: None,
            country: None,
            language: None,
            group_name: group.to_string(),
            media_url: "http://x/a".to_string(),
        }
    }

    #[test]
    fn test_serializes_camel_case_and_omits_absent_fields() {
        let json = serde_json::to_value(entry("Other")).unwrap();
        assert_eq!(json["displayName"], "A");
        assert_eq!(json["groupName"], "Other");
        assert_eq!(json["mediaUrl"], "http://x/a");
        assert!(json.get("logoUrl").is_none());
        assert!(json.get("attributeName").is_none());
    }

    #[test]
    fn test_group_summary_first_encounter_order() {
        let entries = vec![entry("B"), entry("A"), entry("B")];
        let groups = GroupSummary::from_entries(&entries);
        assert_eq!(
            groups,
            vec![
                GroupSummary { name: "B".to_string(), count: 2 },
                GroupSummary { name: "A".to_string(), count: 1 },
            ]
        );
    }
}
