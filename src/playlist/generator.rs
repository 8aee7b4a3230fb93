use chrono::Utc;

use crate::playlist::model::{PlaylistEntry, UNKNOWN_NAME};
use crate::server::utils::filename_utils;

/// longest stem we derive from an entry name before the count/date suffix
const MAX_STEM_LEN: usize = 60;

pub struct M3uGenerator;

impl M3uGenerator {
    /// serialize entries back into m3u text, one #EXTINF line plus one url
    /// line per entry, in input order. pure function of the input
    pub fn generate(entries: &[PlaylistEntry]) -> String {
        let mut out = String::from("#EXTM3U\n");

        for entry in entries {
            out.push_str("#EXTINF:-1");

            // fixed attribute order so output is deterministic
            Self::push_attr(&mut out, "tvg-name", entry.attribute_name.as_deref());
            Self::push_attr(&mut out, "tvg-logo", entry.logo_url.as_deref());
            Self::push_attr(&mut out, "tvg-id", entry.external_id.as_deref());
            Self::push_attr(&mut out, "tvg-country", entry.country.as_deref());
            Self::push_attr(&mut out, "tvg-language", entry.language.as_deref());
            Self::push_attr(&mut out, "group-title", Some(entry.group_name.as_str()));

            let name = Self::escape_value(&entry.display_name);
            out.push(',');
            if name.is_empty() {
                out.push_str(UNKNOWN_NAME);
            } else {
                out.push_str(&name);
            }
            out.push('\n');

            out.push_str(&Self::strip_newlines(&entry.media_url));
            out.push('\n');
        }

        out
    }

    /// filename when the caller didn't supply one: first entry's name plus an
    /// entry count and date stamp for uniqueness. no extension, the endpoint
    /// appends it
    pub fn default_filename(entries: &[PlaylistEntry]) -> String {
        let stem = entries
            .first()
            .map(|e| {
                e.attribute_name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| e.display_name.clone())
            })
            .unwrap_or_default();

        let mut stem = filename_utils::sanitize_filename(&stem);
        if stem.len() > MAX_STEM_LEN {
            // cut on a char boundary, sanitize already collapsed whitespace
            let cut = (1..=MAX_STEM_LEN)
                .rev()
                .find(|i| stem.is_char_boundary(*i))
                .unwrap_or(0);
            stem.truncate(cut);
        }

        format!(
            "{}_{}_items_{}",
            stem,
            entries.len(),
            Utc::now().format("%Y-%m-%d")
        )
    }

    fn push_attr(out: &mut String, key: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&Self::escape_value(value));
            out.push('"');
        }
    }

    /// the format has no escape mechanism for embedded quotes, so they become
    /// single quotes. newlines are stripped to keep one physical line per field
    fn escape_value(value: &str) -> String {
        Self::strip_newlines(&value.replace('"', "'"))
    }

    fn strip_newlines(value: &str) -> String {
        value.replace(['\r', '\n'], "")
    }
}
