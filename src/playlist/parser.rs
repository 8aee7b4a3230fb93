use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::playlist::model::{DEFAULT_GROUP, PlaylistEntry, UNKNOWN_NAME};

/// key="value" blocks on an #EXTINF line (tvg-id="...", group-title="...", etc)
static ATTR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z0-9]+(?:-[A-Za-z0-9]+)*)="([^"]*)""#).unwrap());

/// optional signed duration right after the tag prefix, parsed only to be skipped
static DURATION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-+]?\d+").unwrap());

const EXTINF_PREFIX: &str = "#EXTINF:";
const HEADER_PREFIX: &str = "#EXTM3U";

/// attributes collected from the most recent #EXTINF line, waiting for its url
#[derive(Debug, Default)]
struct ExtinfAccumulator {
    name: Option<String>,
    logo: Option<String>,
    id: Option<String>,
    country: Option<String>,
    language: Option<String>,
    group: Option<String>,
    // trailing ",<text>" title, empty when the line had none
    title: String,
}

/// incremental m3u parser fed with raw byte chunks of one logical file
///
/// the whole point of this over a read-to-string parse is that the carry-over
/// state stays tiny no matter how big the upload is: undecoded trailing bytes
/// of a split utf-8 code point, the last line without a newline yet, and at
/// most one pending #EXTINF accumulator. a line is never classified until its
/// terminator arrived (or `finish` was called), so chunk boundaries can land
/// anywhere, including inside a multi-byte character
#[derive(Debug, Default)]
pub struct M3uStreamParser {
    byte_tail: Vec<u8>,
    line_tail: String,
    pending: Option<ExtinfAccumulator>,
    next_index: usize,
}

impl M3uStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// consume the next chunk, returning the entries it completed.
    /// chunks must arrive in file order with no gaps
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<PlaylistEntry> {
        let decoded = self.decode_chunk(chunk);

        let mut entries = Vec::new();
        let mut rest = decoded.as_str();

        while let Some(pos) = rest.find('\n') {
            let (line, tail) = rest.split_at(pos);
            rest = &tail[1..];

            if self.line_tail.is_empty() {
                self.handle_line(line, &mut entries);
            } else {
                // line started in a previous chunk
                let mut full = std::mem::take(&mut self.line_tail);
                full.push_str(line);
                self.handle_line(&full, &mut entries);
            }
        }

        self.line_tail.push_str(rest);
        entries
    }

    /// end of stream. a trailing line without a newline is only completed when
    /// it's a url line with a pending accumulator - an unterminated info line
    /// can't be known to be whole, so it's dropped
    pub fn finish(&mut self) -> Vec<PlaylistEntry> {
        if !self.byte_tail.is_empty() {
            // whatever is left can't be a complete code point, decode lossy
            let tail = std::mem::take(&mut self.byte_tail);
            self.line_tail.push_str(&String::from_utf8_lossy(&tail));
        }

        let mut entries = Vec::new();
        if !self.line_tail.is_empty() {
            let last = std::mem::take(&mut self.line_tail);
            let line = last.trim_end_matches('\r').trim();
            if line.starts_with("http") {
                if let Some(entry) = self.complete_entry(line) {
                    entries.push(entry);
                }
            } else if line.starts_with(EXTINF_PREFIX) {
                debug!("dropping unterminated info line at end of stream");
            }
        }

        self.pending = None;
        entries
    }

    /// best-effort utf-8: invalid sequences become U+FFFD, an incomplete
    /// trailing sequence is carried over to the next feed
    fn decode_chunk(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.byte_tail);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut input = bytes.as_slice();

        loop {
            match std::str::from_utf8(input) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let (valid, after) = input.split_at(e.valid_up_to());
                    if let Ok(s) = std::str::from_utf8(valid) {
                        out.push_str(s);
                    }
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &after[len..];
                        }
                        None => {
                            // split code point, wait for the rest
                            self.byte_tail = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    fn handle_line(&mut self, raw: &str, entries: &mut Vec<PlaylistEntry>) {
        let line = raw.trim_end_matches('\r').trim();

        if line.is_empty() || line.starts_with(HEADER_PREFIX) {
            return;
        }

        if let Some(content) = line.strip_prefix(EXTINF_PREFIX) {
            // a new info line throws away any previous unconsumed accumulator
            self.pending = Some(parse_extinf(content));
            return;
        }

        if line.starts_with("http") {
            if let Some(entry) = self.complete_entry(line) {
                entries.push(entry);
            }
            return;
        }

        // unrecognized directive or stray text, skip it
    }

    /// combine the pending accumulator with a url line. a url with no
    /// preceding info line yields nothing, either way the accumulator is gone
    fn complete_entry(&mut self, url: &str) -> Option<PlaylistEntry> {
        let acc = self.pending.take()?;

        // trailing title wins over tvg-name, "Unknown" is the compat fallback
        let display_name = if !acc.title.is_empty() {
            acc.title.clone()
        } else if let Some(name) = acc.name.clone().filter(|n| !n.is_empty()) {
            name
        } else {
            UNKNOWN_NAME.to_string()
        };

        let id = format!("entry-{}", self.next_index);
        self.next_index += 1;

        Some(PlaylistEntry {
            id,
            display_name,
            attribute_name: acc.name,
            logo_url: acc.logo,
            external_id: acc.id,
            country: acc.country,
            language: acc.language,
            group_name: acc.group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            media_url: url.to_string(),
        })
    }
}

/// parse the segment after "#EXTINF:". never fails, anything unreadable just
/// leaves the affected field empty
fn parse_extinf(content: &str) -> ExtinfAccumulator {
    let mut acc = ExtinfAccumulator::default();

    // the display title is the ",<text>" after the last attribute block, so
    // track where the attributes end. commas inside quoted values don't count
    let mut scan_from = DURATION_REGEX.find(content).map_or(0, |m| m.end());

    for caps in ATTR_REGEX.captures_iter(content) {
        let (Some(whole), Some(key), Some(value)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        scan_from = scan_from.max(whole.end());

        let value = value.as_str();
        if value.is_empty() {
            // empty attribute is the same as an absent one
            continue;
        }

        match key.as_str().to_ascii_lowercase().as_str() {
            "tvg-name" => acc.name = Some(value.to_string()),
            "tvg-logo" => acc.logo = Some(value.to_string()),
            "tvg-id" => acc.id = Some(value.to_string()),
            "tvg-country" => acc.country = Some(value.to_string()),
            "tvg-language" => acc.language = Some(value.to_string()),
            "group-title" => acc.group = Some(value.to_string()),
            // unrecognized keys are ignored on purpose
            _ => {}
        }
    }

    if let Some(comma) = content[scan_from..].find(',') {
        acc.title = content[scan_from + comma + 1..].trim().to_string();
    }

    acc
}
