/// filename handling shared by the playlist download and the proxy. headers
/// and filesystems both choke on odd characters so everything gets the same
/// treatment: drop control and illegal characters, collapse whitespace, trim
/// trailing dots/spaces, cap the length

const MAX_FILENAME_LEN: usize = 120;
const DEFAULT_FILENAME: &str = "download";

// illegal across the common filesystems (ntfs being the fussiest)
const ILLEGAL_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !ILLEGAL_CHARS.contains(c))
        .collect();

    let mut collapsed = String::with_capacity(cleaned.len());
    let mut last_was_space = false;
    for c in cleaned.trim().chars() {
        if c.is_whitespace() {
            if !last_was_space {
                collapsed.push(' ');
            }
            last_was_space = true;
        } else {
            collapsed.push(c);
            last_was_space = false;
        }
    }

    // windows also refuses names ending in a dot or space
    let mut result = collapsed.trim_end_matches(['.', ' ']).to_string();

    if result.len() > MAX_FILENAME_LEN {
        let cut = (1..=MAX_FILENAME_LEN)
            .rev()
            .find(|i| result.is_char_boundary(*i))
            .unwrap_or(0);
        result.truncate(cut);
    }

    if result.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        result
    }
}

/// attachment header with an ascii fallback plus the rfc 5987 utf-8 form for
/// clients that understand it
pub fn content_disposition(filename: &str) -> String {
    let sanitized = sanitize_filename(filename);

    let ascii: String = sanitized
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    let ascii = if ascii.trim_matches('_').is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        ascii
    };

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(&sanitized)
    )
}
