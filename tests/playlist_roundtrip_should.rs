use playlist_edge::playlist::{GroupSummary, M3uGenerator, M3uStreamParser, PlaylistEntry};

fn parse_all(input: &[u8]) -> Vec<PlaylistEntry> {
    let mut parser = M3uStreamParser::new();
    let mut entries = parser.feed(input);
    entries.extend(parser.finish());
    entries
}

fn entry(name: &str, group: &str, url: &str) -> PlaylistEntry {
    PlaylistEntry {
        id: String::new(),
        display_name: name.to_string(),
        attribute_name: None,
        logo_url: None,
        external_id: None,
        country: None,
        language: None,
        group_name: group.to_string(),
        media_url: url.to_string(),
    }
}

#[test]
fn test_parse_of_generate_reproduces_entries() {
    let mut a = entry("Channel One", "News", "http://x/one.ts");
    a.attribute_name = Some("Channel One HD".to_string());
    a.logo_url = Some("http://x/one.png".to_string());
    a.external_id = Some("one".to_string());
    let b = entry("Channel Two", "Sports", "http://x/two.ts");
    let c = entry("Channel Three", "News", "http://x/three.ts");
    let original = vec![a, b, c];

    let text = M3uGenerator::generate(&original);
    let parsed = parse_all(text.as_bytes());

    assert_eq!(parsed.len(), original.len());
    for (p, o) in parsed.iter().zip(original.iter()) {
        assert_eq!(p.display_name, o.display_name);
        assert_eq!(p.group_name, o.group_name);
        assert_eq!(p.media_url, o.media_url);
    }
    // non-empty optional attributes survive the trip too
    assert_eq!(parsed[0].attribute_name.as_deref(), Some("Channel One HD"));
    assert_eq!(parsed[0].logo_url.as_deref(), Some("http://x/one.png"));
    assert_eq!(parsed[0].external_id.as_deref(), Some("one"));
}

#[test]
fn test_ids_are_fresh_per_parse_run() {
    let text = M3uGenerator::generate(&[
        entry("A", "G", "http://x/a"),
        entry("B", "G", "http://x/b"),
    ]);

    let first = parse_all(text.as_bytes());
    let second = parse_all(text.as_bytes());

    assert_eq!(first[0].id, "entry-0");
    assert_eq!(first[1].id, "entry-1");
    // each run starts over, ids are only unique within one run
    assert_eq!(second[0].id, "entry-0");
}

#[test]
fn test_group_summary_counts_and_order() {
    let entries = parse_all(
        b"#EXTM3U\n\
          #EXTINF:-1 group-title=\"Zeta\",A\nhttp://x/a\n\
          #EXTINF:-1,B\nhttp://x/b\n\
          #EXTINF:-1 group-title=\"Zeta\",C\nhttp://x/c\n\
          #EXTINF:-1,D\nhttp://x/d\n",
    );

    let groups = GroupSummary::from_entries(&entries);
    // first-encountered order, not alphabetical
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "Zeta");
    assert_eq!(groups[0].count, 2);
    assert_eq!(groups[1].name, "Other");
    assert_eq!(groups[1].count, 2);
}

#[test]
fn test_consecutive_info_lines_without_url_yield_nothing() {
    let entries = parse_all(b"#EXTINF:-1,First\n#EXTINF:-1,Second\n");
    assert!(entries.is_empty());
}

#[test]
fn test_chunked_feed_matches_single_feed() {
    let input = "#EXTM3U\n#EXTINF:-1 tvg-name=\"A\" group-title=\"G1\",A\nhttp://x/a\n#EXTINF:-1 tvg-name=\"B\",B\nhttp://x/b\n";
    let whole = parse_all(input.as_bytes());

    // feed in tiny fixed-size chunks like the upload path does, just smaller
    for chunk_size in [1, 3, 7, 16] {
        let mut parser = M3uStreamParser::new();
        let mut entries = Vec::new();
        for chunk in input.as_bytes().chunks(chunk_size) {
            entries.extend(parser.feed(chunk));
        }
        entries.extend(parser.finish());

        assert_eq!(entries.len(), whole.len(), "chunk size {chunk_size}");
        for (a, b) in entries.iter().zip(whole.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.display_name, b.display_name);
            assert_eq!(a.group_name, b.group_name);
            assert_eq!(a.media_url, b.media_url);
        }
    }
}

#[test]
fn test_default_filename_has_count_and_datestamp() {
    let entries = vec![
        entry("My List", "G", "http://x/a"),
        entry("B", "G", "http://x/b"),
    ];
    let name = M3uGenerator::default_filename(&entries);
    assert!(name.starts_with("My List_2_items_20"), "got {name}");
}
