use scriptorium_backend::canon::{books_in, BOOKS, Testament};
use scriptorium_backend::parse_reference;
use scriptorium_backend::reference::{format_reference_id, Reference};

#[test]
fn test_every_display_name_parses() {
    for book in BOOKS.iter() {
        let raw = format!("{} 3:5", book.display_name);
        let r = parse_reference(&raw).unwrap_or_else(|| panic!("failed to parse {}", raw));
        assert_eq!(r.book.order, book.order);
        assert_eq!(r.chapter, 3);
        assert_eq!(r.verse, Some(5));
        assert_eq!(r.to_string(), raw);
    }
}

#[test]
fn test_testament_of_parsed_reference() {
    assert_eq!(books_in(Testament::Old).last().map(|b| b.code), Some("MAL"));
    assert_eq!(parse_reference("MAL 4:6").map(|r| r.book.testament), Some(Testament::Old));
    assert_eq!(parse_reference("MAT 1:1").map(|r| r.book.testament), Some(Testament::New));
}

#[test]
fn test_alias_codes() {
    assert_eq!(parse_reference("SOL 2:1").map(|r| r.book.code), Some("SNG"));
    assert_eq!(parse_reference("JOH 3:16").map(|r| r.book.code), Some("JHN"));
    assert_eq!(parse_reference("1JO 4:8").map(|r| r.book.code), Some("1JN"));
    assert_eq!(parse_reference("Psalm 23:1").map(|r| r.book.order), Some(19));
}

#[test]
fn test_malformed_references() {
    for raw in ["", "   ", "Genesis", "XYZ 1:1", "GEN", "GEN x:1", "GEN 0:1", "Narnia 3:5", "3:5"] {
        assert!(parse_reference(raw).is_none(), "expected None for {:?}", raw);
    }
}

#[test]
fn test_keys_and_ids() {
    let r = parse_reference("1 Samuel 3:4").unwrap();
    assert_eq!(r.verse_key(), "1-samuel-3-4");
    assert_eq!(r.chapter_key(), "1-samuel-3");
    assert_eq!(Reference::from_key("1-samuel-3-4"), Some(r));
    assert_eq!(Reference::from_key("song-of-solomon-2").map(|c| c.to_string()), Some("Song of Solomon 2".to_string()));

    assert_eq!(format_reference_id("EXO 20:2"), "Exodus 20:2");
    assert_eq!(format_reference_id("???"), "???");
}
