use kudzu_core::KeyPath;
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,7}"
}

proptest! {
    /// Display and parse are inverses for any validly constructed path.
    #[test]
    fn display_parse_round_trips(segs in prop::collection::vec(segment(), 1..=6)) {
        let path = KeyPath::from_segments(segs.clone()).unwrap();
        let reparsed = KeyPath::parse(&path.to_string()).unwrap();
        prop_assert_eq!(reparsed, path);
    }

    /// first + rest decomposition loses nothing.
    #[test]
    fn first_rest_partition(segs in prop::collection::vec(segment(), 1..=6)) {
        let path = KeyPath::from_segments(segs.clone()).unwrap();
        match path.rest() {
            None => prop_assert_eq!(segs.len(), 1),
            Some(rest) => {
                prop_assert_eq!(rest.prefixed(path.first()), path);
            }
        }
    }

    /// Any parsed path has no empty segments and at least one segment.
    #[test]
    fn parsed_paths_are_well_formed(text in "[a-z.]{0,16}") {
        if let Ok(path) = KeyPath::parse(&text) {
            prop_assert!(path.len() >= 1);
            prop_assert!(path.segments().all(|s| !s.is_empty()));
        }
    }
}
