//! Property tests for paging parameters: any input yields an in-range page.

use proptest::prelude::*;

use marginalia_search::core::Modifier;
use marginalia_search::query::{LIMIT_DEFAULT, LIMIT_MAX, Limiter, OFFSET_DEFAULT, OFFSET_MAX};
use marginalia_search::{Params, QueryBuilder};

fn page(params: &[(&str, &str)]) -> (usize, usize) {
    let mut params: Params = params.iter().copied().collect();
    let builder = Limiter
        .apply(QueryBuilder::new(), &mut params)
        .expect("limiter never fails");
    assert!(params.is_empty());
    (builder.from(), builder.size())
}

proptest! {
    #[test]
    fn limit_from_any_string_is_in_range(text in ".*") {
        let (_, size) = page(&[("limit", text.as_str())]);
        prop_assert!(size <= LIMIT_MAX);
    }

    #[test]
    fn limit_from_any_integer_is_in_range(limit in any::<i64>()) {
        let text = limit.to_string();
        let (_, size) = page(&[("limit", text.as_str())]);
        prop_assert!(size <= LIMIT_MAX);
        if limit < 0 {
            prop_assert_eq!(size, LIMIT_DEFAULT);
        }
    }

    #[test]
    fn limit_in_range_passes_through(limit in 0..=LIMIT_MAX) {
        let text = limit.to_string();
        let (_, size) = page(&[("limit", text.as_str())]);
        prop_assert_eq!(size, limit);
    }

    #[test]
    fn offset_from_any_string_is_in_range(text in "\\PC*") {
        let (from, _) = page(&[("offset", text.as_str())]);
        prop_assert!(from <= OFFSET_MAX);
    }

    #[test]
    fn offset_in_range_passes_through(offset in 0..=OFFSET_MAX) {
        let text = offset.to_string();
        let (from, _) = page(&[("offset", text.as_str())]);
        prop_assert_eq!(from, offset);
    }
}

#[test]
fn test_offset_examples() {
    let cases = [
        ("7", 7),
        ("42", 42),
        ("23", 23),
        ("foo", OFFSET_DEFAULT),
        ("", OFFSET_DEFAULT),
        ("   ", OFFSET_DEFAULT),
        ("-23", OFFSET_DEFAULT),
        ("32.7", OFFSET_DEFAULT),
        ("9801", OFFSET_MAX),
    ];
    for (raw, expected) in cases {
        assert_eq!(page(&[("offset", raw)]).0, expected, "offset={raw:?}");
    }
}

#[test]
fn test_missing_params_use_defaults() {
    assert_eq!(page(&[]), (OFFSET_DEFAULT, LIMIT_DEFAULT));
}
