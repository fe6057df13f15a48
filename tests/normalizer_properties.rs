//! Property checks for the transform stage

use std::collections::HashSet;

use fashion_etl_lib::application::ProductNormalizer;
use fashion_etl_lib::domain::RawProduct;
use fashion_etl_lib::domain::product::fields;
use proptest::prelude::*;

fn title() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[A-D] [0-9]",
        1 => Just("Unknown Product".to_string()),
        1 => Just("  ".to_string()),
    ]
}

fn price() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "\\$[0-9]{1,4}(\\.[0-9]{2})?",
        1 => Just("Price Unavailable".to_string()),
        1 => "[a-z]{0,4}",
    ]
}

fn rating() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "Rating: ⭐ [0-5]\\.[0-9] / 5",
        1 => Just("Invalid Rating / 5".to_string()),
        1 => Just("Not Rated".to_string()),
    ]
}

fn colors() -> impl Strategy<Value = String> {
    prop_oneof![4 => "[0-9]{1,2} Colors", 1 => Just("Colors".to_string())]
}

fn raw_product() -> impl Strategy<Value = RawProduct> {
    (title(), price(), rating(), colors(), "S|M|L|XL", "Men|Women|Unisex").prop_map(
        |(title, price, rating, colors, size, gender)| {
            RawProduct::new()
                .with(fields::TITLE, title)
                .with(fields::PRICE, price)
                .with(fields::RATING, rating)
                .with(fields::COLORS, colors)
                .with(fields::SIZE, size)
                .with(fields::GENDER, gender)
                .with(fields::TIMESTAMP, "2025-05-01 12:00:00")
        },
    )
}

proptest! {
    #[test]
    fn titles_are_unique(raw in prop::collection::vec(raw_product(), 0..40)) {
        let table = ProductNormalizer::default().normalize(&raw);
        let mut seen = HashSet::new();
        for row in &table {
            prop_assert!(seen.insert(row.title.clone()), "duplicate title {}", row.title);
        }
    }

    #[test]
    fn rows_satisfy_value_invariants(raw in prop::collection::vec(raw_product(), 0..40)) {
        let table = ProductNormalizer::default().normalize(&raw);
        for row in &table {
            prop_assert!(row.price.is_finite() && row.price > 0.0);
            prop_assert!(row.rating.is_finite());
            prop_assert!(!row.title.trim().is_empty());
            prop_assert_ne!(row.title.as_str(), "Unknown Product");
        }
        prop_assert!(table.len() <= raw.len());
    }

    #[test]
    fn first_valid_row_wins(raw in prop::collection::vec(raw_product(), 0..40)) {
        let normalizer = ProductNormalizer::new(1.0);
        let table = normalizer.normalize(&raw);
        for row in &table {
            // the surviving row must equal normalizing the first valid record with its title alone
            let first = raw
                .iter()
                .filter(|r| r.title() == Some(row.title.as_str()))
                .find(|r| !normalizer.normalize(std::slice::from_ref(*r)).is_empty())
                .cloned();
            prop_assert!(first.is_some());
            let alone = normalizer.normalize(&[first.unwrap()]);
            prop_assert_eq!(&alone.rows()[0], row);
        }
    }

    #[test]
    fn normalizing_twice_is_stable_at_neutral_rate(raw in prop::collection::vec(raw_product(), 0..40)) {
        let normalizer = ProductNormalizer::new(1.0);
        let once = normalizer.normalize(&raw);
        let twice = normalizer.normalize(&once.to_raw_products());
        prop_assert_eq!(once, twice);
    }
}
