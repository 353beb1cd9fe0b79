#![allow(dead_code)]

use std::path::PathBuf;

use house_price::{
    data::Dataset,
    domain::{FeatureRow, FeatureValue, Schema},
    load_dataset,
};

pub fn sample_csv() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/melbourne_sample.csv")
}

pub fn sample_dataset() -> Dataset {
    load_dataset(sample_csv(), &Schema::housing()).expect("sample dataset loads")
}

const SUBURBS: [(&str, &str, &str); 4] = [
    ("Abbotsford", "Yarra", "Northern Metropolitan"),
    ("Richmond", "Yarra", "Northern Metropolitan"),
    ("Kew", "Boroondara", "Southern Metropolitan"),
    ("Footscray", "Maribyrnong", "Western Metropolitan"),
];

/// Row with every column filled; `i` varies the values deterministically
pub fn listing_row(i: usize) -> FeatureRow {
    let (suburb, council, region) = SUBURBS[i % SUBURBS.len()];
    let kind = ["h", "u", "t"][i % 3];
    let rooms = (i % 5 + 1) as f64;
    let mut row = FeatureRow::all_missing(&Schema::housing());
    row.set("rooms", FeatureValue::Number(rooms));
    row.set("bathroom", FeatureValue::Number((i % 2 + 1) as f64));
    row.set("car", FeatureValue::Number((i % 3) as f64));
    row.set("landsize", FeatureValue::Number(120.0 + 40.0 * rooms));
    row.set("buildingarea", FeatureValue::Number(60.0 + 25.0 * rooms));
    row.set("yearbuilt", FeatureValue::Number(1950.0 + (i % 60) as f64));
    row.set("building_age", FeatureValue::Number(68.0 - (i % 60) as f64));
    row.set("suburb", FeatureValue::parse_category(suburb));
    row.set("type", FeatureValue::parse_category(kind));
    row.set("councilarea", FeatureValue::parse_category(council));
    row.set("regionname", FeatureValue::parse_category(region));
    row
}

/// Synthetic table where price grows with rooms and suburb index
pub fn synthetic_dataset(n: usize) -> Dataset {
    let rows = (0..n)
        .map(|i| {
            let rooms = (i % 5 + 1) as f64;
            let price = 250_000.0 * rooms + 150_000.0 * (i % SUBURBS.len()) as f64 + 400_000.0;
            (listing_row(i), price)
        })
        .collect();
    Dataset::from_rows(Schema::housing(), rows).expect("synthetic dataset")
}
