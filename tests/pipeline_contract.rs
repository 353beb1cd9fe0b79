mod common;

use house_price::{
    data::{read_dataset, train_test_split, Dataset},
    domain::{FeatureRow, FeatureValue, RawListing, Schema},
    ml::{BoosterParams, PricePipeline, RegressionMetrics},
    PredictorError,
};

fn quick_params() -> BoosterParams {
    BoosterParams {
        n_estimators: 40,
        ..Default::default()
    }
}

#[test]
fn example_listing_gets_one_positive_price() {
    let dataset = common::sample_dataset();
    let pipeline = PricePipeline::fit(&dataset, &BoosterParams::default()).unwrap();

    let listing = RawListing {
        rooms: Some("3".into()),
        bathroom: Some("2".into()),
        car: Some("1".into()),
        landsize: Some("NaN".into()),
        buildingarea: Some("NaN".into()),
        yearbuilt: Some("NaN".into()),
        building_age: Some("NaN".into()),
        suburb: Some("Abbotsford".into()),
        property_type: Some("h".into()),
        councilarea: Some("Yarra".into()),
        regionname: Some("Northern Metropolitan".into()),
    };
    let row = listing.to_feature_row(pipeline.schema());
    assert_eq!(
        row.missing_columns(),
        vec!["landsize", "buildingarea", "yearbuilt", "building_age"]
    );

    let price = pipeline.predict(&row).unwrap();
    assert!(price.is_finite());
    assert!(price > 0.0);
}

#[test]
fn every_full_row_yields_a_finite_non_negative_scalar() {
    let dataset = common::synthetic_dataset(120);
    let pipeline = PricePipeline::fit(&dataset, &quick_params()).unwrap();
    for i in 0..30 {
        let price = pipeline.predict(&common::listing_row(i)).unwrap();
        assert!(price.is_finite() && price >= 0.0, "row {i}: {price}");
    }
}

#[test]
fn all_missing_row_still_predicts() {
    let dataset = common::synthetic_dataset(120);
    let pipeline = PricePipeline::fit(&dataset, &quick_params()).unwrap();
    let row = FeatureRow::all_missing(&Schema::housing());
    let price = pipeline.predict(&row).unwrap();
    assert!(price.is_finite() && price >= 0.0);

    let blank = RawListing::default().to_feature_row(pipeline.schema());
    assert_eq!(pipeline.predict(&blank).unwrap(), price);
}

#[test]
fn unseen_category_encodes_as_zero_block() {
    let dataset = common::synthetic_dataset(120);
    let pipeline = PricePipeline::fit(&dataset, &quick_params()).unwrap();
    let pre = pipeline.preprocessor();
    let block = pre.categorical_block("suburb").unwrap();
    assert_eq!(block.len(), 4);

    let mut unseen = common::listing_row(2);
    unseen.set("suburb", FeatureValue::parse_category("Atlantis"));
    let encoded_unseen = pre.transform_row(&unseen).unwrap();
    assert!(encoded_unseen[block.clone()].iter().all(|v| *v == 0.0));

    let mut zeroed = pre.transform_row(&common::listing_row(2)).unwrap();
    for v in &mut zeroed[block] {
        *v = 0.0;
    }
    assert_eq!(encoded_unseen, zeroed);

    let direct = pipeline.model().predict(&zeroed).unwrap().max(0.0);
    assert_eq!(pipeline.predict(&unseen).unwrap(), direct);
}

#[test]
fn refitting_with_the_same_seed_is_reproducible() {
    let dataset = common::synthetic_dataset(150);
    let params = BoosterParams {
        n_estimators: 30,
        bagging_fraction: 0.7,
        bagging_freq: 1,
        feature_fraction: 0.8,
        seed: 7,
        ..Default::default()
    };
    let a = PricePipeline::fit(&dataset, &params).unwrap();
    let b = PricePipeline::fit(&dataset, &params).unwrap();
    assert_eq!(
        a.predict_table(&dataset.table).unwrap(),
        b.predict_table(&dataset.table).unwrap()
    );
}

#[test]
fn two_row_table_with_ten_estimators() {
    let rows = vec![(common::listing_row(0), 500_000.0), (common::listing_row(1), 700_000.0)];
    let dataset = Dataset::from_rows(Schema::housing(), rows).unwrap();
    let params = BoosterParams {
        n_estimators: 10,
        ..Default::default()
    };
    let pipeline = PricePipeline::fit(&dataset, &params).unwrap();
    let predictions = pipeline.predict_table(&dataset.table).unwrap();
    assert_eq!(predictions.len(), 2);
    assert!(predictions.iter().all(|p| p.is_finite()));
    assert_eq!(pipeline.model().n_trees(), 10);
}

#[test]
fn hold_out_evaluation_beats_the_mean() {
    let dataset = common::synthetic_dataset(300);
    let (train, test) = train_test_split(&dataset, 0.2, 42).unwrap();
    assert_eq!(train.len() + test.len(), 300);

    let pipeline = PricePipeline::fit(&train, &BoosterParams::default()).unwrap();
    let predictions = pipeline.predict_table(&test.table).unwrap();
    let metrics = RegressionMetrics::compute(&predictions, &test.target).unwrap();
    assert_eq!(metrics.count, test.len());
    assert!(metrics.r2 > 0.5, "r2 = {}", metrics.r2);
}

#[test]
fn dataset_without_a_feature_column_is_rejected() {
    let csv = "rooms,type,price\n3,h,1000000\n";
    let err = read_dataset(csv.as_bytes(), &Schema::housing()).unwrap_err();
    assert!(matches!(err, PredictorError::MissingColumn(_)), "{err}");
}

#[test]
fn row_from_another_schema_is_a_client_error() {
    let dataset = common::synthetic_dataset(60);
    let pipeline = PricePipeline::fit(&dataset, &quick_params()).unwrap();
    let row = FeatureRow::new().with("rooms", FeatureValue::Number(2.0));
    let err = pipeline.predict(&row).unwrap_err();
    assert!(err.is_client_error());
}
