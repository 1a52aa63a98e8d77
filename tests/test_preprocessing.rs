//! Integration tests for the fitted preprocessor over the wine schema

use polars::prelude::*;

use vinoml::preprocessing::WinePreprocessor;
use vinoml::schema::{WineFeatures, FEATURE_COLUMNS};
use vinoml::VinoError;

fn wine_features_frame(n: usize) -> DataFrame {
    let columns: Vec<Column> = FEATURE_COLUMNS
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let values: Vec<f64> = (0..n)
                .map(|i| 0.3 + j as f64 + ((i * 5 + j) % 13) as f64 * 0.4)
                .collect();
            Series::new((*name).into(), &values).into()
        })
        .collect();
    DataFrame::new(columns).unwrap()
}

#[test]
fn test_fit_on_wine_schema_standardizes_every_feature() {
    let df = wine_features_frame(60);
    let mut pp = WinePreprocessor::new(&FEATURE_COLUMNS);
    let out = pp.fit_transform(&df).unwrap();

    assert_eq!(out.width(), 11);
    for name in FEATURE_COLUMNS {
        let col = out.column(name).unwrap().as_materialized_series();
        let ca = col.f64().unwrap();
        assert!(ca.mean().unwrap().abs() < 1e-8, "{} not centered", name);
        let std = ca.std(1).unwrap();
        assert!((std - 1.0).abs() < 0.05, "{} std = {}", name, std);
    }
}

#[test]
fn test_single_row_request_transforms_deterministically() {
    let df = wine_features_frame(60);
    let mut pp = WinePreprocessor::new(&FEATURE_COLUMNS);
    pp.fit(&df).unwrap();

    let sample = WineFeatures {
        fixed_acidity: 7.4,
        volatile_acidity: 0.7,
        citric_acid: 0.0,
        residual_sugar: 1.9,
        chlorides: 0.076,
        free_sulfur_dioxide: 11.0,
        total_sulfur_dioxide: 34.0,
        density: 0.9978,
        ph: 3.51,
        sulphates: 0.56,
        alcohol: 9.4,
    };
    let row = sample.to_dataframe().unwrap();

    let a = pp.transform(&row).unwrap();
    let b = pp.transform(&row).unwrap();
    for name in FEATURE_COLUMNS {
        let x = a.column(name).unwrap().as_materialized_series();
        let y = b.column(name).unwrap().as_materialized_series();
        let xv = x.f64().unwrap().get(0).unwrap();
        let yv = y.f64().unwrap().get(0).unwrap();
        assert_eq!(xv.to_bits(), yv.to_bits(), "{} differs across calls", name);
    }
}

#[test]
fn test_transform_never_refits() {
    // Transforming new data must not change the fitted parameters: the
    // same sample maps to the same output before and after other traffic.
    let df = wine_features_frame(60);
    let mut pp = WinePreprocessor::new(&FEATURE_COLUMNS);
    pp.fit(&df).unwrap();

    let row = wine_features_frame(1);
    let before = pp.transform(&row).unwrap();

    let other = wine_features_frame(40);
    pp.transform(&other).unwrap();

    let after = pp.transform(&row).unwrap();
    for name in FEATURE_COLUMNS {
        let x = before.column(name).unwrap().as_materialized_series();
        let y = after.column(name).unwrap().as_materialized_series();
        assert_eq!(
            x.f64().unwrap().get(0).unwrap().to_bits(),
            y.f64().unwrap().get(0).unwrap().to_bits()
        );
    }
}

#[test]
fn test_reordered_columns_are_rejected() {
    let df = wine_features_frame(30);
    let mut pp = WinePreprocessor::new(&FEATURE_COLUMNS);
    pp.fit(&df).unwrap();

    let mut reversed: Vec<&str> = FEATURE_COLUMNS.to_vec();
    reversed.reverse();
    let shuffled = df.select(reversed).unwrap();

    assert!(matches!(
        pp.transform(&shuffled),
        Err(VinoError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_saved_artifact_matches_in_memory_transform() {
    let df = wine_features_frame(60);
    let mut pp = WinePreprocessor::new(&FEATURE_COLUMNS);
    pp.fit(&df).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("preprocessor.json");
    pp.save(&path).unwrap();
    let loaded = WinePreprocessor::load(&path).unwrap();

    let row = wine_features_frame(5);
    let a = pp.transform(&row).unwrap();
    let b = loaded.transform(&row).unwrap();
    for name in FEATURE_COLUMNS {
        let xs = a.column(name).unwrap().as_materialized_series();
        let ys = b.column(name).unwrap().as_materialized_series();
        for (x, y) in xs.f64().unwrap().into_iter().zip(ys.f64().unwrap().into_iter()) {
            assert_eq!(x.unwrap().to_bits(), y.unwrap().to_bits());
        }
    }
}
