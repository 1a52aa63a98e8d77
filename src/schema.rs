//! Canonical wine feature schema
//!
//! The 11 physicochemical measurements, in the exact order and with the
//! exact names (embedded spaces included) the preprocessor was fitted on.
//! Any divergence from this schema at serving time is a hard error.

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Feature columns in training order. Names must match the reference
/// dataset header byte-for-byte.
pub const FEATURE_COLUMNS: [&str; 11] = [
    "fixed acidity",
    "volatile acidity",
    "citric acid",
    "residual sugar",
    "chlorides",
    "free sulfur dioxide",
    "total sulfur dioxide",
    "density",
    "pH",
    "sulphates",
    "alcohol",
];

/// Target column of the reference dataset
pub const TARGET_COLUMN: &str = "quality";

/// One prediction request: the 11 measurements of a single wine sample.
///
/// Strict on the wire: all fields required, unknown fields rejected.
/// JSON uses the canonical spaced names; snake_case aliases are accepted
/// so the same struct backs the HTML form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WineFeatures {
    #[serde(rename = "fixed acidity", alias = "fixed_acidity")]
    pub fixed_acidity: f64,
    #[serde(rename = "volatile acidity", alias = "volatile_acidity")]
    pub volatile_acidity: f64,
    #[serde(rename = "citric acid", alias = "citric_acid")]
    pub citric_acid: f64,
    #[serde(rename = "residual sugar", alias = "residual_sugar")]
    pub residual_sugar: f64,
    pub chlorides: f64,
    #[serde(rename = "free sulfur dioxide", alias = "free_sulfur_dioxide")]
    pub free_sulfur_dioxide: f64,
    #[serde(rename = "total sulfur dioxide", alias = "total_sulfur_dioxide")]
    pub total_sulfur_dioxide: f64,
    pub density: f64,
    #[serde(rename = "pH")]
    pub ph: f64,
    pub sulphates: f64,
    pub alcohol: f64,
}

impl WineFeatures {
    /// Values in canonical column order
    pub fn values(&self) -> [f64; 11] {
        [
            self.fixed_acidity,
            self.volatile_acidity,
            self.citric_acid,
            self.residual_sugar,
            self.chlorides,
            self.free_sulfur_dioxide,
            self.total_sulfur_dioxide,
            self.density,
            self.ph,
            self.sulphates,
            self.alcohol,
        ]
    }

    /// Build a single-row DataFrame with the canonical column names,
    /// the shape the fitted preprocessor expects.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let values = self.values();
        let columns: Vec<Column> = FEATURE_COLUMNS
            .iter()
            .zip(values.iter())
            .map(|(name, &v)| Series::new((*name).into(), &[v]).into())
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

/// Check that a DataFrame carries exactly the canonical feature columns,
/// in order.
pub fn feature_schema_matches(df: &DataFrame) -> bool {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    names.len() == FEATURE_COLUMNS.len()
        && names.iter().zip(FEATURE_COLUMNS.iter()).all(|(a, b)| a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WineFeatures {
        WineFeatures {
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
        }
    }

    #[test]
    fn test_canonical_json_names_accepted() {
        let json = r#"{
            "fixed acidity": 7.4, "volatile acidity": 0.7, "citric acid": 0.0,
            "residual sugar": 1.9, "chlorides": 0.076,
            "free sulfur dioxide": 11.0, "total sulfur dioxide": 34.0,
            "density": 0.9978, "pH": 3.51, "sulphates": 0.56, "alcohol": 9.4
        }"#;
        let features: WineFeatures = serde_json::from_str(json).unwrap();
        assert_eq!(features.fixed_acidity, 7.4);
        assert_eq!(features.ph, 3.51);
    }

    #[test]
    fn test_snake_case_aliases_accepted() {
        let json = r#"{
            "fixed_acidity": 7.4, "volatile_acidity": 0.7, "citric_acid": 0.0,
            "residual_sugar": 1.9, "chlorides": 0.076,
            "free_sulfur_dioxide": 11.0, "total_sulfur_dioxide": 34.0,
            "density": 0.9978, "pH": 3.51, "sulphates": 0.56, "alcohol": 9.4
        }"#;
        let features: WineFeatures = serde_json::from_str(json).unwrap();
        assert_eq!(features, sample());
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = r#"{"fixed acidity": 7.4}"#;
        assert!(serde_json::from_str::<WineFeatures>(json).is_err());
    }

    #[test]
    fn test_extra_field_rejected() {
        let json = r#"{
            "fixed acidity": 7.4, "volatile acidity": 0.7, "citric acid": 0.0,
            "residual sugar": 1.9, "chlorides": 0.076,
            "free sulfur dioxide": 11.0, "total sulfur dioxide": 34.0,
            "density": 0.9978, "pH": 3.51, "sulphates": 0.56, "alcohol": 9.4,
            "vintage": 1998
        }"#;
        assert!(serde_json::from_str::<WineFeatures>(json).is_err());
    }

    #[test]
    fn test_non_numeric_rejected() {
        let json = r#"{
            "fixed acidity": "not_a_number", "volatile acidity": 0.7,
            "citric acid": 0.0, "residual sugar": 1.9, "chlorides": 0.076,
            "free sulfur dioxide": 11.0, "total sulfur dioxide": 34.0,
            "density": 0.9978, "pH": 3.51, "sulphates": 0.56, "alcohol": 9.4
        }"#;
        assert!(serde_json::from_str::<WineFeatures>(json).is_err());
    }

    #[test]
    fn test_to_dataframe_preserves_order() {
        let df = sample().to_dataframe().unwrap();
        assert_eq!(df.height(), 1);
        assert!(feature_schema_matches(&df));
    }

    #[test]
    fn test_values_match_field_order() {
        let values = sample().values();
        assert_eq!(values[0], 7.4);
        assert_eq!(values[8], 3.51);
        assert_eq!(values[10], 9.4);
    }
}
