//! Raw property listings as they arrive from the form, the JSON API or the CLI.
//!
//! Every field is optional free text. Conversion into a [`FeatureRow`] routes
//! anything blank or unparseable to imputation instead of failing.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::row::{FeatureRow, FeatureValue};
use crate::domain::schema::{ColumnKind, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(default, deserialize_with = "lenient_text")]
    pub rooms: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bathroom: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub car: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub landsize: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub buildingarea: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub yearbuilt: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub building_age: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub suburb: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", rename = "type")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub councilarea: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub regionname: Option<String>,
}

impl RawListing {
    /// Raw text for a housing schema column
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "rooms" => &self.rooms,
            "bathroom" => &self.bathroom,
            "car" => &self.car,
            "landsize" => &self.landsize,
            "buildingarea" => &self.buildingarea,
            "yearbuilt" => &self.yearbuilt,
            "building_age" => &self.building_age,
            "suburb" => &self.suburb,
            "type" => &self.property_type,
            "councilarea" => &self.councilarea,
            "regionname" => &self.regionname,
            _ => return None,
        };
        value.as_deref()
    }

    /// Build a row in schema order; absent fields become missing
    pub fn to_feature_row(&self, schema: &Schema) -> FeatureRow {
        let mut row = FeatureRow::new();
        for spec in schema.columns() {
            let raw = self.field(&spec.name).unwrap_or("");
            let value = match spec.kind {
                ColumnKind::Numeric => FeatureValue::parse_number(raw),
                ColumnKind::Categorical => FeatureValue::parse_category(raw),
            };
            row.push(spec.name.clone(), value);
        }
        row
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientScalar {
    Text(String),
    Number(f64),
    Flag(bool),
    Other(IgnoredAny),
}

/// Accept strings, numbers, booleans or null. Arrays and objects are treated
/// as absent so the column is imputed.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LenientScalar>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        LenientScalar::Text(s) => Some(s),
        LenientScalar::Number(n) => Some(n.to_string()),
        LenientScalar::Flag(b) => Some(b.to_string()),
        LenientScalar::Other(_) => None,
    }))
}
