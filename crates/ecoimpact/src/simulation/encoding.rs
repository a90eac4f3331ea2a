use crate::simulation::artifacts::ModelKind;
use crate::simulation::features::{FeatureRecord, FeatureValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Categorical field name to ordered class list; a class's code is its index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodingTable {
    classes: BTreeMap<String, Vec<String>>,
}

impl EncodingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field<I, S>(mut self, field: impl Into<String>, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes
            .insert(field.into(), classes.into_iter().map(Into::into).collect());
        self
    }

    pub fn classes(&self, field: &str) -> Option<&[String]> {
        self.classes.get(field).map(Vec::as_slice)
    }

    pub fn code(&self, field: &str, value: &str) -> Option<usize> {
        self.classes(field)?
            .iter()
            .position(|class| class == value)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodingError {
    #[error("encoding table for the {model} model is not loaded")]
    TableUnavailable { model: ModelKind },
    #[error("categorical features are blank: {}", .fields.join(", "))]
    NullCategory { fields: Vec<&'static str> },
    #[error(
        "feature '{field}' value '{value}' is not in encoder classes; valid values: [{}]",
        .valid.join(", ")
    )]
    UnknownCategory {
        field: &'static str,
        value: String,
        valid: Vec<String>,
    },
    #[error("encoding table has no classes for feature '{field}'")]
    UntabledField { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("non-finite values after encoding in features: {}", .fields.join(", "))]
pub struct NumericValidationError {
    pub fields: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    NumericValidation(#[from] NumericValidationError),
}

/// Encodes `record` into the numeric vector its model expects.
///
/// Categories are replaced by their class index. No value is clamped or
/// imputed: a blank or unknown category, or any NaN/Inf left afterwards,
/// is an error naming the offending fields.
pub fn encode<const N: usize, R: FeatureRecord<N>>(
    record: &R,
    table: Option<&EncodingTable>,
) -> Result<[f64; N], EncodeError> {
    let table = table.ok_or(EncodingError::TableUnavailable { model: R::MODEL })?;
    let values = record.values();

    let blank: Vec<&'static str> = R::SCHEMA
        .into_iter()
        .zip(values.iter())
        .filter(|(_, value)| matches!(value, FeatureValue::Category(None)))
        .map(|(name, _)| name)
        .collect();
    if !blank.is_empty() {
        return Err(EncodingError::NullCategory { fields: blank }.into());
    }

    let mut encoded = [0.0; N];
    for (slot, (field, value)) in encoded.iter_mut().zip(R::SCHEMA.into_iter().zip(values)) {
        *slot = match value {
            FeatureValue::Number(number) => number,
            FeatureValue::Category(None) => f64::NAN,
            FeatureValue::Category(Some(category)) => {
                let classes = table
                    .classes(field)
                    .ok_or(EncodingError::UntabledField { field })?;
                let code = classes
                    .iter()
                    .position(|class| class == category)
                    .ok_or_else(|| EncodingError::UnknownCategory {
                        field,
                        value: category.to_string(),
                        valid: classes.to_vec(),
                    })?;
                code as f64
            }
        };
    }

    let non_finite: Vec<&'static str> = R::SCHEMA
        .into_iter()
        .zip(encoded.iter())
        .filter(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
        .collect();
    if !non_finite.is_empty() {
        return Err(NumericValidationError { fields: non_finite }.into());
    }

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::features::{
        SuccessFeatures, FOSSIL_FUEL_DEPENDENCY, GDP, INCOME_GROUP, REGION, TYPE,
    };

    fn table() -> EncodingTable {
        EncodingTable::new()
            .with_field(TYPE, ["Carbon tax", "ETS"])
            .with_field(REGION, ["East Asia & Pacific", "Europe & Central Asia"])
            .with_field(INCOME_GROUP, ["High income", "Upper middle income"])
    }

    fn record() -> SuccessFeatures {
        SuccessFeatures {
            policy_type: "ETS".to_string(),
            region: "Europe & Central Asia".to_string(),
            income_group: "Upper middle income".to_string(),
            year: 2025,
            fossil_share_pct: 55.0,
            gdp_usd: 1.0e12,
        }
    }

    #[test]
    fn encodes_categories_by_class_index() {
        let encoded = encode(&record(), Some(&table())).expect("encodes");
        assert_eq!(encoded, [1.0, 1.0, 1.0, 2025.0, 55.0, 1.0e12]);
    }

    #[test]
    fn unknown_category_lists_valid_values() {
        let mut record = record();
        record.region = "Atlantis".to_string();
        match encode(&record, Some(&table())) {
            Err(EncodeError::Encoding(EncodingError::UnknownCategory {
                field,
                value,
                valid,
            })) => {
                assert_eq!(field, REGION);
                assert_eq!(value, "Atlantis");
                assert_eq!(valid.len(), 2);
            }
            other => panic!("expected unknown category, got {other:?}"),
        }
    }

    #[test]
    fn padded_category_is_not_cleaned_up() {
        let mut record = record();
        record.region = " Europe & Central Asia".to_string();
        match encode(&record, Some(&table())) {
            Err(EncodeError::Encoding(EncodingError::UnknownCategory { field, value, .. })) => {
                assert_eq!(field, REGION);
                assert_eq!(value, " Europe & Central Asia");
            }
            other => panic!("expected unknown category, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_numbers_are_rejected_by_name() {
        let mut record = record();
        record.fossil_share_pct = f64::NAN;
        record.gdp_usd = f64::INFINITY;
        match encode(&record, Some(&table())) {
            Err(EncodeError::NumericValidation(error)) => {
                assert_eq!(error.fields, vec![FOSSIL_FUEL_DEPENDENCY, GDP]);
            }
            other => panic!("expected numeric validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_table_and_untabled_field_fail() {
        assert!(matches!(
            encode(&record(), None),
            Err(EncodeError::Encoding(EncodingError::TableUnavailable {
                model: ModelKind::Success
            }))
        ));

        let partial = EncodingTable::new().with_field(TYPE, ["ETS"]);
        assert!(matches!(
            encode(&record(), Some(&partial)),
            Err(EncodeError::Encoding(EncodingError::UntabledField { field: REGION }))
        ));
    }

    #[test]
    fn table_deserializes_from_class_lists() {
        let table: EncodingTable =
            serde_json::from_str(r#"{"Type": ["Carbon tax", "ETS"]}"#).expect("json");
        assert_eq!(table.code(TYPE, "ETS"), Some(1));
        assert_eq!(table.code(TYPE, "Cap"), None);
        assert_eq!(table.code(REGION, "ETS"), None);
    }
}
