use crate::simulation::artifacts::{Classifier, ModelArtifacts, ModelKind, Regressor};
use crate::simulation::domain::{PredictionResult, RiskTier, SuccessPrediction};
use crate::simulation::encoding::{encode, EncodeError, EncodingError, NumericValidationError};
use crate::simulation::features::{
    blank_categories, AssembledFeatures, RevenueFeatures, SuccessFeatures,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("country metadata resolution failed; blank features: {}", .fields.join(", "))]
    MetadataResolution { fields: Vec<&'static str> },
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    NumericValidation(#[from] NumericValidationError),
    #[error("{model} {artifact} is not loaded")]
    ModelUnavailable {
        model: ModelKind,
        artifact: &'static str,
    },
}

impl PredictionError {
    /// Service-not-ready, as opposed to a problem with the request's data.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable { .. })
    }
}

impl From<EncodeError> for PredictionError {
    fn from(error: EncodeError) -> Self {
        match error {
            EncodeError::Encoding(EncodingError::TableUnavailable { model }) => {
                Self::ModelUnavailable {
                    model,
                    artifact: "encoding table",
                }
            }
            EncodeError::Encoding(EncodingError::NullCategory { fields }) => {
                Self::MetadataResolution { fields }
            }
            EncodeError::Encoding(inner) => Self::Encoding(inner),
            EncodeError::NumericValidation(inner) => Self::NumericValidation(inner),
        }
    }
}

/// Runs the revenue regressor and success classifier on assembled features.
#[derive(Debug, Clone)]
pub struct PredictionOrchestrator {
    artifacts: Arc<ModelArtifacts>,
}

impl PredictionOrchestrator {
    pub fn new(artifacts: Arc<ModelArtifacts>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Raw regressor output, million USD.
    pub fn predict_revenue(&self, record: &RevenueFeatures) -> Result<f64, PredictionError> {
        let model = self
            .artifacts
            .revenue_model()
            .ok_or(PredictionError::ModelUnavailable {
                model: ModelKind::Revenue,
                artifact: "model",
            })?;
        ensure_resolved(blank_categories(record))?;

        let vector = encode(record, self.artifacts.revenue_table())?;
        let revenue = model.predict(&vector);
        tracing::debug!(revenue_million_usd = revenue, "revenue predicted");
        Ok(revenue)
    }

    pub fn predict_success(
        &self,
        record: &SuccessFeatures,
    ) -> Result<SuccessPrediction, PredictionError> {
        let model = self
            .artifacts
            .success_model()
            .ok_or(PredictionError::ModelUnavailable {
                model: ModelKind::Success,
                artifact: "model",
            })?;
        ensure_resolved(blank_categories(record))?;

        let vector = encode(record, self.artifacts.success_table())?;
        let [abolished, implemented] = model.predict_probabilities(&vector);
        let risk_tier = RiskTier::from_abolished_probability(abolished);
        tracing::debug!(abolished, implemented, ?risk_tier, "success predicted");

        Ok(SuccessPrediction {
            probability: implemented,
            abolished_probability: abolished,
            risk_tier,
        })
    }

    pub fn predict(&self, features: &AssembledFeatures) -> Result<PredictionResult, PredictionError> {
        let revenue_million_usd = self.predict_revenue(&features.revenue)?;
        let success = self.predict_success(&features.success)?;
        Ok(PredictionResult {
            revenue_million_usd,
            success_probability: success.probability,
            risk_tier: success.risk_tier,
        })
    }
}

fn ensure_resolved(blank: Vec<&'static str>) -> Result<(), PredictionError> {
    if blank.is_empty() {
        Ok(())
    } else {
        Err(PredictionError::MetadataResolution { fields: blank })
    }
}
