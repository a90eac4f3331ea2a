mod loader;
mod model;

pub use loader::{ArtifactError, ArtifactLoader};
pub use model::{Classifier, ModelError, Regressor, Tree, TreeEnsemble, TreeNode};

use crate::simulation::encoding::EncodingTable;
use crate::simulation::stats::median;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Revenue,
    Success,
    Fossil,
}

impl ModelKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Success => "success",
            Self::Fossil => "fossil share",
        }
    }

    /// Width of the encoded vector the model was trained on.
    pub const fn feature_count(self) -> usize {
        match self {
            Self::Revenue => 8,
            Self::Success => 6,
            Self::Fossil => 4,
        }
    }

    /// Candidate model files, tried in order.
    pub const fn model_files(self) -> &'static [&'static str] {
        match self {
            Self::Revenue => &["revenue_model_gb.json", "revenue_gb.json", "gb_direct.json"],
            Self::Success => &[
                "success_model_gb.json",
                "success_gb.json",
                "gb_success_final.json",
            ],
            Self::Fossil => &["fossil_fuel_model.json"],
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Class lists for the fossil-share model's categorical inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FossilEncoders {
    #[serde(rename = "country_encoder")]
    pub countries: Vec<String>,
    #[serde(rename = "region_encoder")]
    pub regions: Vec<String>,
    #[serde(rename = "income_encoder")]
    pub income_groups: Vec<String>,
}

impl FossilEncoders {
    pub fn country_code(&self, country: &str) -> Option<usize> {
        self.countries.iter().position(|class| class == country)
    }

    pub fn region_code(&self, region: &str) -> Option<usize> {
        self.regions.iter().position(|class| class == region)
    }

    pub fn income_code(&self, income_group: &str) -> Option<usize> {
        self.income_groups
            .iter()
            .position(|class| class == income_group)
    }
}

/// Learned average yearly change in fossil share, percentage points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FossilDeltaTable {
    #[serde(default)]
    pub country_deltas: BTreeMap<String, f64>,
    #[serde(default)]
    pub region_deltas: BTreeMap<String, f64>,
}

impl FossilDeltaTable {
    pub fn country(&self, country: &str) -> Option<f64> {
        self.country_deltas.get(country).copied()
    }

    pub fn region(&self, region: &str) -> Option<f64> {
        self.region_deltas.get(region).copied()
    }

    pub fn global_median(&self) -> Option<f64> {
        median(self.country_deltas.values().copied())
    }
}

/// Which artifacts are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub revenue_model: bool,
    pub success_model: bool,
    pub fossil_model: bool,
    pub revenue_encoders: bool,
    pub success_encoders: bool,
    pub fossil_encoders: bool,
    pub fossil_deltas: bool,
}

impl ArtifactStatus {
    /// Revenue and success predictions can run.
    pub fn is_ready(&self) -> bool {
        self.missing_for_prediction().is_empty()
    }

    pub fn missing_for_prediction(&self) -> Vec<&'static str> {
        [
            (self.revenue_model, "revenue model"),
            (self.success_model, "success model"),
            (self.revenue_encoders, "revenue encoding table"),
            (self.success_encoders, "success encoding table"),
        ]
        .into_iter()
        .filter(|(loaded, _)| !loaded)
        .map(|(_, name)| name)
        .collect()
    }
}

/// Read-only models and tables shared by every request.
#[derive(Clone, Default)]
pub struct ModelArtifacts {
    revenue: Option<Arc<dyn Regressor>>,
    success: Option<Arc<dyn Classifier>>,
    fossil: Option<Arc<dyn Regressor>>,
    revenue_table: Option<Arc<EncodingTable>>,
    success_table: Option<Arc<EncodingTable>>,
    fossil_encoders: Option<Arc<FossilEncoders>>,
    fossil_deltas: Option<Arc<FossilDeltaTable>>,
}

impl ModelArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_revenue_model(mut self, model: impl Regressor + 'static) -> Self {
        self.revenue = Some(Arc::new(model));
        self
    }

    pub fn with_success_model(mut self, model: impl Classifier + 'static) -> Self {
        self.success = Some(Arc::new(model));
        self
    }

    pub fn with_fossil_model(mut self, model: impl Regressor + 'static) -> Self {
        self.fossil = Some(Arc::new(model));
        self
    }

    pub fn with_revenue_table(mut self, table: EncodingTable) -> Self {
        self.revenue_table = Some(Arc::new(table));
        self
    }

    pub fn with_success_table(mut self, table: EncodingTable) -> Self {
        self.success_table = Some(Arc::new(table));
        self
    }

    pub fn with_fossil_encoders(mut self, encoders: FossilEncoders) -> Self {
        self.fossil_encoders = Some(Arc::new(encoders));
        self
    }

    pub fn with_fossil_deltas(mut self, deltas: FossilDeltaTable) -> Self {
        self.fossil_deltas = Some(Arc::new(deltas));
        self
    }

    pub fn revenue_model(&self) -> Option<&dyn Regressor> {
        self.revenue.as_deref()
    }

    pub fn success_model(&self) -> Option<&dyn Classifier> {
        self.success.as_deref()
    }

    pub fn fossil_model(&self) -> Option<&dyn Regressor> {
        self.fossil.as_deref()
    }

    pub fn revenue_table(&self) -> Option<&EncodingTable> {
        self.revenue_table.as_deref()
    }

    pub fn success_table(&self) -> Option<&EncodingTable> {
        self.success_table.as_deref()
    }

    pub fn fossil_encoders(&self) -> Option<&FossilEncoders> {
        self.fossil_encoders.as_deref()
    }

    pub fn fossil_deltas(&self) -> Option<&FossilDeltaTable> {
        self.fossil_deltas.as_deref()
    }

    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus {
            revenue_model: self.revenue.is_some(),
            success_model: self.success.is_some(),
            fossil_model: self.fossil.is_some(),
            revenue_encoders: self.revenue_table.is_some(),
            success_encoders: self.success_table.is_some(),
            fossil_encoders: self.fossil_encoders.is_some(),
            fossil_deltas: self.fossil_deltas.is_some(),
        }
    }
}

impl fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("status", &self.status())
            .finish()
    }
}
