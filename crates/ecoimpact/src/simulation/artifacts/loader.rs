use super::model::{ModelError, TreeEnsemble};
use super::{FossilDeltaTable, FossilEncoders, ModelArtifacts, ModelKind};
use crate::config::DataConfig;
use crate::simulation::encoding::EncodingTable;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

const REVENUE_ENCODER_FILES: &[&str] = &["encoders_direct.json"];
const SUCCESS_ENCODER_FILES: &[&str] = &["encoders_success.json"];
const FOSSIL_ENCODER_FILES: &[&str] = &["fossil_fuel_encoders.json"];
const FOSSIL_DELTA_FILES: &[&str] = &["fossil_fuel_deltas.json"];

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact file is empty")]
    Empty,
    #[error("invalid artifact JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid model: {0}")]
    Model(#[from] ModelError),
    #[error("{model} model expects {found} features, schema has {expected}")]
    FeatureCount {
        model: ModelKind,
        expected: usize,
        found: usize,
    },
    #[error("encoding table has no classes")]
    NoClasses,
}

/// Reads model artifacts from disk. Anything missing or unreadable is logged
/// and left unavailable; loading itself never fails.
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    models_dir: PathBuf,
    encoders_dir: PathBuf,
}

impl ArtifactLoader {
    pub fn new(models_dir: impl Into<PathBuf>, encoders_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            encoders_dir: encoders_dir.into(),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(&config.models_dir, &config.encoders_dir)
    }

    pub fn load(&self) -> ModelArtifacts {
        let mut artifacts = ModelArtifacts::new();

        if let Some(model) = self.ensemble(ModelKind::Revenue) {
            artifacts = artifacts.with_revenue_model(model);
        }
        if let Some(model) = self.ensemble(ModelKind::Success) {
            artifacts = artifacts.with_success_model(model);
        }
        if let Some(model) = self.ensemble(ModelKind::Fossil) {
            artifacts = artifacts.with_fossil_model(model);
        }
        if let Some(table) = self.encoding_table(REVENUE_ENCODER_FILES, "revenue encoding table") {
            artifacts = artifacts.with_revenue_table(table);
        }
        if let Some(table) = self.encoding_table(SUCCESS_ENCODER_FILES, "success encoding table") {
            artifacts = artifacts.with_success_table(table);
        }
        if let Some(encoders) = first_loadable(
            &self.encoders_dir,
            FOSSIL_ENCODER_FILES,
            "fossil share encoders",
            parse_fossil_encoders,
        ) {
            artifacts = artifacts.with_fossil_encoders(encoders);
        }
        if let Some(deltas) = first_loadable(
            &self.models_dir,
            FOSSIL_DELTA_FILES,
            "fossil share deltas",
            parse_json::<FossilDeltaTable>,
        ) {
            artifacts = artifacts.with_fossil_deltas(deltas);
        }

        let status = artifacts.status();
        if status.is_ready() {
            tracing::info!(?status, "model artifacts ready");
        } else {
            tracing::warn!(
                missing = ?status.missing_for_prediction(),
                "model artifacts incomplete; predictions will be unavailable"
            );
        }
        artifacts
    }

    fn ensemble(&self, kind: ModelKind) -> Option<TreeEnsemble> {
        first_loadable(
            &self.models_dir,
            kind.model_files(),
            kind.label(),
            |bytes| {
                let ensemble = TreeEnsemble::from_json(bytes)?;
                if ensemble.n_features != kind.feature_count() {
                    return Err(ArtifactError::FeatureCount {
                        model: kind,
                        expected: kind.feature_count(),
                        found: ensemble.n_features,
                    });
                }
                Ok(ensemble)
            },
        )
    }

    fn encoding_table(&self, candidates: &[&str], label: &str) -> Option<EncodingTable> {
        first_loadable(&self.encoders_dir, candidates, label, |bytes| {
            let table = parse_json::<EncodingTable>(bytes)?;
            if table.is_empty() {
                return Err(ArtifactError::NoClasses);
            }
            Ok(table)
        })
    }
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ArtifactError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn parse_fossil_encoders(bytes: &[u8]) -> Result<FossilEncoders, ArtifactError> {
    let encoders = parse_json::<FossilEncoders>(bytes)?;
    if encoders.countries.is_empty()
        || encoders.regions.is_empty()
        || encoders.income_groups.is_empty()
    {
        return Err(ArtifactError::NoClasses);
    }
    Ok(encoders)
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    let bytes = std::fs::read(path)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ArtifactError::Empty);
    }
    Ok(bytes)
}

fn first_loadable<T, F>(dir: &Path, candidates: &[&str], label: &str, parse: F) -> Option<T>
where
    F: Fn(&[u8]) -> Result<T, ArtifactError>,
{
    for name in candidates {
        let path = dir.join(name);
        match read_artifact(&path).and_then(|bytes| parse(&bytes)) {
            Ok(value) => {
                tracing::info!(path = %path.display(), "loaded {label}");
                return Some(value);
            }
            Err(ArtifactError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "{label} candidate not found");
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping {label}");
            }
        }
    }

    tracing::warn!(dir = %dir.display(), "no usable {label} found");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::artifacts::Regressor;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ecoimpact-loader-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    const FOSSIL_MODEL: &str = r#"{"n_features": 4, "base_score": 60.0, "trees": [{"nodes": [{"kind": "leaf", "value": 1.5}]}]}"#;

    #[test]
    fn skips_empty_and_corrupt_candidates() {
        let dir = scratch_dir("skips");
        fs::write(dir.join("revenue_model_gb.json"), "").expect("write");
        fs::write(dir.join("revenue_gb.json"), "{broken").expect("write");
        fs::write(
            dir.join("gb_direct.json"),
            r#"{"n_features": 8, "trees": [{"nodes": [{"kind": "leaf", "value": 120.0}]}]}"#,
        )
        .expect("write");
        fs::write(dir.join("fossil_fuel_model.json"), FOSSIL_MODEL).expect("write");
        fs::write(
            dir.join("encoders_direct.json"),
            r#"{"Type": ["Carbon tax", "ETS"]}"#,
        )
        .expect("write");

        let artifacts = ArtifactLoader::new(&dir, &dir).load();
        let status = artifacts.status();
        assert!(status.revenue_model);
        assert!(status.fossil_model);
        assert!(status.revenue_encoders);
        assert!(!status.success_model);
        assert!(!status.fossil_deltas);
        assert!(!status.is_ready());

        let revenue = artifacts.revenue_model().expect("revenue model");
        assert_eq!(revenue.predict(&[0.0; 8]), 120.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_models_with_the_wrong_width() {
        let dir = scratch_dir("width");
        fs::write(dir.join("success_model_gb.json"), FOSSIL_MODEL).expect("write");

        let artifacts = ArtifactLoader::new(&dir, &dir).load();
        assert!(artifacts.success_model().is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directories_leave_everything_unavailable() {
        let loader = ArtifactLoader::new("./no-such-models", "./no-such-encoders");
        let status = loader.load().status();
        assert!(!status.revenue_model && !status.fossil_encoders && !status.fossil_deltas);
    }
}
