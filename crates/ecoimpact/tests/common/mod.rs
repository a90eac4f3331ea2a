#![allow(dead_code)]

use ecoimpact::simulation::artifacts::{ArtifactLoader, ModelArtifacts};
use ecoimpact::simulation::dataset::{Co2Series, CountryDataset, DatasetCache, TableCache};
use ecoimpact::simulation::events::RecordingEventSink;
use ecoimpact::simulation::resolver::CountryProfileResolver;
use ecoimpact::simulation::PolicySimulator;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

pub const DATASET_CSV: &str = "\
Jurisdiction,Year,Region,Income group,GDP,Population,Fossil_Fuel_Dependency_%,Annual_CO2_emissions,Coal per capita (kWh),Oil per capita (kWh),Gas per capita (kWh)
Pakistan,2022,South Asia,Lower middle income,3.2e11,2.3e8,63,1.9e8,500,1500,2000
Pakistan,2023,South Asia,Lower middle income,3.3e11,2.35e8,62.5,1.95e8,510,1490,2010
Pakistan,2024,South Asia,Lower middle income,3.4e11,2.4e8,62,2.0e8,520,1480,2020
India,2023,South Asia,Lower middle income,3.5e12,1.42e9,74,,3000,1400,300
Germany,2024,Europe & Central Asia,High income,,8.4e7,76,6.7e8,6000,11000,8000
";

pub const CO2_CSV: &str = "\
Entity,Year,Annual CO\u{2082} emissions
India,2022,2.7e9
India,2023,2.9e9
";

/// Revenue: 100 M USD up to 30 USD/ton, 300 M USD above.
pub const REVENUE_MODEL: &str = r#"{
  "n_features": 8,
  "base_score": 0.0,
  "trees": [{"nodes": [
    {"kind": "split", "feature": 4, "threshold": 30.0, "left": 1, "right": 2},
    {"kind": "leaf", "value": 100.0},
    {"kind": "leaf", "value": 300.0}
  ]}]
}"#;

/// Success: raw score +1 through 2025, -1 afterwards.
pub const SUCCESS_MODEL: &str = r#"{
  "n_features": 6,
  "trees": [{"nodes": [
    {"kind": "split", "feature": 3, "threshold": 2025.5, "left": 1, "right": 2},
    {"kind": "leaf", "value": 1.0},
    {"kind": "leaf", "value": -1.0}
  ]}]
}"#;

pub const FOSSIL_MODEL: &str = r#"{
  "n_features": 4,
  "base_score": 60.0,
  "trees": [{"nodes": [{"kind": "leaf", "value": 0.0}]}]
}"#;

pub const ENCODERS: &str = r#"{
  "Type": ["Carbon tax", "ETS"],
  "Region": ["South Asia", "East Asia & Pacific"],
  "Income group": ["Lower middle income", "Upper middle income"]
}"#;

pub const FOSSIL_ENCODERS: &str = r#"{
  "country_encoder": ["India", "Pakistan", "Vietnam"],
  "region_encoder": ["East Asia & Pacific", "South Asia"],
  "income_encoder": ["Lower middle income", "Upper middle income"]
}"#;

pub const FOSSIL_DELTAS: &str = r#"{
  "country_deltas": {"Pakistan": -0.8, "Bangladesh": -0.4},
  "region_deltas": {"South Asia": -0.3}
}"#;

pub fn artifact_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "ecoimpact-it-{name}-{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create artifact dir");

    for (file, contents) in [
        ("revenue_model_gb.json", REVENUE_MODEL),
        ("success_model_gb.json", SUCCESS_MODEL),
        ("fossil_fuel_model.json", FOSSIL_MODEL),
        ("encoders_direct.json", ENCODERS),
        ("encoders_success.json", ENCODERS),
        ("fossil_fuel_encoders.json", FOSSIL_ENCODERS),
        ("fossil_fuel_deltas.json", FOSSIL_DELTAS),
    ] {
        fs::write(dir.join(file), contents).expect("write artifact");
    }
    dir
}

pub fn load_artifacts(name: &str) -> ModelArtifacts {
    let dir = artifact_dir(name);
    let artifacts = ArtifactLoader::new(&dir, &dir).load();
    let _ = fs::remove_dir_all(&dir);
    artifacts
}

/// Artifacts with `file` left out of the directory.
pub fn load_artifacts_without(name: &str, file: &str) -> ModelArtifacts {
    let dir = artifact_dir(name);
    fs::remove_file(dir.join(file)).expect("remove artifact");
    let artifacts = ArtifactLoader::new(&dir, &dir).load();
    let _ = fs::remove_dir_all(&dir);
    artifacts
}

pub fn resolver(sink: Arc<RecordingEventSink>) -> Arc<CountryProfileResolver> {
    let dataset =
        CountryDataset::from_reader(Cursor::new(DATASET_CSV)).expect("fixture dataset parses");
    let co2 = Co2Series::from_reader(Cursor::new(CO2_CSV)).expect("fixture co2 parses");
    Arc::new(
        CountryProfileResolver::new(Arc::new(DatasetCache::preloaded(dataset)))
            .with_co2_series(Arc::new(TableCache::preloaded(co2)))
            .with_events(sink),
    )
}

pub fn simulator(name: &str) -> (PolicySimulator, Arc<RecordingEventSink>) {
    let sink = Arc::new(RecordingEventSink::default());
    let simulator = PolicySimulator::new(resolver(sink.clone()), Arc::new(load_artifacts(name)));
    (simulator, sink)
}
