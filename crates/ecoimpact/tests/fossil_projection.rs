mod common;

use ecoimpact::simulation::artifacts::ModelArtifacts;
use ecoimpact::simulation::events::{EventCode, RecordingEventSink};
use ecoimpact::simulation::fossil::{BaselineSource, DeltaSource, DEFAULT_YEARLY_DELTA};
use ecoimpact::simulation::PolicySimulator;
use std::sync::Arc;

#[test]
fn unseen_country_uses_regional_constant() {
    let (simulator, sink) = common::simulator("unseen");
    let projection = simulator.project_fossil("Atlantis", 2024, 1, Some(0.0));

    assert_eq!(projection.baseline_source, BaselineSource::RegionalConstant);
    assert_eq!(projection.yearly_delta, DEFAULT_YEARLY_DELTA);
    assert_eq!(projection.delta_source, DeltaSource::Default);
    assert_eq!(projection.price_factor, 1.0);
    assert_eq!(projection.points.len(), 1);
    assert_eq!(projection.points[0].fossil_share_pct, 75.0);
    assert!(projection.points[0].is_model_baseline);
    assert!(sink.contains(EventCode::FossilBaselineFallback));
}

#[test]
fn country_without_delta_falls_back_to_region() {
    let (simulator, sink) = common::simulator("regional-delta");
    let projection = simulator.project_fossil("India", 2024, 2, None);

    assert_eq!(projection.baseline_source, BaselineSource::Model);
    assert_eq!(projection.delta_source, DeltaSource::Region);
    assert_eq!(projection.yearly_delta, -0.3);
    assert!((projection.points[1].fossil_share_pct - 59.7).abs() < 1e-9);
    assert!(sink.contains(EventCode::FossilDeltaRegional));
}

#[test]
fn country_and_region_without_delta_use_global_median() {
    let (simulator, sink) = common::simulator("median-delta");
    let projection = simulator.project_fossil("Vietnam", 2024, 3, None);

    assert_eq!(projection.region, "East Asia & Pacific");
    assert_eq!(projection.baseline_source, BaselineSource::Model);
    assert_eq!(projection.delta_source, DeltaSource::GlobalMedian);
    assert!((projection.yearly_delta - -0.6).abs() < 1e-9);
    assert!((projection.points[2].fossil_share_pct - 58.8).abs() < 1e-9);
    assert!(sink.contains(EventCode::FossilDeltaGlobalMedian));
    assert!(!sink.contains(EventCode::FossilDeltaDefault));
}

#[test]
fn missing_deltas_file_uses_default_delta() {
    let sink = Arc::new(RecordingEventSink::default());
    let artifacts = common::load_artifacts_without("no-deltas", "fossil_fuel_deltas.json");
    assert!(!artifacts.status().fossil_deltas);
    let simulator = PolicySimulator::new(common::resolver(sink.clone()), Arc::new(artifacts));

    let projection = simulator.project_fossil("Pakistan", 2024, 2, None);
    assert_eq!(projection.baseline_source, BaselineSource::Model);
    assert_eq!(projection.baseline_pct, 60.0);
    assert_eq!(projection.delta_source, DeltaSource::Default);
    assert_eq!(projection.yearly_delta, DEFAULT_YEARLY_DELTA);
    assert_eq!(projection.points[1].fossil_share_pct, 59.5);
    assert!(sink.contains(EventCode::FossilDeltaDefault));
    assert!(!sink.contains(EventCode::FossilBaselineFallback));
}

#[test]
fn projection_needs_no_prediction_artifacts() {
    let sink = Arc::new(RecordingEventSink::default());
    let simulator = PolicySimulator::new(common::resolver(sink), Arc::new(ModelArtifacts::new()));

    let projection = simulator.project_fossil("Pakistan", 2030, 20, Some(100.0));
    assert_eq!(projection.points.len(), 20);
    assert_eq!(projection.baseline_source, BaselineSource::RegionalConstant);
    assert_eq!(projection.price_factor, 1.5);
    assert!(projection
        .points
        .windows(2)
        .all(|pair| pair[1].fossil_share_pct <= pair[0].fossil_share_pct));
    assert!(projection
        .points
        .iter()
        .all(|point| (0.0..=100.0).contains(&point.fossil_share_pct)));
}
