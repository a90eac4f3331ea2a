use ecoimpact::simulation::artifacts::ArtifactStatus;
use ecoimpact::simulation::coverage::explain_coverage;
use ecoimpact::simulation::domain::{CountryProfile, ScenarioInput};
use ecoimpact::simulation::events::{ResolutionEvent, Severity};
use ecoimpact::simulation::fossil::{BaselineSource, DeltaSource, FossilProjection};
use ecoimpact::simulation::resolver::CountryContext;
use ecoimpact::simulation::{ScenarioComparison, ScenarioSide, SimulationReport};

fn optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(value) => format!("{value:.decimals$}"),
        None => "n/a".to_string(),
    }
}

fn describe_scenario(scenario: &ScenarioInput) -> String {
    format!(
        "{} at {} USD/ton in {}, {}-{}",
        scenario.policy_type(),
        scenario.price_usd_per_ton(),
        scenario.country(),
        scenario.start_year(),
        scenario.end_year()
    )
}

pub(crate) fn simulation_report(report: &SimulationReport) {
    println!("Policy simulation: {}", describe_scenario(&report.scenario));
    println!(
        "Outlook: {:.1}% success probability ({}) | {:.1} M USD total revenue",
        report.success_probability * 100.0,
        report.risk_tier.label(),
        report.overall_revenue_million_usd
    );

    println!("\nYearly predictions");
    println!(
        "{:<6} {:>14} {:>12} {:>10} {:>9} {:>12} {:>10}",
        "Year", "Revenue (M$)", "CO2 (Mt)", "% GDP", "Success", "Risk", "Coverage"
    );
    for year in &report.yearly {
        println!(
            "{:<6} {:>14.1} {:>12} {:>10} {:>8.1}% {:>12} {:>9.1}%",
            year.year,
            year.revenue_million_usd,
            optional(year.co2_covered_million_tons, 2),
            optional(year.revenue_percent_gdp, 3),
            year.success_probability * 100.0,
            year.risk_tier.label(),
            year.emission_coverage_pct
        );
    }

    country_context(&report.country_context);
    println!();
    fossil_projection(&report.fossil_projection);
    println!("\nGenerated at {}", report.generated_at.to_rfc3339());
}

fn country_context(context: &CountryContext) {
    match context.data_year {
        Some(year) => println!("\nCountry context ({year} data)"),
        None => println!("\nCountry context (no dataset row)"),
    }
    println!("- {} | {}", context.region, context.income_group);
    println!(
        "- GDP {} USD | population {} | annual CO2 {} t",
        optional(context.gdp_usd, 0),
        optional(context.population, 0),
        optional(context.annual_co2_tons, 0)
    );
    if let Some(mix) = &context.energy_mix_kwh_per_capita {
        println!(
            "- Energy per capita (kWh): coal {:.0}, oil {:.0}, gas {:.0}, nuclear {:.0}, hydro {:.0}, wind {:.0}, solar {:.0}, other renewables {:.0}",
            mix.coal, mix.oil, mix.gas, mix.nuclear, mix.hydro, mix.wind, mix.solar, mix.other_renewables
        );
    }
}

pub(crate) fn coverage_breakdown(
    scenario: &ScenarioInput,
    year: i32,
    profile: &CountryProfile,
    co2_emissions_tons: Option<f64>,
) {
    let breakdown = explain_coverage(scenario, year, profile, co2_emissions_tons);
    println!("\nEmission coverage breakdown ({year})");
    for component in &breakdown.components {
        println!(
            "- {:<18} {:>+7.2}  {}",
            format!("{:?}", component.factor),
            component.contribution,
            component.notes
        );
    }
    println!("= {:.2}% (unclamped {:.2})", breakdown.total, breakdown.unclamped);
}

pub(crate) fn fossil_projection(projection: &FossilProjection) {
    let baseline = match projection.baseline_source {
        BaselineSource::Model => "model baseline",
        BaselineSource::RegionalConstant => "regional constant baseline",
    };
    let delta = match projection.delta_source {
        DeltaSource::Country => "country trend",
        DeltaSource::Region => "regional trend",
        DeltaSource::GlobalMedian => "global median trend",
        DeltaSource::Default => "default trend",
    };
    println!(
        "Fossil fuel share for {} ({}): {baseline} {:.1}%, {delta} {:+.2} pp/yr x{:.1} price factor",
        projection.country,
        projection.region,
        projection.baseline_pct,
        projection.yearly_delta,
        projection.price_factor
    );
    for point in &projection.points {
        let marker = if point.is_model_baseline {
            " (baseline)"
        } else {
            ""
        };
        println!("  {}  {:>5.1}%{marker}", point.year, point.fossil_share_pct);
    }
}

pub(crate) fn comparison(comparison: &ScenarioComparison) {
    println!("Scenario comparison");
    println!("- First:  {}", describe_scenario(&comparison.first.scenario));
    println!("- Second: {}", describe_scenario(&comparison.second.scenario));
    println!(
        "\n{:<28} {:>12} {:>12} {:>12}  {}",
        "Metric", "First", "Second", "Difference", "Better"
    );
    for entry in &comparison.metrics {
        let better = match entry.better {
            Some(ScenarioSide::First) => "first",
            Some(ScenarioSide::Second) => "second",
            None => "-",
        };
        println!(
            "{:<28} {:>12} {:>12} {:>12}  {better}",
            entry.metric.label(),
            optional(entry.first, 3),
            optional(entry.second, 3),
            optional(entry.difference, 3)
        );
    }
}

pub(crate) fn status(
    status: &ArtifactStatus,
    dataset_path: &str,
    dataset_rows: Option<usize>,
    dataset_error: Option<&str>,
) {
    let mark = |loaded: bool| if loaded { "loaded" } else { "missing" };
    println!("Artifact status");
    println!("- revenue model:          {}", mark(status.revenue_model));
    println!("- success model:          {}", mark(status.success_model));
    println!("- fossil share model:     {}", mark(status.fossil_model));
    println!("- revenue encoding table: {}", mark(status.revenue_encoders));
    println!("- success encoding table: {}", mark(status.success_encoders));
    println!("- fossil share encoders:  {}", mark(status.fossil_encoders));
    println!("- fossil share deltas:    {}", mark(status.fossil_deltas));

    let missing = status.missing_for_prediction();
    if missing.is_empty() {
        println!("Predictions: ready");
    } else {
        println!("Predictions: unavailable (missing {})", missing.join(", "));
    }

    match (dataset_rows, dataset_error) {
        (Some(rows), _) => println!("Dataset: {dataset_path} ({rows} rows)"),
        (None, Some(error)) => println!("Dataset: {dataset_path} unavailable ({error})"),
        (None, None) => println!("Dataset: {dataset_path} unavailable"),
    }
}

pub(crate) fn events(events: &[ResolutionEvent]) {
    if events.is_empty() {
        return;
    }
    println!("\nData notes");
    for event in events {
        let level = match event.severity {
            Severity::Info => "info",
            Severity::Warning => "warn",
        };
        let year = event
            .year
            .map(|year| format!(" {year}"))
            .unwrap_or_default();
        println!(
            "- [{level}] {}{year} {}: {}",
            event.country, event.code, event.detail
        );
    }
}
