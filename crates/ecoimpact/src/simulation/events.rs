use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// Machine-readable identifier for every fallback the pipeline can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCode {
    DatasetUnavailable,
    TemporalBackfill,
    GroupMedian,
    PopulationDefaulted,
    GdpDefaulted,
    FossilShareDefaulted,
    FossilShareClamped,
    RegionFallback,
    IncomeGroupFallback,
    FossilBaselineFallback,
    FossilDeltaRegional,
    FossilDeltaGlobalMedian,
    FossilDeltaDefault,
    Co2SupplementalSource,
}

impl EventCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DatasetUnavailable => "dataset_unavailable",
            Self::TemporalBackfill => "temporal_backfill",
            Self::GroupMedian => "group_median",
            Self::PopulationDefaulted => "population_defaulted",
            Self::GdpDefaulted => "gdp_defaulted",
            Self::FossilShareDefaulted => "fossil_share_defaulted",
            Self::FossilShareClamped => "fossil_share_clamped",
            Self::RegionFallback => "region_fallback",
            Self::IncomeGroupFallback => "income_group_fallback",
            Self::FossilBaselineFallback => "fossil_baseline_fallback",
            Self::FossilDeltaRegional => "fossil_delta_regional",
            Self::FossilDeltaGlobalMedian => "fossil_delta_global_median",
            Self::FossilDeltaDefault => "fossil_delta_default",
            Self::Co2SupplementalSource => "co2_supplemental_source",
        }
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal record of a fallback taken while resolving inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionEvent {
    pub severity: Severity,
    pub code: EventCode,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub detail: String,
}

impl ResolutionEvent {
    pub fn warning(
        code: EventCode,
        country: impl Into<String>,
        year: Option<i32>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            country: country.into(),
            year,
            detail: detail.into(),
        }
    }

    pub fn info(
        code: EventCode,
        country: impl Into<String>,
        year: Option<i32>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Info,
            ..Self::warning(code, country, year, detail)
        }
    }
}

/// Receiver for resolution events (log forwarding, collection, metrics adapters).
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ResolutionEvent);
}

/// Forwards events to `tracing` with the code and context as fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: ResolutionEvent) {
        match event.severity {
            Severity::Info => tracing::info!(
                code = %event.code,
                country = %event.country,
                year = ?event.year,
                "{}",
                event.detail
            ),
            Severity::Warning => tracing::warn!(
                code = %event.code,
                country = %event.country,
                year = ?event.year,
                "{}",
                event.detail
            ),
        }
    }
}

/// Keeps every event in memory and optionally forwards to another sink.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<ResolutionEvent>>,
    forward: Option<Box<dyn EventSink>>,
}

impl RecordingEventSink {
    pub fn forwarding(sink: impl EventSink + 'static) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            forward: Some(Box::new(sink)),
        }
    }

    pub fn events(&self) -> Vec<ResolutionEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn codes(&self) -> Vec<EventCode> {
        self.events().into_iter().map(|event| event.code).collect()
    }

    pub fn contains(&self, code: EventCode) -> bool {
        self.events().iter().any(|event| event.code == code)
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: ResolutionEvent) {
        if let Some(forward) = &self.forward {
            forward.emit(event.clone());
        }
        match self.events.lock() {
            Ok(mut guard) => guard.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order_and_forwards() {
        let sink = RecordingEventSink::forwarding(TracingEventSink);
        sink.emit(ResolutionEvent::warning(
            EventCode::GdpDefaulted,
            "Atlantis",
            Some(2024),
            "GDP not found",
        ));
        sink.emit(ResolutionEvent::info(
            EventCode::TemporalBackfill,
            "Atlantis",
            Some(2024),
            "used 2023",
        ));
        assert_eq!(
            sink.codes(),
            vec![EventCode::GdpDefaulted, EventCode::TemporalBackfill]
        );
        assert_eq!(sink.events()[1].severity, Severity::Info);
    }
}
