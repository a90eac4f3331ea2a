use super::lookup::Membership;
use crate::simulation::dataset::{CountryDataset, CountryYearRow};
use crate::simulation::domain::FieldSource;
use crate::simulation::stats::median;

/// Oldest year the backfill will look at.
pub const BACKFILL_FLOOR_YEAR: i32 = 2019;
pub const BACKFILL_WINDOW_YEARS: i32 = 5;

/// Years tried after `year` itself, newest first.
pub fn backfill_years(year: i32) -> impl Iterator<Item = i32> {
    let floor = year
        .saturating_sub(BACKFILL_WINDOW_YEARS)
        .max(BACKFILL_FLOOR_YEAR);
    (floor..year).rev()
}

/// Dataset values found by one strategy; absent fields fall through to defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DatasetMatch {
    pub(crate) gdp_usd: Option<f64>,
    pub(crate) population: Option<f64>,
    pub(crate) fossil_share_pct: Option<f64>,
    pub(crate) source: FieldSource,
}

impl DatasetMatch {
    fn from_row(row: &CountryYearRow, source: FieldSource) -> Self {
        Self {
            gdp_usd: row.gdp_usd.filter(|value| value.is_finite()),
            population: row
                .population
                .filter(|value| value.is_finite() && *value > 0.0),
            fossil_share_pct: row.fossil_share_pct.filter(|value| value.is_finite()),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ExactMatch,
    TemporalBackfill,
    GroupMedian,
}

/// Tried in order; the first strategy that finds rows supplies every field.
pub const CASCADE: [Strategy; 3] = [
    Strategy::ExactMatch,
    Strategy::TemporalBackfill,
    Strategy::GroupMedian,
];

impl Strategy {
    pub const fn name(self) -> &'static str {
        match self {
            Self::ExactMatch => "exact_match",
            Self::TemporalBackfill => "temporal_backfill",
            Self::GroupMedian => "group_median",
        }
    }

    pub(crate) fn attempt(
        self,
        dataset: &CountryDataset,
        country: &str,
        year: i32,
        membership: &Membership,
    ) -> Option<DatasetMatch> {
        match self {
            Self::ExactMatch => dataset
                .row(country, year)
                .map(|row| DatasetMatch::from_row(row, FieldSource::Exact { year })),
            Self::TemporalBackfill => backfill_years(year).find_map(|candidate| {
                dataset.row(country, candidate).map(|row| {
                    DatasetMatch::from_row(row, FieldSource::Backfill { year: candidate })
                })
            }),
            Self::GroupMedian => std::iter::once(year)
                .chain(backfill_years(year))
                .find_map(|candidate| {
                    let rows = dataset.group_rows(
                        &membership.region,
                        &membership.income_group,
                        candidate,
                    );
                    group_median(&rows, candidate)
                }),
        }
    }
}

fn group_median(rows: &[&CountryYearRow], year: i32) -> Option<DatasetMatch> {
    if rows.is_empty() {
        return None;
    }

    let population = median(
        rows.iter()
            .filter_map(|row| row.population)
            .filter(|value| *value > 0.0),
    );
    Some(DatasetMatch {
        gdp_usd: median(rows.iter().filter_map(|row| row.gdp_usd)),
        population,
        fossil_share_pct: median(rows.iter().filter_map(|row| row.fossil_share_pct)),
        source: FieldSource::GroupMedian {
            year,
            matches: rows.len(),
        },
    })
}

/// Runs the cascade and reports which strategy matched.
pub(crate) fn run(
    dataset: &CountryDataset,
    country: &str,
    year: i32,
    membership: &Membership,
) -> Option<(Strategy, DatasetMatch)> {
    CASCADE.iter().find_map(|strategy| {
        strategy
            .attempt(dataset, country, year, membership)
            .map(|found| (*strategy, found))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::resolver::lookup::MembershipOrigin;

    #[test]
    fn backfill_window_stops_at_floor_year() {
        assert_eq!(
            backfill_years(2024).collect::<Vec<_>>(),
            vec![2023, 2022, 2021, 2020, 2019]
        );
        assert_eq!(backfill_years(2020).collect::<Vec<_>>(), vec![2019]);
        assert_eq!(backfill_years(2030).last(), Some(2025));
        assert_eq!(backfill_years(2019).count(), 0);
        assert_eq!(backfill_years(i32::MIN).count(), 0);
        assert_eq!(backfill_years(i32::MAX).last(), Some(i32::MAX - 5));
    }

    fn membership() -> Membership {
        Membership {
            region: "Europe & Central Asia".to_string(),
            income_group: "High income".to_string(),
            origin: MembershipOrigin::Dataset,
        }
    }

    fn group_row(country: &str, year: i32, gdp: Option<f64>, population: f64) -> CountryYearRow {
        let mut row = CountryYearRow::new(country, year);
        row.region = Some("Europe & Central Asia".to_string());
        row.income_group = Some("High income".to_string());
        row.gdp_usd = gdp;
        row.population = Some(population);
        row
    }

    #[test]
    fn group_median_uses_present_values_per_field() {
        let dataset = CountryDataset::from_rows(vec![
            group_row("A", 2022, Some(1.0e12), 10.0),
            group_row("B", 2022, None, 30.0),
            group_row("C", 2022, Some(3.0e12), -5.0),
        ]);

        let (strategy, found) =
            run(&dataset, "Atlantis", 2024, &membership()).expect("group rows found");
        assert_eq!(strategy, Strategy::GroupMedian);
        assert_eq!(found.gdp_usd, Some(2.0e12));
        assert_eq!(found.population, Some(20.0));
        assert_eq!(found.fossil_share_pct, None);
        assert_eq!(
            found.source,
            FieldSource::GroupMedian {
                year: 2022,
                matches: 3
            }
        );
    }

    #[test]
    fn exact_row_wins_even_when_fields_are_missing() {
        let dataset = CountryDataset::from_rows(vec![
            group_row("A", 2024, None, 10.0),
            group_row("A", 2023, Some(1.0e12), 10.0),
        ]);
        let (strategy, found) = run(&dataset, "A", 2024, &membership()).expect("exact row");
        assert_eq!(strategy, Strategy::ExactMatch);
        assert_eq!(found.gdp_usd, None);
    }
}
