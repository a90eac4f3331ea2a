mod normalizer;
mod parser;

pub use normalizer::normalize_country;
pub(crate) use normalizer::lookup_key;

use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    Csv(csv::Error),
    Empty,
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Io(err) => write!(f, "failed to read dataset: {}", err),
            DatasetError::Csv(err) => write!(f, "invalid dataset CSV data: {}", err),
            DatasetError::Empty => write!(f, "dataset contains no usable rows"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io(err) => Some(err),
            DatasetError::Csv(err) => Some(err),
            DatasetError::Empty => None,
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Per-capita primary energy by source, kWh (equivalent).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyMix {
    pub coal: Option<f64>,
    pub oil: Option<f64>,
    pub gas: Option<f64>,
    pub nuclear: Option<f64>,
    pub hydro: Option<f64>,
    pub wind: Option<f64>,
    pub solar: Option<f64>,
    pub other_renewables: Option<f64>,
}

impl EnergyMix {
    /// Coal + oil + gas as a share of the total, when any source is reported.
    pub fn fossil_share_pct(&self) -> Option<f64> {
        let fossil = [self.coal, self.oil, self.gas];
        let other = [
            self.nuclear,
            self.hydro,
            self.wind,
            self.solar,
            self.other_renewables,
        ];
        if fossil.iter().chain(other.iter()).all(Option::is_none) {
            return None;
        }

        let fossil_total: f64 = fossil.iter().flatten().sum();
        let total = fossil_total + other.iter().flatten().sum::<f64>();
        if total > 0.0 {
            Some(fossil_total / total * 100.0)
        } else {
            None
        }
    }

    pub fn kwh_per_capita(&self) -> EnergyMixView {
        EnergyMixView {
            coal: self.coal.unwrap_or(0.0),
            oil: self.oil.unwrap_or(0.0),
            gas: self.gas.unwrap_or(0.0),
            nuclear: self.nuclear.unwrap_or(0.0),
            hydro: self.hydro.unwrap_or(0.0),
            wind: self.wind.unwrap_or(0.0),
            solar: self.solar.unwrap_or(0.0),
            other_renewables: self.other_renewables.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyMixView {
    pub coal: f64,
    pub oil: f64,
    pub gas: f64,
    pub nuclear: f64,
    pub hydro: f64,
    pub wind: f64,
    pub solar: f64,
    pub other_renewables: f64,
}

/// One (jurisdiction, year) observation; numeric cells are `None` when missing.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryYearRow {
    pub jurisdiction: String,
    pub year: i32,
    pub region: Option<String>,
    pub income_group: Option<String>,
    pub gdp_usd: Option<f64>,
    pub population: Option<f64>,
    pub fossil_share_pct: Option<f64>,
    pub annual_co2_tons: Option<f64>,
    pub energy_mix: EnergyMix,
}

impl CountryYearRow {
    pub fn new(jurisdiction: impl Into<String>, year: i32) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            year,
            region: None,
            income_group: None,
            gdp_usd: None,
            population: None,
            fossil_share_pct: None,
            annual_co2_tons: None,
            energy_mix: EnergyMix::default(),
        }
    }
}

/// In-memory country/year table indexed for the resolver's lookups.
#[derive(Debug, Default)]
pub struct CountryDataset {
    rows: Vec<CountryYearRow>,
    by_country_year: HashMap<(String, i32), usize>,
    by_group_year: HashMap<(String, String, i32), Vec<usize>>,
}

impl CountryDataset {
    pub fn from_rows(rows: Vec<CountryYearRow>) -> Self {
        let mut by_country_year = HashMap::new();
        let mut by_group_year: HashMap<(String, String, i32), Vec<usize>> = HashMap::new();

        for (index, row) in rows.iter().enumerate() {
            by_country_year
                .entry((row.jurisdiction.clone(), row.year))
                .or_insert(index);
            if let (Some(region), Some(income)) = (&row.region, &row.income_group) {
                by_group_year
                    .entry((region.clone(), income.clone(), row.year))
                    .or_default()
                    .push(index);
            }
        }

        Self {
            rows,
            by_country_year,
            by_group_year,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let parsed = parser::parse_country_rows(reader)?;
        if parsed.skipped > 0 {
            tracing::warn!(
                skipped = parsed.skipped,
                "dataset rows without a jurisdiction or year were skipped"
            );
        }
        if parsed.rows.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self::from_rows(parsed.rows))
    }

    pub fn rows(&self) -> &[CountryYearRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row recorded for the (jurisdiction, year) pair.
    pub fn row(&self, country: &str, year: i32) -> Option<&CountryYearRow> {
        self.by_country_year
            .get(&(country.to_string(), year))
            .map(|index| &self.rows[*index])
    }

    pub fn group_rows(&self, region: &str, income_group: &str, year: i32) -> Vec<&CountryYearRow> {
        self.by_group_year
            .get(&(region.to_string(), income_group.to_string(), year))
            .map(|indices| indices.iter().map(|index| &self.rows[*index]).collect())
            .unwrap_or_default()
    }
}

/// Annual CO2 emissions per entity from a standalone series.
#[derive(Debug, Default)]
pub struct Co2Series {
    tons: HashMap<(String, i32), f64>,
}

impl Co2Series {
    pub fn from_observations<I, S>(observations: I) -> Self
    where
        I: IntoIterator<Item = (S, i32, f64)>,
        S: Into<String>,
    {
        let mut tons = HashMap::new();
        for (entity, year, value) in observations {
            tons.entry((entity.into(), year)).or_insert(value);
        }
        Self { tons }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let parsed = parser::parse_co2_rows(reader)?;
        if parsed.rows.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self::from_observations(
            parsed
                .rows
                .into_iter()
                .map(|row| (row.entity, row.year, row.tons)),
        ))
    }

    pub fn tons(&self, entity: &str, year: i32) -> Option<f64> {
        self.tons.get(&(entity.to_string(), year)).copied()
    }
}

/// Tables that can be read from a file on first use.
pub trait TabularSource: Sized + Send + Sync {
    const LABEL: &'static str;
    fn load(path: &Path) -> Result<Self, DatasetError>;
}

impl TabularSource for CountryDataset {
    const LABEL: &'static str = "country dataset";

    fn load(path: &Path) -> Result<Self, DatasetError> {
        Self::from_path(path)
    }
}

impl TabularSource for Co2Series {
    const LABEL: &'static str = "CO2 series";

    fn load(path: &Path) -> Result<Self, DatasetError> {
        Self::from_path(path)
    }
}

enum TableSource<T> {
    Path(PathBuf),
    Loaded(Arc<T>),
    Unavailable,
}

/// Read-only table loaded at most once, on first access.
///
/// Load failures are logged and remembered; callers see `None` from then on.
pub struct TableCache<T> {
    source: TableSource<T>,
    cell: OnceLock<Option<Arc<T>>>,
}

pub type DatasetCache = TableCache<CountryDataset>;

impl<T: TabularSource> TableCache<T> {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: TableSource::Path(path.into()),
            cell: OnceLock::new(),
        }
    }

    pub fn preloaded(table: T) -> Self {
        Self {
            source: TableSource::Loaded(Arc::new(table)),
            cell: OnceLock::new(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            source: TableSource::Unavailable,
            cell: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get_or_init(|| self.initialize()).as_deref()
    }

    fn initialize(&self) -> Option<Arc<T>> {
        match &self.source {
            TableSource::Loaded(table) => Some(Arc::clone(table)),
            TableSource::Unavailable => None,
            TableSource::Path(path) => match T::load(path) {
                Ok(table) => {
                    tracing::info!(path = %path.display(), "loaded {}", T::LABEL);
                    Some(Arc::new(table))
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "could not load {}", T::LABEL);
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "Jurisdiction,Year,Region,Income group,GDP,Population,Population_Log,Fossil_Fuel_Dependency_%,Annual_CO2_emissions,Coal per capita (kWh),Oil per capita (kWh),Gas per capita (kWh),Hydro per capita (kWh - equivalent)\n\
Pakistan,2022,South Asia,Lower middle income,3.7e11,235000000,,,2.0e8,,,,\n\
Pakistan,2022,South Asia,Lower middle income,9.9e11,1,,,,,,,\n\
Chile,2021.0,Latin America & Caribbean,High income,NaN,,16.8,,,1000,2000,1000,1000\n\
,2021,Nowhere,Low income,1,1,,,,,,,\n";

    #[test]
    fn parses_rows_and_keeps_first_duplicate() {
        let dataset = CountryDataset::from_reader(Cursor::new(SAMPLE)).expect("parses");
        assert_eq!(dataset.len(), 3);
        let pakistan = dataset.row("Pakistan", 2022).expect("row present");
        assert_eq!(pakistan.gdp_usd, Some(3.7e11));
        assert_eq!(pakistan.population, Some(235_000_000.0));
        assert_eq!(pakistan.annual_co2_tons, Some(2.0e8));
    }

    #[test]
    fn derives_missing_numbers_from_related_columns() {
        let dataset = CountryDataset::from_reader(Cursor::new(SAMPLE)).expect("parses");
        let chile = dataset.row("Chile", 2021).expect("year parsed from float");
        assert_eq!(chile.gdp_usd, None);
        assert!((chile.population.expect("from log") - 16.8f64.exp()).abs() < 1e-3);
        assert_eq!(chile.fossil_share_pct, Some(80.0));
    }

    #[test]
    fn group_index_collects_matching_rows() {
        let dataset = CountryDataset::from_reader(Cursor::new(SAMPLE)).expect("parses");
        assert_eq!(
            dataset
                .group_rows("South Asia", "Lower middle income", 2022)
                .len(),
            2
        );
        assert!(dataset.group_rows("South Asia", "High income", 2022).is_empty());
    }

    #[test]
    fn header_only_file_is_rejected() {
        let error = CountryDataset::from_reader(Cursor::new("Jurisdiction,Year\n"))
            .expect_err("no rows");
        assert!(matches!(error, DatasetError::Empty));
    }

    #[test]
    fn number_parsing_treats_nan_and_blank_as_missing() {
        assert_eq!(parser::parse_number_for_tests(" 12.5 "), Some(12.5));
        assert_eq!(parser::parse_number_for_tests("NaN"), None);
        assert_eq!(parser::parse_number_for_tests("inf"), None);
        assert_eq!(parser::parse_number_for_tests(""), None);
        assert_eq!(parser::parse_year_for_tests("2020.0"), Some(2020));
        assert_eq!(parser::parse_year_for_tests("2020.5"), None);
    }

    #[test]
    fn co2_series_reads_unicode_header() {
        let csv = "Entity,Code,Year,Annual CO\u{2082} emissions\nPakistan,PAK,2022,200000000\nPakistan,PAK,2023,\n";
        let series = Co2Series::from_reader(Cursor::new(csv)).expect("parses");
        assert_eq!(series.tons("Pakistan", 2022), Some(2.0e8));
        assert_eq!(series.tons("Pakistan", 2023), None);
    }

    #[test]
    fn cache_loads_once_and_remembers_failures() {
        let missing: TableCache<CountryDataset> =
            TableCache::from_path("./does-not-exist/dataset.csv");
        assert!(missing.cell.get().is_none());
        assert!(missing.get().is_none());
        assert!(missing.cell.get().is_some());
        assert!(missing.get().is_none());

        let loaded = DatasetCache::preloaded(CountryDataset::from_rows(vec![CountryYearRow::new(
            "Chile", 2021,
        )]));
        assert_eq!(loaded.get().map(CountryDataset::len), Some(1));
    }
}
