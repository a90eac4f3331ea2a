use super::{CountryYearRow, EnergyMix};
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) struct ParsedRows<T> {
    pub(crate) rows: Vec<T>,
    pub(crate) skipped: usize,
}

pub(crate) fn parse_country_rows<R: Read>(
    reader: R,
) -> Result<ParsedRows<CountryYearRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    let mut skipped = 0;

    for record in csv_reader.deserialize::<DatasetRow>() {
        match record?.into_row() {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    Ok(ParsedRows { rows, skipped })
}

pub(crate) struct Co2Observation {
    pub(crate) entity: String,
    pub(crate) year: i32,
    pub(crate) tons: f64,
}

pub(crate) fn parse_co2_rows<R: Read>(
    reader: R,
) -> Result<ParsedRows<Co2Observation>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    let mut skipped = 0;

    for record in csv_reader.deserialize::<Co2Row>() {
        let row = record?;
        match (row.entity, row.year, row.emissions) {
            (Some(entity), Some(year), Some(tons)) => rows.push(Co2Observation { entity, year, tons }),
            _ => skipped += 1,
        }
    }

    Ok(ParsedRows { rows, skipped })
}

#[derive(Debug, Deserialize)]
struct DatasetRow {
    #[serde(
        rename = "Jurisdiction",
        alias = "Country",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    jurisdiction: Option<String>,
    #[serde(rename = "Year", default, deserialize_with = "lenient_year")]
    year: Option<i32>,
    #[serde(rename = "Region", default, deserialize_with = "empty_string_as_none")]
    region: Option<String>,
    #[serde(
        rename = "Income group",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    income_group: Option<String>,
    #[serde(rename = "GDP", default, deserialize_with = "lenient_f64")]
    gdp: Option<f64>,
    #[serde(rename = "Population", default, deserialize_with = "lenient_f64")]
    population: Option<f64>,
    #[serde(rename = "Population_Log", default, deserialize_with = "lenient_f64")]
    population_log: Option<f64>,
    #[serde(
        rename = "Fossil_Fuel_Dependency_%",
        default,
        deserialize_with = "lenient_f64"
    )]
    fossil_share: Option<f64>,
    #[serde(
        rename = "Annual_CO2_emissions",
        default,
        deserialize_with = "lenient_f64"
    )]
    annual_co2: Option<f64>,
    #[serde(rename = "Coal per capita (kWh)", default, deserialize_with = "lenient_f64")]
    coal: Option<f64>,
    #[serde(rename = "Oil per capita (kWh)", default, deserialize_with = "lenient_f64")]
    oil: Option<f64>,
    #[serde(rename = "Gas per capita (kWh)", default, deserialize_with = "lenient_f64")]
    gas: Option<f64>,
    #[serde(
        rename = "Nuclear per capita (kWh - equivalent)",
        default,
        deserialize_with = "lenient_f64"
    )]
    nuclear: Option<f64>,
    #[serde(
        rename = "Hydro per capita (kWh - equivalent)",
        default,
        deserialize_with = "lenient_f64"
    )]
    hydro: Option<f64>,
    #[serde(
        rename = "Wind per capita (kWh - equivalent)",
        default,
        deserialize_with = "lenient_f64"
    )]
    wind: Option<f64>,
    #[serde(
        rename = "Solar per capita (kWh - equivalent)",
        default,
        deserialize_with = "lenient_f64"
    )]
    solar: Option<f64>,
    #[serde(
        rename = "Other renewables per capita (kWh - equivalent)",
        default,
        deserialize_with = "lenient_f64"
    )]
    other_renewables: Option<f64>,
}

impl DatasetRow {
    fn into_row(self) -> Option<CountryYearRow> {
        let jurisdiction = self.jurisdiction?;
        let year = self.year?;

        let energy_mix = EnergyMix {
            coal: self.coal,
            oil: self.oil,
            gas: self.gas,
            nuclear: self.nuclear,
            hydro: self.hydro,
            wind: self.wind,
            solar: self.solar,
            other_renewables: self.other_renewables,
        };

        let population = self
            .population
            .filter(|value| *value > 0.0)
            .or_else(|| self.population_log.map(f64::exp).filter(|v| v.is_finite()));
        let fossil_share_pct = self
            .fossil_share
            .or_else(|| energy_mix.fossil_share_pct());

        Some(CountryYearRow {
            jurisdiction,
            year,
            region: self.region,
            income_group: self.income_group,
            gdp_usd: self.gdp,
            population,
            fossil_share_pct,
            annual_co2_tons: self.annual_co2,
            energy_mix,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Co2Row {
    #[serde(
        rename = "Entity",
        alias = "Country",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    entity: Option<String>,
    #[serde(rename = "Year", default, deserialize_with = "lenient_year")]
    year: Option<i32>,
    #[serde(
        rename = "Annual CO\u{2082} emissions",
        alias = "Annual CO2 emissions",
        alias = "CO2_emissions",
        default,
        deserialize_with = "lenient_f64"
    )]
    emissions: Option<f64>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.as_deref().and_then(parse_number))
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.as_deref().and_then(parse_year))
}

/// Blank, `NaN`, and infinite cells all count as missing.
fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|number| number.is_finite())
}

fn parse_year(value: &str) -> Option<i32> {
    let trimmed = value.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    parse_number(trimmed)
        .filter(|number| number.fract() == 0.0 && number.abs() < f64::from(i32::MAX))
        .map(|number| number as i32)
}

#[cfg(test)]
pub(crate) fn parse_number_for_tests(value: &str) -> Option<f64> {
    parse_number(value)
}

#[cfg(test)]
pub(crate) fn parse_year_for_tests(value: &str) -> Option<i32> {
    parse_year(value)
}
