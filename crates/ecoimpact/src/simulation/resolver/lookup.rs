use crate::simulation::dataset::{lookup_key, CountryDataset};
use crate::simulation::domain::{
    DEFAULT_INCOME_GROUP, DEFAULT_REGION, EAST_ASIA_PACIFIC, HIGH_INCOME, LOWER_MIDDLE_INCOME,
    NORTH_AMERICA, UPPER_MIDDLE_INCOME,
};
use std::collections::HashMap;

const SOUTH_ASIA: &str = "South Asia";

/// Memberships for jurisdictions the dataset is known to misplace or omit.
const STATIC_MEMBERSHIPS: &[(&str, &str, &str)] = &[
    ("Pakistan", EAST_ASIA_PACIFIC, UPPER_MIDDLE_INCOME),
    ("United States", NORTH_AMERICA, HIGH_INCOME),
    ("India", SOUTH_ASIA, LOWER_MIDDLE_INCOME),
    ("Bangladesh", SOUTH_ASIA, LOWER_MIDDLE_INCOME),
    ("Sri Lanka", SOUTH_ASIA, UPPER_MIDDLE_INCOME),
    ("Nepal", SOUTH_ASIA, LOWER_MIDDLE_INCOME),
    ("Afghanistan", SOUTH_ASIA, LOWER_MIDDLE_INCOME),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOrigin {
    Dataset,
    StaticTable,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub region: String,
    pub income_group: String,
    pub origin: MembershipOrigin,
}

/// Region and income group per jurisdiction, first dataset occurrence wins.
#[derive(Debug, Default)]
pub(crate) struct MembershipIndex {
    exact: HashMap<String, (String, String)>,
    folded: HashMap<String, (String, String)>,
}

impl MembershipIndex {
    pub(crate) fn build(dataset: Option<&CountryDataset>) -> Self {
        let mut index = Self::default();
        let Some(dataset) = dataset else {
            return index;
        };

        for row in dataset.rows() {
            let (Some(region), Some(income)) = (&row.region, &row.income_group) else {
                continue;
            };
            let pair = (region.clone(), income.clone());
            index
                .folded
                .entry(lookup_key(&row.jurisdiction))
                .or_insert_with(|| pair.clone());
            index
                .exact
                .entry(row.jurisdiction.clone())
                .or_insert(pair);
        }

        tracing::debug!(jurisdictions = index.exact.len(), "built membership index");
        index
    }

    pub(crate) fn lookup(&self, country: &str) -> Membership {
        let found = self
            .exact
            .get(country)
            .or_else(|| self.folded.get(&lookup_key(country)));
        if let Some((region, income_group)) = found {
            return Membership {
                region: region.clone(),
                income_group: income_group.clone(),
                origin: MembershipOrigin::Dataset,
            };
        }

        let key = lookup_key(country);
        if let Some((_, region, income_group)) = STATIC_MEMBERSHIPS
            .iter()
            .find(|(name, _, _)| lookup_key(name) == key)
        {
            return Membership {
                region: (*region).to_string(),
                income_group: (*income_group).to_string(),
                origin: MembershipOrigin::StaticTable,
            };
        }

        Membership {
            region: DEFAULT_REGION.to_string(),
            income_group: DEFAULT_INCOME_GROUP.to_string(),
            origin: MembershipOrigin::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::dataset::CountryYearRow;

    fn row(country: &str, year: i32, region: &str, income: &str) -> CountryYearRow {
        let mut row = CountryYearRow::new(country, year);
        row.region = Some(region.to_string());
        row.income_group = Some(income.to_string());
        row
    }

    #[test]
    fn dataset_memberships_win_over_static_table() {
        let dataset = CountryDataset::from_rows(vec![
            row("India", 2020, "Dataset Region", LOWER_MIDDLE_INCOME),
            row("India", 2021, "Later Region", HIGH_INCOME),
        ]);
        let index = MembershipIndex::build(Some(&dataset));

        let india = index.lookup("India");
        assert_eq!(india.region, "Dataset Region");
        assert_eq!(india.origin, MembershipOrigin::Dataset);
        assert_eq!(index.lookup("india").region, "Dataset Region");
    }

    #[test]
    fn falls_back_to_static_table_then_defaults() {
        let index = MembershipIndex::build(None);

        let nepal = index.lookup("Nepal");
        assert_eq!(nepal.region, SOUTH_ASIA);
        assert_eq!(nepal.origin, MembershipOrigin::StaticTable);

        let unknown = index.lookup("Atlantis");
        assert_eq!(unknown.region, DEFAULT_REGION);
        assert_eq!(unknown.income_group, DEFAULT_INCOME_GROUP);
        assert_eq!(unknown.origin, MembershipOrigin::Default);
    }
}
