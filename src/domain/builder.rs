//! Tree builder reshaping flat records into the appeal hierarchy.
//!
//! Shape: root → {Yes, No} → continent → country → year leaves.
//!
//! Country membership of *both* branches comes from the in-range Yes records.
//! A country that only has No events is therefore absent from the No branch,
//! and a country with Yes events but no No events shows up under No with no
//! year leaves.

use std::collections::HashMap;

use itertools::Itertools;

use crate::domain::entities::{Appeal, CountryAggregate, Record, TreeNode, TreeOptions, YearRange};

/// Aggregates of both branches for one range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchAggregates {
    pub yes: Vec<CountryAggregate>,
    pub no: Vec<CountryAggregate>,
}

/// Constructs the appeal tree from a record set.
///
/// Stateless apart from its options; every call rebuilds from scratch.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    options: TreeOptions,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Build the full tree for `records` restricted to `range`.
    pub fn build(&self, records: &[Record], range: YearRange) -> TreeNode {
        let continents = continents(records);
        let aggregates = self.aggregate(records, range);

        TreeNode::branch(
            self.options.root_label.clone(),
            vec![
                self.branch_node(&self.options.yes_label, &continents, &aggregates.yes),
                self.branch_node(&self.options.no_label, &continents, &aggregates.no),
            ],
        )
    }

    /// Sorted country aggregates for the Yes and No branches.
    pub fn aggregate(&self, records: &[Record], range: YearRange) -> BranchAggregates {
        let (yes, no): (Vec<&Record>, Vec<&Record>) = records
            .iter()
            .filter(|r| range.contains(r.start_year))
            .partition(|r| r.appeal == Appeal::Yes);

        BranchAggregates {
            yes: aggregate_branch(&yes, &yes),
            no: aggregate_branch(&yes, &no),
        }
    }

    fn branch_node(
        &self,
        label: &str,
        continents: &[&str],
        aggregates: &[CountryAggregate],
    ) -> TreeNode {
        let mut by_continent: HashMap<&str, Vec<TreeNode>> = aggregates.iter().fold(
            HashMap::new(),
            |mut acc, agg| {
                acc.entry(agg.continent.as_str())
                    .or_default()
                    .push(self.country_node(agg));
                acc
            },
        );

        // Aggregates of unlisted continents stay in the map and are dropped
        let children = continents
            .iter()
            .map(|c| TreeNode::branch(*c, by_continent.remove(c).unwrap_or_default()))
            .collect();

        TreeNode::branch(label, children)
    }

    fn country_node(&self, agg: &CountryAggregate) -> TreeNode {
        let name: String = agg.country.chars().take(self.options.name_width).collect();
        let years = agg
            .years
            .iter()
            .map(|y| TreeNode::leaf(y.to_string()))
            .collect();
        TreeNode::branch(name, years)
    }
}

/// Distinct continents of the unfiltered data, in first-occurrence order.
pub fn continents(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.continent.as_str()).unique().collect()
}

/// Aggregate `subset` over the countries found in `membership`.
///
/// The continent of each aggregate is the one of the last matching `subset`
/// record; countries without any match keep the continent seen in `membership`.
fn aggregate_branch(membership: &[&Record], subset: &[&Record]) -> Vec<CountryAggregate> {
    let (index, mut aggregates) = membership.iter().fold(
        (HashMap::<&str, usize>::new(), Vec::<CountryAggregate>::new()),
        |(mut index, mut aggregates), r| {
            match index.get(r.country.as_str()) {
                Some(&i) => aggregates[i].continent = r.continent.clone(),
                None => {
                    index.insert(r.country.as_str(), aggregates.len());
                    aggregates.push(CountryAggregate::new(&r.country, &r.continent));
                }
            }
            (index, aggregates)
        },
    );

    for r in subset {
        if let Some(&i) = index.get(r.country.as_str()) {
            let agg = &mut aggregates[i];
            agg.years.push(r.year);
            agg.continent = r.continent.clone();
        }
    }

    aggregates.sort_by_cached_key(|a| a.country.to_uppercase());
    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(start: i32, appeal: Appeal, country: &str, continent: &str) -> Record {
        Record::new(start, start, appeal, country, continent)
    }

    #[test]
    fn given_same_country_on_two_continents_when_aggregating_then_last_record_wins() {
        let records = vec![
            rec(2000, Appeal::Yes, "Georgia", "Asia"),
            rec(2001, Appeal::Yes, "Georgia", "Europe"),
        ];

        let aggs = TreeBuilder::new().aggregate(&records, YearRange::full());

        assert_eq!(aggs.yes.len(), 1);
        assert_eq!(aggs.yes[0].continent, "Europe");
        assert_eq!(aggs.yes[0].years, vec![2000, 2001]);
    }

    #[test]
    fn given_country_only_in_no_subset_when_aggregating_then_absent_from_both() {
        let records = vec![
            rec(2000, Appeal::Yes, "Chad", "Africa"),
            rec(2000, Appeal::No, "Peru", "Americas"),
        ];

        let aggs = TreeBuilder::new().aggregate(&records, YearRange::full());

        assert_eq!(aggs.yes.len(), 1);
        assert_eq!(aggs.no.len(), 1);
        assert_eq!(aggs.no[0].country, "Chad");
        assert!(aggs.no[0].years.is_empty());
    }

    #[test]
    fn given_mixed_case_names_when_sorting_then_ignores_case() {
        let records = vec![
            rec(2000, Appeal::Yes, "chile", "Americas"),
            rec(2000, Appeal::Yes, "Bolivia", "Americas"),
            rec(2000, Appeal::Yes, "argentina", "Americas"),
        ];

        let aggs = TreeBuilder::new().aggregate(&records, YearRange::full());

        let names: Vec<_> = aggs.yes.iter().map(|a| a.country.as_str()).collect();
        assert_eq!(names, vec!["argentina", "Bolivia", "chile"]);
    }

    #[test]
    fn given_custom_width_when_building_then_truncates_to_width() {
        let options = TreeOptions {
            name_width: 3,
            ..TreeOptions::default()
        };
        let records = vec![rec(2000, Appeal::Yes, "Chad", "Africa")];

        let tree = TreeBuilder::with_options(options).build(&records, YearRange::full());

        let africa = tree.child("Yes").and_then(|b| b.child("Africa")).unwrap();
        assert_eq!(africa.child_names(), vec!["Cha"]);
    }
}
