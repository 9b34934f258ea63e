//! Tests for TreeBuilder

use std::collections::HashSet;

use rstest::rstest;

use aidtree::domain::{Appeal, Record, TreeBuilder, TreeNode, YearRange};
use aidtree::util::testing;

fn rec(start: i32, year: i32, appeal: Appeal, country: &str, continent: &str) -> Record {
    Record::new(start, year, appeal, country, continent)
}

fn range(min: i32, max: i32) -> YearRange {
    YearRange::new(min, max).unwrap()
}

/// Mixed dataset spanning several continents, decades and both appeal values.
fn sample_records() -> Vec<Record> {
    vec![
        rec(1995, 1995, Appeal::Yes, "Sudan", "Africa"),
        rec(2004, 2005, Appeal::Yes, "Indonesia", "Asia"),
        rec(2010, 2010, Appeal::Yes, "Haiti", "Americas"),
        rec(2010, 2011, Appeal::No, "Haiti", "Americas"),
        rec(1960, 1960, Appeal::Yes, "chile", "Americas"),
        rec(2015, 2015, Appeal::No, "Nepal", "Asia"),
        rec(2015, 2015, Appeal::Yes, "Nepal", "Asia"),
        rec(1998, 1998, Appeal::No, "Sudan", "Africa"),
        rec(2019, 2019, Appeal::Yes, "Bolivia (Plurinational State of)", "Americas"),
        rec(1930, 1930, Appeal::No, "Italy", "Europe"),
        rec(2015, 2016, Appeal::Yes, "Nepal", "Asia"),
    ]
}

fn branch<'a>(tree: &'a TreeNode, label: &str) -> &'a TreeNode {
    tree.child(label).expect("branch present")
}

fn country_years(tree: &TreeNode, label: &str, continent: &str, country: &str) -> Vec<String> {
    branch(tree, label)
        .child(continent)
        .and_then(|c| c.child(country))
        .map(|c| c.children.iter().map(|y| y.name.clone()).collect())
        .unwrap_or_else(|| panic!("{label}/{continent}/{country} missing"))
}

#[test]
fn given_example_records_when_building_then_no_branch_keeps_empty_country() {
    testing::init_test_setup();
    // Arrange
    let records = vec![
        rec(2000, 2000, Appeal::Yes, "Chad", "Africa"),
        rec(1950, 1950, Appeal::No, "Chad", "Africa"),
    ];

    // Act
    let tree = TreeBuilder::new().build(&records, range(1990, 2023));

    // Assert
    let expected = TreeNode::branch(
        "Appealed for aid?",
        vec![
            TreeNode::branch(
                "Yes",
                vec![TreeNode::branch(
                    "Africa",
                    vec![TreeNode::branch("Chad", vec![TreeNode::leaf("2000")])],
                )],
            ),
            TreeNode::branch(
                "No",
                vec![TreeNode::branch("Africa", vec![TreeNode::leaf("Chad")])],
            ),
        ],
    );
    assert_eq!(tree, expected);
}

#[test]
fn given_no_records_when_building_then_returns_two_empty_branches() {
    // Act
    let tree = TreeBuilder::new().build(&[], YearRange::full());

    // Assert
    assert_eq!(tree.name, "Appealed for aid?");
    assert_eq!(tree.child_names(), vec!["Yes", "No"]);
    assert!(tree.children.iter().all(|b| b.children.is_empty()));
}

#[test]
fn given_range_excluding_everything_when_building_then_continents_remain_empty() {
    // Act
    let tree = TreeBuilder::new().build(&sample_records(), range(1900, 1920));

    // Assert
    for label in ["Yes", "No"] {
        let b = branch(&tree, label);
        assert_eq!(b.child_names(), vec!["Africa", "Asia", "Americas", "Europe"]);
        assert!(b.children.iter().all(|c| c.children.is_empty()));
    }
}

#[rstest]
#[case(1900, 2023)]
#[case(1990, 2010)]
#[case(2015, 2015)]
#[case(1950, 1999)]
fn given_any_range_when_building_then_both_branches_list_all_continents(
    #[case] min: i32,
    #[case] max: i32,
) {
    // Arrange
    let records = sample_records();

    // Act
    let tree = TreeBuilder::new().build(&records, range(min, max));

    // Assert: first-occurrence order of the unfiltered data
    let expected = vec!["Africa", "Asia", "Americas", "Europe"];
    assert_eq!(branch(&tree, "Yes").child_names(), expected);
    assert_eq!(branch(&tree, "No").child_names(), expected);
}

#[rstest]
#[case(1900, 2023)]
#[case(1990, 2010)]
#[case(2015, 2015)]
#[case(1955, 1965)]
fn given_any_range_when_building_then_leaves_come_from_in_range_records(
    #[case] min: i32,
    #[case] max: i32,
) {
    // Arrange
    let records = sample_records();
    let r = range(min, max);
    let allowed: HashSet<String> = records
        .iter()
        .filter(|rec| r.contains(rec.start_year))
        .map(|rec| rec.year.to_string())
        .collect();

    // Act
    let tree = TreeBuilder::new().build(&records, r);

    // Assert
    for b in &tree.children {
        for continent in &b.children {
            for country in &continent.children {
                for leaf in &country.children {
                    assert!(leaf.is_leaf());
                    assert!(
                        allowed.contains(&leaf.name),
                        "leaf {} not from range {}",
                        leaf.name,
                        r
                    );
                }
            }
        }
    }
}

#[test]
fn given_mixed_case_countries_when_building_then_sorted_case_insensitive() {
    // Act
    let tree = TreeBuilder::new().build(&sample_records(), YearRange::full());

    // Assert
    let americas = branch(&tree, "Yes").child("Americas").unwrap();
    assert_eq!(
        americas.child_names(),
        vec!["Bolivia (Pluri", "chile", "Haiti"]
    );
}

#[test]
fn given_long_country_name_when_building_then_truncates_to_fourteen_chars() {
    // Act
    let tree = TreeBuilder::new().build(&sample_records(), YearRange::full());

    // Assert
    for b in &tree.children {
        for continent in &b.children {
            for country in &continent.children {
                assert!(country.name.chars().count() <= 14, "{}", country.name);
            }
        }
    }
    assert!(branch(&tree, "Yes")
        .child("Americas")
        .unwrap()
        .child("Bolivia (Pluri")
        .is_some());
}

#[test]
fn given_repeated_events_when_building_then_years_keep_encounter_order() {
    // Arrange
    let records = vec![
        rec(2015, 2016, Appeal::Yes, "Nepal", "Asia"),
        rec(2015, 2015, Appeal::Yes, "Nepal", "Asia"),
        rec(2015, 2015, Appeal::Yes, "Nepal", "Asia"),
    ];

    // Act
    let tree = TreeBuilder::new().build(&records, YearRange::full());

    // Assert
    assert_eq!(
        country_years(&tree, "Yes", "Asia", "Nepal"),
        vec!["2016", "2015", "2015"]
    );
}

#[test]
fn given_country_with_only_no_events_when_building_then_absent_from_no_branch() {
    // Act
    let tree = TreeBuilder::new().build(&sample_records(), YearRange::full());

    // Assert: Italy has no appeal record, so no branch lists it
    let europe_no = branch(&tree, "No").child("Europe").unwrap();
    assert!(europe_no.children.is_empty());
    assert_eq!(country_years(&tree, "No", "Americas", "Haiti"), vec!["2011"]);
    assert_eq!(country_years(&tree, "No", "Africa", "Sudan"), vec!["1998"]);
    assert!(country_years(&tree, "No", "Americas", "chile").is_empty());
}

#[test]
fn given_start_year_differs_from_year_when_filtering_then_uses_start_year() {
    // Arrange: event year inside the range, start year outside
    let records = vec![
        rec(2004, 2005, Appeal::Yes, "Indonesia", "Asia"),
        rec(2006, 2006, Appeal::Yes, "Indonesia", "Asia"),
    ];

    // Act
    let tree = TreeBuilder::new().build(&records, range(2005, 2010));

    // Assert
    assert_eq!(country_years(&tree, "Yes", "Asia", "Indonesia"), vec!["2006"]);
}

#[test]
fn given_identical_inputs_when_building_twice_then_trees_are_equal() {
    // Arrange
    let records = sample_records();
    let builder = TreeBuilder::new();

    // Act
    let first = builder.build(&records, range(1990, 2020));
    let second = builder.build(&records, range(1990, 2020));

    // Assert
    assert_eq!(first, second);
    assert_eq!(first.leaf_count(), second.leaf_count());
}

#[test]
fn given_populated_tree_when_measuring_depth_then_has_five_levels() {
    // Act
    let tree = TreeBuilder::new().build(&sample_records(), YearRange::full());

    // Assert: root, branch, continent, country, year
    assert_eq!(tree.depth(), 5);
}
