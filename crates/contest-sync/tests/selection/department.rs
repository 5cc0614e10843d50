//! Department filtering, listing, and counting.

use contest_sync::selection::{
    department_counts, departments, eligible, filter_by_department, DepartmentFilter,
    ALL_DEPARTMENTS,
};
use contest_sync::types::{ContestFields, Record, Winner};

fn record(id: Option<&str>, name: &str, department: &str) -> Winner {
    let fields = ContestFields {
        guide_id: format!("guide-{name}"),
        name: name.to_string(),
        department: department.to_string(),
        supervisor: String::new(),
        timestamp: "2024-01-01T00:00:00Z".parse().unwrap(),
        chat_ids: vec![],
    };
    match id {
        Some(id) => Record::persisted(id, fields),
        None => Record::Pending(fields),
    }
}

fn roster() -> Vec<Winner> {
    vec![
        record(Some("1"), "Ana", "Billing"),
        record(Some("2"), "Bo", "Support"),
        record(None, "Cy", "Billing"),
        record(Some("3"), "Di", "support"),
        record(Some("4"), "Ed", "Billing"),
    ]
}

#[test]
fn label_round_trip() {
    assert_eq!(DepartmentFilter::from_label(ALL_DEPARTMENTS), DepartmentFilter::All);
    assert_eq!(
        DepartmentFilter::from_label("Billing"),
        DepartmentFilter::Only("Billing".to_string())
    );
    assert_eq!(DepartmentFilter::default().label(), "All");
    assert_eq!(DepartmentFilter::Only("Billing".to_string()).label(), "Billing");
}

#[test]
fn all_keeps_everything_in_order() {
    let all = roster();
    let names: Vec<&str> = filter_by_department(&all, &DepartmentFilter::All)
        .into_iter()
        .map(|r| r.name())
        .collect();
    assert_eq!(names, vec!["Ana", "Bo", "Cy", "Di", "Ed"]);
}

#[test]
fn match_is_exact_and_case_sensitive() {
    let all = roster();
    let support: Vec<&str> = filter_by_department(&all, &DepartmentFilter::from_label("Support"))
        .into_iter()
        .map(|r| r.name())
        .collect();
    assert_eq!(support, vec!["Bo"]);

    let none = filter_by_department(&all, &DepartmentFilter::from_label("Sales"));
    assert!(none.is_empty());
}

#[test]
fn eligible_skips_pending_records() {
    let all = roster();
    let billing: Vec<&str> = eligible(&all, &DepartmentFilter::from_label("Billing"))
        .into_iter()
        .map(|r| r.name())
        .collect();
    assert_eq!(billing, vec!["Ana", "Ed"]);
    assert_eq!(eligible(&all, &DepartmentFilter::All).len(), 4);
}

#[test]
fn departments_are_distinct_and_sorted() {
    assert_eq!(departments(&roster()), vec!["Billing", "Support", "support"]);
    assert!(departments::<ContestFields>(&[]).is_empty());
}

#[test]
fn counts_per_department() {
    let counts = department_counts(&roster());
    assert_eq!(counts.get("Billing"), Some(&3));
    assert_eq!(counts.get("Support"), Some(&1));
    assert_eq!(counts.get("support"), Some(&1));
    assert_eq!(counts.values().sum::<usize>(), 5);
}
