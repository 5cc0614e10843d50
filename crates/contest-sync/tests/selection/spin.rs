//! Spin draws over filtered candidates.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use contest_sync::error::SelectionError;
use contest_sync::selection::{
    eligible, pick, spin, DepartmentFilter, MIN_SETTLE_FRAMES, SETTLE_FRAME_SPREAD,
};
use contest_sync::types::{ContestFields, Record, Winner};

fn record(id: &str, department: &str) -> Winner {
    Record::persisted(
        id,
        ContestFields {
            guide_id: format!("guide-{id}"),
            name: format!("name-{id}"),
            department: department.to_string(),
            supervisor: String::new(),
            timestamp: "2024-01-01T00:00:00Z".parse().unwrap(),
            chat_ids: vec![],
        },
    )
}

#[test]
fn selection_is_always_a_member_of_the_filtered_set() {
    let all: Vec<Winner> = (0..20)
        .map(|i| record(&i.to_string(), if i % 3 == 0 { "Billing" } else { "Support" }))
        .collect();
    let filter = DepartmentFilter::from_label("Billing");
    let candidates = eligible(&all, &filter);

    for seed in 0..200 {
        let mut rng = StdRng::seed_from_u64(seed);
        let s = spin(&candidates, &mut rng).unwrap();
        assert_eq!(s.selected.department(), "Billing");
        assert!(s.frames.iter().all(|f| f.department() == "Billing"));
        assert!(std::ptr::eq(s.selected, *s.frames.last().unwrap()));
        let frames = s.frames.len();
        assert!((MIN_SETTLE_FRAMES..MIN_SETTLE_FRAMES + SETTLE_FRAME_SPREAD).contains(&frames));
    }
}

#[test]
fn empty_filter_result_is_an_error() {
    let all = vec![record("1", "Support")];
    let candidates = eligible(&all, &DepartmentFilter::from_label("Billing"));
    let mut rng = StdRng::seed_from_u64(1);

    assert!(matches!(
        spin(&candidates, &mut rng),
        Err(SelectionError::NoEligibleCandidates)
    ));
}

#[test]
fn draws_cover_every_candidate() {
    let all: Vec<Winner> = (0..4).map(|i| record(&i.to_string(), "Support")).collect();
    let mut rng = StdRng::seed_from_u64(42);

    let seen: HashSet<&str> = (0..500)
        .map(|_| pick(&all, &mut rng).unwrap().id().unwrap())
        .collect();
    assert_eq!(seen.len(), 4);
}

#[test]
fn same_seed_same_result() {
    let all: Vec<Winner> = (0..10).map(|i| record(&i.to_string(), "Support")).collect();
    let a = spin(&all, &mut StdRng::seed_from_u64(9)).unwrap();
    let b = spin(&all, &mut StdRng::seed_from_u64(9)).unwrap();
    assert_eq!(a.selected.id(), b.selected.id());
    assert_eq!(a.frames.len(), b.frames.len());
}
