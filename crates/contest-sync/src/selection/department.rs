use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Entry, Record};

/// Label of the "no filter" department choice.
pub const ALL_DEPARTMENTS: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DepartmentFilter {
    #[default]
    All,
    Only(String),
}

impl DepartmentFilter {
    /// Parse a UI label; [`ALL_DEPARTMENTS`] means no filter.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_DEPARTMENTS {
            DepartmentFilter::All
        } else {
            DepartmentFilter::Only(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DepartmentFilter::All => ALL_DEPARTMENTS,
            DepartmentFilter::Only(department) => department,
        }
    }

    /// Exact, case-sensitive match.
    pub fn matches(&self, department: &str) -> bool {
        match self {
            DepartmentFilter::All => true,
            DepartmentFilter::Only(wanted) => wanted == department,
        }
    }
}

/// Records whose department passes `filter`, in their original order.
pub fn filter_by_department<'a, F: Entry>(
    all: &'a [Record<F>],
    filter: &DepartmentFilter,
) -> Vec<&'a Record<F>> {
    all.iter().filter(|r| filter.matches(r.department())).collect()
}

/// Like [`filter_by_department`], but pending records are left out: they
/// have no remote id and cannot be selected.
pub fn eligible<'a, F: Entry>(
    all: &'a [Record<F>],
    filter: &DepartmentFilter,
) -> Vec<&'a Record<F>> {
    all.iter()
        .filter(|r| r.is_persisted() && filter.matches(r.department()))
        .collect()
}

/// Distinct departments, sorted ascending.
pub fn departments<F: Entry>(all: &[Record<F>]) -> Vec<String> {
    all.iter()
        .map(|r| r.department())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Number of records per department.
pub fn department_counts<F: Entry>(all: &[Record<F>]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in all {
        *counts.entry(record.department().to_string()).or_insert(0) += 1;
    }
    counts
}
