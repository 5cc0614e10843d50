//! Candidate narrowing and random selection.
//!
//! - [`department`]: [`DepartmentFilter`], department lists and counts.
//! - [`spin`]: uniform draws over an eligible set.
//!
//! Nothing here removes candidates from later draws; callers exclude
//! candidates by building `eligible` accordingly.

pub mod department;
pub mod spin;

pub use department::{
    department_counts, departments, eligible, filter_by_department, DepartmentFilter,
    ALL_DEPARTMENTS,
};
pub use spin::{pick, spin, Spin, MIN_SETTLE_FRAMES, SETTLE_FRAME_SPREAD};
