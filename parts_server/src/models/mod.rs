//! Row types returned by report queries.

pub mod catalog;
pub mod lifecycle;
pub mod overview;
pub mod part_history;
pub mod vehicle;
