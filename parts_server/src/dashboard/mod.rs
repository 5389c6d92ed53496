//! In-process analytics over report rows.

pub mod lifecycle;
pub mod mileage;
pub mod odometer;
pub mod stats;
