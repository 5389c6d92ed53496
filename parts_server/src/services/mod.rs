//! Report queries. Each service takes a connection and a validated filter.

pub mod catalog_service;
pub mod lifecycle_service;
pub mod overview_service;
pub mod part_history_service;
pub mod service_order_service;
pub mod vehicle_service;
