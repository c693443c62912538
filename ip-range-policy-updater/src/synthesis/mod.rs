//! Policy synthesis (deterministic JSON generation)

pub mod policy_builder;

pub use policy_builder::{base_policy, build_region_policy, with_source_ip_condition};
