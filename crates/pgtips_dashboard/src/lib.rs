pub mod config;
pub mod dashboard;
pub mod dashboard_definitions;
pub mod errors;
pub mod panel;
mod panels;
pub mod query_builder;
