//! BDD step definitions for the OLT dashboard service

pub mod dashboard_steps;
pub mod lifecycle_steps;
pub mod normalization_steps;
pub mod traffic_steps;
pub mod view_steps;
