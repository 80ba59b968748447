//! HTTP handlers, grouped by resource.

pub mod catalog;
pub mod health;
pub mod results;
