pub mod config;
pub mod consolidate;
pub mod diagnostics;
pub mod error;
pub mod input;
pub mod plan;
pub mod purchase;
pub mod render;
pub mod report;
pub mod solver;
pub mod types;
pub mod validate;
