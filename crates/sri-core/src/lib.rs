pub mod config;
pub mod logging;

pub mod controller;
pub mod digest;
pub mod eligibility;
pub mod error;
pub mod runner;
