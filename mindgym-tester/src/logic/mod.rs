pub mod reports;
pub mod runner;

pub use runner::{ScenarioResult, ScenarioRunner, run_plan};
