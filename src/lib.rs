// src/lib.rs
pub mod commands;
pub mod config;
pub mod services;
pub mod utils;

pub use commands::{AnalysisOutcome, AnalysisReport, Analyzer};
pub use config::AnalyzerConfig;
