// src/commands/mod.rs
mod analyze;

pub use analyze::{Analysis, AnalysisOutcome, AnalysisReport, Analyzer, MentionEdge};
