//! Service modules for genre analysis

pub mod analysis;

pub use analysis::{AnalysisError, GenreAnalysis, GenreAnalyzer};
