pub mod chain;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod render;
pub mod scoring;
pub mod segment;
pub mod selectors;

pub use chain::{BlogExtractor, Stage, Strategy};
pub use config::ExtractorConfig;
pub use error::{HardError, SoftError, StrategyError};
pub use models::{AnalyzedArticle, ExtractionMethod, ExtractionResult, Paragraph, StructuredSections};
