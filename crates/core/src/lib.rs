pub mod analysis;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod report;
pub mod validation;

pub use analysis::{
    CategoryAnalyzer, CategoryInsight, PerformanceSegmenter, PriceSegmentAnalysis,
    PriceSegmentAnalyzer, RecommendationEngine, SeasonalAnalyzer, StockAnalyzer,
};
pub use config::{AnalysisConfig, AppConfig, LoadOptions, LogFormat};
pub use domain::input::AnalysisInput;
pub use domain::product::{Product, ProductId};
pub use engine::{analyze, analyze_with, execute, execute_with, AnalysisResponse};
pub use errors::{AnalysisError, ErrorCode, ErrorEnvelope, FailureKind};
pub use report::{EnrichedProduct, InsightReport, InventorySummary, OutputFormatter};
pub use validation::InputValidator;
