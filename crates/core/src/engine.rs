//! Single-call entry point that runs the whole insight pipeline.
//!
//! Stages run in a fixed order and each one reads only what earlier stages
//! produced. Any failure short-circuits the run and becomes an error envelope;
//! nothing partial is ever returned.

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analysis::{
    CategoryAnalyzer, PerformanceSegmenter, PriceSegmentAnalyzer, ProductMetrics,
    RecommendationEngine, RecommendationMetric, SeasonalAnalyzer,
};
use crate::config::AnalysisConfig;
use crate::domain::input::AnalysisInput;
use crate::errors::{AnalysisError, ErrorEnvelope, FailureKind};
use crate::report::{AnalysisResults, InsightReport};
use crate::validation::InputValidator;

/// Either the finished report or the error envelope, serialized as-is.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Report(InsightReport),
    Failure(ErrorEnvelope),
}

impl AnalysisResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Report(_))
    }

    pub fn report(&self) -> Option<&InsightReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorEnvelope> {
        match self {
            Self::Report(_) => None,
            Self::Failure(envelope) => Some(envelope),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|error| {
            let envelope = ErrorEnvelope::from(AnalysisError::Internal {
                kind: FailureKind::Serialization,
                message: error.to_string(),
            });
            serde_json::to_value(envelope).unwrap_or(Value::Null)
        })
    }
}

impl From<Result<InsightReport, AnalysisError>> for AnalysisResponse {
    fn from(value: Result<InsightReport, AnalysisError>) -> Self {
        match value {
            Ok(report) => Self::Report(report),
            Err(error) => Self::Failure(error.into()),
        }
    }
}

/// Runs the pipeline with default tunables and never fails outward.
pub fn execute(payload: &Value) -> AnalysisResponse {
    execute_with(&AnalysisConfig::default(), payload)
}

pub fn execute_with(config: &AnalysisConfig, payload: &Value) -> AnalysisResponse {
    let tenant_id = tenant_of(payload);
    let started = Instant::now();
    info!(
        event_name = "analysis.execute.start",
        tenant_id,
        products = entries(payload, "products"),
        orders = entries(payload, "orderHistory"),
        cities = entries(payload, "climateData"),
        "product analysis started"
    );

    match analyze_with(config, payload) {
        Ok(report) => {
            info!(
                event_name = "analysis.execute.completed",
                tenant_id,
                hero_products = report.hero_products.len(),
                slow_movers = report.slow_movers.len(),
                seasonal_products = report.seasonal_products.len(),
                total_products = report.inventory_summary.total_products,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "product analysis completed"
            );
            AnalysisResponse::Report(report)
        }
        Err(error) => {
            warn!(
                event_name = "analysis.execute.failed",
                tenant_id,
                code = error.code().as_str(),
                error = %error,
                "product analysis failed"
            );
            AnalysisResponse::Failure(error.into())
        }
    }
}

pub fn analyze(payload: &Value) -> Result<InsightReport, AnalysisError> {
    analyze_with(&AnalysisConfig::default(), payload)
}

pub fn analyze_with(config: &AnalysisConfig, payload: &Value) -> Result<InsightReport, AnalysisError> {
    let validated = InputValidator.validate(payload).map_err(|error| {
        warn!(
            event_name = "analysis.validation.rejected",
            tenant_id = tenant_of(payload),
            error = %error,
            "input rejected"
        );
        error
    })?;
    let tenant_id = validated.tenant_id;

    let input = AnalysisInput::from_payload(validated)?;
    InputValidator.check_unique_product_ids(&input.products)?;
    let products = input.products.as_slice();

    let stock = config.stock_analyzer().analyze(products, &input.order_history);
    stage_completed(tenant_id, "stock", stock.len());

    let performance = PerformanceSegmenter.segment(products, &stock);
    stage_completed(tenant_id, "performance", performance.len());

    let seasonal = SeasonalAnalyzer.analyze(products, input.current_season(), &input.climate_data);
    stage_completed(tenant_id, "seasonal", seasonal.len());

    let engine = RecommendationEngine;
    let recommendations: ProductMetrics<RecommendationMetric> = products
        .iter()
        .map(|product| {
            let id = &product.product_id;
            let metric = engine.recommend(
                product,
                performance.get(id),
                stock.get(id),
                seasonal.get(id),
            );
            (id.clone(), metric)
        })
        .collect();
    stage_completed(tenant_id, "recommendation", recommendations.len());

    let category_insights = CategoryAnalyzer.analyze(products, &performance, &stock);
    stage_completed(tenant_id, "category", category_insights.len());

    let price_segment_analysis = PriceSegmentAnalyzer.analyze(products, &performance, &stock);
    stage_completed(tenant_id, "price_segment", price_segment_analysis.total_products());

    let results = AnalysisResults {
        stock,
        performance,
        seasonal,
        recommendations,
        category_insights,
        price_segment_analysis,
    };
    let report = config.formatter().format(products, results);
    stage_completed(tenant_id, "format", report.inventory_summary.total_products);

    Ok(report)
}

fn tenant_of(payload: &Value) -> &str {
    payload.get("tenantId").and_then(Value::as_str).unwrap_or_default()
}

/// Length of a top-level list or mapping; zero for anything else.
fn entries(payload: &Value, field: &str) -> usize {
    match payload.get(field) {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        _ => 0,
    }
}

fn stage_completed(tenant_id: &str, stage: &'static str, records: usize) {
    debug!(event_name = "analysis.stage.completed", tenant_id, stage, records, "analysis stage done");
}
