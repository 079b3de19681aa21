use product_insight_core::analysis::{
    MarginHealth, PerformanceSegment, PerformanceSegmenter, PriceSegment, RecommendedAction,
    SeasonalRelevance, StockAnalyzer, StockSegment, UrgencyLevel,
};
use product_insight_core::domain::product::{Product, RuleType};
use product_insight_core::{analyze, execute, AnalysisResponse, ErrorCode};
use serde_json::{json, Value};

fn payload(products: Value, orders: Value, month: u8, climate: Value) -> Value {
    json!({
        "tenantId": "tenant-1",
        "products": products,
        "orderHistory": orders,
        "currentMonth": month,
        "climateData": climate
    })
}

#[test]
fn single_new_product_without_sales_is_featured() {
    let product = json!({
        "productId": "P1",
        "stock": 100,
        "cost": 50,
        "basePrice": 100,
        "trendScore": 90,
        "lifecycleStage": "NEW",
        "isSeasonal": false
    });
    let input = payload(json!([product.clone()]), json!([]), 7, json!({}));

    let report = analyze(&input).expect("valid input produces a report");

    assert_eq!(report.hero_products.len(), 1);
    let hero = &report.hero_products[0];
    assert_eq!(hero.product_id.as_str(), "P1");
    assert_eq!(hero.daily_sales_rate, 0.0);
    assert_eq!(hero.stock_days, 999.0);
    assert_eq!(hero.stock_segment, StockSegment::Excess);
    assert_eq!(hero.performance_segment, PerformanceSegment::Rising);
    assert_eq!(hero.recommended_action, RecommendedAction::Feature);
    assert_eq!(hero.urgency_level, UrgencyLevel::High);
    assert_eq!(hero.margin_health, MarginHealth::Good);
    assert_eq!(hero.price_segment, PriceSegment::Budget);
    assert_eq!(report.new_products, report.hero_products);
    assert_eq!(report.slow_movers, report.hero_products);

    let catalog: Vec<Product> = serde_json::from_value(json!([product])).expect("product parses");
    let stock = StockAnalyzer::default().analyze(&catalog, &[]);
    let performance = PerformanceSegmenter.segment(&catalog, &stock);
    let metric = &performance[&catalog[0].product_id];
    assert!((metric.margin - 50.0).abs() < 1e-9);

    let summary = &report.inventory_summary;
    assert_eq!(summary.total_products, 1);
    assert_eq!(summary.total_stock_value, 5000.0);
    assert_eq!(summary.excess_stock_products, 1);
    assert_eq!(summary.avg_stock_days, 999.0);
    assert_eq!(summary.inventory_turnover_rate, 0.37);
}

#[test]
fn missing_tenant_id_is_a_validation_error() {
    let mut input = payload(json!([{"productId": "P1"}]), json!([]), 7, json!({}));
    input.as_object_mut().expect("object").remove("tenantId");

    let output = execute(&input).to_value();

    assert_eq!(
        output,
        json!({"error": {"code": "VALIDATION_ERROR", "message": "Missing required field: tenantId"}})
    );
}

#[test]
fn out_of_range_month_cites_the_value() {
    let input = payload(json!([{"productId": "P1"}]), json!([]), 13, json!({}));

    let response = execute(&input);

    let envelope = response.error().expect("month 13 is rejected");
    assert_eq!(envelope.error.code, ErrorCode::ValidationError);
    assert!(envelope.error.message.contains("13"), "message was {}", envelope.error.message);
}

#[test]
fn humid_city_makes_an_all_season_product_highly_relevant() {
    let products = json!([{
        "productId": "RAIN-1",
        "productName": "Rain Jacket",
        "trendScore": 70,
        "isSeasonal": true,
        "seasonCode": "all",
        "seasonalityRules": [{"ruleType": "HIGH_HUMIDITY", "threshold": 60}]
    }]);
    let climate = json!({"Istanbul": {"humidityPct": 70, "avgTempC": 22, "rainfallMm": 5, "seasonTag": "SUMMER"}});

    for month in [1, 4, 7, 10] {
        let report = analyze(&payload(products.clone(), json!([]), month, climate.clone()))
            .expect("valid input produces a report");

        assert_eq!(report.seasonal_products.len(), 1, "month {month}");
        let seasonal = &report.seasonal_products[0];
        assert_eq!(seasonal.seasonal_relevance, SeasonalRelevance::High);
        assert_eq!(seasonal.climate_match, vec![RuleType::HighHumidity]);
        assert_eq!(seasonal.matching_cities, vec!["Istanbul".to_owned()]);
        assert_eq!(seasonal.recommended_action, RecommendedAction::SeasonalPush);
    }
}

#[test]
fn stock_day_and_price_boundaries_are_inclusive() {
    // 90 units sold over the 90-day window gives one unit per day.
    let products = json!([
        {"productId": "D15", "stock": 15, "basePrice": 200, "trendScore": 10},
        {"productId": "D60", "stock": 60, "basePrice": 500, "trendScore": 10},
        {"productId": "D61", "stock": 61, "basePrice": 501, "trendScore": 10}
    ]);
    let orders = json!([{"items": [
        {"productId": "D15", "quantity": 90},
        {"productId": "D60", "quantity": 90},
        {"productId": "D61", "quantity": 90}
    ]}]);

    let report = analyze(&payload(products, orders, 3, json!({}))).expect("report");

    let by_id = |id: &str| {
        report
            .slow_movers
            .iter()
            .find(|product| product.product_id.as_str() == id)
            .cloned()
            .expect("every underperformer is a slow mover")
    };
    assert_eq!(by_id("D15").stock_segment, StockSegment::Healthy);
    assert_eq!(by_id("D15").price_segment, PriceSegment::Budget);
    assert_eq!(by_id("D60").stock_segment, StockSegment::Healthy);
    assert_eq!(by_id("D60").price_segment, PriceSegment::Mid);
    assert_eq!(by_id("D61").stock_segment, StockSegment::Excess);
    assert_eq!(by_id("D61").price_segment, PriceSegment::Premium);
    assert_eq!(report.inventory_summary.healthy_stock_products, 2);
    assert_eq!(report.inventory_summary.excess_stock_products, 1);
}

#[test]
fn product_without_id_reports_missing_field() {
    let input = payload(json!([{"productName": "Nameless"}]), json!([]), 5, json!({}));

    let output = execute(&input).to_value();

    assert_eq!(
        output,
        json!({"error": {
            "code": "MISSING_FIELD",
            "message": "Missing required field: productId",
            "field": "productId"
        }})
    );
}

#[test]
fn wrongly_typed_record_is_an_internal_error() {
    let input = payload(json!([{"productId": "P1", "stock": "lots"}]), json!([]), 5, json!({}));

    let output = execute(&input).to_value();

    assert_eq!(output["error"]["code"], "INTERNAL_ERROR");
    assert_eq!(output["error"]["details"]["type"], "MalformedRecord");
    assert!(output["error"].get("field").is_none());
}

#[test]
fn duplicated_product_ids_are_rejected_before_analysis() {
    let input = payload(json!([{"productId": "P1"}, {"productId": "P1"}]), json!([]), 5, json!({}));

    let response = execute(&input);

    assert!(matches!(response, AnalysisResponse::Failure(_)));
    assert_eq!(
        response.to_value(),
        json!({"error": {"code": "VALIDATION_ERROR", "message": "Duplicate productId: P1"}})
    );
}

#[test]
fn ranked_lists_keep_catalog_order_on_ties() {
    let products = json!([
        {"productId": "A", "lifecycleStage": "NEW", "trendScore": 50},
        {"productId": "B", "lifecycleStage": "NEW", "trendScore": 70},
        {"productId": "C", "lifecycleStage": "NEW", "trendScore": 50}
    ]);

    let report = analyze(&payload(products, json!([]), 2, json!({}))).expect("report");

    let order: Vec<&str> = report.new_products.iter().map(|p| p.product_id.as_str()).collect();
    assert_eq!(order, ["B", "A", "C"]);
}

#[test]
fn category_insights_group_missing_categories_as_unknown() {
    let products = json!([
        {"productId": "A", "category": "Outerwear", "trendScore": 90, "stock": 3},
        {"productId": "B", "trendScore": 40, "stock": 7}
    ]);

    let report = analyze(&payload(products, json!([]), 2, json!({}))).expect("report");

    let categories: Vec<&String> = report.category_insights.keys().collect();
    assert_eq!(categories, ["Outerwear", "Unknown"]);
    assert_eq!(report.category_insights["Unknown"].total_stock, 7);
}

#[test]
fn matching_cities_follow_payload_order() {
    let products = json!([{
        "productId": "HUMID-1",
        "seasonalityRules": [{"ruleType": "HIGH_HUMIDITY", "threshold": 60}]
    }]);
    let climate = json!({"Izmir": {"humidityPct": 80}, "Ankara": {"humidityPct": 70}});

    let report = analyze(&payload(products, json!([]), 6, climate)).expect("report");

    assert_eq!(report.seasonal_products[0].matching_cities, ["Izmir", "Ankara"]);
}

#[test]
fn category_insights_follow_first_seen_order() {
    let products = json!([
        {"productId": "A", "category": "Swimwear"},
        {"productId": "B", "category": "Accessories"},
        {"productId": "C", "category": "Swimwear"}
    ]);

    let report = analyze(&payload(products, json!([]), 6, json!({}))).expect("report");

    let categories: Vec<&String> = report.category_insights.keys().collect();
    assert_eq!(categories, ["Swimwear", "Accessories"]);
    let rendered = serde_json::to_string(&report.category_insights).expect("insights serialize");
    assert!(rendered.starts_with("{\"Swimwear\":"), "got {rendered}");
}

#[test]
fn falsy_seasonal_flags_read_as_non_seasonal() {
    let products = json!([
        {"productId": "NULL", "isSeasonal": null, "seasonCode": "WINTER"},
        {"productId": "ZERO", "isSeasonal": 0, "seasonCode": "WINTER"}
    ]);

    let report = analyze(&payload(products, json!([]), 7, json!({}))).expect("report");

    let all = report.slow_movers.iter().chain(report.hero_products.iter());
    for product in all {
        assert!(product.season_match, "{} should match every season", product.product_id);
        assert_eq!(product.seasonal_relevance, SeasonalRelevance::Medium);
    }
    assert_eq!(report.slow_movers.len(), 2);
}

#[test]
fn explicit_null_text_fields_are_echoed() {
    let products = json!([{
        "productId": "P1",
        "productName": null,
        "brand": null,
        "isSeasonal": true,
        "seasonCode": null
    }]);

    let response = execute(&payload(products, json!([]), 1, json!({})));

    let rendered = response.to_value();
    let slow = &rendered["slowMovers"][0];
    assert_eq!(slow["productName"], Value::Null);
    assert_eq!(slow["brand"], Value::Null);
    assert_eq!(slow["seasonMatch"], false);
    assert_eq!(slow["seasonalRelevance"], "LOW");
}

#[test]
fn totals_beyond_u64_do_not_abort_the_run() {
    let products = json!([
        {"productId": "BIG", "category": "Bulk", "stock": u64::MAX},
        {"productId": "ONE", "category": "Bulk", "stock": 1}
    ]);
    let orders = json!([
        {"items": [{"productId": "BIG", "quantity": u64::MAX}]},
        {"items": [{"productId": "BIG", "quantity": 1}]}
    ]);

    let response = execute(&payload(products, orders, 3, json!({})));

    let report = response.report().expect("large integers still produce a report");
    assert_eq!(report.category_insights["Bulk"].total_stock, u128::from(u64::MAX) + 1);
    let rendered = serde_json::to_string(&response).expect("response serializes");
    assert!(rendered.contains("\"totalStock\":18446744073709551616"));
}

#[test]
fn rounding_uses_the_exact_value_with_ties_to_even() {
    // Eight scores averaging exactly 70.125.
    let scores = [70, 70, 70, 70, 70, 70, 70, 71];
    let mut products: Vec<Value> = scores
        .iter()
        .enumerate()
        .map(|(index, score)| json!({"productId": format!("T{index}"), "category": "Tie", "trendScore": score}))
        .collect();
    products.push(json!({"productId": "COST", "category": "Cost", "stock": 1, "cost": 1.115}));

    let report = analyze(&payload(Value::Array(products), json!([]), 4, json!({}))).expect("report");

    assert_eq!(report.category_insights["Tie"].avg_trend_score, 70.12);
    assert_eq!(report.inventory_summary.total_stock_value, 1.11);
}
