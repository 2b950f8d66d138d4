//! Integration tests for `SearchDispatcher` against mock retailers.
//!
//! Every retailer is a `wiremock` server, so no real network traffic is
//! made. Timing properties use in-process fake extractors instead.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use price_finder::retailers::build_extractors;
use price_finder::{
    FailureReason, ProductIdentifier, RetailerConfig, RetailerExtractor, RetailerProduct,
    RetailerSelectors, SearchDispatcher, StockStatus, ValidationError,
};

fn selectors() -> RetailerSelectors {
    RetailerSelectors {
        price: ".price".to_string(),
        title: "h1.title".to_string(),
        brand: Some(".brand".to_string()),
        model: Some(".model".to_string()),
        description: None,
        breadcrumb: Some(".crumbs a".to_string()),
        availability: Some(".stock".to_string()),
        out_of_stock_marker: None,
        spec_row: Some("table.specs tr".to_string()),
        spec_name: "th".to_string(),
        spec_value: "td".to_string(),
        search_result: ".result".to_string(),
        search_link: "a".to_string(),
        search_title: ".name".to_string(),
        search_price: ".price".to_string(),
    }
}

fn retailer(name: &str, server: &MockServer) -> RetailerConfig {
    RetailerConfig {
        name: name.to_string(),
        display_name: name.to_uppercase(),
        base_url: server.uri(),
        product_url_pattern: "{base}/p/{id}".to_string(),
        search_url_pattern: "{base}/search?q={query}".to_string(),
        timeout: Duration::from_secs(5),
        follow_search_results: false,
        selectors: selectors(),
    }
}

fn dispatcher(configs: Vec<RetailerConfig>) -> SearchDispatcher {
    let client = Client::builder()
        .user_agent("price-finder-test/0.1")
        .build()
        .expect("test client");
    SearchDispatcher::new(build_extractors(&client, configs).expect("test extractors"))
}

fn product_page(brand: &str, price: &str) -> String {
    format!(
        r#"<html><body>
        <div class="crumbs"><a href="/">Home</a><a href="/bath">Bathroom Faucets</a></div>
        <h1 class="title">Single Handle Faucet</h1>
        <span class="brand">{brand}</span>
        <span class="model">Model # 7594ESRS</span>
        <span class="price">{price}</span>
        <div class="stock">In Stock</div>
        <table class="specs"><tr><th>Finish</th><td>Spot Resist Stainless</td></tr></table>
        </body></html>"#
    )
}

const SEARCH_PAGE: &str = r#"<html><body>
    <div class="result">
      <a href="/p/moen-7594esrs/204">Moen faucet</a>
      <span class="name">Moen Arbor Faucet</span>
      <span class="price">$289.00</span>
    </div>
    <div class="result"><a href="/p/other/1">Other</a></div>
    </body></html>"#;

// ---------------------------------------------------------------------------
// Fetch strategy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn direct_lookup_populates_retailer_and_product_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/7594ESRS"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Moen", "$279.00")))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatcher(vec![retailer("alpha", &server)])
        .search_all_retailers("7594ESRS", None)
        .await
        .expect("valid identifier");

    let alpha = &result.retailers["alpha"];
    assert_eq!(alpha.raw_price, "$279.00");
    assert_eq!(alpha.url, format!("{}/p/7594ESRS", server.uri()));
    assert_eq!(alpha.in_stock, StockStatus::InStock);
    assert_eq!(result.brand.as_deref(), Some("Moen"));
    assert_eq!(result.product_name.as_deref(), Some("Single Handle Faucet"));
    assert_eq!(result.model_number.as_deref(), Some("7594ESRS"));
    assert_eq!(result.category.as_deref(), Some("Bathroom Faucets"));
    assert_eq!(result.specifications["Finish"], "Spot Resist Stainless");
    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
}

#[tokio::test]
async fn falls_back_to_first_search_result_when_direct_lookup_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/7594ESRS"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "7594ESRS"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatcher(vec![retailer("alpha", &server)])
        .search_all_retailers("7594ESRS", None)
        .await
        .expect("valid identifier");

    let alpha = &result.retailers["alpha"];
    assert_eq!(alpha.url, format!("{}/p/moen-7594esrs/204", server.uri()));
    assert_eq!(alpha.raw_price, "$289.00");
    assert_eq!(alpha.in_stock, StockStatus::Unknown, "listing says nothing about stock");
    assert_eq!(result.product_name.as_deref(), Some("Moen Arbor Faucet"));
}

#[tokio::test]
async fn blank_direct_page_also_falls_back_to_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/7594ESRS"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>We couldn't find that</body></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatcher(vec![retailer("alpha", &server)])
        .search_all_retailers("7594ESRS", None)
        .await
        .expect("valid identifier");

    assert_eq!(result.retailers["alpha"].raw_price, "$289.00");
}

#[tokio::test]
async fn followed_search_result_adds_product_page_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/7594ESRS"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/moen-7594esrs/204"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><h1 class="title">Arbor Pulldown</h1><span class="brand">Moen</span>
               <table class="specs"><tr><th>Spout Height</th><td>9.5 in</td></tr></table></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = retailer("alpha", &server);
    config.follow_search_results = true;

    let result = dispatcher(vec![config])
        .search_all_retailers("7594ESRS", None)
        .await
        .expect("valid identifier");

    assert_eq!(result.product_name.as_deref(), Some("Arbor Pulldown"));
    assert_eq!(result.brand.as_deref(), Some("Moen"));
    assert_eq!(result.specifications["Spout Height"], "9.5 in");
    assert_eq!(
        result.retailers["alpha"].raw_price, "$289.00",
        "price from the listing is kept when the product page has none"
    );
}

// ---------------------------------------------------------------------------
// Failure isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_success_on_both_attempts_is_an_http_error_for_that_retailer_only() {
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&failing)
        .await;

    let working = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/7594ESRS"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Moen", "$279.00")))
        .mount(&working)
        .await;

    let result = dispatcher(vec![retailer("alpha", &failing), retailer("beta", &working)])
        .search_all_retailers("7594ESRS", None)
        .await
        .expect("valid identifier");

    assert_eq!(result.retailers.len(), 2);
    assert!(result.retailers["alpha"].url.is_empty());
    assert_eq!(result.retailers["alpha"].raw_price, "N/A");
    assert_eq!(result.retailers["beta"].raw_price, "$279.00");
    let error = result.error.expect("partial failure is reported");
    assert!(error.contains("alpha: HTTP 503"), "{error}");
    assert!(!error.contains("beta"), "{error}");
}

#[tokio::test]
async fn all_failures_still_return_one_empty_entry_per_retailer() {
    let empty_search = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/7594ESRS"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&empty_search)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>No results</p>"))
        .mount(&empty_search)
        .await;

    let forbidden = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&forbidden)
        .await;

    let result = dispatcher(vec![
        retailer("alpha", &empty_search),
        retailer("beta", &forbidden),
    ])
    .search_all_retailers("7594ESRS", None)
    .await
    .expect("valid identifier");

    assert_eq!(result.retailers.len(), 2);
    for info in result.retailers.values() {
        assert!(info.url.is_empty());
        assert_eq!(info.raw_price, "N/A");
        assert_eq!(info.in_stock, StockStatus::Unknown);
    }
    assert_eq!(result.successful_retailers(), 0);
    let error = result.error.expect("error summary");
    assert!(error.contains("alpha: could not parse"), "{error}");
    assert!(error.contains("beta: HTTP 403"), "{error}");
}

#[tokio::test]
async fn connection_failure_is_reported_not_raised() {
    let server = MockServer::start().await;
    let mut config = retailer("alpha", &server);
    // Nothing listens on port 9 on loopback.
    config.base_url = "http://127.0.0.1:9".to_string();

    let result = dispatcher(vec![config])
        .search_all_retailers("7594ESRS", None)
        .await
        .expect("valid identifier");

    assert_eq!(result.retailers.len(), 1);
    assert!(result.error.expect("error summary").starts_with("alpha: "));
}

#[tokio::test]
async fn refused_direct_connection_still_falls_back_to_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "7594ESRS"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = retailer("alpha", &server);
    config.product_url_pattern = "http://127.0.0.1:9/p/{id}".to_string();

    let result = dispatcher(vec![config])
        .search_all_retailers("7594ESRS", None)
        .await
        .expect("valid identifier");

    let alpha = &result.retailers["alpha"];
    assert_eq!(alpha.url, format!("{}/p/moen-7594esrs/204", server.uri()));
    assert_eq!(alpha.raw_price, "$289.00");
    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
}

// ---------------------------------------------------------------------------
// Brand hint, validation, determinism
// ---------------------------------------------------------------------------

#[tokio::test]
async fn brand_hint_is_never_overwritten_by_retailer_brand() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/K-3999"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Generic", "$329.00")))
        .mount(&server)
        .await;

    let result = dispatcher(vec![retailer("alpha", &server)])
        .search_all_retailers("K-3999", Some("Kohler"))
        .await
        .expect("valid identifier");

    assert_eq!(result.brand.as_deref(), Some("Kohler"));
}

#[tokio::test]
async fn malformed_identifier_fails_without_network_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(vec![retailer("alpha", &server)]);
    let too_long = "9".repeat(41);

    for bad in ["", "   ", "K 3999", "-K3999", "K3999;DROP", too_long.as_str()] {
        let err = dispatcher
            .search_all_retailers(bad, None)
            .await
            .expect_err("identifier should be rejected");
        assert!(
            matches!(
                err,
                ValidationError::Empty | ValidationError::InvalidFormat(_) | ValidationError::TooLong { .. }
            ),
            "unexpected error for {bad:?}: {err:?}"
        );
    }
}

#[tokio::test]
async fn identical_responses_give_identical_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/7594ESRS"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Moen", "$279.00")))
        .mount(&server)
        .await;
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&failing)
        .await;

    let dispatcher = dispatcher(vec![retailer("alpha", &server), retailer("beta", &failing)]);

    let first = dispatcher.search_all_retailers("7594ESRS", None).await.expect("first");
    let second = dispatcher.search_all_retailers("7594ESRS", None).await.expect("second");

    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// In-process retailer that answers after a fixed delay.
struct DelayedRetailer {
    config: RetailerConfig,
    delay: Duration,
}

impl DelayedRetailer {
    fn boxed(name: &str, delay: Duration, timeout: Duration) -> Box<dyn RetailerExtractor> {
        Box::new(Self {
            config: RetailerConfig {
                name: name.to_string(),
                display_name: name.to_string(),
                base_url: format!("https://{name}.test"),
                product_url_pattern: "{base}/p/{id}".to_string(),
                search_url_pattern: "{base}/search?q={query}".to_string(),
                timeout,
                follow_search_results: false,
                selectors: selectors(),
            },
            delay,
        })
    }
}

#[async_trait]
impl RetailerExtractor for DelayedRetailer {
    fn config(&self) -> &RetailerConfig {
        &self.config
    }

    async fn fetch_and_extract(
        &self,
        identifier: &ProductIdentifier,
        _timeout: Duration,
    ) -> Result<RetailerProduct, FailureReason> {
        tokio::time::sleep(self.delay).await;
        Ok(RetailerProduct {
            url: self.build_product_url(identifier),
            raw_price: Some("$1.00".to_string()),
            name: Some(format!("{} product", self.config.name)),
            ..RetailerProduct::default()
        })
    }
}

#[tokio::test]
async fn slow_retailer_times_out_without_affecting_fast_one() {
    let dispatcher = SearchDispatcher::new(vec![
        DelayedRetailer::boxed("slow", Duration::from_secs(10), Duration::from_millis(300)),
        DelayedRetailer::boxed("fast", Duration::from_millis(50), Duration::from_secs(5)),
    ]);

    let started = Instant::now();
    let result = dispatcher
        .search_all_retailers("K-3999", None)
        .await
        .expect("valid identifier");
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(3), "search took {elapsed:?}");
    assert_eq!(result.retailers["fast"].raw_price, "$1.00");
    assert_eq!(result.retailers["fast"].url, "https://fast.test/p/K-3999");
    assert!(result.retailers["slow"].url.is_empty());
    assert_eq!(result.product_name.as_deref(), Some("fast product"));
    let error = result.error.expect("timeout reported");
    assert!(error.contains("slow: timed out"), "{error}");
}

#[tokio::test]
async fn outer_deadline_cancels_pending_retailers_as_timeouts() {
    let dispatcher = SearchDispatcher::new(vec![
        DelayedRetailer::boxed("fast", Duration::from_millis(20), Duration::from_secs(5)),
        DelayedRetailer::boxed("slow", Duration::from_secs(10), Duration::from_secs(20)),
        DelayedRetailer::boxed("slower", Duration::from_secs(15), Duration::from_secs(20)),
    ]);

    let started = Instant::now();
    let result = dispatcher
        .search_within("K-3999", None, Duration::from_millis(400))
        .await
        .expect("valid identifier");

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(result.retailers.len(), 3);
    assert_eq!(result.retailers["fast"].raw_price, "$1.00");
    let error = result.error.expect("timeouts reported");
    assert!(error.contains("slow: timed out"), "{error}");
    assert!(error.contains("slower: timed out"), "{error}");
}

#[tokio::test]
async fn duplicate_retailer_names_keep_the_first_extractor() {
    let dispatcher = SearchDispatcher::new(vec![
        DelayedRetailer::boxed("alpha", Duration::from_millis(10), Duration::from_secs(5)),
        DelayedRetailer::boxed("alpha", Duration::from_secs(10), Duration::from_millis(50)),
        DelayedRetailer::boxed("beta", Duration::from_millis(10), Duration::from_secs(5)),
    ]);

    assert_eq!(dispatcher.retailer_names(), ["alpha", "beta"]);

    let result = dispatcher
        .search_all_retailers("K-3999", None)
        .await
        .expect("valid identifier");

    assert_eq!(result.retailers.len(), 2);
    assert_eq!(result.retailers["alpha"].raw_price, "$1.00");
    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
}
