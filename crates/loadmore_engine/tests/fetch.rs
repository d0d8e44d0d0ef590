use std::time::Duration;

use loadmore_engine::{FailureKind, FetchSettings, PageFetcher, ReqwestPageFetcher};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_with_base(server: &MockServer) -> ReqwestPageFetcher {
    let settings = FetchSettings {
        base_url: Some(Url::parse(&server.uri()).unwrap()),
        ..FetchSettings::default()
    };
    ReqwestPageFetcher::new(settings).unwrap()
}

#[tokio::test]
async fn fetcher_returns_body_and_cursor_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("next-url", "/p2")
                .set_body_raw(r#"[{"html":"<li>A</li>"}]"#, "application/json"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestPageFetcher::new(FetchSettings::default()).unwrap();
    let url = format!("{}/p1", server.uri());

    let page = fetcher.fetch_page(&url, None).await.expect("fetch ok");
    assert_eq!(page.url, url);
    assert_eq!(page.next_url.as_deref(), Some("/p2"));
    assert_eq!(page.body, br#"[{"html":"<li>A</li>"}]"#);
}

#[tokio::test]
async fn blank_cursor_header_counts_as_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/last"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("next-url", "  ")
                .set_body_raw("[]", "application/json"),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher_with_base(&server);

    let page = fetcher.fetch_page("/last", None).await.expect("fetch ok");
    assert_eq!(page.next_url, None);
}

#[tokio::test]
async fn custom_cursor_header_is_case_insensitive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "/p2")
                .set_body_raw("[]", "application/json"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        next_url_header: "X-Next-Page".to_string(),
        base_url: Some(Url::parse(&server.uri()).unwrap()),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestPageFetcher::new(settings).unwrap();

    let page = fetcher.fetch_page("/p1", None).await.expect("fetch ok");
    assert_eq!(page.next_url.as_deref(), Some("/p2"));
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher_with_base(&server);

    let err = fetcher.fetch_page("/missing", None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert!(err.kind.is_retryable());
}

#[tokio::test]
async fn relative_url_without_base_is_invalid() {
    let fetcher = ReqwestPageFetcher::new(FetchSettings::default()).unwrap();

    let err = fetcher.fetch_page("/p2", None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
    assert!(!err.kind.is_retryable());
}

#[tokio::test]
async fn relative_url_resolves_against_referrer_without_base() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/c/2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReqwestPageFetcher::new(FetchSettings::default()).unwrap();
    let referrer = format!("{}/c/1", server.uri());

    let page = fetcher.fetch_page("2", Some(&referrer)).await.expect("fetch ok");
    assert_eq!(page.url, format!("{}/c/2", server.uri()));
    server.verify().await;
}

#[tokio::test]
async fn configured_base_wins_over_referrer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_with_base(&server);

    let page = fetcher
        .fetch_page("/p2", Some("http://unreachable.invalid/p1"))
        .await
        .expect("fetch ok");
    assert_eq!(page.url, format!("{}/p2", server.uri()));
    server.verify().await;
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("[]"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        base_url: Some(Url::parse(&server.uri()).unwrap()),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestPageFetcher::new(settings).unwrap();

    let err = fetcher.fetch_page("/slow", None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[\"0123456789\"]"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        base_url: Some(Url::parse(&server.uri()).unwrap()),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestPageFetcher::new(settings).unwrap();

    let err = fetcher.fetch_page("/large", None).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(14)
        }
    );
    assert!(!err.kind.is_retryable());
}
