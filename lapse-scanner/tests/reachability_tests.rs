use lapse_scanner::{NetworkProber, ProbeTimeouts, Prober, Reachability};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prober() -> NetworkProber {
    NetworkProber::new(ProbeTimeouts::default()).unwrap()
}

#[tokio::test]
async fn test_head_answer_is_used_directly() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = prober()
        .check_reachability(&format!("{}/page", server.uri()))
        .await;

    assert_eq!(result, Reachability::Status(200));
}

#[tokio::test]
async fn test_head_not_allowed_retries_with_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/legacy"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/legacy"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = prober()
        .check_reachability(&format!("{}/legacy", server.uri()))
        .await;

    assert_eq!(result, Reachability::Status(404));
}

#[tokio::test]
async fn test_head_not_implemented_retries_with_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/old-server"))
        .respond_with(ResponseTemplate::new(501))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old-server"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = prober()
        .check_reachability(&format!("{}/old-server", server.uri()))
        .await;

    assert_eq!(result, Reachability::Status(200));
}

#[tokio::test]
async fn test_redirects_are_followed_to_final_status() {
    let server = MockServer::start().await;
    Mock::given(path("/moved"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", format!("{}/gone", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = prober()
        .check_reachability(&format!("{}/moved", server.uri()))
        .await;

    assert_eq!(result, Reachability::Status(404));
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    let result = prober().check_reachability("http://127.0.0.1:1/").await;

    assert!(
        matches!(result, Reachability::TransportError(_)),
        "expected transport error, got {:?}",
        result
    );
}
