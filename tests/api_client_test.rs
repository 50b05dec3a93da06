use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use city_search::api_client::{ApiClient, CityQueryParams, CitySource, FetchError, DEFAULT_API_HOST};
use city_search::query_state::{PageSize, ResultPage};

const SAMPLE_CITIES: &str = include_str!("fixtures/sample_cities.json");

/// Serve one canned HTTP response on a local port. Yields the raw request.
async fn serve_once(status_line: &str, body: &str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
    });

    (base_url, rx)
}

fn client_for(base_url: &str) -> ApiClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    ApiClient::with_client(base_url, DEFAULT_API_HOST, "test-key", http)
}

fn page_two_of_del() -> CityQueryParams {
    CityQueryParams::new("del", PageSize::default(), 2)
}

#[tokio::test]
async fn test_request_carries_params_and_headers() {
    let (base_url, request) = serve_once("HTTP/1.1 200 OK", SAMPLE_CITIES).await;
    let client = client_for(&base_url);

    let response = client.fetch_cities(&page_two_of_del()).await.unwrap();
    let page = ResultPage::from(response);
    assert_eq!(page.records.len(), 5);
    assert_eq!(page.total_count, 13);
    assert_eq!(page.records[0].name, "Central Delhi district");

    let request = request.await.unwrap();
    let request_line = request.lines().next().unwrap();
    // offset carries the page number itself
    assert_eq!(
        request_line,
        "GET /v1/geo/cities?countryIds=IN&namePrefix=del&limit=5&offset=2 HTTP/1.1"
    );

    let headers = request.to_ascii_lowercase();
    assert!(headers.contains("x-rapidapi-host: wft-geo-db.p.rapidapi.com\r\n"));
    assert!(headers.contains("x-rapidapi-key: test-key\r\n"));
}

#[tokio::test]
async fn test_prefix_is_url_encoded() {
    let (base_url, request) = serve_once("HTTP/1.1 200 OK", SAMPLE_CITIES).await;
    let client = client_for(&base_url);

    let params = CityQueryParams::new("new delhi", PageSize::new(10).unwrap(), 1);
    client.fetch_cities(&params).await.unwrap();

    let request = request.await.unwrap();
    assert!(request.starts_with(
        "GET /v1/geo/cities?countryIds=IN&namePrefix=new+delhi&limit=10&offset=1 HTTP/1.1"
    ));
}

#[tokio::test]
async fn test_error_status_becomes_status_error() {
    let (base_url, _request) =
        serve_once("HTTP/1.1 503 Service Unavailable", r#"{"message":"busy"}"#).await;
    let client = client_for(&base_url);

    match client.fetch_cities(&page_two_of_del()).await {
        Err(FetchError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert!(body.contains("busy"));
        }
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_shape_becomes_decode_error() {
    let (base_url, _request) = serve_once("HTTP/1.1 200 OK", r#"{"data": "nope"}"#).await;
    let client = client_for(&base_url);

    let result = client.fetch_cities(&page_two_of_del()).await;
    assert!(matches!(result, Err(FetchError::Decode(_))), "{:?}", result);
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = client_for(&base_url).fetch_cities(&page_two_of_del()).await;
    assert!(matches!(result, Err(FetchError::Network(_))), "{:?}", result);
}
