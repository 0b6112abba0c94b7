use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use storefront_assistant::agent::Assistant;
use storefront_assistant::config::catalog::Catalog;
use storefront_assistant::server::api;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod on an ephemeral port, backed by the bundled catalog.
        let catalog = Catalog::load(concat!(env!("CARGO_MANIFEST_DIR"), "/public/data/products.json"))
            .expect("bundled catalog should load");
        let assistant = Assistant::new(Arc::new(catalog));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            api::serve(listener, assistant).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/assistant", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn greeting_round_trip() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.post(server.endpoint()).json(&json!({"message": "hi"})).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({"response": "Hello! Welcome to Pulse & Threads. How can I help you shop today?"})
    );
}

#[tokio::test]
async fn search_counts_bundled_products() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.endpoint())
        .json(&json!({"message": "Find crocs"}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["response"],
        "I found 2 item(s) matching 'crocs'. You can find them on the products page!"
    );

    let res = client
        .post(server.endpoint())
        .json(&json!({"message": "search for"}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["response"],
        "I found 10 item(s) matching ''. You can find them on the products page!"
    );
}

#[tokio::test]
async fn empty_object_is_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.post(server.endpoint()).json(&json!({})).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({"error": "Invalid request. Message not found."}));
}

#[tokio::test]
async fn invalid_json_is_rejected_and_server_keeps_serving() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.endpoint())
        .header("content-type", "application/json")
        .body("{\"message\":")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(server.endpoint())
        .json(&json!({"message": "thanks"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["response"], "You're welcome! Is there anything else I can help with?");
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.endpoint())
        .header("origin", "http://localhost:3000")
        .json(&json!({"message": "products"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
}
