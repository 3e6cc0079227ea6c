use super::*;
use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    Router,
};
use serde_json::{json, Value};
use shared::{error::ErrorCode, protocol::ImageFileIds};
use std::{collections::HashMap, io};
use tokio::{net::TcpListener, sync::Mutex as AsyncMutex};
use tracing_subscriber::fmt::MakeWriter;

const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: Method,
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    cache_control: Option<String>,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct MockBackend {
    requests: Arc<AsyncMutex<Vec<RecordedRequest>>>,
    responses: Arc<AsyncMutex<HashMap<(Method, String), (StatusCode, String)>>>,
}

impl MockBackend {
    async fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.responses
            .lock()
            .await
            .insert((method, path.to_string()), (status, body.to_string()));
    }

    async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn handle_any(
    State(state): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    state.requests.lock().await.push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_value(&headers, "authorization"),
        cache_control: header_value(&headers, "cache-control"),
        body: serde_json::from_str(&body).ok(),
    });

    state
        .responses
        .lock()
        .await
        .get(&(method, uri.path().to_string()))
        .cloned()
        .unwrap_or((StatusCode::NOT_FOUND, "no route".to_string()))
}

async fn spawn_backend() -> (MockBackend, String) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = MockBackend::default();
    let app = Router::new().fallback(handle_any).with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (state, format!("http://{addr}"))
}

fn client_for(base_url: &str) -> (AdminClient, Arc<RecordingCacheInvalidator>) {
    let invalidator = Arc::new(RecordingCacheInvalidator::default());
    let session = AdminSession::new(Url::parse(base_url).expect("url"), TOKEN);
    let client = AdminClient::new_with_invalidator(session, invalidator.clone()).expect("client");
    (client, invalidator)
}

fn bakery_json(id: &str) -> Value {
    json!({
        "id": id,
        "bakery_name": "Tiệm bánh Hoa",
        "phone": "0900000000",
        "open_time": "08:00:00",
        "close_time": "20:00:00",
        "is_approve": false,
        "status": "UNBANNED",
        "shop_image_file_ids": ["img1"]
    })
}

#[tokio::test]
async fn list_bakeries_decodes_page_and_disables_caching() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(
            Method::GET,
            "/bakeries",
            StatusCode::OK,
            json!({ "data": [bakery_json("b-1"), bakery_json("b-2")], "page_count": 3 }),
        )
        .await;
    let (client, _) = client_for(&url);

    let page = client
        .list_bakeries(&SearchParams::default().page(2).per_page(10))
        .await;

    assert!(page.is_ok());
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.page_count, 3);

    let requests = backend.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.as_deref(), Some("page=2&per_page=10"));
    assert_eq!(requests[0].cache_control.as_deref(), Some("no-store"));
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Bearer test-token")
    );
}

#[tokio::test]
async fn list_bakeries_failure_yields_empty_page_with_error() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(
            Method::GET,
            "/bakeries",
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": "boom" }),
        )
        .await;
    let (client, _) = client_for(&url);

    let page = client.list_bakeries(&SearchParams::default()).await;

    assert!(page.data.is_empty());
    assert_eq!(page.page_count, 0);
    match page.error {
        Some(ActionError::Backend(api)) => {
            assert_eq!(api.status, 500);
            assert_eq!(api.code, ErrorCode::Internal);
            assert!(api.message.contains("boom"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_is_reported_as_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let (client, _) = client_for(&format!("http://{addr}"));

    let page = client.list_bakeries(&SearchParams::default()).await;

    assert!(matches!(page.error, Some(ActionError::Transport(_))));
    assert!(client.get_bakery(&BakeryId::from("b-1")).await.is_none());
}

#[tokio::test]
async fn get_bakery_returns_entity_or_none() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(
            Method::GET,
            "/bakeries/b-1",
            StatusCode::OK,
            json!({ "data": bakery_json("b-1") }),
        )
        .await;
    let (client, _) = client_for(&url);

    let bakery = client
        .get_bakery(&BakeryId::from("b-1"))
        .await
        .expect("bakery");
    assert_eq!(bakery.bakery_name, "Tiệm bánh Hoa");

    assert!(client.get_bakery(&BakeryId::from("missing")).await.is_none());
}

#[tokio::test]
async fn approve_and_unapprove_share_endpoint_with_opposite_flags() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(
            Method::PUT,
            "/bakeries/b-1/approve",
            StatusCode::OK,
            json!({ "data": null }),
        )
        .await;
    let (client, invalidator) = client_for(&url);
    let bakery_id = BakeryId::from("b-1");

    client.approve_bakery(&bakery_id).await.expect("approve");
    client.unapprove_bakery(&bakery_id).await.expect("unapprove");

    let requests = backend.requests().await;
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.method == Method::PUT));
    assert!(requests.iter().all(|r| r.path == "/bakeries/b-1/approve"));
    assert_eq!(requests[0].body, Some(json!({ "is_approve": true })));
    assert_eq!(requests[1].body, Some(json!({ "is_approve": false })));
    assert_eq!(
        invalidator.paths(),
        vec![
            "/dashboard/bakeries/b-1".to_string(),
            "/dashboard/bakeries/b-1".to_string()
        ]
    );
}

#[tokio::test]
async fn rejected_mutation_does_not_invalidate() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(
            Method::PUT,
            "/bakeries/b-1/approve",
            StatusCode::FORBIDDEN,
            json!({ "message": "not allowed" }),
        )
        .await;
    let (client, invalidator) = client_for(&url);

    let err = client
        .approve_bakery(&BakeryId::from("b-1"))
        .await
        .expect_err("must fail");

    match err {
        ActionError::Backend(api) => assert_eq!(api.code, ErrorCode::Forbidden),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(invalidator.paths().is_empty());
}

#[tokio::test]
async fn ban_action_sends_discriminator() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(
            Method::PUT,
            "/bakeries/b-9/ban_action",
            StatusCode::OK,
            json!({}),
        )
        .await;
    let (client, invalidator) = client_for(&url);
    let bakery_id = BakeryId::from("b-9");

    client
        .ban_bakery(&bakery_id, BanAction::Ban)
        .await
        .expect("ban");
    client
        .ban_bakery(&bakery_id, BanAction::UnBan)
        .await
        .expect("unban");

    let requests = backend.requests().await;
    assert_eq!(requests[0].body, Some(json!({ "action": "BAN" })));
    assert_eq!(requests[1].body, Some(json!({ "action": "UN_BAN" })));
    assert_eq!(invalidator.paths().len(), 2);
}

#[tokio::test]
async fn delete_bakery_invalidates_detail_path() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(Method::DELETE, "/bakeries/b-3", StatusCode::OK, json!({}))
        .await;
    let (client, invalidator) = client_for(&url);

    client
        .delete_bakery(&BakeryId::from("b-3"))
        .await
        .expect("delete");

    assert_eq!(invalidator.take(), vec!["/dashboard/bakeries/b-3".to_string()]);
    assert!(invalidator.paths().is_empty());
}

#[tokio::test]
async fn bakery_ids_are_percent_encoded_in_paths() {
    let (backend, url) = spawn_backend().await;
    let (client, _) = client_for(&url);

    let _ = client.delete_bakery(&BakeryId::from("a/b")).await;

    let requests = backend.requests().await;
    assert_eq!(requests[0].path, "/bakeries/a%2Fb");
}

#[tokio::test]
async fn update_profile_sends_normalized_payload() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(
            Method::PUT,
            "/bakeries/b-1",
            StatusCode::OK,
            json!({ "data": bakery_json("b-1") }),
        )
        .await;
    let (client, invalidator) = client_for(&url);

    let updated = client
        .update_bakery_profile(
            &BakeryId::from("b-1"),
            BakeryProfileUpdate {
                bakery_name: "Tiệm bánh Hoa".into(),
                shop_image_file_ids: Some(ImageFileIds::Raw("img1".into())),
                open_time: "09:30".into(),
                close_time: "21:00:00".into(),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.id, BakeryId::from("b-1"));

    let requests = backend.requests().await;
    let body = requests[0].body.clone().expect("json body");
    assert_eq!(body["shop_image_file_ids"], json!(["img1"]));
    assert_eq!(body["open_time"], "09:30:00");
    assert_eq!(body["close_time"], "21:00:00");
    assert_eq!(body["business_license_file_id"], "");
    assert!(body.get("password").is_none());
    assert!(body.get("bank_account").is_none());
    assert_eq!(invalidator.paths(), vec!["/dashboard/bakeries/b-1".to_string()]);
}

#[tokio::test]
async fn update_profile_decodes_json_encoded_image_list() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(
            Method::PUT,
            "/bakeries/b-1",
            StatusCode::OK,
            json!({ "data": bakery_json("b-1") }),
        )
        .await;
    let (client, _) = client_for(&url);

    client
        .update_bakery_profile(
            &BakeryId::from("b-1"),
            BakeryProfileUpdate {
                bakery_name: "B".into(),
                shop_image_file_ids: Some(ImageFileIds::Raw(r#"["a","b"]"#.into())),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    let requests = backend.requests().await;
    let body = requests[0].body.clone().expect("json body");
    assert_eq!(body["shop_image_file_ids"], json!(["a", "b"]));
}

#[tokio::test]
async fn update_profile_failure_is_relayed_without_invalidation() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(
            Method::PUT,
            "/bakeries/b-1",
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "message": "bad phone" }),
        )
        .await;
    let (client, invalidator) = client_for(&url);

    let err = client
        .update_bakery_profile(&BakeryId::from("b-1"), BakeryProfileUpdate::default())
        .await
        .expect_err("must fail");

    assert!(matches!(err, ActionError::Backend(ref api) if api.code == ErrorCode::Validation));
    assert!(invalidator.paths().is_empty());
}

#[tokio::test]
async fn get_bakery_file_returns_metadata() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(
            Method::GET,
            "/files/f-1",
            StatusCode::OK,
            json!({ "data": { "id": "f-1", "file_name": "cert.pdf", "file_url": "https://cdn/cert.pdf" } }),
        )
        .await;
    let (client, _) = client_for(&url);

    let file = client
        .get_bakery_file(&FileId::from("f-1"))
        .await
        .expect("file");
    assert_eq!(file.file_name, "cert.pdf");
    assert!(client.get_bakery_file(&FileId::from("f-2")).await.is_none());
}

#[tokio::test]
async fn cake_decoration_mutations_invalidate_ingredients_view() {
    let (backend, url) = spawn_backend().await;
    let item = json!({
        "id": "d-1",
        "name": "Kem bơ",
        "price": 15000,
        "color": "#ffffff",
        "is_default": true,
        "type": "OUTERICING"
    });
    backend
        .respond(
            Method::POST,
            "/cake_decorations",
            StatusCode::CREATED,
            json!({ "data": item }),
        )
        .await;
    backend
        .respond(
            Method::DELETE,
            "/cake_decorations/d-1",
            StatusCode::OK,
            json!({}),
        )
        .await;
    let (client, invalidator) = client_for(&url);

    let created = client
        .create_cake_decoration(CakeDecorationDraft::for_category(
            shared::domain::DecorationCategory::OuterIcing,
            "Kem bơ",
            15000,
        ))
        .await
        .expect("create");
    assert_eq!(created.decoration_type, "OUTERICING");

    client
        .delete_cake_decoration(&created.id)
        .await
        .expect("delete");

    let requests = backend.requests().await;
    assert_eq!(requests[0].body.as_ref().map(|b| b["type"].clone()), Some(json!("OUTERICING")));
    assert_eq!(
        invalidator.paths(),
        vec![INGREDIENTS_PATH.to_string(), INGREDIENTS_PATH.to_string()]
    );
}

#[tokio::test]
async fn list_cake_decorations_groups_by_type() {
    let (backend, url) = spawn_backend().await;
    backend
        .respond(
            Method::GET,
            "/cake_decorations",
            StatusCode::OK,
            json!({ "data": [
                { "type": "CANDLES", "items": [] },
                { "type": "DRIP", "items": [{ "id": "d-2", "name": "Sô-cô-la", "price": 20000, "color": "brown", "type": "DRIP" }] }
            ] }),
        )
        .await;
    let (client, _) = client_for(&url);

    let page = client.list_cake_decorations(&SearchParams::default()).await;

    assert!(page.is_ok());
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[1].items[0].price, 20000);
    assert_eq!(page.page_count, 0);
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

struct LogBufferWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogBufferWriter(Arc::clone(&self.0))
    }
}

impl io::Write for LogBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().expect("log buffer").clone()).expect("utf8 logs")
    }
}

#[tokio::test]
async fn failed_mutations_are_logged_with_their_target() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::ERROR)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (backend, url) = spawn_backend().await;
    for (method, path) in [
        (Method::PUT, "/bakeries/b-1/approve"),
        (Method::PUT, "/bakeries/b-1/ban_action"),
        (Method::DELETE, "/bakeries/b-1"),
        (Method::DELETE, "/cake_decorations/d-9"),
    ] {
        backend
            .respond(method, path, StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "down" }))
            .await;
    }
    let (client, _invalidator) = client_for(&url);
    let bakery_id = BakeryId::from("b-1");

    assert!(client.unapprove_bakery(&bakery_id).await.is_err());
    assert!(client.ban_bakery(&bakery_id, BanAction::Ban).await.is_err());
    assert!(client.delete_bakery(&bakery_id).await.is_err());
    assert!(client
        .delete_cake_decoration(&DecorationId::from("d-9"))
        .await
        .is_err());
    // No route registered: the backend answers 404.
    assert!(client
        .update_cake_decoration(
            &DecorationId::from("d-9"),
            CakeDecorationDraft::for_category(
                shared::domain::DecorationCategory::Drip,
                "Sô cô la",
                5_000,
            ),
        )
        .await
        .is_err());

    let text = logs.text();
    for message in [
        "failed to update bakery approval",
        "failed to apply bakery ban action",
        "failed to delete bakery",
        "failed to delete cake decoration",
        "failed to update cake decoration",
    ] {
        assert!(text.contains(message), "missing '{message}' in:\n{text}");
    }
    assert!(text.contains("bakery_id=b-1"));
    assert!(text.contains("decoration_id=d-9"));
}
