use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use rpc_framework::schema::Schema;
use rpc_framework::{ActorClient, Context, Procedure, Router, RpcError};
use rpc_server::lifecycle::AppSystem;
use rpc_server::transport::{HttpResponse, RpcHttpService, MAX_BODY_SIZE};
use serde_json::{json, Value};
use std::sync::Arc;

fn request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

async fn read_json(response: HttpResponse) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn app(system: &AppSystem, expose_internal: bool) -> RpcHttpService {
    RpcHttpService::new(system.registry(), "/trpc", expose_internal)
}

#[tokio::test]
async fn test_get_runs_query_with_url_encoded_input() {
    let system = AppSystem::start().unwrap();
    system.seed_demo_users().await.unwrap();
    let service = app(&system, true);

    let (status, body) = read_json(
        service
            .handle(request(Method::GET, "/trpc/getUserById?input=%221%22", ""))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": "1", "name": "Alice", "email": "alice@example.com" }));

    let (status, body) = read_json(service.handle(request(Method::GET, "/trpc/getUsers", "")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    drop(service);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_post_runs_mutation_with_json_body() {
    let system = AppSystem::start().unwrap();
    let service = app(&system, true);

    let (status, body) = read_json(
        service
            .handle(request(
                Method::POST,
                "/trpc/todo.createTodo",
                r#"{"title":"Walk the dog"}"#,
            ))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": "1", "title": "Walk the dog", "completed": false }));

    drop(service);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_oversized_body_is_rejected_before_the_handler() {
    let system = AppSystem::start().unwrap();
    let service = app(&system, true);

    let body = format!(r#"{{"title":"{}"}}"#, "x".repeat(MAX_BODY_SIZE));
    let (status, envelope) = read_json(
        service
            .handle(request(Method::POST, "/trpc/todo.createTodo", &body))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["code"], "BAD_INPUT");
    assert!(envelope["message"].as_str().unwrap().contains("exceeds"));
    assert!(system.todo_service.get_all().await.unwrap().is_empty());

    let (status, _) = read_json(
        service
            .handle(request(Method::POST, "/trpc/todo.createTodo", r#"{"title":"small"}"#))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    drop(service);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_errors_render_as_envelopes() {
    let system = AppSystem::start().unwrap();
    system.seed_demo_users().await.unwrap();
    let service = app(&system, true);

    // Validation failure carries its issues.
    let (status, body) = read_json(
        service
            .handle(request(Method::POST, "/trpc/createUser", r#"{"name":"X"}"#))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_INPUT");
    assert_eq!(body["issues"].as_array().unwrap().len(), 2);

    // Domain failure keeps its code.
    let (status, body) = read_json(
        service
            .handle(request(
                Method::POST,
                "/trpc/createUser",
                r#"{"name":"Ali","email":"alice@example.com"}"#,
            ))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        json!({ "code": "CONFLICT", "message": "User with this email already exists" })
    );

    let (status, body) = read_json(
        service
            .handle(request(Method::GET, "/trpc/todo.getTodoById?input=%7B%22id%22%3A%227%22%7D", ""))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    drop(service);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_routing_failures() {
    let system = AppSystem::start().unwrap();
    let service = app(&system, true);

    // Outside the prefix.
    let (status, body) = read_json(service.handle(request(Method::GET, "/api/getUsers", "")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    // Unknown procedure.
    let (status, _) = read_json(service.handle(request(Method::GET, "/trpc/nope", "")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Mutation over GET and unsupported verbs.
    let (status, body) = read_json(service.handle(request(Method::GET, "/trpc/createUser", "")).await).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], "METHOD_NOT_SUPPORTED");

    let response = service.handle(request(Method::DELETE, "/trpc/deleteUser", "")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["allow"], "GET, POST");

    // Malformed JSON.
    let (status, body) = read_json(
        service
            .handle(request(Method::POST, "/trpc/createUser", "{not json"))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_INPUT");

    drop(service);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_internal_details_hidden_outside_development() {
    let registry = Router::new()
        .procedure(
            Procedure::query("whoami")
                .output(Schema::integer())
                .handler(|ctx: Context, (): ()| async move {
                    Ok::<_, RpcError>(ctx.identity().unwrap_or_default().to_string())
                }),
        )
        .build()
        .unwrap();
    let registry = Arc::new(registry);

    let whoami = || {
        let mut req = request(Method::GET, "/trpc/whoami", "");
        req.headers_mut()
            .insert(AUTHORIZATION, "secret-token".parse().unwrap());
        req
    };

    let production = RpcHttpService::new(Arc::clone(&registry), "/trpc", false);
    let (status, body) = read_json(production.handle(whoami()).await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "code": "INTERNAL", "message": "Internal server error" }));

    let development = RpcHttpService::new(registry, "/trpc", true);
    let (_, body) = read_json(development.handle(whoami()).await).await;
    assert_ne!(body["message"], "Internal server error");
}

#[tokio::test]
async fn test_serve_over_tcp_until_shutdown() {
    use rpc_server::transport::serve;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    let system = AppSystem::start().unwrap();
    system.seed_demo_users().await.unwrap();
    let service = Arc::new(app(&system, false));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve(service, listener, async {
        let _ = stop_rx.await;
    }));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /trpc/getUsers HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
    assert!(raw.contains("charlie@example.com"));

    stop_tx.send(()).unwrap();
    server.await.unwrap();
    system.shutdown().await.unwrap();
}
