use rpc_framework::{ActorClient, Call, ErrorCode, ProcedureKind, ProcedureRegistry, RpcError};
use rpc_server::lifecycle::AppSystem;
use serde_json::{json, Value};
use std::sync::Arc;

async fn seeded() -> (AppSystem, Arc<ProcedureRegistry>) {
    let system = AppSystem::start().unwrap();
    system.seed_demo_users().await.unwrap();
    let registry = system.registry();
    (system, registry)
}

async fn query(
    registry: &ProcedureRegistry,
    path: &str,
    input: Option<Value>,
) -> Result<Value, RpcError> {
    let call = Call::query(path);
    registry
        .invoke(match input {
            Some(input) => call.with_input(input),
            None => call,
        })
        .await
}

async fn mutate(registry: &ProcedureRegistry, path: &str, input: Value) -> Result<Value, RpcError> {
    registry.invoke(Call::mutation(path).with_input(input)).await
}

#[tokio::test]
async fn test_registry_exposes_every_procedure() {
    let (system, registry) = seeded().await;

    let listed: Vec<_> = registry
        .procedures()
        .into_iter()
        .map(|p| (p.path, p.kind))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("createUser".to_string(), ProcedureKind::Mutation),
            ("deleteUser".to_string(), ProcedureKind::Mutation),
            ("getUserById".to_string(), ProcedureKind::Query),
            ("getUsers".to_string(), ProcedureKind::Query),
            ("todo.createTodo".to_string(), ProcedureKind::Mutation),
            ("todo.deleteTodo".to_string(), ProcedureKind::Mutation),
            ("todo.getAllTodos".to_string(), ProcedureKind::Query),
            ("todo.getTodoById".to_string(), ProcedureKind::Query),
            ("todo.updateTodo".to_string(), ProcedureKind::Mutation),
            ("updateUser".to_string(), ProcedureKind::Mutation),
        ]
    );

    drop(registry);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_seeded_users_are_served() {
    let (system, registry) = seeded().await;

    let users = query(&registry, "getUsers", None).await.unwrap();
    assert_eq!(
        users,
        json!([
            { "id": "1", "name": "Alice", "email": "alice@example.com" },
            { "id": "2", "name": "Bob", "email": "bob@example.com" },
            { "id": "3", "name": "Charlie", "email": "charlie@example.com" },
        ])
    );

    let bob = query(&registry, "getUserById", Some(json!("2"))).await.unwrap();
    assert_eq!(bob["name"], "Bob");

    let err = query(&registry, "getUserById", Some(json!("99"))).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "User with id 99 not found");

    drop(registry);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_create_user_conflict_scenario() {
    let system = AppSystem::start().unwrap();
    let registry = system.registry();

    let created = mutate(&registry, "createUser", json!({ "name": "Al", "email": "a@b.com" }))
        .await
        .unwrap();
    assert_eq!(created, json!({ "id": "1", "name": "Al", "email": "a@b.com" }));

    let err = mutate(&registry, "createUser", json!({ "name": "Bo", "email": "a@b.com" }))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
    assert_eq!(err.message, "User with this email already exists");

    let users = query(&registry, "getUsers", None).await.unwrap();
    assert_eq!(users.as_array().unwrap().len(), 1);

    drop(registry);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_user_input_is_rejected_before_service() {
    let system = AppSystem::start().unwrap();
    let registry = system.registry();

    let err = mutate(&registry, "createUser", json!({ "name": "A", "email": "nope" }))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadInput);
    let paths: Vec<_> = err.issues.iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["name", "email"]);

    // Nothing reached the repository.
    assert!(system.user_service.get_all().await.unwrap().is_empty());

    let err = query(&registry, "getUserById", Some(json!(2))).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::BadInput);

    drop(registry);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_user_update_and_delete() {
    let (system, registry) = seeded().await;

    let updated = mutate(
        &registry,
        "updateUser",
        json!({ "id": "1", "data": { "name": "Alicia" } }),
    )
    .await
    .unwrap();
    assert_eq!(
        updated,
        json!({ "id": "1", "name": "Alicia", "email": "alice@example.com" })
    );

    let err = mutate(
        &registry,
        "updateUser",
        json!({ "id": "1", "data": { "email": "bob@example.com" } }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    assert_eq!(mutate(&registry, "deleteUser", json!({ "id": "3" })).await.unwrap(), json!(true));
    assert_eq!(mutate(&registry, "deleteUser", json!({ "id": "3" })).await.unwrap(), json!(false));

    drop(registry);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_todo_procedures() {
    let system = AppSystem::start().unwrap();
    let registry = system.registry();

    assert_eq!(query(&registry, "todo.getAllTodos", None).await.unwrap(), json!([]));

    let created = mutate(
        &registry,
        "todo.createTodo",
        json!({ "title": "Buy milk", "description": "2 litres" }),
    )
    .await
    .unwrap();
    assert_eq!(
        created,
        json!({ "id": "1", "title": "Buy milk", "description": "2 litres", "completed": false })
    );

    // Empty partial update is a no-op.
    let same = mutate(&registry, "todo.updateTodo", json!({ "id": "1", "data": {} }))
        .await
        .unwrap();
    assert_eq!(same, created);

    let done = mutate(
        &registry,
        "todo.updateTodo",
        json!({ "id": "1", "data": { "completed": true } }),
    )
    .await
    .unwrap();
    assert_eq!(done["completed"], json!(true));
    assert_eq!(done["title"], json!("Buy milk"));

    let err = mutate(&registry, "todo.updateTodo", json!({ "id": "1", "data": { "title": "" } }))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadInput);
    assert_eq!(err.issues[0].path, "data.title");

    let fetched = query(&registry, "todo.getTodoById", Some(json!({ "id": "1" })))
        .await
        .unwrap();
    assert_eq!(fetched, done);

    assert_eq!(
        mutate(&registry, "todo.deleteTodo", json!({ "id": "1" })).await.unwrap(),
        json!(true)
    );
    let err = query(&registry, "todo.getTodoById", Some(json!({ "id": "1" })))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let err = mutate(&registry, "todo.updateTodo", json!({ "id": "1", "data": {} }))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    drop(registry);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_query_called_as_mutation() {
    let system = AppSystem::start().unwrap();
    let registry = system.registry();

    let err = registry
        .invoke(Call::mutation("getUsers"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MethodNotSupported);

    drop(registry);
    system.shutdown().await.unwrap();
}
