use rpc_framework::{ActorEntity, FrameworkError, ResourceActor};
use std::collections::HashSet;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct SimpleUser {
    id: u64,
    name: String,
    email: String,
}

#[derive(Debug)]
struct SimpleUserCreate {
    name: String,
    email: String,
}

#[derive(Debug, Default)]
struct SimpleUserPatch {
    name: Option<String>,
}

impl ActorEntity for SimpleUser {
    type Id = u64;
    type Create = SimpleUserCreate;
    type Patch = SimpleUserPatch;

    fn id(&self) -> &u64 {
        &self.id
    }

    fn from_create(id: u64, params: SimpleUserCreate) -> Self {
        Self {
            id,
            name: params.name,
            email: params.email,
        }
    }

    fn apply_patch(&mut self, patch: SimpleUserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
    }
}

fn create(name: &str, email: &str) -> SimpleUserCreate {
    SimpleUserCreate {
        name: name.to_string(),
        email: email.to_string(),
    }
}

// --- Tests ---

#[tokio::test]
async fn test_actor_lifecycle() {
    let (actor, client) = ResourceActor::<SimpleUser>::new(10);
    let handle = tokio::spawn(actor.run());

    // 1. Create through a transaction
    let alice = client
        .transaction(|repo| {
            let id = repo.next_id();
            repo.insert(SimpleUser::from_create(id, create("Alice", "alice@example.com")))
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alice.id, 1);

    // 2. Get
    let fetched = client.get(alice.id).await.unwrap().unwrap();
    assert_eq!(fetched, alice);

    // 3. Update
    let renamed = client
        .update(
            alice.id,
            SimpleUserPatch {
                name: Some("Alicia".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Alicia");
    assert_eq!(renamed.email, "alice@example.com");

    // 4. Delete
    assert!(client.delete(alice.id).await.unwrap());
    assert!(!client.delete(alice.id).await.unwrap());
    assert_eq!(client.get(alice.id).await.unwrap(), None);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_update_missing_entity() {
    let (actor, client) = ResourceActor::<SimpleUser>::new(10);
    tokio::spawn(actor.run());

    let result = client.update(99, SimpleUserPatch::default()).await;
    assert!(matches!(result, Err(FrameworkError::NotFound(_))));
}

#[tokio::test]
async fn test_ids_are_not_reused_after_delete() {
    let (actor, client) = ResourceActor::<SimpleUser>::new(10);
    tokio::spawn(actor.run());

    let insert = |name: &'static str| {
        let client = client.clone();
        async move {
            client
                .transaction(move |repo| {
                    let id = repo.next_id();
                    repo.insert(SimpleUser::from_create(id, create(name, "x@example.com")))
                })
                .await
                .unwrap()
                .unwrap()
        }
    };

    let first = insert("first").await;
    let second = insert("second").await;
    client.delete(second.id).await.unwrap();
    let third = insert("third").await;

    assert_eq!((first.id, second.id, third.id), (1, 2, 3));
    let names: Vec<_> = client.list().await.unwrap().into_iter().map(|u| u.name).collect();
    assert_eq!(names, vec!["first", "third"]);
}

#[tokio::test]
async fn test_concurrent_unique_inserts() {
    let (actor, client) = ResourceActor::<SimpleUser>::new(64);
    tokio::spawn(actor.run());

    // Every task tries to claim the same email; the check and the insert share one
    // transaction so exactly one of them wins.
    let mut tasks = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client
                .transaction(move |repo| {
                    if repo.find_by(&|u: &SimpleUser| u.email == "same@example.com").is_some() {
                        return None;
                    }
                    let id = repo.next_id();
                    repo.insert(SimpleUser::from_create(
                        id,
                        create(&format!("user-{i}"), "same@example.com"),
                    ))
                    .ok()
                })
                .await
                .unwrap()
        }));
    }

    let mut winners = 0;
    for task in tasks {
        if task.await.unwrap().is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(client.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_inserts_get_distinct_ids() {
    let (actor, client) = ResourceActor::<SimpleUser>::new(64);
    tokio::spawn(actor.run());

    let mut tasks = Vec::new();
    for i in 0..50 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client
                .transaction(move |repo| {
                    let id = repo.next_id();
                    repo.insert(SimpleUser::from_create(
                        id,
                        create(&format!("user-{i}"), &format!("user-{i}@example.com")),
                    ))
                })
                .await
                .unwrap()
                .unwrap()
                .id
        }));
    }

    let mut ids = HashSet::new();
    for task in tasks {
        ids.insert(task.await.unwrap());
    }
    assert_eq!(ids.len(), 50);
}

#[tokio::test]
async fn test_closed_actor_reports_error() {
    let (actor, client) = ResourceActor::<SimpleUser>::new(1);
    drop(actor);

    assert_eq!(client.list().await, Err(FrameworkError::ActorClosed));
}
