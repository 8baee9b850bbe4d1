//! # Mock Client
//!
//! `MockClient<T>` hands out a real [`ResourceClient<T>`] whose requests are answered
//! from a queue of expectations instead of a running repository. Use it to test how a
//! service reacts to responses that are awkward to produce with a real actor, such as
//! a closed channel or an entity that vanished between two calls.
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **State** | Scripted responses | Real repository |
//! | **Error Injection** | `return_err` | Hard (requires specific state) |
//! | **Use Case** | Service logic around the client | The service end to end |
//!
//! ```rust
//! use rpc_framework::mock::MockClient;
//! use rpc_framework::{ActorEntity, FrameworkError};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Tag { id: u64, label: String }
//!
//! impl ActorEntity for Tag {
//!     type Id = u64; type Create = String; type Patch = ();
//!     fn id(&self) -> &u64 { &self.id }
//!     fn from_create(id: u64, label: String) -> Self { Self { id, label } }
//!     fn apply_patch(&mut self, _: ()) {}
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Tag>::new();
//!     mock.expect_get(1).return_err(FrameworkError::ActorClosed);
//!
//!     let client = mock.client();
//!     assert_eq!(client.get(1).await, Err(FrameworkError::ActorClosed));
//!     mock.verify();
//! }
//! ```
//!
//! Transactions run against a scratch [`MemoryRepository`] owned by the mock, which
//! can be pre-populated with [`MockClient::with_entities`].

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use crate::repository::{MemoryRepository, Repository};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// An expected request and the response to send back.
enum Expectation<T: ActorEntity> {
    Get {
        response: Result<Option<T>, FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
    FindBy {
        response: Result<Option<T>, FrameworkError>,
    },
    Insert {
        response: Result<T, FrameworkError>,
    },
    Update {
        response: Result<T, FrameworkError>,
    },
    Delete {
        response: Result<bool, FrameworkError>,
    },
    Transaction,
}

impl<T: ActorEntity> Expectation<T> {
    fn name(&self) -> &'static str {
        match self {
            Self::Get { .. } => "Get",
            Self::List { .. } => "List",
            Self::FindBy { .. } => "FindBy",
            Self::Insert { .. } => "Insert",
            Self::Update { .. } => "Update",
            Self::Delete { .. } => "Delete",
            Self::Transaction => "Transaction",
        }
    }
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
///
/// # Example
/// ```ignore
/// let mut mock = MockClient::<User>::new();
/// mock.expect_get(UserId::from(1)).return_ok(Some(user));
/// mock.expect_delete(UserId::from(1)).return_ok(true);
///
/// let service = UserService::new(mock.client());
/// // Exercise the service...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Expectations<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations and an empty scratch repository.
    pub fn new() -> Self {
        Self::with_entities(Vec::new())
    }

    /// Creates a mock whose transactions see `entities` in their repository.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_entities(entities: Vec<T>) -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let mut scratch = MemoryRepository::<T>::new();
        for entity in entities {
            scratch
                .insert(entity)
                .unwrap_or_else(|e| panic!("mock seed rejected: {e}"));
        }

        // Spawn background task to answer requests
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue.lock().unwrap().pop_front();

                match (request, expectation) {
                    (ResourceRequest::Get { respond_to, .. }, Some(Expectation::Get { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::FindBy { respond_to, .. },
                        Some(Expectation::FindBy { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Insert { respond_to, .. },
                        Some(Expectation::Insert { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Update { respond_to, .. },
                        Some(Expectation::Update { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Delete { respond_to, .. },
                        Some(Expectation::Delete { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Transaction { op }, Some(Expectation::Transaction)) => {
                        op(&mut scratch as &mut dyn Repository<T>);
                    }
                    (request, expectation) => {
                        panic!(
                            "Unexpected request {:?}; expected {}",
                            request,
                            expectation.map_or("nothing", |e| e.name())
                        );
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    fn push(&self, expectation: Expectation<T>) {
        self.expectations.lock().unwrap().push_back(expectation);
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self, _id: T::Id) -> ExpectationBuilder<'_, T, Option<T>> {
        ExpectationBuilder::new(self, |response| Expectation::Get { response })
    }

    /// Expects a `list` operation.
    pub fn expect_list(&mut self) -> ExpectationBuilder<'_, T, Vec<T>> {
        ExpectationBuilder::new(self, |response| Expectation::List { response })
    }

    /// Expects a `find_by` operation.
    pub fn expect_find_by(&mut self) -> ExpectationBuilder<'_, T, Option<T>> {
        ExpectationBuilder::new(self, |response| Expectation::FindBy { response })
    }

    /// Expects an `insert` operation.
    pub fn expect_insert(&mut self) -> ExpectationBuilder<'_, T, T> {
        ExpectationBuilder::new(self, |response| Expectation::Insert { response })
    }

    /// Expects an `update` operation.
    pub fn expect_update(&mut self, _id: T::Id) -> ExpectationBuilder<'_, T, T> {
        ExpectationBuilder::new(self, |response| Expectation::Update { response })
    }

    /// Expects a `delete` operation.
    pub fn expect_delete(&mut self, _id: T::Id) -> ExpectationBuilder<'_, T, bool> {
        ExpectationBuilder::new(self, |response| Expectation::Delete { response })
    }

    /// Expects a `transaction`; it runs against the scratch repository.
    pub fn expect_transaction(&mut self) {
        self.push(Expectation::Transaction);
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining != 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

/// Fluent builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<'a, T: ActorEntity, R> {
    mock: &'a MockClient<T>,
    wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
}

impl<'a, T: ActorEntity, R> ExpectationBuilder<'a, T, R> {
    fn new(mock: &'a MockClient<T>, wrap: fn(Result<R, FrameworkError>) -> Expectation<T>) -> Self {
        Self { mock, wrap }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.mock.push((self.wrap)(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        self.mock.push((self.wrap)(Err(error)));
    }
}
