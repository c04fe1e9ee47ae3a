//! In-memory [`Transport`] for tests.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use crate::transport::{FetchError, Transport};

type Query = Vec<(String, String)>;

/// Serves canned JSON keyed by `path` (plus `?page=N` for list requests)
/// and records every request. Unknown keys answer HTTP 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: HashMap<String, Value>,
    requests: RefCell<Vec<(String, Query)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, body: Value) -> Self {
        self.routes.insert(path.to_owned(), body);
        self
    }

    pub fn page(mut self, path: &str, page: u32, body: Value) -> Self {
        self.routes.insert(format!("{path}?page={page}"), body);
        self
    }

    /// Request keys in the order they were made
    pub fn requested(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn query_of(&self, key: &str) -> Option<Query> {
        self.requests
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, query)| query.clone())
    }
}

impl Transport for FakeTransport {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let key = match query.iter().find(|(name, _)| *name == "page") {
            Some((_, page)) => format!("{path}?page={page}"),
            None => path.to_owned(),
        };
        let owned = query
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect();
        self.requests.borrow_mut().push((key.clone(), owned));

        self.routes.get(&key).cloned().ok_or_else(|| FetchError::Status {
            url: format!("https://api.github.test{key}"),
            status: 404,
            message: "Not Found".to_owned(),
        })
    }
}
