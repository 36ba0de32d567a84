//! In-memory stand-ins for the upstream APIs, serving canned JSON by request path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use serde_json::Value;
use tower::service_fn;

use crate::client::Client;
use crate::error::{FetchError, UpstreamError};
use crate::services::fetch_service::{ApiRequest, FetchService};

#[derive(Debug, Clone)]
enum Route {
    Json(Value),
    Status(StatusCode),
}

/// Paths without a route respond `404 Not Found`. Every request is recorded.
#[derive(Debug, Clone, Default)]
pub struct FakeApi {
    routes: Arc<HashMap<String, Route>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, path: &str, value: Value) -> Self {
        Arc::make_mut(&mut self.routes).insert(path.to_owned(), Route::Json(value));
        self
    }

    pub fn with_status(mut self, path: &str, status: StatusCode) -> Self {
        Arc::make_mut(&mut self.routes).insert(path.to_owned(), Route::Status(status));
        self
    }

    pub fn service(&self) -> impl FetchService {
        let fake = self.clone();
        service_fn(move |request: ApiRequest| {
            let response = fake.respond(request);
            async move { response }
        })
    }

    pub fn client(&self) -> Client<impl FetchService> {
        Client::new(self.service())
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_paths(&self) -> Vec<String> {
        self.requests().iter().map(ApiRequest::path).collect()
    }

    fn respond(&self, request: ApiRequest) -> Result<Value, FetchError> {
        let route = self.routes.get(&request.path()).cloned();
        self.requests.lock().unwrap().push(request);

        match route {
            Some(Route::Json(value)) => Ok(value),
            Some(Route::Status(status)) => Err(UpstreamError::new(status).into()),
            None => Err(UpstreamError::new(StatusCode::NOT_FOUND).into()),
        }
    }
}
