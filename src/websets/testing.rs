//! In-memory [`WebsetsApi`] used by unit tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

use super::{ApiError, ApiRequest, WebsetsApi};

type Responder = Box<dyn Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync>;

/// Records every request and answers with a configurable responder.
pub(crate) struct RecordingApi {
    requests: Mutex<Vec<ApiRequest>>,
    responder: Responder,
}

impl RecordingApi {
    /// Answers every call with `{"path": "<rendered path>"}`.
    pub fn ok() -> Self {
        Self::with(|request| Ok(json!({ "path": request.path })))
    }

    pub fn failing(status: u16, message: &str, details: Option<&str>) -> Self {
        let message = message.to_string();
        let details = details.map(str::to_string);
        Self::with(move |_| {
            Err(ApiError::Upstream {
                status,
                message: message.clone(),
                details: details.clone(),
            })
        })
    }

    pub fn with(
        responder: impl Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl WebsetsApi for RecordingApi {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let result = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        result
    }
}
