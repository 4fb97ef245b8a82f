//! Scripted stand-in for the backend, used by unit tests.

use crate::remote::{CallOptions, HttpError, Method, RemoteCall};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub method: Method,
    pub body: Option<String>,
}

/// Answers calls from a queue of one-shot responses, then from an optional
/// fallback. Every call is recorded.
#[derive(Default)]
pub struct MockRemote {
    once: Mutex<VecDeque<Result<Value, HttpError>>>,
    always: Mutex<Option<Result<Value, HttpError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_once(&self, value: Value) {
        self.once.lock().unwrap().push_back(Ok(value));
    }

    pub fn fail_once(&self, status: u16, message: &str) {
        self.once
            .lock()
            .unwrap()
            .push_back(Err(HttpError::new(status, message)));
    }

    pub fn respond_always(&self, value: Value) {
        *self.always.lock().unwrap() = Some(Ok(value));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }
}

impl RemoteCall for MockRemote {
    fn call(&self, path: &str, options: &CallOptions) -> Result<Value, HttpError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            method: options.method,
            body: options.body.clone(),
        });
        if let Some(next) = self.once.lock().unwrap().pop_front() {
            return next;
        }
        match &*self.always.lock().unwrap() {
            Some(response) => response.clone(),
            None => Err(HttpError::unexpected(format!("no scripted response for {}", path))),
        }
    }
}
