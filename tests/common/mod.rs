#![allow(dead_code)]

use monsterapi::{Credentials, MonsterClient};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

pub const API_KEY: &str = "test_api_key";
pub const BEARER_TOKEN: &str = "test_bearer_token";

pub fn test_client(server: &MockServer) -> MonsterClient {
    MonsterClient::new_with_url(Credentials::new(API_KEY, BEARER_TOKEN), &server.uri()).unwrap()
}

pub fn status_body(process_id: &str, status: &str) -> Value {
    json!({
        "message": "Request processed successfully",
        "response_data": {
            "process_id": process_id,
            "status": status,
            "credit_used": 4,
            "overage": 0
        }
    })
}

pub fn completed_body(process_id: &str, output: &[&str]) -> Value {
    json!({
        "message": "Request processed successfully",
        "response_data": {
            "process_id": process_id,
            "status": "COMPLETED",
            "result": { "output": output },
            "credit_used": 4,
            "overage": 0
        }
    })
}

/// Replies with each body in turn, repeating the last one once exhausted.
pub struct StatusSequence {
    bodies: Vec<Value>,
    calls: AtomicUsize,
}

impl StatusSequence {
    pub fn new(bodies: Vec<Value>) -> Self {
        Self {
            bodies,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for StatusSequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let body = &self.bodies[call.min(self.bodies.len() - 1)];
        ResponseTemplate::new(200).set_body_json(body)
    }
}
