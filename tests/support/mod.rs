//! Purpose: In-memory stand-in for the remote service, shared by integration tests.
//! Exports: `FakeServer`, `session_for`, `init_tracing`, `TestResult`.
//! Role: Implements `Backend` over wire-form collections and records every request.
//! Invariants: Records are stored in wire form (lowerCamelCase) exactly as a real server would.
//! Invariants: Listing excludes archived records unless `archiveReason` is given.
#![allow(dead_code)]

use benchling_api::api::{
    ApiResult, Backend, HttpRequest, HttpResponse, Method, Session, SessionConfig,
};
use benchling_api::core::codec;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

pub type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

const DEFAULT_PAGE_SIZE: usize = 50;

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

pub fn session_for(server: &Arc<FakeServer>) -> Session {
    init_tracing();
    Session::from_config(SessionConfig::new("sk_test").with_backend(server.clone()))
        .expect("session")
}

#[derive(Default)]
struct State {
    collections: BTreeMap<String, Vec<Value>>,
    schemas: BTreeMap<String, Vec<Value>>,
    requests: Vec<HttpRequest>,
    failures: VecDeque<HttpResponse>,
    unfiltered: Vec<String>,
    next_id: u64,
}

#[derive(Default)]
pub struct FakeServer {
    state: Mutex<State>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Insert a wire-form record into `path`, assigning an id when missing.
    pub fn seed(&self, path: &str, mut record: Value) -> String {
        let mut state = self.state();
        let id = match record.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = state.fresh_id(path);
                record["id"] = json!(id);
                id
            }
        };
        state
            .collections
            .entry(path.to_string())
            .or_default()
            .push(record);
        id
    }

    /// Accept `wire_key` in list queries without filtering on it.
    pub fn ignore_filter(&self, wire_key: &str) {
        self.state().unfiltered.push(wire_key.to_string());
    }

    pub fn add_registry(&self, id: &str, name: &str, schemas: Vec<Value>) {
        self.seed("registries", json!({"id": id, "name": name}));
        self.state().schemas.insert(id.to_string(), schemas);
    }

    pub fn record(&self, path: &str, id: &str) -> Option<Value> {
        self.state()
            .collections
            .get(path)
            .and_then(|records| records.iter().find(|record| record["id"] == json!(id)).cloned())
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    /// Answer the next request with `status` and `body` instead of routing it.
    pub fn fail_next(&self, status: u16, body: Value) {
        self.state()
            .failures
            .push_back(HttpResponse::json(status, &body));
    }
}

impl Backend for FakeServer {
    fn execute(&self, request: &HttpRequest) -> ApiResult<HttpResponse> {
        let mut state = self.state();
        state.requests.push(request.clone());
        if let Some(failure) = state.failures.pop_front() {
            return Ok(failure);
        }
        Ok(state.route(request))
    }
}

fn not_found(what: &str) -> HttpResponse {
    HttpResponse::json(
        404,
        &json!({"error": {"message": format!("{what} not found"), "type": "invalid_request_error"}}),
    )
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::json(
        400,
        &json!({"error": {"message": message, "type": "invalid_request_error"}}),
    )
}

fn prefix(path: &str) -> &'static str {
    match path {
        "dna-sequences" | "oligos" => "seq",
        "aa-sequences" => "prtn",
        "custom-entities" => "bfi",
        "batches" => "bat",
        "folders" => "lib",
        "projects" | "registries" => "src",
        "dna-alignments" => "seqanl",
        "tasks" => "task",
        _ => "rec",
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl State {
    fn fresh_id(&mut self, path: &str) -> String {
        self.next_id += 1;
        format!("{}_{}", prefix(path), self.next_id)
    }

    fn route(&mut self, request: &HttpRequest) -> HttpResponse {
        let segments: Vec<String> = request
            .url
            .path_segments()
            .map(|segments| segments.skip(2).map(str::to_string).collect())
            .unwrap_or_default();
        let Some(last) = segments.last() else {
            return not_found("route");
        };
        let (last, action) = match last.split_once(':') {
            Some((head, action)) => (head.to_string(), Some(action.to_string())),
            None => (last.clone(), None),
        };
        let mut parts: Vec<&str> = segments[..segments.len() - 1]
            .iter()
            .map(String::as_str)
            .collect();
        parts.push(&last);
        let body = request.body.clone().unwrap_or(Value::Null);

        match (request.method, parts.as_slice(), action.as_deref()) {
            (Method::Get, [path], None) => self.list(path, request),
            (Method::Get, ["entities", id, "batches"], None) => {
                let batches: Vec<Value> = self
                    .collections
                    .get("batches")
                    .map(|records| {
                        records
                            .iter()
                            .filter(|record| record["entityId"] == json!(id))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                HttpResponse::json(200, &json!({"batches": batches}))
            }
            (Method::Get, ["registries", id, "entity-schemas"], None) => match self.schemas.get(*id) {
                Some(schemas) => HttpResponse::json(200, &json!({"entitySchemas": schemas})),
                None => not_found("registry"),
            },
            (Method::Get, ["registries", id, "registered-entities"], Some("bulk-get")) => {
                let wanted: Vec<String> = request
                    .query_param("entityRegistryIds")
                    .map(|ids| ids.split(',').map(str::to_string).collect())
                    .unwrap_or_default();
                let entities: Vec<Value> = self
                    .collections
                    .values()
                    .flatten()
                    .filter(|record| record["registryId"] == json!(id))
                    .filter(|record| wanted.iter().any(|w| record["entityRegistryId"] == json!(w)))
                    .cloned()
                    .collect();
                HttpResponse::json(200, &json!({"entities": entities}))
            }
            (Method::Get, [path, id], None) => match self.find(path, id) {
                Some(record) => HttpResponse::json(200, record),
                None => not_found(id),
            },
            (Method::Post, [path], None) => {
                let record = self.insert(path, body);
                HttpResponse::json(201, &record)
            }
            (Method::Post, [path], Some("bulk-create")) => {
                let key = codec::wire_key(&path.replace('-', "_"));
                let items = body[key.as_str()].as_array().cloned().unwrap_or_default();
                let created: Vec<Value> = items
                    .into_iter()
                    .map(|item| self.insert(path, item))
                    .collect();
                let mut response = Map::new();
                response.insert(key, Value::Array(created));
                HttpResponse::json(200, &Value::Object(response))
            }
            (Method::Post, [path], Some("archive")) => {
                let reason = body["reason"].clone();
                for id in ids_in(&body) {
                    if let Some(record) = self.find_mut(path, &id) {
                        record["archiveRecord"] = json!({"reason": reason});
                    }
                }
                HttpResponse::json(200, &json!({}))
            }
            (Method::Post, [path], Some("unarchive")) => {
                for id in ids_in(&body) {
                    if let Some(record) = self.find_mut(path, &id) {
                        record["archiveRecord"] = Value::Null;
                    }
                }
                HttpResponse::json(200, &json!({}))
            }
            (Method::Post, ["registries", id], Some("register-entities")) => {
                self.register(id, &body)
            }
            (Method::Post, ["registries", id], Some("unregister-entities")) => {
                if self.find("registries", id).is_none() {
                    return bad_request(&format!("Invalid registry id: {id}"));
                }
                let folder_id = body["folderId"].clone();
                for entity_id in body["entityIds"].as_array().cloned().unwrap_or_default() {
                    if let Some(record) = self.find_anywhere_mut(&text(&entity_id)) {
                        record["registryId"] = Value::Null;
                        record["entityRegistryId"] = Value::Null;
                        record["folderId"] = folder_id.clone();
                    }
                }
                HttpResponse::json(200, &json!({}))
            }
            (Method::Post, ["dna-alignments"], Some("create-template-alignment")) => {
                let alignment = self.insert(
                    "dna-alignments",
                    json!({"name": body["name"], "alignedSequences": []}),
                );
                let task = self.insert(
                    "tasks",
                    json!({"status": "SUCCEEDED", "response": alignment}),
                );
                HttpResponse::json(202, &json!({"taskId": task["id"]}))
            }
            (Method::Patch, [path, id], None) => {
                let Some(record) = self.find_mut(path, id) else {
                    return not_found(id);
                };
                if let (Value::Object(target), Value::Object(patch)) = (&mut *record, body) {
                    for (key, value) in patch {
                        target.insert(key, value);
                    }
                }
                HttpResponse::json(200, record)
            }
            (Method::Delete, [path, id], None) => {
                let Some(records) = self.collections.get_mut(*path) else {
                    return not_found(id);
                };
                let before = records.len();
                records.retain(|record| record["id"] != json!(id));
                if records.len() == before {
                    return not_found(id);
                }
                HttpResponse::json(200, &json!({}))
            }
            _ => not_found("route"),
        }
    }

    fn list(&self, path: &str, request: &HttpRequest) -> HttpResponse {
        let archive_reason = request.query_param("archiveReason");
        let mut matching: Vec<&Value> = self
            .collections
            .get(path)
            .map(|records| records.iter().collect())
            .unwrap_or_default();
        // Newest first unless sorted ascending.
        if request.query_param("sort").as_deref() != Some("modifiedAt:asc") {
            matching.reverse();
        }
        matching.retain(|record| match (&archive_reason, record.get("archiveRecord")) {
            (Some(reason), Some(archived)) => archived["reason"] == json!(reason),
            (Some(_), None) => false,
            (None, Some(archived)) => archived.is_null(),
            (None, None) => true,
        });
        for (key, value) in request.url.query_pairs() {
            if matches!(key.as_ref(), "pageSize" | "nextToken" | "sort" | "archiveReason")
                || self.unfiltered.iter().any(|ignored| ignored == key.as_ref())
            {
                continue;
            }
            matching.retain(|record| record.get(key.as_ref()).map(text).as_deref() == Some(&*value));
        }

        let page_size = request
            .query_param("pageSize")
            .and_then(|size| size.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let start: usize = request
            .query_param("nextToken")
            .and_then(|token| token.parse().ok())
            .unwrap_or(0);
        let end = (start + page_size).min(matching.len());
        let page: Vec<Value> = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|record| (*record).clone())
            .collect();
        let key = codec::wire_key(&path.replace('-', "_"));
        let mut response = Map::new();
        response.insert(key, Value::Array(page));
        if end < matching.len() {
            response.insert("nextToken".to_string(), json!(end.to_string()));
        }
        HttpResponse::json(200, &Value::Object(response))
    }

    fn insert(&mut self, path: &str, mut record: Value) -> Value {
        let id = self.fresh_id(path);
        record["id"] = json!(id);
        self.collections
            .entry(path.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    fn register(&mut self, registry_id: &str, body: &Value) -> HttpResponse {
        if self.find("registries", registry_id).is_none() {
            return bad_request(&format!("Invalid registry id: {registry_id}"));
        }
        let strategy = body["namingStrategy"].as_str().unwrap_or("NEW_IDS").to_string();
        for entity_id in body["entityIds"].as_array().cloned().unwrap_or_default() {
            self.next_id += 1;
            let fresh = format!("REG{:03}", self.next_id);
            let Some(record) = self.find_anywhere_mut(&text(&entity_id)) else {
                return bad_request(&format!("entity {entity_id} not found"));
            };
            let name = record["name"].as_str().map(str::to_string);
            let registry_name = match (strategy.as_str(), name) {
                ("IDS_FROM_NAMES", Some(name)) => name,
                ("DELETE_NAMES", _) => {
                    record["name"] = json!(fresh);
                    fresh
                }
                _ => fresh,
            };
            record["registryId"] = json!(registry_id);
            record["entityRegistryId"] = json!(registry_name);
        }
        HttpResponse::json(200, &json!({}))
    }

    fn find(&self, path: &str, id: &str) -> Option<&Value> {
        self.collections
            .get(path)?
            .iter()
            .find(|record| record["id"] == json!(id))
    }

    fn find_mut(&mut self, path: &str, id: &str) -> Option<&mut Value> {
        self.collections
            .get_mut(path)?
            .iter_mut()
            .find(|record| record["id"] == json!(id))
    }

    fn find_anywhere_mut(&mut self, id: &str) -> Option<&mut Value> {
        self.collections
            .values_mut()
            .flatten()
            .find(|record| record["id"] == json!(id))
    }
}

fn ids_in(body: &Value) -> Vec<String> {
    body.as_object()
        .and_then(|map| {
            map.iter()
                .find(|(key, _)| key.ends_with("Ids"))
                .and_then(|(_, ids)| ids.as_array())
        })
        .map(|ids| ids.iter().map(text).collect())
        .unwrap_or_default()
}
