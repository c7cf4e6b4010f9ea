//! Record-keeping boundary for historical runs
//!
//! The orchestrator's external collaborator is a thin CRUD service over Run
//! records. This module models that collaborator at its boundary: the record
//! shape, the `{status, message, data?}` response envelope, and the HTTP-style
//! status codes (200 read, 201 created, 400 malformed payload, 404 unknown
//! id). The transport in front of it is out of scope; an in-memory store
//! carries the contract.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Envelope status marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
}

/// Structured success/failure envelope returned by every operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Envelope plus its HTTP-style status code
#[derive(Debug, Clone)]
pub struct Response {
    pub code: u16,
    pub envelope: Envelope,
}

impl Response {
    fn success(code: u16, message: &str, data: Option<Value>) -> Self {
        Self {
            code,
            envelope: Envelope {
                status: Status::Success,
                message: message.to_string(),
                data,
            },
        }
    }

    fn fail(code: u16, message: &str) -> Self {
        Self {
            code,
            envelope: Envelope {
                status: Status::Fail,
                message: message.to_string(),
                data: None,
            },
        }
    }
}

/// One stored run record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: u64,
    pub target_cl: f64,
    pub n_chord: usize,
    pub n_thick: usize,
    #[serde(default = "default_bits")]
    pub bits_chord: u32,
    #[serde(default = "default_bits")]
    pub bits_thick: u32,
    #[serde(default = "default_bits")]
    pub bits_te: u32,
    #[serde(default = "default_generations")]
    pub generations: u32,
    #[serde(default = "default_true")]
    pub constrain_moment: bool,
    #[serde(default)]
    pub report: bool,
}

/// Create payload: the record without its assigned id
#[derive(Debug, Clone, Deserialize)]
struct CreateRun {
    target_cl: f64,
    n_chord: usize,
    n_thick: usize,
    #[serde(default = "default_bits")]
    bits_chord: u32,
    #[serde(default = "default_bits")]
    bits_thick: u32,
    #[serde(default = "default_bits")]
    bits_te: u32,
    #[serde(default = "default_generations")]
    generations: u32,
    #[serde(default = "default_true")]
    constrain_moment: bool,
    #[serde(default)]
    report: bool,
}

fn default_bits() -> u32 {
    8
}

fn default_generations() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

/// In-memory run record store carrying the boundary contract
#[derive(Debug)]
pub struct RecordStore {
    records: Vec<RunRecord>,
    next_id: u64,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Liveness check
    pub fn ping(&self) -> Response {
        Response::success(200, "pong!", None)
    }

    /// Create a record from a JSON payload
    ///
    /// An empty object or one missing any required field is a 400 with the
    /// envelope marked fail; a well-formed payload is a 201.
    pub fn create(&mut self, payload: &Value) -> Response {
        let create: CreateRun = match serde_json::from_value(payload.clone()) {
            Ok(create) => create,
            Err(_) => return Response::fail(400, "Invalid payload."),
        };

        let record = RunRecord {
            id: self.next_id,
            target_cl: create.target_cl,
            n_chord: create.n_chord,
            n_thick: create.n_thick,
            bits_chord: create.bits_chord,
            bits_thick: create.bits_thick,
            bits_te: create.bits_te,
            generations: create.generations,
            constrain_moment: create.constrain_moment,
            report: create.report,
        };
        self.next_id += 1;
        self.records.push(record);

        Response::success(201, "New run was added!", None)
    }

    /// List every stored record
    pub fn list(&self) -> Response {
        let runs = serde_json::to_value(&self.records).unwrap_or_else(|_| json!([]));
        Response::success(200, "All runs.", Some(json!({ "runs": runs })))
    }

    /// Read one record by its textual identifier
    ///
    /// Non-numeric identifiers and unknown ids both map to 404.
    pub fn read(&self, id: &str) -> Response {
        let parsed: Option<u64> = id.parse().ok();
        let record = parsed.and_then(|id| self.records.iter().find(|r| r.id == id));
        match record {
            Some(record) => Response::success(
                200,
                "Run found.",
                Some(serde_json::to_value(record).unwrap_or(Value::Null)),
            ),
            None => Response::fail(404, "Run does not exist."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping() {
        let store = RecordStore::new();
        let response = store.ping();
        assert_eq!(response.code, 200);
        assert_eq!(response.envelope.status, Status::Success);
        assert!(response.envelope.message.contains("pong!"));
    }

    #[test]
    fn test_create_with_full_payload() {
        let mut store = RecordStore::new();
        let response = store.create(&json!({
            "target_cl": 1.0, "n_chord": 3, "n_thick": 3,
            "bits_chord": 8, "bits_thick": 8,
            "generations": 100, "constrain_moment": false, "report": false
        }));
        assert_eq!(response.code, 201);
        assert_eq!(response.envelope.status, Status::Success);
        assert!(response.envelope.message.contains("New run was added!"));
    }

    #[test]
    fn test_create_empty_payload_is_400() {
        let mut store = RecordStore::new();
        let response = store.create(&json!({}));
        assert_eq!(response.code, 400);
        assert_eq!(response.envelope.status, Status::Fail);
        assert!(response.envelope.message.contains("Invalid payload."));
    }

    #[test]
    fn test_create_missing_required_key_is_400() {
        let mut store = RecordStore::new();
        let response = store.create(&json!({"target_cl": 1.0}));
        assert_eq!(response.code, 400);
        assert_eq!(response.envelope.status, Status::Fail);
    }

    #[test]
    fn test_read_single_record() {
        let mut store = RecordStore::new();
        store.create(&json!({"target_cl": 1.0, "n_chord": 3, "n_thick": 3}));
        let response = store.read("1");
        assert_eq!(response.code, 200);
        let data = response.envelope.data.unwrap();
        assert_eq!(data["target_cl"], 1.0);
        assert_eq!(data["n_chord"], 3);
        assert_eq!(data["bits_chord"], 8);
    }

    #[test]
    fn test_read_non_numeric_id_is_404() {
        let store = RecordStore::new();
        let response = store.read("blah");
        assert_eq!(response.code, 404);
        assert!(response.envelope.message.contains("Run does not exist"));
    }

    #[test]
    fn test_read_unknown_id_is_404() {
        let mut store = RecordStore::new();
        store.create(&json!({"target_cl": 1.0, "n_chord": 3, "n_thick": 3}));
        let response = store.read("999");
        assert_eq!(response.code, 404);
        assert_eq!(response.envelope.status, Status::Fail);
    }

    #[test]
    fn test_list_all_records() {
        let mut store = RecordStore::new();
        store.create(&json!({"target_cl": 1.0, "n_chord": 3, "n_thick": 3}));
        store.create(&json!({
            "target_cl": 0.5, "n_chord": 6, "n_thick": 6,
            "bits_chord": 16, "bits_thick": 16
        }));

        let response = store.list();
        assert_eq!(response.code, 200);
        let runs = &response.envelope.data.unwrap()["runs"];
        assert_eq!(runs.as_array().unwrap().len(), 2);
        assert_eq!(runs[0]["target_cl"], 1.0);
        assert_eq!(runs[1]["bits_chord"], 16);
    }

    #[test]
    fn test_envelope_serializes_lowercase_status() {
        let store = RecordStore::new();
        let text = serde_json::to_string(&store.ping().envelope).unwrap();
        assert!(text.contains("\"status\":\"success\""));
        assert!(!text.contains("\"data\""));
    }
}
