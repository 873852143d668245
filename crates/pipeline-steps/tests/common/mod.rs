//! Shared fixtures: a temporary object store and step events.

#![allow(dead_code)]

use std::fs;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::{Value, json};
use tempfile::TempDir;

use pipeline_model::StepEvent;
use pipeline_steps::LocalObjectStore;

pub const INPUT_PREFIX: &str = "raw/green/boligpriser/version=1/edition=20200120T133700/";

pub struct Fixture {
    _dir: TempDir,
    pub store: LocalObjectStore,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let store = LocalObjectStore::new(dir.path());
        Self { _dir: dir, store }
    }

    /// Write `body` as object `key`.
    pub fn put(&self, key: &str, body: &[u8]) -> &Self {
        let path = self.store.root().join(key);
        fs::create_dir_all(path.parent().expect("key has a parent")).expect("create dirs");
        fs::write(path, body).expect("write object");
        self
    }

    pub fn put_input(&self, name: &str, body: &[u8]) -> &Self {
        self.put(&format!("{INPUT_PREFIX}{name}"), body)
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("compress");
    encoder.finish().expect("finish gzip")
}

pub fn boligpriser_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "delbydel_id": {"type": "string"},
                "navn": {"type": "string"},
                "pris": {"type": "number"},
                "til_salg": {"type": "boolean"},
                "solgt": {"type": "string", "format": "date-time"}
            },
            "required": ["delbydel_id", "navn", "pris", "til_salg"]
        }
    })
}

pub const BOLIGPRISER_CSV: &str = "\
delbydel_id;navn;pris;til_salg;solgt
0011;Lodalen;1010,01;true;2020-01-01T12:01:01
0012;Grønland;5001,10;false;
0013;\"Nedre; Tøyen\";201.2321;true;2020-12-01T12-01
";

/// A step event over the default input prefix.
pub fn csv_event(task_config: Value) -> StepEvent {
    event(
        task_config,
        json!({
            "s3_input_prefixes": {"boligpriser": INPUT_PREFIX},
            "input_events": null,
            "status": "PENDING",
            "errors": []
        }),
    )
}

pub fn event(task_config: Value, step_data: Value) -> StepEvent {
    StepEvent::from_value(json!({
        "execution_name": "boligpriser-UUID",
        "task": "validate_input",
        "payload": {
            "pipeline": {
                "id": "boligpriser",
                "task_config": {"validate_input": task_config}
            },
            "output_dataset": {
                "id": "boligpriser",
                "version": "1",
                "edition": "20200120T133701",
                "s3_prefix": "%stage%/green/boligpriser/version=1/edition=20200120T133701/"
            },
            "step_data": step_data
        }
    }))
    .expect("valid step event")
}
