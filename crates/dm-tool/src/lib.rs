mod case;
mod runner;
mod source;

pub use case::{ExpectedFinal, ExpectedStep, TestCase, TESTCASE_SCHEMA_V1};
pub use runner::{assert_case, run_case, RunReport};
pub use source::{discover_cases, read_script, read_test_case};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DmToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse testcase {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid testcase schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("No script.json under {path}.")]
    ScriptMissing { path: PathBuf },
    #[error("No testcase.json files under {path}.")]
    CasesEmpty { path: PathBuf },
    #[error("Engine error: {0}")]
    Engine(#[from] dm_core::DmScriptError),
    #[error("Expected step count {expected}, actual {actual}. observed={observed}")]
    StepCountMismatch {
        expected: usize,
        actual: usize,
        observed: String,
    },
    #[error("Step mismatch at index {index}. expected={expected} actual={actual}")]
    StepMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("Final session mismatch. expected={expected} actual={actual}")]
    FinalMismatch { expected: String, actual: String },
    #[error("Failed to serialize step for diff: {0}")]
    StepSerialize(serde_json::Error),
}
