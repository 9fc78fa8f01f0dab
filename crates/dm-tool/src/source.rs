use std::fs;
use std::path::{Path, PathBuf};

use dm_api::{load_script_json, Script};
use walkdir::WalkDir;

use crate::{DmToolError, TestCase, TESTCASE_SCHEMA_V1};

pub fn read_script(example_dir: &Path) -> Result<Script, DmToolError> {
    let path = example_dir.join("script.json");
    if !path.is_file() {
        return Err(DmToolError::ScriptMissing {
            path: example_dir.to_path_buf(),
        });
    }

    let raw = fs::read_to_string(&path).map_err(|source| DmToolError::ReadFile {
        path: path.clone(),
        source,
    })?;
    Ok(load_script_json(&raw)?)
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, DmToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| DmToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: TestCase = serde_json::from_str(&raw).map_err(|source| DmToolError::ParseCase {
        path: case_path.to_path_buf(),
        source,
    })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(DmToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}

pub fn discover_cases(root: &Path) -> Result<Vec<PathBuf>, DmToolError> {
    let mut cases = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == "testcase.json")
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();

    if cases.is_empty() {
        return Err(DmToolError::CasesEmpty {
            path: root.to_path_buf(),
        });
    }

    cases.sort();
    Ok(cases)
}
