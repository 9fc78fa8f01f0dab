use std::path::PathBuf;

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn fixtures_root() -> PathBuf {
    workspace_root().join("fixtures")
}

pub fn fixture_dir(name: &str) -> PathBuf {
    fixtures_root().join(name)
}

pub fn script_path(name: &str) -> PathBuf {
    fixture_dir(name).join("script.json")
}

pub fn testcase_path(name: &str) -> PathBuf {
    fixture_dir(name).join("testcase.json")
}
