use dm_core::DmScriptError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> DmScriptError {
    DmScriptError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: DmScriptError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    if let Some(node_id) = &error.node_id {
        println!("NODE:{}", node_id);
    }
    println!("ERROR_MSG_JSON:{}", json_string(&error.message));
    1
}

pub(crate) fn json_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

pub(crate) fn map_cli_script_path(error: std::io::Error) -> DmScriptError {
    map_error("CLI_SCRIPT_PATH", error)
}

pub(crate) fn map_cli_script_read(error: std::io::Error) -> DmScriptError {
    map_error("CLI_SCRIPT_READ", error)
}

pub(crate) fn map_cli_state_write(error: std::io::Error) -> DmScriptError {
    map_error("CLI_STATE_WRITE", error)
}

pub(crate) fn map_cli_state_read(error: std::io::Error) -> DmScriptError {
    map_error("CLI_STATE_READ", error)
}

pub(crate) fn map_cli_state_invalid(error: serde_json::Error) -> DmScriptError {
    map_error("CLI_STATE_INVALID", error)
}

pub(crate) fn map_cli_json(error: serde_json::Error) -> DmScriptError {
    map_error("CLI_JSON", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        assert_eq!(emit_error(DmScriptError::new("ERR", "failed")), 1);
        assert_eq!(
            emit_error(DmScriptError::at_node("ERR", "failed", "start")),
            1
        );
    }

    #[test]
    fn json_string_escapes_quotes_and_newlines() {
        assert_eq!(json_string("say \"hi\"\nnow"), r#""say \"hi\"\nnow""#);
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        assert_eq!(
            map_cli_script_path(std::io::Error::other("path")).code,
            "CLI_SCRIPT_PATH"
        );
        assert_eq!(
            map_cli_script_read(std::io::Error::other("read")).code,
            "CLI_SCRIPT_READ"
        );
        assert_eq!(
            map_cli_state_write(std::io::Error::other("write")).code,
            "CLI_STATE_WRITE"
        );
        assert_eq!(
            map_cli_state_read(std::io::Error::other("read")).code,
            "CLI_STATE_READ"
        );

        let invalid = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(map_cli_state_invalid(invalid).code, "CLI_STATE_INVALID");
        let invalid = serde_json::from_str::<serde_json::Value>("[").expect_err("invalid json");
        assert_eq!(map_cli_json(invalid).code, "CLI_JSON");
    }
}
