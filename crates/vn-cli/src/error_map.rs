use std::fmt::Display;

use vn_core::NovelError;

fn map_error(code: &'static str, error: impl Display) -> NovelError {
    NovelError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: NovelError) -> i32 {
    for line in error_lines(&error) {
        println!("{}", line);
    }
    1
}

pub(crate) fn error_lines(error: &NovelError) -> Vec<String> {
    vec![
        "RESULT:ERROR".to_string(),
        format!("ERROR_CODE:{}", error.code),
        format!("ERROR_MSG_JSON:{}", json_string(&error.message)),
    ]
}

pub(crate) fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

pub(crate) fn map_tui_io(error: std::io::Error) -> NovelError {
    map_error("TUI_IO", error)
}

pub(crate) fn map_cli_config_read(error: std::io::Error) -> NovelError {
    map_error("CLI_CONFIG_READ", error)
}

pub(crate) fn map_cli_config_invalid(error: serde_json::Error) -> NovelError {
    map_error("CLI_CONFIG_INVALID", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(NovelError::new("ERR", "failed"));
        assert_eq!(code, 1);
    }

    #[test]
    fn error_lines_encode_message_as_json() {
        let lines = error_lines(&NovelError::new("LOAD_READ", "bad \"path\""));
        assert_eq!(
            lines,
            vec![
                "RESULT:ERROR",
                "ERROR_CODE:LOAD_READ",
                "ERROR_MSG_JSON:\"bad \\\"path\\\"\"",
            ]
        );
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        assert_eq!(map_tui_io(std::io::Error::other("io")).code, "TUI_IO");
        assert_eq!(
            map_cli_config_read(std::io::Error::other("read")).code,
            "CLI_CONFIG_READ"
        );
        let invalid = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(map_cli_config_invalid(invalid).code, "CLI_CONFIG_INVALID");
    }
}
