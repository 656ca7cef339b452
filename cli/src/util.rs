use std::io::Read;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use vantage_core::error::codes;

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

/// Render JSON pretty-printed, or on one line when `raw` is set.
pub fn render(value: &Value, raw: bool) -> String {
    if raw { format!("{value}") } else { format!("{value:#}") }
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", render(&err, false));
    std::process::exit(4);
}

/// Print a locally computed result and return the success exit code.
pub fn print_result<T: serde::Serialize>(result: &T, raw: bool) -> i32 {
    match serde_json::to_value(result) {
        Ok(value) => {
            println!("{}", render(&value, raw));
            0
        }
        Err(e) => {
            let err = json!({
                "error": codes::INTERNAL_ERROR,
                "message": format!("Failed to serialize result: {e}")
            });
            eprintln!("{}", render(&err, raw));
            2
        }
    }
}

/// Structured body for an input that failed to deserialize into engine
/// records. Mirrors the API's 400 body so scripts can handle both alike.
pub fn input_error_body(source: &str, err: &serde_json::Error) -> Value {
    let message = err.to_string();
    let mut body = json!({
        "error": codes::VALIDATION_FAILED,
        "message": format!("Invalid snapshot in '{source}': {message}"),
        "docs_hint": "Level keys and weights are listed by `vantage risk scales`."
    });
    if let Some(code) = codes::from_deserialize_message(&message) {
        body["error_code"] = json!(code);
    }
    body
}

/// Deserialize a snapshot read by [`read_json_from_file`]. On failure the
/// structured error is printed and the exit code (1) is returned.
pub fn parse_snapshot<T: DeserializeOwned>(source: &str, value: Value, raw: bool) -> Result<T, i32> {
    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(source, error = %e, "snapshot rejected");
        eprintln!("{}", render(&input_error_body(source, &e), raw));
        1
    })
}

/// Execute an API request, print response, exit with structured code.
///
/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub async fn api_request(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
    raw: bool,
) -> i32 {
    let url = match reqwest::Url::parse(&format!("{api_url}{path}")) {
        Ok(u) => u,
        Err(e) => {
            let err = json!({
                "error": "cli_error",
                "message": format!("Invalid URL: {api_url}{path}: {e}")
            });
            eprintln!("{}", render(&err, raw));
            return 4;
        }
    };

    tracing::debug!(%url, %method, "sending request");
    let mut req = client().request(method, url);
    if let Some(b) = body {
        req = req.json(&b);
    }

    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => {
            let err = json!({
                "error": "connection_error",
                "message": format!("{e}"),
                "docs_hint": "Is the API server running? Check VANTAGE_API_URL."
            });
            eprintln!("{}", render(&err, raw));
            return 3;
        }
    };

    let status = resp.status().as_u16();
    let exit_code = exit_code_for_status(status);

    let resp_body: Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => json!({"raw_error": format!("Failed to parse response as JSON: {e}")}),
    };

    let formatted = render(&resp_body, raw);
    if exit_code == 0 {
        println!("{formatted}");
    } else {
        eprintln!("{formatted}");
    }

    exit_code
}

fn exit_code_for_status(status: u16) -> i32 {
    match status {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}

/// Read JSON from a file path or stdin (when path is "-").
pub fn read_json_from_file(path: &str) -> Result<Value, String> {
    let raw = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {e}"))?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read file '{path}': {e}"))?
    };
    serde_json::from_str(&raw).map_err(|e| format!("Invalid JSON in '{path}': {e}"))
}

/// Like [`read_json_from_file`], exiting with a usage error when the file
/// cannot be read.
pub fn load_json_or_exit(path: &str) -> Value {
    match read_json_from_file(path) {
        Ok(v) => v,
        Err(e) => exit_error(&e, Some("Provide a valid JSON file or use '-' for stdin")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_exit_codes() {
        assert_eq!(exit_code_for_status(200), 0);
        assert_eq!(exit_code_for_status(400), 1);
        assert_eq!(exit_code_for_status(429), 1);
        assert_eq!(exit_code_for_status(500), 2);
    }

    #[test]
    fn render_respects_raw_flag() {
        let value = json!({"score": 16});
        assert_eq!(render(&value, true), r#"{"score":16}"#);
        assert!(render(&value, false).contains('\n'));
    }

    #[test]
    fn input_error_carries_engine_code() {
        let err = serde_json::from_value::<vantage_core::LikelihoodLevel>(json!("often"))
            .expect_err("unknown key should fail");
        let body = input_error_body("scenarios.json", &err);
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["error_code"], "invalid_level_key");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_json_from_file("/nonexistent/vantage-snapshot.json")
            .expect_err("missing file should fail");
        assert!(err.starts_with("Failed to read file"));
    }
}
