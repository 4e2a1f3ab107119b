//! CLI response formatting and output.
//!
//! Provides JSON envelope, printing, and exit code mapping.

use grassflow::error::Hint;
use grassflow::{Error, ErrorCode, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }
}

impl CliResponse<()> {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
            }),
        }
    }
}

fn write_stdout(payload: &str) -> Result<()> {
    use std::io::{self, Write};

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(()); // Exit gracefully on SIGPIPE
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

fn print_response<T: Serialize>(response: &CliResponse<T>) -> Result<()> {
    write_stdout(&response.to_json()?)
}

pub fn print_success<T: Serialize>(data: T) -> Result<()> {
    print_response(&CliResponse::success(data))
}

pub fn print_result<T: Serialize>(result: Result<T>) -> Result<()> {
    match result {
        Ok(data) => print_success(data),
        Err(err) => print_response(&CliResponse::<()>::from_error(&err)),
    }
}

/// Raw mode: the bare string on success, the JSON error envelope otherwise.
pub fn print_raw_result(result: Result<String>) -> Result<()> {
    match result {
        Ok(text) => write_stdout(&text),
        Err(err) => print_response(&CliResponse::<()>::from_error(&err)),
    }
}

pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(
                    err.to_string(),
                    Some("serialize response".to_string()),
                )),
                1,
            ),
        },
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

pub fn map_cmd_result_to_raw(result: Result<(String, i32)>) -> (Result<String>, i32) {
    match result {
        Ok((text, exit_code)) => (Ok(text), exit_code),
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

pub fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigMissingKey
        | ErrorCode::ConfigInvalidJson
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationMissingArgument
        | ErrorCode::ValidationInvalidArgument
        | ErrorCode::ValidationInvalidJson => 2,

        ErrorCode::CleanupFailed => 3,

        ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError
        | ErrorCode::InternalUnexpected => 1,
    }
}

pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    print_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_group_by_category() {
        assert_eq!(exit_code_for_error(ErrorCode::ConfigMissingKey), 2);
        assert_eq!(exit_code_for_error(ErrorCode::ValidationInvalidArgument), 2);
        assert_eq!(exit_code_for_error(ErrorCode::CleanupFailed), 3);
        assert_eq!(exit_code_for_error(ErrorCode::InternalIoError), 1);
    }

    #[test]
    fn error_envelope_omits_empty_hints() {
        let err = Error::cleanup_failed("/g/utm/ms/vector/roads", "remove vector", "denied");
        let value = serde_json::to_value(CliResponse::<()>::from_error(&err)).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "cleanup.failed");
        assert!(value["error"].get("hints").is_none());
        assert!(value.get("data").is_none());
    }

    #[test]
    fn failed_command_maps_to_error_exit_code() {
        let result: Result<(serde_json::Value, i32)> =
            Err(Error::validation_invalid_argument("kw", "bad", None, None));
        let (json, code) = map_cmd_result_to_json(result);
        assert!(json.is_err());
        assert_eq!(code, 2);
    }
}
