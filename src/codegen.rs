//! Injectable-program generation for remote async execution.
//!
//! The generated program invokes the action with its parameters, captures the
//! resolved value as `content` or a thrown error as an error snapshot
//! (message, name, stack, plus the host-specific `arguments` and `type`
//! fields), and reports exactly one completion message tagged with the
//! correlation id from a `finally` block, so the caller-side listener never
//! waits forever on an uncaught remote exception.
//!
//! Parameters are embedded as serialized JSON literals in invocation order.
//! That is the whole serialization contract: a parameter must be a JSON
//! value. Functions, symbols, and cyclic structures have no representation
//! here by construction of [`serde_json::Value`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// What to run in the remote context.
#[derive(Clone, Debug)]
pub enum Action {
    /// Source text of a function expression to invoke with the parameters.
    Function(String),
    /// Source text of an expression evaluating to a callable.
    Code(String),
    /// A full injection descriptor; its `code` is wrapped, every other field
    /// passes through to the injection call untouched.
    Details(InjectDetails),
}

impl Action {
    /// A function-expression action.
    pub fn function(source: impl Into<String>) -> Self {
        Self::Function(source.into())
    }

    /// A code-string action.
    pub fn code(source: impl Into<String>) -> Self {
        Self::Code(source.into())
    }
}

/// Script-injection descriptor, mirroring the host's `executeScript` details
/// object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// File-based injection is rejected by [`build_injection`]: the bridge
    /// must stay in control of the generated wrapper, which an externally
    /// loaded file defeats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_frames: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_about_blank: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_at: Option<String>,
}

/// Build the injection details for one remote call.
///
/// Fails synchronously, before anything is injected, on unsupported action
/// shapes: a file-based descriptor, or a descriptor with neither code nor
/// file. These are caller programming errors, not runtime conditions.
pub fn build_injection(action: &Action, id: &str, params: &[Value]) -> Result<InjectDetails> {
    match action {
        Action::Function(source) | Action::Code(source) => Ok(InjectDetails {
            code: Some(wrap_async_report(source, id, params)?),
            ..InjectDetails::default()
        }),
        Action::Details(details) => {
            if let Some(code) = &details.code {
                let mut wrapped = details.clone();
                wrapped.code = Some(wrap_async_report(code, id, params)?);
                Ok(wrapped)
            } else if let Some(file) = &details.file {
                Err(Error::validation(format!(
                    "Cannot execute {file}. File based execute scripts are not supported."
                )))
            } else {
                Err(Error::validation(format!(
                    "Cannot execute {}, it must be a function, a code string, or carry a code property.",
                    serde_json::to_string(details)?
                )))
            }
        }
    }
}

/// Wrap an action in the self-reporting async program.
fn wrap_async_report(action: &str, id: &str, params: &[Value]) -> Result<String> {
    let id_literal = serde_json::to_string(id)?;
    let mut literals = Vec::with_capacity(params.len());
    for param in params {
        literals.push(serde_json::to_string(param)?);
    }
    let args = literals.join(",");

    Ok(format!(
        r"(async function () {{
    const result = {{ id: {id_literal} }};
    try {{
        result.content = await ({action})({args});
    }}
    catch (err) {{
        result.error = {{
            message: err.message,
            arguments: err.arguments,
            type: err.type,
            name: err.name,
            stack: err.stack
        }};
    }}
    finally {{
        chrome.runtime.sendMessage(result);
    }}
}})()"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn code_embeds_the_correlation_id() {
        let details =
            build_injection(&Action::code("() => 1"), "abc123", &[]).unwrap();
        let code = details.code.unwrap();
        assert!(code.contains(r#"const result = { id: "abc123" };"#));
        assert!(code.contains("finally"));
        assert!(code.contains("chrome.runtime.sendMessage(result)"));
    }

    #[test]
    fn snapshot_carries_the_host_specific_error_fields() {
        let details = build_injection(&Action::code("() => 1"), "id0", &[]).unwrap();
        let code = details.code.unwrap();
        for field in [
            "message: err.message",
            "arguments: err.arguments",
            "type: err.type",
            "name: err.name",
            "stack: err.stack",
        ] {
            assert!(code.contains(field), "snapshot misses {field}");
        }
    }

    #[test]
    fn params_are_serialized_in_invocation_order() {
        let details = build_injection(
            &Action::function("(a, b, c) => a"),
            "id1",
            &[json!(1), json!("two"), json!({ "three": [3] })],
        )
        .unwrap();
        let code = details.code.unwrap();
        assert!(code.contains(r#"((a, b, c) => a)(1,"two",{"three":[3]})"#));
    }

    #[test]
    fn zero_params_invoke_with_empty_list() {
        let details = build_injection(&Action::code("f"), "id2", &[]).unwrap();
        assert!(details.code.unwrap().contains("(f)()"));
    }

    #[test]
    fn details_keep_their_injection_options() {
        let action = Action::Details(InjectDetails {
            code: Some("() => 0".to_string()),
            all_frames: Some(true),
            run_at: Some("document_end".to_string()),
            ..InjectDetails::default()
        });
        let details = build_injection(&action, "id3", &[]).unwrap();
        assert_eq!(details.all_frames, Some(true));
        assert_eq!(details.run_at.as_deref(), Some("document_end"));
        assert!(details.code.unwrap().contains("id3"));
    }

    #[test]
    fn file_details_are_rejected() {
        let action = Action::Details(InjectDetails {
            file: Some("payload.js".to_string()),
            ..InjectDetails::default()
        });
        let err = build_injection(&action, "id4", &[]).unwrap_err();
        assert!(matches!(err, Error::Validation(message) if message.contains("payload.js")));
    }

    #[test]
    fn empty_details_are_rejected() {
        let action = Action::Details(InjectDetails::default());
        let err = build_injection(&action, "id5", &[]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn details_serialize_camel_case_without_absent_fields() {
        let details = InjectDetails {
            code: Some("x".to_string()),
            all_frames: Some(false),
            ..InjectDetails::default()
        };
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value, json!({ "code": "x", "allFrames": false }));
    }
}
