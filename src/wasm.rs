//! Browser bindings
//!
//! Exposes the boundary operations to JavaScript. Each export takes the call
//! arguments as an array and returns the operation's JSON payload as a plain
//! JS object. Arity is checked by [`ExplainService::dispatch`].
//!
//! ```js
//! import init, { explainPromQL } from "./pkg/promql_explain.js";
//!
//! await init();
//! const result = explainPromQL(["rate(http_requests_total[5m])"]);
//! ```

use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::explain::{ExplainError, ExplainService, Operation};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// `formatPromQL([query])`
#[wasm_bindgen(js_name = formatPromQL)]
pub fn format_promql(args: Box<[JsValue]>) -> JsValue {
    call(Operation::Format, &args)
}

/// `validatePromQL([query])`
#[wasm_bindgen(js_name = validatePromQL)]
pub fn validate_promql(args: Box<[JsValue]>) -> JsValue {
    call(Operation::Validate, &args)
}

/// `explainPromQL([query])`
#[wasm_bindgen(js_name = explainPromQL)]
pub fn explain_promql(args: Box<[JsValue]>) -> JsValue {
    call(Operation::Explain, &args)
}

/// `getExampleQueries()`
#[wasm_bindgen(js_name = getExampleQueries)]
pub fn get_example_queries(args: Box<[JsValue]>) -> JsValue {
    call(Operation::ListExamples, &args)
}

fn call(op: Operation, args: &[JsValue]) -> JsValue {
    let args: Vec<Option<String>> = args.iter().map(coerce_argument).collect();
    to_js(&invoke(op, &args))
}

/// Strings pass through; anything else is coerced through `JSON.stringify`.
/// `None` when the value has no JSON form (`undefined`, functions).
fn coerce_argument(value: &JsValue) -> Option<String> {
    value.as_string().or_else(|| {
        js_sys::JSON::stringify(value)
            .ok()
            .and_then(|s| s.as_string())
    })
}

/// Dispatch coerced arguments; values without a text form become empty queries
fn invoke(op: Operation, args: &[Option<String>]) -> Value {
    let args: Vec<String> = args
        .iter()
        .map(|arg| arg.clone().unwrap_or_default())
        .collect();
    ExplainService::new().dispatch(op.as_str(), &args)
}

fn to_js(payload: &Value) -> JsValue {
    let parsed = serde_json::to_string(payload)
        .ok()
        .and_then(|text| js_sys::JSON::parse(&text).ok());

    match parsed {
        Some(value) => value,
        None => {
            let fallback = serde_json::json!({
                "success": false,
                "error": ExplainError::Serialization(String::new()).to_string(),
            });
            js_sys::JSON::parse(&fallback.to_string()).unwrap_or(JsValue::NULL)
        }
    }
}
