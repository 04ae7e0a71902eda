//! LiftScript line server
//!
//! Reads one JSON request per line on stdin and writes one JSON response
//! per line on stdout. Logs go to stderr.
//!
//! Methods:
//! - evaluate (default): run `script` in `mode` against the given day,
//!   set history, extra bindings and state
//! - functions: list the function table, optionally for one category
//! - help: describe one function
//!
//! Environment:
//! - LIFTSCRIPT_SETTINGS: path to a settings JSON file (unit, plates, bars)
//! - LIFTSCRIPT_LOG: log level (default info)

use liftscript::{Engine, Mode, ParseCache, ScriptBindings, ScriptError, Settings, Value, Weight};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::env;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use tracing::{debug, error, info, warn, Level};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct History {
    weights: Vec<Weight>,
    reps: Vec<f64>,
    completed_reps: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Request {
    id: Option<JsonValue>,
    method: Option<String>,
    script: Option<String>,
    mode: Option<Mode>,
    #[serde(default)]
    day: usize,
    week: Option<usize>,
    set_index: Option<usize>,
    #[serde(default)]
    history: History,
    #[serde(default)]
    bindings: HashMap<String, JsonValue>,
    #[serde(default)]
    state: HashMap<String, JsonValue>,
    category: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct Response {
    id: Option<JsonValue>,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ScriptError>,
}

impl Response {
    fn failure(id: Option<JsonValue>, error: ScriptError) -> Self {
        Self { id, ok: false, error: Some(error), ..Self::default() }
    }
}

fn init_logging() {
    let level = env::var("LIFTSCRIPT_LOG")
        .ok()
        .and_then(|s| Level::from_str(&s).ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_settings() -> Settings {
    match env::var("LIFTSCRIPT_SETTINGS") {
        Ok(path) => match Settings::load(&path) {
            Ok(settings) => {
                info!(%path, units = %settings.units, "loaded settings");
                settings
            }
            Err(e) => {
                warn!(%path, error = %e, "could not load settings, using defaults");
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

fn main() {
    init_logging();

    let settings = load_settings();
    let engine = Engine::with_settings(&settings);
    let mut cache = ParseCache::new();

    info!(version = SERVER_VERSION, functions = engine.registry().len(), "liftscript server ready");

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("end of input");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                debug!(bytes = line.len(), "received request");

                let response = match serde_json::from_str::<Request>(line) {
                    Ok(request) => handle_request(&engine, &mut cache, request),
                    Err(e) => {
                        warn!(error = %e, "malformed request");
                        Response::failure(None, ScriptError::invalid_request(format!("Invalid request: {}", e)))
                    }
                };

                if let Err(e) = write_response(&response) {
                    error!(error = %e, "could not write response");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "could not read stdin");
                break;
            }
        }
    }
}

fn write_response(response: &Response) -> io::Result<()> {
    let json = serde_json::to_string(response)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    stdout.flush()
}

fn handle_request(engine: &Engine, cache: &mut ParseCache, request: Request) -> Response {
    let id = request.id.clone();
    match request.method.as_deref().unwrap_or("evaluate") {
        "evaluate" => match evaluate(engine, cache, request) {
            Ok((value, state)) => Response { id, ok: true, value: Some(value), state: Some(state), ..Response::default() },
            Err(e) => {
                debug!(code = %e.code, "evaluation failed");
                Response::failure(id, e)
            }
        },
        "functions" => {
            let list = engine.list_functions(request.category.as_deref());
            Response { id, ok: true, result: Some(JsonValue::Array(list)), ..Response::default() }
        }
        "help" => {
            let name = request.name.unwrap_or_default();
            match engine.help(&name) {
                Some(help) => Response { id, ok: true, result: Some(help), ..Response::default() },
                None => Response::failure(id, ScriptError::undefined_func(&name)),
            }
        }
        other => Response::failure(
            id,
            ScriptError::invalid_request(format!("Unknown method '{}'", other))
                .with_suggestion("Use evaluate, functions or help"),
        ),
    }
}

fn evaluate(
    engine: &Engine,
    cache: &mut ParseCache,
    request: Request,
) -> Result<(Value, HashMap<String, Value>), ScriptError> {
    let source = request
        .script
        .ok_or_else(|| ScriptError::invalid_request("Missing 'script'"))?;
    let mode = request.mode.unwrap_or(Mode::Reps);
    let script = cache.get_or_parse(&source)?;

    let bindings = ScriptBindings {
        day: request.day,
        week: request.week,
        set_index: request.set_index.unwrap_or(1),
        weights: request.history.weights,
        reps: request.history.reps,
        completed_reps: request.history.completed_reps,
    };

    let mut ctx = bindings.apply(engine.context());
    for (name, json) in &request.bindings {
        ctx = ctx.with_binding(name.as_str(), json_to_value(name, json)?);
    }
    let state = request
        .state
        .iter()
        .map(|(name, json)| Ok((name.clone(), json_to_value(name, json)?)))
        .collect::<Result<HashMap<_, _>, ScriptError>>()?;
    let ctx = ctx.with_state(state);

    let evaluation = script.evaluate(mode, &ctx)?;
    Ok((evaluation.value, evaluation.state))
}

/// Numbers, booleans, strings, null and `{"value", "unit"}` weights
fn json_to_value(name: &str, json: &JsonValue) -> Result<Value, ScriptError> {
    match json {
        JsonValue::Null => Ok(Value::Undefined),
        JsonValue::Bool(b) => Ok(Value::Bool(*b)),
        JsonValue::Number(n) => n
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| ScriptError::type_error("finite Number", "number")),
        JsonValue::String(s) => Ok(Value::Text(s.clone())),
        JsonValue::Object(_) => serde_json::from_value::<Weight>(json.clone())
            .map(Value::Weight)
            .or_else(|_| serde_json::from_value::<Value>(json.clone()))
            .map_err(|e| ScriptError::type_error("Weight", "object")
                .with_suggestion(format!("Binding '{}': {}", name, e))),
        JsonValue::Array(_) => Err(ScriptError::type_error("scalar binding", "array")
            .with_suggestion(format!("Binding '{}' must be a number, weight or boolean", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(json: JsonValue) -> Request {
        serde_json::from_value(json).unwrap()
    }

    fn engine() -> Engine {
        Engine::default()
    }

    #[test]
    fn test_evaluate_weight_request() {
        let engine = engine();
        let mut cache = ParseCache::new();
        let r = handle_request(&engine, &mut cache, request(json!({
            "id": 1,
            "script": "state.w = w + 10lb\nstate.w",
            "mode": "weight",
            "day": 2,
            "history": {
                "weights": [{"value": 125.0, "unit": "lb"}],
                "reps": [5],
                "completedReps": [5]
            }
        })));
        assert!(r.ok);
        assert_eq!(r.value, Some(Value::Weight(Weight::lb(135.0))));
        assert_eq!(r.state.unwrap().get("w"), Some(&Value::Weight(Weight::lb(135.0))));
    }

    #[test]
    fn test_extra_bindings_and_state() {
        let engine = engine();
        let mut cache = ParseCache::new();
        let r = handle_request(&engine, &mut cache, request(json!({
            "script": "state.count + bonus",
            "bindings": {"bonus": 2},
            "state": {"count": 3}
        })));
        assert!(r.ok);
        assert_eq!(r.value, Some(Value::Number(5.0)));
    }

    #[test]
    fn test_error_response() {
        let engine = engine();
        let mut cache = ParseCache::new();
        let r = handle_request(&engine, &mut cache, request(json!({"id": "a", "script": "1 +"})));
        assert!(!r.ok);
        let err = r.error.unwrap();
        assert!(err.is_syntax());
        assert_eq!(err.position.unwrap().offset, 3);
    }

    #[test]
    fn test_functions_method() {
        let engine = engine();
        let mut cache = ParseCache::new();
        let r = handle_request(&engine, &mut cache, request(json!({"method": "functions", "category": "history"})));
        assert!(r.ok);
        assert_eq!(r.result.unwrap().as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_unknown_method() {
        let engine = engine();
        let mut cache = ParseCache::new();
        let r = handle_request(&engine, &mut cache, request(json!({"method": "shutdown"})));
        assert!(!r.ok);
        assert_eq!(r.error.unwrap().code, liftscript::codes::INVALID_REQUEST);
    }

    #[test]
    fn test_missing_script_is_request_error() {
        let engine = engine();
        let mut cache = ParseCache::new();
        let r = handle_request(&engine, &mut cache, request(json!({"id": 7})));
        let err = r.error.unwrap();
        assert!(err.is_request());
        assert!(!err.is_syntax());
    }

    #[test]
    fn test_json_to_value() {
        assert_eq!(json_to_value("x", &json!(null)).unwrap(), Value::Undefined);
        assert_eq!(json_to_value("x", &json!({"value": 20, "unit": "kg"})).unwrap(), Value::Weight(Weight::kg(20.0)));
        assert!(json_to_value("x", &json!([1, 2])).is_err());
    }
}
