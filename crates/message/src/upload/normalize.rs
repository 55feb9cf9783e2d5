use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::ValidationError;

use super::{UploadedFile, UploadedFileTree, UploadedFiles};

const SPEC_FIELDS: [&str; 5] = ["tmp_name", "size", "error", "name", "type"];

/// Normalizes a raw upload specification into an [`UploadedFiles`] tree.
///
/// The raw form is what a CGI style server hands over: a map from field name
/// to either a spec object (`tmp_name`, `size`, `error`, `name`, `type`), a
/// spec object whose members are themselves arrays or maps (for fields named
/// like `docs[]`), or a further nesting of field names. `null` means no uploads.
///
/// ```
/// use micro_message::upload::normalize_files;
/// use serde_json::json;
///
/// let files = normalize_files(&json!({
///     "avatar": { "tmp_name": "/tmp/php1", "size": 10, "error": 0, "name": "me.png", "type": "image/png" },
///     "docs": {
///         "tmp_name": ["/tmp/php2", "/tmp/php3"],
///         "size": [1, 2],
///         "error": [0, 4],
///         "name": ["a.txt", ""],
///         "type": ["text/plain", ""],
///     },
/// }))
/// .unwrap();
///
/// assert_eq!(files["avatar"].as_file().unwrap().client_filename(), Some("me.png"));
/// assert_eq!(files["docs"].get(&["1"]).unwrap().as_file().unwrap().size(), 2);
/// ```
///
/// # Errors
///
/// Returns [`ValidationError`] for a value that is neither a spec nor a
/// nesting, a spec without `tmp_name` or `error`, or an unknown error code.
pub fn normalize_files(raw: &Value) -> Result<UploadedFiles, ValidationError> {
    match raw {
        Value::Null => Ok(UploadedFiles::new()),
        Value::Object(fields) => fields.iter().map(|(key, value)| Ok((key.clone(), normalize_entry(value)?))).collect(),
        other => Err(ValidationError::invalid_file_spec(format!("expected an object, got {other}"))),
    }
}

fn normalize_entry(value: &Value) -> Result<UploadedFileTree, ValidationError> {
    match value {
        Value::Object(map) if map.contains_key("tmp_name") => from_spec(map),
        Value::Object(_) => normalize_files(value).map(UploadedFileTree::Nested),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| Ok((i.to_string(), normalize_entry(item)?)))
            .collect::<Result<_, _>>()
            .map(UploadedFileTree::Nested),
        other => Err(ValidationError::invalid_file_spec(format!("invalid value in files specification: {other}"))),
    }
}

fn from_spec(spec: &Map<String, Value>) -> Result<UploadedFileTree, ValidationError> {
    let tmp_name = &spec["tmp_name"];

    if let Some(keys) = child_keys(tmp_name) {
        // every field of the spec is indexed the same way as tmp_name
        return keys
            .into_iter()
            .map(|key| {
                let nested: Map<String, Value> = SPEC_FIELDS
                    .iter()
                    .filter_map(|field| Some(((*field).to_string(), child(spec.get(*field)?, &key)?.clone())))
                    .collect();
                Ok((key, from_spec(&nested)?))
            })
            .collect::<Result<_, _>>()
            .map(UploadedFileTree::Nested);
    }

    let tmp_name = tmp_name.as_str().ok_or_else(|| ValidationError::invalid_file_spec("tmp_name must be a string"))?;
    let error = spec
        .get("error")
        .and_then(as_i64)
        .ok_or_else(|| ValidationError::invalid_file_spec("error must be an integer"))?;
    let size = spec.get("size").and_then(as_i64).and_then(|size| u64::try_from(size).ok()).unwrap_or(0);

    let file = UploadedFile::from_raw_code(
        PathBuf::from(tmp_name),
        size,
        error,
        spec.get("name").and_then(Value::as_str).map(str::to_string),
        spec.get("type").and_then(Value::as_str).map(str::to_string),
    )?;

    Ok(file.into())
}

/// Keys of an array (`"0"`, `"1"`, ...) or object value; `None` for scalars.
fn child_keys(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some((0..items.len()).map(|i| i.to_string()).collect()),
        Value::Object(map) => Some(map.keys().cloned().collect()),
        _ => None,
    }
}

fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Array(items) => items.get(key.parse::<usize>().ok()?),
        Value::Object(map) => map.get(key),
        _ => None,
    }
}

/// Integers may arrive as numbers or as numeric strings.
fn as_i64(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_str()?.trim().parse().ok())
}
