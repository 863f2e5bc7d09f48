// Author: Dustin Pilgrim
// License: MIT

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{CompileOptions, KyoError, Value};

/// Convert a compiled document to a `serde_json::Value`.
///
/// Whole numbers become JSON integers, everything else maps one to one.
pub fn to_json(value: &Value) -> Result<serde_json::Value, KyoError> {
    serde_json::to_value(value).map_err(|e| KyoError::Type {
        message: format!("Failed to convert document to JSON: {}", e),
        hint: None,
    })
}

/// Pretty-printed JSON text of a compiled document.
pub fn to_json_string(value: &Value) -> Result<String, KyoError> {
    serde_json::to_string_pretty(value).map_err(|e| KyoError::Type {
        message: format!("Failed to serialize document: {}", e),
        hint: None,
    })
}

/// Deserialize a compiled document into any `serde` type.
///
/// # Examples
/// ```
/// #[derive(serde::Deserialize)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// let doc = kyoml::compile("host = 'localhost'\nport = 8080", kyoml::CompileOptions::default()).unwrap();
/// let server: Server = kyoml::export::deserialize(&doc).unwrap();
/// assert_eq!(server.port, 8080);
/// ```
pub fn deserialize<T: DeserializeOwned>(value: &Value) -> Result<T, KyoError> {
    serde_json::from_value(to_json(value)?).map_err(|e| KyoError::Type {
        message: format!("Document does not match the target type: {}", e),
        hint: Some("Check key names and value types against the struct".into()),
    })
}

/// Compile a KyoML file and export it as pretty JSON.
///
/// # Errors
/// Returns error if the file can't be read, contains invalid KyoML, or a directive fails.
pub fn export_file<P: AsRef<Path>>(path: P, options: CompileOptions) -> Result<String, KyoError> {
    let doc = crate::compile_file(path, options)?;
    to_json_string(&doc)
}
