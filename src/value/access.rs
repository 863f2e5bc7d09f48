use super::*;
use crate::KyoError;

impl Value {
    /// Get a typed value using dot notation.
    ///
    /// # Examples
    /// ```
    /// # fn main() -> Result<(), kyoml::KyoError> {
    /// let doc = kyoml::compile("server {\n  port = 8080\n}", kyoml::CompileOptions::default())?;
    /// let port: u16 = doc.get_as("server.port")?;
    /// assert_eq!(port, 8080);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// `MissingPath` if nothing lives at `path`, `Type` if the value does not convert.
    pub fn get_as<T>(&self, path: &str) -> Result<T, KyoError>
    where
        T: TryFrom<Value, Error = KyoError>,
    {
        let value = self.get_value(path)?;
        T::try_from(value.clone()).map_err(|e| match e {
            KyoError::Type { message, hint } => KyoError::Type {
                message: format!("{} at '{}'", message, path),
                hint,
            },
            other => other,
        })
    }

    /// Like [`Value::get_as`], but a missing path is `Ok(None)`.
    pub fn get_optional<T>(&self, path: &str) -> Result<Option<T>, KyoError>
    where
        T: TryFrom<Value, Error = KyoError>,
    {
        match self.get_as(path) {
            Ok(value) => Ok(Some(value)),
            Err(KyoError::MissingPath { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get a value with a fallback default.
    pub fn get_or<T>(&self, path: &str, default: T) -> T
    where
        T: TryFrom<Value, Error = KyoError>,
    {
        self.get_as(path).unwrap_or(default)
    }

    pub fn get_value(&self, path: &str) -> Result<&Value, KyoError> {
        self.lookup(path).ok_or_else(|| KyoError::MissingPath {
            path: path.to_string(),
        })
    }

    /// Keys of the object at `path`, in document order.
    pub fn get_keys(&self, path: &str) -> Result<Vec<String>, KyoError> {
        match self.get_value(path)? {
            Value::Object(map) => Ok(map.keys().cloned().collect()),
            other => Err(KyoError::Type {
                message: format!("Path '{}' is a {}, not an object", path, other.type_name()),
                hint: Some("Only blocks and maps have keys".into()),
            }),
        }
    }

    pub fn has(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }
}
