use std::path::PathBuf;

use crate::KyoError;

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf, KyoError> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir().ok_or_else(|| KyoError::File {
                path: path.to_string(),
                message: "Could not determine home directory for ~ expansion".into(),
            })?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paths_are_untouched() {
        assert_eq!(expand_home("conf/app.kyo").unwrap(), PathBuf::from("conf/app.kyo"));
        assert_eq!(expand_home("/etc/app.kyo").unwrap(), PathBuf::from("/etc/app.kyo"));
    }

    #[test]
    fn test_home_is_expanded() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/app.kyo").unwrap(), home.join("app.kyo"));
        }
    }
}
