use std::path::PathBuf;

/// Environment override for the data directory (tests, portable installs).
pub const HOME_ENV: &str = "MATH_MENTOR_HOME";

/// Retourne le repertoire de donnees cross-platform.
/// `$MATH_MENTOR_HOME` if set, otherwise:
/// Linux: ~/.config/math-mentor/
/// macOS: ~/Library/Application Support/math-mentor/
/// Windows: %APPDATA%/math-mentor/
pub fn data_dir() -> PathBuf {
    if let Ok(home) = std::env::var(HOME_ENV) {
        if !home.trim().is_empty() {
            return PathBuf::from(expand_tilde(&home));
        }
    }
    let base = dirs::config_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    });
    base.join("math-mentor")
}

/// {data_dir}/config.json
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// {data_dir}/mentor.db: corpus + attempt log
pub fn db_path() -> PathBuf {
    data_dir().join("mentor.db")
}

/// {data_dir}/mentor.log
pub fn log_path() -> PathBuf {
    data_dir().join("mentor.log")
}

/// Expand ~ to home directory in paths.
pub fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") || path == "~" {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_data_dir() {
        let dir = data_dir();
        assert!(config_path().starts_with(&dir));
        assert!(db_path().starts_with(&dir));
        assert!(log_path().starts_with(&dir));
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/lib/mentor"), "/var/lib/mentor");
    }
}
