//! Failures when reading `scene_fx.json` or a scene snapshot file.

use std::fmt;

/// Returned by config loading and snapshot file I/O. Systems that run every
/// frame log and recover instead of returning this.
#[derive(Debug)]
pub enum SceneFxError {
    /// The config or snapshot file could not be read or written.
    Io(std::io::Error),
    /// Config file is not valid JSON, or holds out-of-range values.
    Config(String),
    /// Snapshot bytes could not be decoded.
    Decode(String),
    /// Snapshot was written by a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
}

impl fmt::Display for SceneFxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneFxError::Io(e) => write!(f, "scene file I/O failed: {e}"),
            SceneFxError::Config(msg) => write!(f, "Invalid config: {msg}"),
            SceneFxError::Decode(msg) => write!(f, "Snapshot is corrupt: {msg}"),
            SceneFxError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: snapshot is v{found}, but this build only supports up to v{expected_max}"
            ),
        }
    }
}

impl std::error::Error for SceneFxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneFxError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SceneFxError {
    fn from(e: std::io::Error) -> Self {
        SceneFxError::Io(e)
    }
}

impl From<bitcode::Error> for SceneFxError {
    fn from(e: bitcode::Error) -> Self {
        SceneFxError::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for SceneFxError {
    fn from(e: serde_json::Error) -> Self {
        SceneFxError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_io() {
        let err = SceneFxError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("I/O failed"), "got: {msg}");
        assert!(msg.contains("file not found"), "got: {msg}");
    }

    #[test]
    fn test_display_version_mismatch() {
        let err = SceneFxError::VersionMismatch {
            expected_max: 1,
            found: 7,
        };
        let msg = format!("{err}");
        assert!(msg.contains("v7"), "got: {msg}");
        assert!(msg.contains("v1"), "got: {msg}");
    }

    #[test]
    fn test_from_json_error_is_config() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: SceneFxError = json_err.into();
        assert!(matches!(err, SceneFxError::Config(_)));
    }

    #[test]
    fn test_io_has_source() {
        use std::error::Error;
        let err: SceneFxError = std::io::Error::other("boom").into();
        assert!(err.source().is_some());
    }
}
