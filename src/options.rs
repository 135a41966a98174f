use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::failure::DEFAULT_INTERNAL_SEGMENTS;
use crate::sink::LogLevel;
use crate::styling::ColorChoice;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct TapReporterOptions {
    /// Suite directories and stack frames are shown relative to this path.
    pub root_path: PathBuf,
    pub log_level: LogLevel,
    /// Write the stream to this file instead of stdout/stderr.
    pub file_path: Option<PathBuf>,
    pub color: ColorChoice,
    /// Leading path segments marking dependency or runtime stack frames.
    pub internal_segments: Vec<String>,
}

impl Default for TapReporterOptions {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            log_level: LogLevel::Info,
            file_path: None,
            color: ColorChoice::Auto,
            internal_segments: DEFAULT_INTERNAL_SEGMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TapReporterOptions {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Invalid reporter options")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).with_context(|| format!("Couldn't read options file {path:?}"))?;

        Self::from_json(&json)
    }

    /// The root as an absolute path, resolved against the current directory when needed.
    pub fn absolute_root(&self) -> anyhow::Result<PathBuf> {
        if self.root_path.is_absolute() {
            return Ok(self.root_path.clone());
        }

        let cwd = std::env::current_dir().context("Couldn't get current directory")?;
        Ok(cwd.join(&self.root_path))
    }

    /// Files get plain text unless color was explicitly requested.
    pub fn effective_color(&self) -> ColorChoice {
        match (self.file_path.is_some(), self.color) {
            (true, ColorChoice::Auto) => ColorChoice::Never,
            (_, choice) => choice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let options = TapReporterOptions::from_json(r#"{"logLevel": "ERROR"}"#).unwrap();

        assert_eq!(options.log_level, LogLevel::Error);
        assert_eq!(options.internal_segments, vec!["node_modules", "internal"]);
        assert_eq!(options.color, ColorChoice::Auto);
    }

    #[test]
    fn custom_internals_and_color() {
        let options =
            TapReporterOptions::from_json(r#"{"internalSegments": ["vendor"], "color": "never", "rootPath": "/srv"}"#)
                .unwrap();

        assert_eq!(options.internal_segments, vec!["vendor"]);
        assert_eq!(options.effective_color(), ColorChoice::Never);
        #[cfg(unix)]
        assert_eq!(options.absolute_root().unwrap(), PathBuf::from("/srv"));
    }

    #[test]
    fn file_output_defaults_to_plain() {
        let options = TapReporterOptions {
            file_path: Some(PathBuf::from("report.tap")),
            ..Default::default()
        };
        assert_eq!(options.effective_color(), ColorChoice::Never);

        let forced = TapReporterOptions {
            color: ColorChoice::Always,
            ..options
        };
        assert_eq!(forced.effective_color(), ColorChoice::Always);
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(TapReporterOptions::from_json(r#"{"logLevel": "LOUD"}"#).is_err());
    }
}
