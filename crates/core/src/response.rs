//! Response shaping for tool results
//!
//! Every list-style tool funnels its upstream payload through
//! [`OutputFormatter::format_response`], which picks the serialization
//! ([`ResponseFormat`]) and the delivery ([`ResponseMode`]). Inline responses
//! carry the serialized text directly. File responses persist the text under
//! the formatter's root directory and return a four-line summary instead, so
//! large result sets do not flood the caller's context window.
//!
//! The root directory is injected at construction, which keeps tests isolated
//! in a per-test temporary directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::toon;

/// Default root for persisted responses.
pub const DEFAULT_TMP_DIR: &str = "/tmp/lunchmoney-mcp";

/// Summary line used when the caller does not provide one.
pub const DEFAULT_SUMMARY: &str = "Data written to file";

/// Serialization used for the response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Toon,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Toon => "toon",
        }
    }

    /// File extension for persisted payloads.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery of the response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    #[default]
    Inline,
    File,
}

/// Per-call options for [`OutputFormatter::format_response`].
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Tool identifier, used as the persisted file name prefix.
    pub tool_name: String,
    /// First line of the file-mode response.
    pub summary: Option<String>,
}

impl FormatOptions {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// Error type for response formatting
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("Failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Serialize `data` with the codec selected by `format`.
///
/// `json` produces compact JSON; `toon` produces TOON text. No side effects.
pub fn serialize<T>(data: &T, format: ResponseFormat) -> Result<String, ResponseError>
where
    T: Serialize + ?Sized,
{
    match format {
        ResponseFormat::Json => Ok(serde_json::to_string(data)?),
        ResponseFormat::Toon => Ok(toon::encode(&serde_json::to_value(data)?)),
    }
}

/// Render a byte count as kilobytes with one decimal place.
pub fn format_size_kb(bytes: usize) -> String {
    // Ties round up, so 256 bytes reads as 0.3 rather than 0.2.
    format!("{:.1}", (bytes as f64 * 10.0 / 1024.0).round() / 10.0)
}

/// Shapes tool payloads and persists file-mode responses under a root directory.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    root: PathBuf,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TMP_DIR)
    }
}

impl OutputFormatter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file written for `tool_name` at `epoch_millis`.
    pub fn file_path(&self, tool_name: &str, format: ResponseFormat, epoch_millis: i64) -> PathBuf {
        let path = self
            .root
            .join(format!("{tool_name}-{epoch_millis}.{}", format.extension()));
        std::path::absolute(&path).unwrap_or(path)
    }

    /// Produce the text content of a tool response.
    ///
    /// # Arguments
    /// * `data` - Any JSON-representable value
    /// * `format` - Serialization codec
    /// * `mode` - `Inline` returns the serialized text, `File` persists it
    /// * `options` - Tool name (file prefix) and optional summary line
    ///
    /// # Returns
    /// The serialized payload, or for file mode the lines
    /// `{summary}`, `File: {path}`, `Format: {format}` and `Size: {kb} KB`.
    pub fn format_response<T>(
        &self,
        data: &T,
        format: ResponseFormat,
        mode: ResponseMode,
        options: &FormatOptions,
    ) -> Result<String, ResponseError>
    where
        T: Serialize + ?Sized,
    {
        let text = serialize(data, format)?;

        match mode {
            ResponseMode::Inline => Ok(text),
            ResponseMode::File => {
                self.write_file(&text, format, options, chrono::Utc::now().timestamp_millis())
            }
        }
    }

    fn write_file(
        &self,
        text: &str,
        format: ResponseFormat,
        options: &FormatOptions,
        epoch_millis: i64,
    ) -> Result<String, ResponseError> {
        fs::create_dir_all(&self.root).map_err(|source| ResponseError::CreateDir {
            path: self.root.clone(),
            source,
        })?;

        let path = self.file_path(&options.tool_name, format, epoch_millis);
        fs::write(&path, text).map_err(|source| ResponseError::Write {
            path: path.clone(),
            source,
        })?;

        let summary = options.summary.as_deref().unwrap_or(DEFAULT_SUMMARY);

        Ok(format!(
            "{summary}\nFile: {}\nFormat: {format}\nSize: {} KB",
            path.display(),
            format_size_kb(text.len())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn file_line(text: &str) -> PathBuf {
        let line = text
            .lines()
            .find_map(|line| line.strip_prefix("File: "))
            .expect("response should name the file");
        PathBuf::from(line)
    }

    #[test]
    fn test_default_format_and_mode() {
        assert_eq!(ResponseFormat::default(), ResponseFormat::Json);
        assert_eq!(ResponseMode::default(), ResponseMode::Inline);
    }

    #[test]
    fn test_format_and_mode_deserialize_lowercase() {
        let format: ResponseFormat = serde_json::from_value(json!("toon")).unwrap();
        let mode: ResponseMode = serde_json::from_value(json!("file")).unwrap();
        assert_eq!(format, ResponseFormat::Toon);
        assert_eq!(mode, ResponseMode::File);

        assert!(serde_json::from_value::<ResponseFormat>(json!("yaml")).is_err());
        assert!(serde_json::from_value::<ResponseMode>(json!("stream")).is_err());
    }

    #[test]
    fn test_inline_json_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let formatter = OutputFormatter::new(temp_dir.path());
        let data = json!({
            "transactions": [{"id": 1, "payee": "Café", "amount": "4.50"}],
            "has_more": false,
            "note": null
        });

        let text = formatter
            .format_response(
                &data,
                ResponseFormat::Json,
                ResponseMode::Inline,
                &FormatOptions::new("transactions"),
            )
            .unwrap();

        let decoded: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, data);
        assert!(!text.contains('\n'), "inline json should be compact");
    }

    #[test]
    fn test_inline_does_not_touch_filesystem() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("never-created");
        let formatter = OutputFormatter::new(&root);

        formatter
            .format_response(
                &json!([1, 2, 3]),
                ResponseFormat::Toon,
                ResponseMode::Inline,
                &FormatOptions::new("tags"),
            )
            .unwrap();

        assert!(!root.exists());
    }

    #[test]
    fn test_inline_toon_uses_codec() {
        let formatter = OutputFormatter::default();
        let data = json!([{"id": 1, "name": "travel"}, {"id": 2, "name": "food"}]);

        let text = formatter
            .format_response(
                &data,
                ResponseFormat::Toon,
                ResponseMode::Inline,
                &FormatOptions::new("tags"),
            )
            .unwrap();

        assert_eq!(text, toon::encode(&data));
        assert_eq!(text, "[2]{id,name}:\n  1,travel\n  2,food");
    }

    #[test]
    fn test_file_mode_writes_payload_and_summary() {
        let temp_dir = TempDir::new().unwrap();
        let formatter = OutputFormatter::new(temp_dir.path());
        let data = json!([{"id": 1}, {"id": 2}]);
        let options = FormatOptions::new("assets").with_summary("2 assets");

        let text = formatter
            .format_response(&data, ResponseFormat::Json, ResponseMode::File, &options)
            .unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "2 assets");
        assert!(lines[1].starts_with("File: "));
        assert_eq!(lines[2], "Format: json");
        assert!(lines[3].starts_with("Size: ") && lines[3].ends_with(" KB"));

        let path = file_line(&text);
        assert!(path.starts_with(temp_dir.path()));
        let file_name = path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.starts_with("assets-"));
        assert!(file_name.ends_with(".json"));

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, serde_json::to_string(&data).unwrap());
    }

    #[test]
    fn test_file_mode_toon_extension_and_contents() {
        let temp_dir = TempDir::new().unwrap();
        let formatter = OutputFormatter::new(temp_dir.path());
        let data = json!({"ids": [1, 2, 3]});

        let text = formatter
            .format_response(
                &data,
                ResponseFormat::Toon,
                ResponseMode::File,
                &FormatOptions::new("tags"),
            )
            .unwrap();

        assert!(text.contains("Format: toon"));
        let path = file_line(&text);
        assert_eq!(path.extension().unwrap(), "toon");
        assert_eq!(fs::read_to_string(&path).unwrap(), "ids[3]: 1,2,3");
    }

    #[test]
    fn test_file_mode_default_summary() {
        let temp_dir = TempDir::new().unwrap();
        let formatter = OutputFormatter::new(temp_dir.path());

        let text = formatter
            .format_response(
                &json!({}),
                ResponseFormat::Json,
                ResponseMode::File,
                &FormatOptions::new("crypto"),
            )
            .unwrap();

        assert!(text.starts_with("Data written to file\n"));
    }

    #[test]
    fn test_file_mode_creates_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested").join("output");
        let formatter = OutputFormatter::new(&root);

        let text = formatter
            .format_response(
                &json!([]),
                ResponseFormat::Json,
                ResponseMode::File,
                &FormatOptions::new("budgets"),
            )
            .unwrap();

        assert!(root.is_dir());
        assert!(file_line(&text).exists());
    }

    #[test]
    fn test_write_file_overwrites_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let formatter = OutputFormatter::new(temp_dir.path());
        let options = FormatOptions::new("tags");

        formatter
            .write_file("a much longer first payload", ResponseFormat::Json, &options, 42)
            .unwrap();
        let text = formatter
            .write_file("[]", ResponseFormat::Json, &options, 42)
            .unwrap();

        let path = file_line(&text);
        assert_eq!(path.file_name().unwrap(), "tags-42.json");
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_size_counts_utf8_bytes() {
        // 1024 two-byte characters are 2048 bytes, i.e. 2.0 KB.
        let text = "é".repeat(1024);
        assert_eq!(text.chars().count(), 1024);
        assert_eq!(format_size_kb(text.len()), "2.0");

        let temp_dir = TempDir::new().unwrap();
        let formatter = OutputFormatter::new(temp_dir.path());
        let response = formatter
            .write_file(&text, ResponseFormat::Toon, &FormatOptions::new("notes"), 1)
            .unwrap();
        assert!(response.ends_with("Size: 2.0 KB"));
    }

    #[test]
    fn test_format_size_kb_rounding() {
        assert_eq!(format_size_kb(0), "0.0");
        assert_eq!(format_size_kb(100), "0.1");
        assert_eq!(format_size_kb(1536), "1.5");
        assert_eq!(format_size_kb(256), "0.3");
        assert_eq!(format_size_kb(1280), "1.3");
        assert_eq!(format_size_kb(10 * 1024 * 1024), "10240.0");
    }

    #[test]
    fn test_unwritable_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("occupied");
        fs::write(&blocker, "not a directory").unwrap();
        let formatter = OutputFormatter::new(&blocker);

        let result = formatter.format_response(
            &json!([1]),
            ResponseFormat::Json,
            ResponseMode::File,
            &FormatOptions::new("tags"),
        );

        assert!(matches!(result, Err(ResponseError::CreateDir { .. })));
    }
}
