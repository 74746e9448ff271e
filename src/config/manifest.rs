//! Model Manifest - 模型清单加载
//!
//! 清单是一个 JSON 数组，每项 `{"model_name": ..., "default_voice": ...}`。
//! 启动时读取一次；文件缺失、JSON 不合法、非数组、空数组均为致命错误，
//! 服务拒绝启动（不提供部分可用）。

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// 清单加载错误
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error(
        "TTS models manifest '{0}' not found. \
         Create it with a JSON array of {{model_name, default_voice}} entries"
    )]
    NotFound(String),

    #[error("Failed to read TTS models manifest '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse TTS models manifest '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("TTS models manifest '{path}' is invalid: {message}")]
    InvalidFormat { path: String, message: String },
}

/// 清单条目
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    /// 模型名称
    pub model_name: String,
    /// 该模型的默认音色
    #[serde(default)]
    pub default_voice: Option<String>,
}

/// 加载模型清单
pub fn load_manifest(path: &Path) -> Result<Vec<ManifestEntry>, ManifestError> {
    let display = path.display().to_string();

    if !path.exists() {
        return Err(ManifestError::NotFound(display));
    }

    let raw = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
        path: display.clone(),
        message: e.to_string(),
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| ManifestError::Parse {
            path: display.clone(),
            message: e.to_string(),
        })?;

    if !value.is_array() {
        return Err(ManifestError::InvalidFormat {
            path: display,
            message: "expected a JSON array of model entries".to_string(),
        });
    }

    let entries: Vec<ManifestEntry> =
        serde_json::from_value(value).map_err(|e| ManifestError::Parse {
            path: display.clone(),
            message: e.to_string(),
        })?;

    if entries.is_empty() {
        return Err(ManifestError::InvalidFormat {
            path: display,
            message: "model list is empty".to_string(),
        });
    }

    if entries.iter().any(|e| e.model_name.trim().is_empty()) {
        return Err(ManifestError::InvalidFormat {
            path: display,
            message: "entry with empty model_name".to_string(),
        });
    }

    Ok(entries)
}

/// 追加配置的默认模型
///
/// 若设置了默认模型且不在清单内，以配置的默认音色追加注册一个条目
/// （清单之外经环境配置引入的模型）
pub fn apply_default_model(
    entries: &mut Vec<ManifestEntry>,
    default_model: Option<&str>,
    default_voice: &str,
) {
    if let Some(name) = default_model {
        if !entries.iter().any(|e| e.model_name == name) {
            tracing::info!(model = %name, "Registering configured default model");
            entries.push(ManifestEntry {
                model_name: name.to_string(),
                default_voice: Some(default_voice.to_string()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_manifest() {
        let file = write_manifest(
            r#"[
                {"model_name": "tts_models/multilingual/multi-dataset/xtts_v2", "default_voice": "Craig Gutsy"},
                {"model_name": "tts_models/en/ljspeech/vits"}
            ]"#,
        );
        let entries = load_manifest(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].default_voice.as_deref(), Some("Craig Gutsy"));
        assert_eq!(entries[1].default_voice, None);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_manifest(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let file = write_manifest("{ not json");
        let err = load_manifest(file.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_non_array_is_fatal() {
        let file = write_manifest(r#"{"model_name": "x"}"#);
        let err = load_manifest(file.path()).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidFormat { .. }));
    }

    #[test]
    fn test_empty_array_is_fatal() {
        let file = write_manifest("[]");
        let err = load_manifest(file.path()).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidFormat { .. }));
    }

    #[test]
    fn test_empty_model_name_is_fatal() {
        let file = write_manifest(r#"[{"model_name": ""}]"#);
        let err = load_manifest(file.path()).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidFormat { .. }));
    }

    #[test]
    fn test_apply_default_model_appends_when_absent() {
        let mut entries = vec![ManifestEntry {
            model_name: "a".to_string(),
            default_voice: None,
        }];
        apply_default_model(&mut entries, Some("b"), "Craig Gutsy");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].model_name, "b");
        assert_eq!(entries[1].default_voice.as_deref(), Some("Craig Gutsy"));
    }

    #[test]
    fn test_apply_default_model_noop_when_present() {
        let mut entries = vec![ManifestEntry {
            model_name: "a".to_string(),
            default_voice: Some("alice".to_string()),
        }];
        apply_default_model(&mut entries, Some("a"), "Craig Gutsy");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].default_voice.as_deref(), Some("alice"));
    }
}
