//! Model Registry - 只读模型注册表
//!
//! 启动时从模型清单构建，记录每个模型的默认音色与多语能力，
//! 并驱动引擎逐个预加载模型。加载失败即致命，服务不对外提供部分可用。
//! 构建完成后进程生命周期内只读（经 Arc 共享，无锁）。

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ManifestEntry;

use super::ports::{SynthesisError, SynthesizerPort};

/// 注册表条目
#[derive(Debug, Clone)]
pub struct ModelEntry {
    /// 该模型的默认音色
    pub default_voice: Option<String>,
    /// 是否支持语言参数（按原模型命名约定：名称含 "multi"）
    pub multilingual: bool,
}

/// 模型注册表
pub struct ModelRegistry {
    engine: Arc<dyn SynthesizerPort>,
    entries: HashMap<String, ModelEntry>,
    default_model: Option<String>,
}

impl ModelRegistry {
    /// 从清单条目构建注册表
    ///
    /// 重复的模型名保留首个条目并记录警告
    pub fn build(
        manifest: Vec<ManifestEntry>,
        default_model: Option<String>,
        engine: Arc<dyn SynthesizerPort>,
    ) -> Self {
        let mut entries: HashMap<String, ModelEntry> = HashMap::new();

        for item in manifest {
            if entries.contains_key(&item.model_name) {
                tracing::warn!(
                    model = %item.model_name,
                    "Duplicate model in manifest, keeping first entry"
                );
                continue;
            }
            let multilingual = item.model_name.contains("multi");
            entries.insert(
                item.model_name,
                ModelEntry {
                    default_voice: item.default_voice,
                    multilingual,
                },
            );
        }

        Self {
            engine,
            entries,
            default_model,
        }
    }

    /// 预加载全部已注册模型
    ///
    /// 任意一个失败即返回错误，调用方应中止启动
    pub async fn load_all(&self) -> Result<(), SynthesisError> {
        for name in self.model_names() {
            tracing::info!(model = %name, "Loading TTS model");
            self.engine.load_model(&name).await?;
        }
        tracing::info!(count = self.entries.len(), "All TTS models loaded");
        Ok(())
    }

    pub fn get(&self, model_name: &str) -> Option<&ModelEntry> {
        self.entries.get(model_name)
    }

    pub fn contains(&self, model_name: &str) -> bool {
        self.entries.contains_key(model_name)
    }

    /// 全部模型名（字典序，用于错误提示与 /v1/models）
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// 配置的默认模型（仅当确实已注册时返回）
    pub fn default_model(&self) -> Option<&str> {
        self.default_model
            .as_deref()
            .filter(|name| self.entries.contains_key(*name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn engine(&self) -> Arc<dyn SynthesizerPort> {
        self.engine.clone()
    }
}
