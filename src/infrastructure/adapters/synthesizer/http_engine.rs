//! HTTP Engine Client - 调用外部合成引擎服务
//!
//! 实现 SynthesizerPort trait，通过 HTTP 调用外部合成引擎。
//!
//! 引擎 API:
//! - POST {base_url}/api/models/load   Request: {"model_name": "..."}  (JSON)
//! - POST {base_url}/api/synthesize    Request: 见 EngineSynthesisBody
//!   Response: audio/wav binary, metadata in headers

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{
    SynthesisError, SynthesisOutput, SynthesisRequest, SynthesizerPort,
};

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct EngineSynthesisBody<'a> {
    model_name: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker_wav: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker_name: Option<&'a str>,
}

/// 模型加载请求体 (JSON)
#[derive(Debug, Serialize)]
struct EngineLoadBody<'a> {
    model_name: &'a str,
}

/// HTTP 引擎客户端配置
#[derive(Debug, Clone)]
pub struct HttpEngineConfig {
    /// 引擎服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpEngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpEngineConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 引擎客户端
pub struct HttpEngineClient {
    client: Client,
    config: HttpEngineConfig,
}

impl HttpEngineClient {
    /// 创建新的引擎客户端
    pub fn new(config: HttpEngineConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn synthesize_url(&self) -> String {
        format!("{}/api/synthesize", self.config.base_url)
    }

    fn load_url(&self) -> String {
        format!("{}/api/models/load", self.config.base_url)
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url)
    }

    fn map_send_error(e: reqwest::Error) -> SynthesisError {
        if e.is_timeout() {
            SynthesisError::Timeout
        } else if e.is_connect() {
            SynthesisError::NetworkError(format!("Cannot connect to synthesis engine: {}", e))
        } else {
            SynthesisError::NetworkError(e.to_string())
        }
    }
}

#[async_trait]
impl SynthesizerPort for HttpEngineClient {
    async fn load_model(&self, model_name: &str) -> Result<(), SynthesisError> {
        let response = self
            .client
            .post(self.load_url())
            .json(&EngineLoadBody { model_name })
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::ModelLoad {
                model: model_name.to_string(),
                message: format!("HTTP {}: {}", status, error_text),
            });
        }

        tracing::info!(model = %model_name, "Engine reported model ready");
        Ok(())
    }

    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisOutput, SynthesisError> {
        request.validate_speaker()?;

        let speaker_wav = request
            .speaker_wav
            .as_deref()
            .map(|p| p.to_string_lossy().into_owned());
        let body = EngineSynthesisBody {
            model_name: &request.model_name,
            text: &request.text,
            language: request.language.as_deref(),
            speaker_wav: speaker_wav.as_deref(),
            speaker_name: request.speaker_name.as_deref(),
        };

        tracing::debug!(
            url = %self.synthesize_url(),
            model = %body.model_name,
            text_len = body.text.len(),
            language = ?body.language,
            speaker_wav = ?body.speaker_wav,
            speaker_name = ?body.speaker_name,
            "Sending synthesis request"
        );

        let response = self
            .client
            .post(self.synthesize_url())
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::EngineError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        // 从 headers 提取元数据
        let headers = response.headers();
        let duration_ms = headers
            .get("X-Engine-Duration-Ms")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let sample_rate = headers
            .get("X-Engine-Sample-Rate")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("Failed to read audio: {}", e)))?;

        tokio::fs::write(&request.output_path, &audio_data)
            .await
            .map_err(|e| {
                SynthesisError::EngineError(format!(
                    "Failed to write waveform '{}': {}",
                    request.output_path.display(),
                    e
                ))
            })?;

        tracing::info!(
            duration_ms = ?duration_ms,
            sample_rate = ?sample_rate,
            audio_size = audio_data.len(),
            output = %request.output_path.display(),
            "Synthesis completed"
        );

        Ok(SynthesisOutput {
            output_path: request.output_path,
            duration_ms,
            sample_rate,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
