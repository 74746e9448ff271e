//! Fake Engine - 用于测试的合成引擎
//!
//! 不调用外部服务，按配置生成一段正弦波 WAV 写入目标路径

use async_trait::async_trait;

use crate::application::ports::{
    SynthesisError, SynthesisOutput, SynthesisRequest, SynthesizerPort,
};

/// Fake Engine 配置
#[derive(Debug, Clone)]
pub struct FakeEngineConfig {
    /// 生成音频的时长（毫秒）
    pub duration_ms: u64,
    /// 采样率
    pub sample_rate: u32,
    /// 正弦波频率（Hz）
    pub frequency: f32,
}

impl Default for FakeEngineConfig {
    fn default() -> Self {
        Self {
            duration_ms: 500,
            sample_rate: 24000,
            frequency: 440.0,
        }
    }
}

/// Fake Engine
///
/// 测试用：始终成功，输出固定参数的正弦波
pub struct FakeEngine {
    config: FakeEngineConfig,
}

impl FakeEngine {
    pub fn new(config: FakeEngineConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeEngineConfig::default())
    }

    /// 生成 16-bit PCM 单声道正弦波 WAV
    pub fn generate_wav(&self) -> Vec<u8> {
        let sample_rate = self.config.sample_rate;
        let num_samples = (sample_rate as u64 * self.config.duration_ms / 1000) as usize;
        let data_size = num_samples * 2;
        let file_size = 36 + data_size;

        let mut wav = Vec::with_capacity(44 + data_size);

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(file_size as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk: PCM, mono, 16-bit
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());

        let step = 2.0 * std::f32::consts::PI * self.config.frequency / sample_rate as f32;
        for i in 0..num_samples {
            let sample = ((i as f32 * step).sin() * 0.3 * 32767.0) as i16;
            wav.extend_from_slice(&sample.to_le_bytes());
        }

        wav
    }
}

#[async_trait]
impl SynthesizerPort for FakeEngine {
    async fn load_model(&self, model_name: &str) -> Result<(), SynthesisError> {
        tracing::debug!(model = %model_name, "FakeEngine: model ready");
        Ok(())
    }

    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisOutput, SynthesisError> {
        request.validate_speaker()?;

        tracing::debug!(
            model = %request.model_name,
            text_len = request.text.len(),
            speaker_wav = ?request.speaker_wav,
            speaker_name = ?request.speaker_name,
            "FakeEngine: writing generated audio"
        );

        let wav = self.generate_wav();
        tokio::fs::write(&request.output_path, &wav)
            .await
            .map_err(|e| SynthesisError::EngineError(e.to_string()))?;

        Ok(SynthesisOutput {
            output_path: request.output_path,
            duration_ms: Some(self.config.duration_ms),
            sample_rate: Some(self.config.sample_rate),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_generated_wav_has_valid_header() {
        let engine = FakeEngine::with_defaults();
        let wav = engine.generate_wav();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // 500ms @ 24kHz mono 16-bit
        assert_eq!(wav.len(), 44 + 24000 / 2 * 2);
    }

    #[tokio::test]
    async fn test_synthesize_writes_output_file() {
        let tmp = tempfile::tempdir().unwrap();
        let output_path = tmp.path().join("out.wav");
        let engine = FakeEngine::with_defaults();

        let result = engine
            .synthesize(SynthesisRequest {
                model_name: "fake".to_string(),
                text: "Hello".to_string(),
                language: None,
                speaker_wav: None,
                speaker_name: Some("alice".to_string()),
                output_path: output_path.clone(),
            })
            .await
            .unwrap();

        assert_eq!(result.output_path, output_path);
        assert!(output_path.is_file());
    }

    #[tokio::test]
    async fn test_synthesize_rejects_missing_speaker() {
        let engine = FakeEngine::with_defaults();
        let err = engine
            .synthesize(SynthesisRequest {
                model_name: "fake".to_string(),
                text: "Hello".to_string(),
                language: None,
                speaker_wav: None,
                speaker_name: None,
                output_path: PathBuf::from("unused.wav"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidInput(_)));
    }
}
