//! Speech Handler - 合成请求编排
//!
//! 单请求生命周期：规范化 → 音色解析 → 引擎合成（落盘临时 WAV）→
//! 读取 → 转码 → 返回字节。临时波形文件用随机 UUID 命名以协调并发
//! 请求共享 scratch 目录；RAII 守卫保证任何退出路径（包括合成后
//! 读取失败、转码失败）都会删除临时文件。

use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use super::error::ApplicationError;
use super::normalizer::RequestNormalizer;
use super::ports::{
    AudioFormat, SynthesisRequest, SynthesizerPort, TranscodeConfig, TranscoderPort,
};
use super::resolver::SpeakerResolver;

/// 原始合成命令（HTTP 层从请求体直接映射，未经校验）
#[derive(Debug, Clone, Default)]
pub struct SpeechCommand {
    pub model: Option<String>,
    pub input: Option<String>,
    pub voice: Option<String>,
    pub language: Option<String>,
    pub instructions: Option<String>,
    pub response_format: Option<String>,
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SpeechOutput {
    /// 转码后的音频字节
    pub audio_data: Vec<u8>,
    /// HTTP Content-Type
    pub content_type: &'static str,
    /// 实际输出格式
    pub format: AudioFormat,
}

/// 合成请求处理器
pub struct SpeechHandler {
    normalizer: RequestNormalizer,
    resolver: SpeakerResolver,
    engine: Arc<dyn SynthesizerPort>,
    transcoder: Arc<dyn TranscoderPort>,
    /// 临时波形目录
    scratch_dir: PathBuf,
    /// 有损格式目标比特率（bps）
    bitrate: u32,
}

impl SpeechHandler {
    pub fn new(
        normalizer: RequestNormalizer,
        resolver: SpeakerResolver,
        engine: Arc<dyn SynthesizerPort>,
        transcoder: Arc<dyn TranscoderPort>,
        scratch_dir: PathBuf,
        bitrate: u32,
    ) -> Self {
        Self {
            normalizer,
            resolver,
            engine,
            transcoder,
            scratch_dir,
            bitrate,
        }
    }

    /// 处理一次合成请求
    pub async fn handle(&self, command: SpeechCommand) -> Result<SpeechOutput, ApplicationError> {
        let normalized = self.normalizer.normalize(&command)?;
        let speaker = self.resolver.resolve(&normalized.voice)?;

        let output_path = self
            .scratch_dir
            .join(format!("speech_{}.wav", Uuid::new_v4()));
        // 守卫在合成前创建：引擎写盘后任何失败路径都会清理
        let scratch = ScratchFile::new(output_path.clone());

        tracing::info!(
            model = %normalized.model_name,
            text_len = normalized.text.len(),
            language = ?normalized.language,
            speaker = %speaker,
            format = %normalized.format,
            "Generating speech"
        );

        let request = SynthesisRequest {
            model_name: normalized.model_name.clone(),
            text: normalized.text.clone(),
            language: normalized.language.clone(),
            speaker_wav: speaker.speaker_wav().map(|p| p.to_path_buf()),
            speaker_name: speaker.speaker_name().map(String::from),
            output_path,
        };
        request
            .validate_speaker()
            .map_err(|e| ApplicationError::Internal(e.to_string()))?;

        let synthesized = self.engine.synthesize(request).await?;

        let wav_data = tokio::fs::read(&synthesized.output_path)
            .await
            .map_err(|e| {
                ApplicationError::Internal(format!(
                    "failed to read synthesized waveform '{}': {}",
                    synthesized.output_path.display(),
                    e
                ))
            })?;

        let transcode_config = TranscodeConfig {
            format: normalized.format,
            bitrate: Some(self.bitrate),
        };
        let transcoded = self.transcoder.transcode(&wav_data, &transcode_config).await?;

        drop(scratch);

        tracing::info!(
            format = %transcoded.format,
            duration_ms = transcoded.duration_ms,
            audio_size = transcoded.audio_data.len(),
            "Speech generation completed"
        );

        Ok(SpeechOutput {
            audio_data: transcoded.audio_data,
            content_type: transcoded.format.media_type(),
            format: transcoded.format,
        })
    }
}

/// 临时波形文件守卫
///
/// Drop 时尽力删除文件；文件尚未写出时删除失败是正常情况
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove scratch waveform"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        AudioInfo, SpeakerLookupPort, SynthesisError, SynthesisOutput, TranscodeError,
        TranscodeResult,
    };
    use crate::application::registry::ModelRegistry;
    use crate::config::ManifestEntry;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MODEL: &str = "tts_models/multilingual/multi-dataset/xtts_v2";

    /// 写出固定 WAV 字节的引擎桩
    struct FileEngine {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SynthesizerPort for FileEngine {
        async fn load_model(&self, _model_name: &str) -> Result<(), SynthesisError> {
            Ok(())
        }

        async fn synthesize(
            &self,
            request: SynthesisRequest,
        ) -> Result<SynthesisOutput, SynthesisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            request.validate_speaker()?;
            tokio::fs::write(&request.output_path, b"RIFFfake")
                .await
                .map_err(|e| SynthesisError::EngineError(e.to_string()))?;
            Ok(SynthesisOutput {
                output_path: request.output_path,
                duration_ms: Some(1000),
                sample_rate: Some(24000),
            })
        }
    }

    struct PassthroughTranscoder {
        fail: bool,
    }

    #[async_trait]
    impl TranscoderPort for PassthroughTranscoder {
        async fn transcode(
            &self,
            wav_data: &[u8],
            config: &TranscodeConfig,
        ) -> Result<TranscodeResult, TranscodeError> {
            if self.fail {
                return Err(TranscodeError::EncodingError("forced failure".to_string()));
            }
            Ok(TranscodeResult {
                audio_data: wav_data.to_vec(),
                format: config.format,
                duration_ms: 1000,
                sample_rate: 24000,
                channels: 1,
            })
        }

        fn audio_info(&self, wav_data: &[u8]) -> Result<AudioInfo, TranscodeError> {
            Ok(AudioInfo {
                duration_ms: 1000,
                sample_rate: 24000,
                channels: 1,
                bits_per_sample: 16,
                data_size: wav_data.len(),
            })
        }

        fn supports_format(&self, _format: AudioFormat) -> bool {
            true
        }
    }

    struct EmptyLookup;

    impl SpeakerLookupPort for EmptyLookup {
        fn path_exists(&self, _path: &Path) -> bool {
            false
        }

        fn locate(&self, _file_name: &str) -> Option<std::path::PathBuf> {
            None
        }

        fn sorted_samples(&self) -> Vec<std::path::PathBuf> {
            Vec::new()
        }
    }

    fn handler(scratch_dir: PathBuf, fail_transcode: bool) -> (SpeechHandler, Arc<FileEngine>) {
        let engine = Arc::new(FileEngine {
            calls: AtomicUsize::new(0),
        });
        let registry = Arc::new(ModelRegistry::build(
            vec![ManifestEntry {
                model_name: MODEL.to_string(),
                default_voice: Some("Craig Gutsy".to_string()),
            }],
            None,
            engine.clone(),
        ));
        let normalizer = RequestNormalizer::new(registry, "Craig Gutsy", AudioFormat::Wav);
        let resolver = SpeakerResolver::new(Arc::new(EmptyLookup), false);
        let handler = SpeechHandler::new(
            normalizer,
            resolver,
            engine.clone(),
            Arc::new(PassthroughTranscoder {
                fail: fail_transcode,
            }),
            scratch_dir,
            64000,
        );
        (handler, engine)
    }

    fn command() -> SpeechCommand {
        SpeechCommand {
            model: Some(MODEL.to_string()),
            input: Some("Hello".to_string()),
            ..Default::default()
        }
    }

    fn scratch_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_handle_returns_audio_and_cleans_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let (handler, _) = handler(dir.path().to_path_buf(), false);

        let output = handler.handle(command()).await.unwrap();
        assert_eq!(output.audio_data, b"RIFFfake");
        assert_eq!(output.content_type, "audio/wav");
        assert!(scratch_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_scratch_cleaned_on_transcode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (handler, _) = handler(dir.path().to_path_buf(), true);

        let err = handler.handle(command()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Transcode(_)));
        assert!(scratch_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_validation_failure_skips_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        let (handler, engine) = handler(dir.path().to_path_buf(), false);

        let mut cmd = command();
        cmd.model = Some("unknown-model".to_string());
        let err = handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ModelNotAvailable { .. }));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }
}
