//! Voxgate - OpenAI 兼容的 TTS 网关
//!
//! 架构：
//! - Domain: 说话人引用值对象
//! - Application: 规范化、音色解析、模型注册表、合成编排、ports
//! - Infrastructure: http, adapters (speakers / synthesizer / transcoder)

use std::sync::Arc;

use voxgate::application::{ModelRegistry, RequestNormalizer, SpeakerResolver, SpeechHandler};
use voxgate::config::{apply_default_model, load_config, load_manifest, print_config};
use voxgate::infrastructure::adapters::speakers::DirSpeakerLookup;
use voxgate::infrastructure::adapters::synthesizer::{HttpEngineClient, HttpEngineConfig};
use voxgate::infrastructure::adapters::transcoder::AudioTranscoder;
use voxgate::infrastructure::http::{AppState, HttpServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},voxgate={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Voxgate - OpenAI 兼容 TTS 网关");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.audio.scratch_dir).await?;
    tokio::fs::create_dir_all(&config.speakers.dir).await?;

    // 加载模型清单：清单缺失、不可解析或为空时直接退出
    let mut manifest = load_manifest(&config.models.manifest_path)
        .map_err(|e| anyhow::anyhow!("Failed to load model manifest: {}", e))?;
    apply_default_model(
        &mut manifest,
        config.models.default_model.as_deref(),
        &config.models.default_voice,
    );

    // 创建引擎客户端
    let engine_config =
        HttpEngineConfig::new(&config.engine.url).with_timeout(config.engine.timeout_secs);
    let engine = Arc::new(
        HttpEngineClient::new(engine_config)
            .map_err(|e| anyhow::anyhow!("Failed to create engine client: {}", e))?,
    );

    // 构建注册表并预加载全部模型（任一失败即启动失败）
    let registry = Arc::new(ModelRegistry::build(
        manifest,
        config.models.default_model.clone(),
        engine.clone(),
    ));
    registry
        .load_all()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load models: {}", e))?;
    tracing::info!(models = registry.len(), "All models ready");

    // 说话人样本目录
    let speakers = Arc::new(DirSpeakerLookup::new(&config.speakers.dir));

    // 组装合成流水线
    let normalizer = RequestNormalizer::new(
        registry.clone(),
        &config.models.default_voice,
        config.audio.default_format,
    );
    let resolver = SpeakerResolver::new(speakers.clone(), config.speakers.index_lookup);
    let speech_handler = SpeechHandler::new(
        normalizer,
        resolver,
        engine,
        Arc::new(AudioTranscoder::new()),
        config.audio.scratch_dir.clone(),
        config.audio.bitrate,
    );

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        speech_handler,
        registry,
        speakers,
        config.speakers.index_lookup,
    );
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
