//! Speaker Resolver - 音色字符串解析
//!
//! 把规范化后的 voice 字符串解析为 SpeakerReference，严格按优先级
//! 取首个命中项：
//! 1. 本身是绝对路径或含路径分隔符，且文件存在 → FileReference(原值)
//! 2. 样本目录内存在同名文件 → FileReference(dir/voice)
//! 3. 样本目录内存在 "{voice}.wav" → FileReference(dir/voice.wav)
//! 4. （仅 index_lookup 开启时）纯十进制数字 → 字典序 .wav 列表的
//!    零基索引；越界则继续向下
//! 5. 兜底 → NamedSpeaker(voice)
//!
//! 索引模式默认关闭，避免 voice="0" 在"索引 0"与"名为 0 的说话人"
//! 之间产生歧义。

use std::path::Path;
use std::sync::Arc;

use crate::domain::SpeakerReference;

use super::error::ApplicationError;
use super::ports::SpeakerLookupPort;

/// 音色解析器
pub struct SpeakerResolver {
    lookup: Arc<dyn SpeakerLookupPort>,
    /// 数字索引兼容模式开关
    index_lookup: bool,
}

impl SpeakerResolver {
    pub fn new(lookup: Arc<dyn SpeakerLookupPort>, index_lookup: bool) -> Self {
        Self {
            lookup,
            index_lookup,
        }
    }

    /// 解析 voice 字符串
    pub fn resolve(&self, voice: &str) -> Result<SpeakerReference, ApplicationError> {
        // 优先级 1: 已经像一个路径
        let path = Path::new(voice);
        if (path.is_absolute() || voice.contains(std::path::MAIN_SEPARATOR))
            && self.lookup.path_exists(path)
        {
            tracing::debug!(voice = %voice, "Resolved speaker to explicit path");
            return Ok(SpeakerReference::FileReference(path.to_path_buf()));
        }

        // 优先级 2: 样本目录内精确文件名
        if let Some(found) = self.lookup.locate(voice) {
            tracing::debug!(voice = %voice, path = %found.display(), "Resolved speaker to sample file");
            return Ok(SpeakerReference::FileReference(found));
        }

        // 优先级 3: 补全 .wav 扩展名
        if let Some(found) = self.lookup.locate(&format!("{}.wav", voice)) {
            tracing::debug!(voice = %voice, path = %found.display(), "Resolved speaker to sample file (.wav)");
            return Ok(SpeakerReference::FileReference(found));
        }

        // 优先级 4: 数字索引（显式开启的兼容模式）
        if self.index_lookup && is_decimal(voice) {
            let samples = self.lookup.sorted_samples();
            if let Some(found) = voice
                .parse::<usize>()
                .ok()
                .and_then(|index| samples.get(index))
            {
                tracing::debug!(voice = %voice, path = %found.display(), "Resolved speaker by index");
                return Ok(SpeakerReference::FileReference(found.clone()));
            }
            // 越界时继续按名称兜底
        }

        // 优先级 5: 视为模型内置说话人名称
        // 防御性检查：规范化阶段保证 voice 非空，此分支理论上不可达
        if voice.trim().is_empty() {
            return Err(ApplicationError::SpeakerResolution(voice.to_string()));
        }
        tracing::debug!(voice = %voice, "No sample file matched, using as built-in speaker name");
        Ok(SpeakerReference::NamedSpeaker(voice.to_string()))
    }
}

/// 是否由十进制数字组成（非空）
fn is_decimal(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    /// 内存样本表，验证优先级逻辑无需真实文件系统
    struct MapLookup {
        dir: PathBuf,
        files: BTreeMap<String, PathBuf>,
        extra_paths: Vec<PathBuf>,
    }

    impl MapLookup {
        fn new(names: &[&str]) -> Self {
            let dir = PathBuf::from("speakers");
            let files = names
                .iter()
                .map(|name| (name.to_string(), dir.join(name)))
                .collect();
            Self {
                dir,
                files,
                extra_paths: Vec::new(),
            }
        }

        fn with_path(mut self, path: &str) -> Self {
            self.extra_paths.push(PathBuf::from(path));
            self
        }
    }

    impl SpeakerLookupPort for MapLookup {
        fn path_exists(&self, path: &Path) -> bool {
            self.extra_paths.iter().any(|p| p == path)
                || self.files.values().any(|p| p == path)
        }

        fn locate(&self, file_name: &str) -> Option<PathBuf> {
            self.files.get(file_name).cloned()
        }

        fn sorted_samples(&self) -> Vec<PathBuf> {
            let _ = &self.dir;
            self.files
                .iter()
                .filter(|(name, _)| name.ends_with(".wav"))
                .map(|(_, path)| path.clone())
                .collect()
        }
    }

    fn resolver(names: &[&str], index_lookup: bool) -> SpeakerResolver {
        SpeakerResolver::new(Arc::new(MapLookup::new(names)), index_lookup)
    }

    #[test]
    fn test_explicit_path_wins() {
        let lookup = MapLookup::new(&["alice.wav"]).with_path("/refs/custom.wav");
        let resolver = SpeakerResolver::new(Arc::new(lookup), false);
        let resolved = resolver.resolve("/refs/custom.wav").unwrap();
        assert_eq!(
            resolved,
            SpeakerReference::FileReference(PathBuf::from("/refs/custom.wav"))
        );
    }

    #[test]
    fn test_exact_name_beats_wav_suffix() {
        // "alice" 与 "alice.wav" 同时存在时，精确名优先
        let resolver = resolver(&["alice", "alice.wav"], false);
        let resolved = resolver.resolve("alice").unwrap();
        assert_eq!(
            resolved,
            SpeakerReference::FileReference(PathBuf::from("speakers/alice"))
        );
    }

    #[test]
    fn test_wav_suffix_match() {
        let resolver = resolver(&["alice.wav"], false);
        let resolved = resolver.resolve("alice").unwrap();
        assert_eq!(
            resolved,
            SpeakerReference::FileReference(PathBuf::from("speakers/alice.wav"))
        );
    }

    #[test]
    fn test_no_match_returns_named_speaker_unchanged() {
        let resolver = resolver(&["alice.wav"], false);
        let resolved = resolver.resolve("bob").unwrap();
        assert_eq!(resolved, SpeakerReference::NamedSpeaker("bob".to_string()));
    }

    #[test]
    fn test_index_lookup_disabled_digit_is_a_name() {
        let resolver = resolver(&["a.wav", "b.wav"], false);
        let resolved = resolver.resolve("0").unwrap();
        assert_eq!(resolved, SpeakerReference::NamedSpeaker("0".to_string()));
    }

    #[test]
    fn test_index_lookup_in_range() {
        let resolver = resolver(&["a.wav", "b.wav"], true);
        let resolved = resolver.resolve("1").unwrap();
        assert_eq!(
            resolved,
            SpeakerReference::FileReference(PathBuf::from("speakers/b.wav"))
        );
    }

    #[test]
    fn test_index_lookup_out_of_range_falls_through() {
        let resolver = resolver(&["a.wav", "b.wav"], true);
        let resolved = resolver.resolve("7").unwrap();
        assert_eq!(resolved, SpeakerReference::NamedSpeaker("7".to_string()));
    }

    #[test]
    fn test_digit_named_file_beats_index() {
        // 目录里真有名为 "0.wav" 的样本时，走文件名匹配而不是索引
        let resolver = resolver(&["0.wav", "z.wav"], true);
        let resolved = resolver.resolve("0").unwrap();
        assert_eq!(
            resolved,
            SpeakerReference::FileReference(PathBuf::from("speakers/0.wav"))
        );
    }

    #[test]
    fn test_empty_voice_is_resolution_failure() {
        let resolver = resolver(&[], false);
        let err = resolver.resolve("").unwrap_err();
        assert!(matches!(err, ApplicationError::SpeakerResolution(_)));
    }
}
