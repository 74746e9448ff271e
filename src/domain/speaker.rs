//! Speaker Reference - 说话人引用值对象
//!
//! 一次合成请求的说话人引用，二选一：
//! - FileReference: 指向已存在的参考音频文件（声音克隆）
//! - NamedSpeaker: 模型内置说话人表中的名称
//!
//! 不变量: 每次请求恰好产生其中一种，解析器保证不会两者皆空

use std::path::{Path, PathBuf};

/// 说话人引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerReference {
    /// 参考音频文件路径（文件已验证存在）
    FileReference(PathBuf),
    /// 模型内置说话人名称
    NamedSpeaker(String),
}

impl SpeakerReference {
    /// 参考音频路径（NamedSpeaker 时为 None）
    pub fn speaker_wav(&self) -> Option<&Path> {
        match self {
            Self::FileReference(path) => Some(path),
            Self::NamedSpeaker(_) => None,
        }
    }

    /// 内置说话人名称（FileReference 时为 None）
    pub fn speaker_name(&self) -> Option<&str> {
        match self {
            Self::FileReference(_) => None,
            Self::NamedSpeaker(name) => Some(name),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::FileReference(_))
    }
}

impl std::fmt::Display for SpeakerReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileReference(path) => write!(f, "file:{}", path.display()),
            Self::NamedSpeaker(name) => write!(f, "speaker:{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_reference_accessors() {
        let speaker = SpeakerReference::FileReference(PathBuf::from("speakers/alice.wav"));
        assert!(speaker.is_file());
        assert_eq!(speaker.speaker_wav(), Some(Path::new("speakers/alice.wav")));
        assert_eq!(speaker.speaker_name(), None);
    }

    #[test]
    fn test_named_speaker_accessors() {
        let speaker = SpeakerReference::NamedSpeaker("Craig Gutsy".to_string());
        assert!(!speaker.is_file());
        assert_eq!(speaker.speaker_wav(), None);
        assert_eq!(speaker.speaker_name(), Some("Craig Gutsy"));
    }

    #[test]
    fn test_exactly_one_side_set() {
        let file = SpeakerReference::FileReference(PathBuf::from("a.wav"));
        let named = SpeakerReference::NamedSpeaker("bob".to_string());
        assert!(file.speaker_wav().is_some() ^ file.speaker_name().is_some());
        assert!(named.speaker_wav().is_some() ^ named.speaker_name().is_some());
    }
}
