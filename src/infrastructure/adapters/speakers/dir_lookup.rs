//! Dir Speaker Lookup - 平坦目录的说话人样本查找
//!
//! SpeakerLookupPort 的文件系统实现：样本目录内按文件名查找，
//! 不递归子目录。去掉扩展名的文件名即说话人标识。

use std::path::{Path, PathBuf};

use crate::application::ports::SpeakerLookupPort;

/// 目录样本查找器
pub struct DirSpeakerLookup {
    dir: PathBuf,
}

impl DirSpeakerLookup {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 样本名列表（去掉 .wav 扩展名，字典序），用于 /v1/audio/voices
    pub fn sample_names(&self) -> Vec<String> {
        self.sorted_samples()
            .iter()
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect()
    }
}

impl SpeakerLookupPort for DirSpeakerLookup {
    fn path_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn locate(&self, file_name: &str) -> Option<PathBuf> {
        // 仅接受平坦文件名；带路径分隔符的输入走 path_exists 分支
        if file_name.contains(std::path::MAIN_SEPARATOR) {
            return None;
        }
        let candidate = self.dir.join(file_name);
        candidate.is_file().then_some(candidate)
    }

    fn sorted_samples(&self) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Cannot list speakers directory");
                return Vec::new();
            }
        };

        let mut samples: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
            })
            .collect();

        samples.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"RIFF").unwrap();
    }

    #[test]
    fn test_locate_exact_file() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "alice.wav");
        let lookup = DirSpeakerLookup::new(tmp.path());

        assert_eq!(
            lookup.locate("alice.wav"),
            Some(tmp.path().join("alice.wav"))
        );
        assert_eq!(lookup.locate("alice"), None);
        assert_eq!(lookup.locate("bob.wav"), None);
    }

    #[test]
    fn test_locate_rejects_path_separators() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "alice.wav");
        let lookup = DirSpeakerLookup::new(tmp.path());

        let escaped = format!("..{}alice.wav", std::path::MAIN_SEPARATOR);
        assert_eq!(lookup.locate(&escaped), None);
    }

    #[test]
    fn test_sorted_samples_lexicographic_wav_only() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "zoe.wav");
        touch(tmp.path(), "alice.wav");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "bob.WAV");
        let lookup = DirSpeakerLookup::new(tmp.path());

        let samples = lookup.sorted_samples();
        let names: Vec<_> = samples
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["alice.wav", "bob.WAV", "zoe.wav"]);
    }

    #[test]
    fn test_sample_names_strip_extension() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "alice.wav");
        touch(tmp.path(), "bob.wav");
        let lookup = DirSpeakerLookup::new(tmp.path());

        assert_eq!(lookup.sample_names(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_missing_directory_yields_empty_list() {
        let lookup = DirSpeakerLookup::new("definitely/not/here");
        assert!(lookup.sorted_samples().is_empty());
    }
}
