//! Speaker Lookup Port - 说话人样本查找抽象
//!
//! 把"按名称查找参考音频"抽象为能力接口，解析优先级逻辑留在
//! SpeakerResolver 中；后端可替换为数据库或对象存储而不动优先级链。

use std::path::{Path, PathBuf};

/// Speaker Lookup Port
///
/// 说话人样本存储的抽象接口（当前实现为平坦目录）
pub trait SpeakerLookupPort: Send + Sync {
    /// 判断任意完整路径是否指向已存在的文件（解析优先级 1 使用）
    fn path_exists(&self, path: &Path) -> bool;

    /// 在样本存储内查找精确文件名，返回完整路径
    fn locate(&self, file_name: &str) -> Option<PathBuf>;

    /// 按文件名字典序排列的全部 .wav 样本
    ///
    /// 用于数字索引解析和 /v1/audio/voices 列表
    fn sorted_samples(&self) -> Vec<PathBuf>;
}
