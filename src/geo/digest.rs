//! 数据集内容指纹（MD5，与 MaxMind 发布的 `.md5` 校验文件一致）

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 16]);

impl ContentDigest {
    pub fn of(bytes: &[u8]) -> Self {
        Self(md5::compute(bytes).0)
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    /// 与校验源返回的文本比较
    ///
    /// 只取第一个空白分隔的片段（兼容 `md5sum` 的 `hash  filename` 输出），大小写不敏感。
    pub fn matches_hex(&self, text: &str) -> bool {
        text.split_whitespace()
            .next()
            .is_some_and(|token| token.eq_ignore_ascii_case(&self.to_hex()))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}
