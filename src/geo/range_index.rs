//! 网段索引
//!
//! 按掩码后的网络地址升序排列的不可变网段表，支持 O(log n) 的点查询。
//! 同一个实现通过 [`AddressFamily`] 复用于 IPv4 与 IPv6。

use std::fmt;

use super::addr::{AddressFamily, parse_cidr};
use super::location::LocationKey;
use crate::errors::{IpGeoError, Result};

/// 一条网段记录：掩码后的网络地址 + 前缀长度 + 位置键
pub struct NetworkRecord<F: AddressFamily> {
    base: F::Addr,
    prefix_len: u8,
    key: LocationKey,
}

impl<F: AddressFamily> NetworkRecord<F> {
    /// 构造并规范化：超出前缀长度的位会被清零
    pub fn new(addr: F::Addr, prefix_len: u8, key: LocationKey) -> Result<Self> {
        if prefix_len > F::BITS {
            return Err(IpGeoError::field_parse(format!(
                "prefix length {} out of range for {}",
                prefix_len,
                F::NAME
            )));
        }
        Ok(Self {
            base: F::mask(addr, prefix_len),
            prefix_len,
            key,
        })
    }

    /// 从 `address/prefixlength` 文本构造
    pub fn from_cidr(cidr: &str, key: LocationKey) -> Result<Self> {
        let (base, prefix_len) = parse_cidr::<F>(cidr)?;
        Ok(Self {
            base,
            prefix_len,
            key,
        })
    }

    pub fn base(&self) -> F::Addr {
        self.base
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn key(&self) -> LocationKey {
        self.key
    }

    /// 精确 CIDR 包含判断
    #[inline]
    pub fn contains(&self, addr: F::Addr) -> bool {
        F::mask(addr, self.prefix_len) == self.base
    }
}

impl<F: AddressFamily> Clone for NetworkRecord<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: AddressFamily> Copy for NetworkRecord<F> {}

impl<F: AddressFamily> PartialEq for NetworkRecord<F> {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.prefix_len == other.prefix_len && self.key == other.key
    }
}

impl<F: AddressFamily> Eq for NetworkRecord<F> {}

impl<F: AddressFamily> fmt::Debug for NetworkRecord<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkRecord")
            .field("family", &F::NAME)
            .field("base", &self.base)
            .field("prefix_len", &self.prefix_len)
            .field("key", &self.key)
            .finish()
    }
}

/// 不可变的有序网段索引
pub struct RangeIndex<F: AddressFamily> {
    records: Vec<NetworkRecord<F>>,
}

impl<F: AddressFamily> RangeIndex<F> {
    /// 按网络地址升序排序后构建索引，不丢弃任何记录
    ///
    /// 排序是稳定的：网络地址相同的多条记录保持解析顺序，
    /// 查询时命中其中最后一条。
    pub fn build(mut records: Vec<NetworkRecord<F>>) -> Self {
        records.sort_by_key(|r| r.base);
        Self { records }
    }

    /// 查找包含 `addr` 的网段
    ///
    /// 二分定位不大于 `addr` 的最大网络地址，再做精确包含判断。
    /// 索引假定网段互不重叠，因此这不是最长前缀匹配。
    pub fn lookup(&self, addr: F::Addr) -> Option<LocationKey> {
        let idx = self.records.partition_point(|r| r.base <= addr);
        let candidate = self.records.get(idx.checked_sub(1)?)?;
        candidate.contains(addr).then_some(candidate.key)
    }

    /// 解析文本地址后查找；地址不属于本地址族时返回 None
    pub fn lookup_text(&self, text: &str) -> Option<LocationKey> {
        F::parse(text).and_then(|addr| self.lookup(addr))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkRecord<F>> {
        self.records.iter()
    }
}

impl<F: AddressFamily> Default for RangeIndex<F> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<F: AddressFamily> fmt::Debug for RangeIndex<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeIndex")
            .field("family", &F::NAME)
            .field("len", &self.records.len())
            .finish()
    }
}
