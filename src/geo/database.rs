//! 地理数据库快照
//!
//! 一个 [`GeoDatabase`] 由两个地址族的网段索引和一张位置表组成，
//! 构造完成后不再修改，可被任意多个并发查询共享。

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::addr::{Ipv4, Ipv6, parse_v4, parse_v6};
use super::digest::ContentDigest;
use super::location::{LocationKey, LocationRecord, LocationTable};
use super::range_index::RangeIndex;

/// 单次查询的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// 命中网段并解析到位置记录
    Found(&'a LocationRecord),
    /// 地址合法，但不在任何已索引网段内
    NotFound,
    /// 既不是 IPv4 也不是 IPv6
    InvalidAddress,
}

impl<'a> Lookup<'a> {
    pub fn record(&self) -> Option<&'a LocationRecord> {
        match self {
            Lookup::Found(rec) => Some(rec),
            _ => None,
        }
    }

    pub fn cloned(&self) -> LookupResult {
        match self {
            Lookup::Found(rec) => LookupResult::Found((*rec).clone()),
            Lookup::NotFound => LookupResult::NotFound,
            Lookup::InvalidAddress => LookupResult::InvalidAddress,
        }
    }
}

/// [`Lookup`] 的自有版本，可脱离快照生命周期返回给调用方
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found(LocationRecord),
    NotFound,
    InvalidAddress,
}

#[derive(Debug, Default)]
pub struct GeoDatabase {
    ipv4: RangeIndex<Ipv4>,
    ipv6: RangeIndex<Ipv6>,
    locations: LocationTable,
}

impl GeoDatabase {
    pub fn new(ipv4: RangeIndex<Ipv4>, ipv6: RangeIndex<Ipv6>, locations: LocationTable) -> Self {
        Self {
            ipv4,
            ipv6,
            locations,
        }
    }

    /// 根据文本判断地址族，查询对应索引，再解析位置记录
    pub fn lookup(&self, text: &str) -> Lookup<'_> {
        let key = if let Some(addr) = parse_v4(text) {
            self.ipv4.lookup(addr)
        } else if let Some(addr) = parse_v6(text) {
            self.ipv6.lookup(addr)
        } else {
            return Lookup::InvalidAddress;
        };

        match key.and_then(|k| self.resolve(k)) {
            Some(record) => Lookup::Found(record),
            None => Lookup::NotFound,
        }
    }

    fn resolve(&self, key: LocationKey) -> Option<&LocationRecord> {
        let record = self.locations.get(key);
        if record.is_none() {
            // 悬空引用在加载时已告警，这里只记录命中
            tracing::debug!("Location key {} missing from location table", key);
        }
        record
    }

    pub fn ipv4(&self) -> &RangeIndex<Ipv4> {
        &self.ipv4
    }

    pub fn ipv6(&self) -> &RangeIndex<Ipv6> {
        &self.ipv6
    }

    pub fn locations(&self) -> &LocationTable {
        &self.locations
    }
}

/// 快照统计信息（健康检查与日志）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub digest: String,
    pub loaded_at: String,
    pub ipv4_networks: usize,
    pub ipv6_networks: usize,
    pub locations: usize,
}

/// 已发布的单元：数据库 + 来源字节指纹 + 加载时间
#[derive(Debug)]
pub struct Snapshot {
    database: GeoDatabase,
    digest: ContentDigest,
    loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(database: GeoDatabase, digest: ContentDigest) -> Self {
        Self {
            database,
            digest,
            loaded_at: Utc::now(),
        }
    }

    pub fn database(&self) -> &GeoDatabase {
        &self.database
    }

    pub fn digest(&self) -> ContentDigest {
        self.digest
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn lookup(&self, text: &str) -> Lookup<'_> {
        self.database.lookup(text)
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            digest: self.digest.to_hex(),
            loaded_at: self.loaded_at.to_rfc3339(),
            ipv4_networks: self.database.ipv4.len(),
            ipv6_networks: self.database.ipv6.len(),
            locations: self.database.locations.len(),
        }
    }
}
