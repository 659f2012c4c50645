//! IP 地理位置核心
//!
//! - `addr`: 地址族抽象、解析与掩码
//! - `range_index`: 按地址族泛型的有序网段索引
//! - `location`: 位置记录与位置表
//! - `loader`: zip/CSV 数据集解析
//! - `database`: 不可变数据库与快照
//! - `digest`: 数据集内容指纹
//! - `manager`: 快照发布与刷新
//! - `refresher`: 后台定时刷新

pub mod addr;
pub mod database;
pub mod digest;
pub mod loader;
pub mod location;
pub mod manager;
pub mod range_index;
pub mod refresher;

pub use addr::{AddressFamily, Ipv4, Ipv6};
pub use database::{GeoDatabase, Lookup, LookupResult, Snapshot, SnapshotStats};
pub use digest::ContentDigest;
pub use loader::{DatasetEdition, DatasetLayout, DatasetLoader};
pub use location::{BlankFieldPolicy, Continent, Country, LocationKey, LocationRecord, LocationTable};
pub use manager::{DatabaseManager, DatasetSources, RefreshOutcome};
pub use range_index::{NetworkRecord, RangeIndex};
pub use refresher::{RefreshHandle, RefreshTask};
