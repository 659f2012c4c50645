//! 数据集加载
//!
//! 从 zip 压缩包中按文件名找到三个 CSV 成员（IPv4 网段、IPv6 网段、位置表），
//! 逐行解析并构建一个完整的 [`GeoDatabase`]。任何一处失败都会让整次加载失败，
//! 不会产出部分数据库。

use std::io::{Cursor, Read};
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::addr::{AddressFamily, Ipv4, Ipv6};
use super::database::GeoDatabase;
use super::location::{BlankFieldPolicy, LocationKey, LocationRecord, LocationTable};
use super::range_index::{NetworkRecord, RangeIndex};
use crate::errors::{IpGeoError, Result};

/// 网段文件最少列数：network, geoname_id
const BLOCK_MIN_COLUMNS: usize = 2;
/// 位置文件最少列数：geoname_id .. country_name
const LOCATION_MIN_COLUMNS: usize = 6;
/// City 版位置文件中城市名所在列
const CITY_NAME_COLUMN: usize = 10;

/// GeoLite2 数据集版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetEdition {
    #[default]
    Country,
    City,
}

impl FromStr for DatasetEdition {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "country" => Ok(Self::Country),
            "city" => Ok(Self::City),
            _ => Err(format!(
                "Invalid dataset edition: '{}'. Valid: country, city",
                s
            )),
        }
    }
}

/// 压缩包成员文件名（按 base filename 匹配）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    pub ipv4_blocks: String,
    pub ipv6_blocks: String,
    pub locations: String,
}

impl DatasetLayout {
    pub fn for_edition(edition: DatasetEdition) -> Self {
        let prefix = match edition {
            DatasetEdition::Country => "GeoLite2-Country",
            DatasetEdition::City => "GeoLite2-City",
        };
        Self {
            ipv4_blocks: format!("{}-Blocks-IPv4.csv", prefix),
            ipv6_blocks: format!("{}-Blocks-IPv6.csv", prefix),
            locations: format!("{}-Locations-en.csv", prefix),
        }
    }
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self::for_edition(DatasetEdition::default())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DatasetLoader {
    layout: DatasetLayout,
    policy: BlankFieldPolicy,
}

impl DatasetLoader {
    pub fn new(layout: DatasetLayout, policy: BlankFieldPolicy) -> Self {
        Self { layout, policy }
    }

    /// 解析压缩包并构建数据库
    pub fn load(&self, bytes: &[u8]) -> Result<GeoDatabase> {
        let start = std::time::Instant::now();
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| IpGeoError::archive(format!("couldn't open dataset archive: {}", e)))?;

        let mut ipv4_member = None;
        let mut ipv6_member = None;
        let mut locations_member = None;

        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let Some(base) = Path::new(file.name())
                .file_name()
                .and_then(|n| n.to_str())
                .map(String::from)
            else {
                continue;
            };

            let slot = if base == self.layout.ipv4_blocks {
                &mut ipv4_member
            } else if base == self.layout.ipv6_blocks {
                &mut ipv6_member
            } else if base == self.layout.locations {
                &mut locations_member
            } else {
                continue;
            };

            debug!("Found dataset member {} at {}", base, file.name());
            *slot = Some(read_member(file, &base)?);
        }

        let ipv4_member = ipv4_member.ok_or_else(|| missing(&self.layout.ipv4_blocks))?;
        let ipv6_member = ipv6_member.ok_or_else(|| missing(&self.layout.ipv6_blocks))?;
        let locations_member = locations_member.ok_or_else(|| missing(&self.layout.locations))?;

        let ipv4 = parse_blocks::<Ipv4>(&ipv4_member, &self.layout.ipv4_blocks)?;
        let ipv6 = parse_blocks::<Ipv6>(&ipv6_member, &self.layout.ipv6_blocks)?;
        let locations = parse_locations(&locations_member, &self.layout.locations, self.policy)?;

        let ipv4 = RangeIndex::build(ipv4);
        let ipv6 = RangeIndex::build(ipv6);

        let dangling = ipv4
            .iter()
            .map(|r| r.key())
            .chain(ipv6.iter().map(|r| r.key()))
            .filter(|k| locations.get(*k).is_none())
            .count();
        if dangling > 0 {
            warn!(
                "{} network blocks reference location keys absent from {}",
                dangling, self.layout.locations
            );
        }

        info!(
            "Dataset parsed in {:?}: {} IPv4 networks, {} IPv6 networks, {} locations",
            start.elapsed(),
            ipv4.len(),
            ipv6.len(),
            locations.len()
        );

        Ok(GeoDatabase::new(ipv4, ipv6, locations))
    }
}

fn missing(name: &str) -> IpGeoError {
    IpGeoError::missing_member(format!("dataset archive has no member named {}", name))
}

fn read_member<R: Read>(mut file: R, name: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .map_err(|e| IpGeoError::archive(format!("couldn't read member {}: {}", name, e)))?;
    Ok(buf)
}

/// 逐行遍历 CSV（首行表头已跳过），回调拿到 1-based 行号
fn for_each_row<F>(data: &[u8], member: &str, mut f: F) -> Result<()>
where
    F: FnMut(&StringRecord, u64) -> Result<()>,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                return Err(IpGeoError::malformed_row(format!("{}: {}", member, e)));
            }
        }
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        f(&record, line)?;
    }
    Ok(())
}

fn parse_blocks<F: AddressFamily>(data: &[u8], member: &str) -> Result<Vec<NetworkRecord<F>>> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for_each_row(data, member, |row, line| {
        if row.len() < BLOCK_MIN_COLUMNS {
            return Err(IpGeoError::malformed_row(format!(
                "{} line {}: expected at least {} columns, got {}",
                member,
                line,
                BLOCK_MIN_COLUMNS,
                row.len()
            )));
        }

        let key_field = &row[1];
        if key_field.is_empty() {
            skipped += 1;
            return Ok(());
        }

        let key = key_field
            .parse::<LocationKey>()
            .map_err(|e| at_line(e, member, line))?;
        let record =
            NetworkRecord::<F>::from_cidr(&row[0], key).map_err(|e| at_line(e, member, line))?;
        records.push(record);
        Ok(())
    })?;

    debug!(
        "{}: {} {} networks, {} without location",
        member,
        records.len(),
        F::NAME,
        skipped
    );
    Ok(records)
}

fn parse_locations(data: &[u8], member: &str, policy: BlankFieldPolicy) -> Result<LocationTable> {
    // 行数即记录数上限（含表头）
    let rows = data.iter().filter(|&&b| b == b'\n').count();
    let mut table = LocationTable::with_capacity(rows);

    for_each_row(data, member, |row, line| {
        if row.len() < LOCATION_MIN_COLUMNS {
            return Err(IpGeoError::malformed_row(format!(
                "{} line {}: expected at least {} columns, got {}",
                member,
                line,
                LOCATION_MIN_COLUMNS,
                row.len()
            )));
        }

        let key = row[0]
            .parse::<LocationKey>()
            .map_err(|e| at_line(e, member, line))?;
        let record = LocationRecord::from_columns(
            (&row[2], &row[3]),
            (&row[4], &row[5]),
            row.get(CITY_NAME_COLUMN),
            policy,
        );
        table.insert(key, record);
        Ok(())
    })?;

    Ok(table)
}

fn at_line(err: IpGeoError, member: &str, line: u64) -> IpGeoError {
    match err {
        IpGeoError::FieldParse(msg) => {
            IpGeoError::field_parse(format!("{} line {}: {}", member, line, msg))
        }
        other => other,
    }
}
