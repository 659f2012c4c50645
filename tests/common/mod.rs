//! Shared fixtures: in-memory GeoLite2-style zip archives and a swappable source.
#![allow(dead_code)]

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use zip::write::SimpleFileOptions;

use ipgeo::errors::{IpGeoError, Result};
use ipgeo::geo::{AddressFamily, LocationKey, NetworkRecord};
use ipgeo::source::Source;

pub const IPV4_MEMBER: &str = "GeoLite2-Country-Blocks-IPv4.csv";
pub const IPV6_MEMBER: &str = "GeoLite2-Country-Blocks-IPv6.csv";
pub const LOCATIONS_MEMBER: &str = "GeoLite2-Country-Locations-en.csv";

const BLOCKS_HEADER: &str = "network,geoname_id,registered_country_geoname_id,represented_country_geoname_id,is_anonymous_proxy,is_satellite_provider\n";
const LOCATIONS_HEADER: &str = "geoname_id,locale_code,continent_code,continent_name,country_iso_code,country_name,is_in_european_union\n";

/// Builder for a country-edition dataset archive.
#[derive(Default, Clone)]
pub struct DatasetBuilder {
    ipv4: Vec<(String, u32)>,
    ipv6: Vec<(String, u32)>,
    locations: Vec<(u32, String, String, String, String)>,
    // 放进子目录，模拟官方压缩包的 GeoLite2-Country-CSV_YYYYMMDD/ 前缀
    directory: Option<String>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ipv4(mut self, cidr: &str, key: u32) -> Self {
        self.ipv4.push((cidr.to_string(), key));
        self
    }

    pub fn ipv6(mut self, cidr: &str, key: u32) -> Self {
        self.ipv6.push((cidr.to_string(), key));
        self
    }

    pub fn location(
        mut self,
        key: u32,
        continent: (&str, &str),
        country: (&str, &str),
    ) -> Self {
        self.locations.push((
            key,
            continent.0.to_string(),
            continent.1.to_string(),
            country.0.to_string(),
            country.1.to_string(),
        ));
        self
    }

    pub fn in_directory(mut self, dir: &str) -> Self {
        self.directory = Some(dir.to_string());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut ipv4 = String::from(BLOCKS_HEADER);
        for (cidr, key) in &self.ipv4 {
            ipv4.push_str(&format!("{},{},{},,0,0\n", cidr, key, key));
        }
        let mut ipv6 = String::from(BLOCKS_HEADER);
        for (cidr, key) in &self.ipv6 {
            ipv6.push_str(&format!("{},{},{},,0,0\n", cidr, key, key));
        }
        let mut locations = String::from(LOCATIONS_HEADER);
        for (key, cc, cn, kc, kn) in &self.locations {
            locations.push_str(&format!(
                "{},en,{},\"{}\",{},\"{}\",0\n",
                key, cc, cn, kc, kn
            ));
        }

        let prefix = self
            .directory
            .as_ref()
            .map(|d| format!("{}/", d))
            .unwrap_or_default();
        zip_members(&[
            (&format!("{}{}", prefix, IPV4_MEMBER), &ipv4),
            (&format!("{}{}", prefix, IPV6_MEMBER), &ipv6),
            (&format!("{}{}", prefix, LOCATIONS_MEMBER), &locations),
        ])
    }
}

pub fn zip_members(members: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, body) in members {
        writer.start_file(*name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// The two-row scenario: 1.2.3.0/24 → France, Europe.
pub fn france_dataset() -> Vec<u8> {
    DatasetBuilder::new()
        .ipv4("1.2.3.0/24", 100)
        .location(100, ("EU", "Europe"), ("FR", "France"))
        .build()
}

/// 去掉与已保留网段重叠的记录，得到互不重叠的网段集合
pub fn disjoint<F: AddressFamily>(raw: Vec<(F::Addr, u8)>) -> Vec<NetworkRecord<F>> {
    let mut kept: Vec<NetworkRecord<F>> = Vec::new();
    for (i, (addr, prefix_len)) in raw.into_iter().enumerate() {
        let candidate = NetworkRecord::<F>::new(addr, prefix_len, LocationKey(i as u32)).unwrap();
        let overlaps = kept.iter().any(|k| {
            let bits = k.prefix_len().min(candidate.prefix_len());
            F::mask(k.base(), bits) == F::mask(candidate.base(), bits)
        });
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

/// Source whose content can be swapped between refreshes.
#[derive(Default)]
pub struct MemorySource {
    body: Mutex<Option<Bytes>>,
    reads: AtomicUsize,
}

impl MemorySource {
    pub fn with(body: impl Into<Bytes>) -> Self {
        let source = Self::default();
        source.set(body);
        source
    }

    pub fn set(&self, body: impl Into<Bytes>) {
        *self.body.lock().unwrap() = Some(body.into());
    }

    pub fn fail(&self) {
        *self.body.lock().unwrap() = None;
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for MemorySource {
    async fn read(&self) -> Result<Bytes> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.body
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| IpGeoError::source_fetch("memory source offline"))
    }

    fn describe(&self) -> String {
        "memory://fixture".to_string()
    }
}
