//! 位置表
//!
//! LocationKey → LocationRecord 的不可变映射。

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::IpGeoError;

/// 位置键（GeoNames ID），仅在同一个快照内有意义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationKey(pub u32);

impl FromStr for LocationKey {
    type Err = IpGeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(LocationKey)
            .map_err(|e| IpGeoError::field_parse(format!("invalid location key \"{}\": {}", s, e)))
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continent {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
}

/// 查询结果中的位置信息，缺失字段在 JSON 中省略
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent: Option<Continent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Country>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// 数据集中出现空字符串时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlankFieldPolicy {
    /// 全空的 code/name 对、空城市名视为缺失（JSON 中省略）
    #[default]
    Absent,
    /// 原样保留为空字符串
    Blank,
}

impl FromStr for BlankFieldPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "absent" => Ok(Self::Absent),
            "blank" => Ok(Self::Blank),
            _ => Err(format!(
                "Invalid blank field policy: '{}'. Valid: absent, blank",
                s
            )),
        }
    }
}

impl LocationRecord {
    /// 按策略从原始列构造
    pub fn from_columns(
        continent: (&str, &str),
        country: (&str, &str),
        city: Option<&str>,
        policy: BlankFieldPolicy,
    ) -> Self {
        let keep = |code: &str, name: &str| match policy {
            BlankFieldPolicy::Absent => !(code.is_empty() && name.is_empty()),
            BlankFieldPolicy::Blank => true,
        };

        let continent = keep(continent.0, continent.1).then(|| Continent {
            code: continent.0.to_string(),
            name: continent.1.to_string(),
        });
        let country = keep(country.0, country.1).then(|| Country {
            code: country.0.to_string(),
            name: country.1.to_string(),
        });
        let city = city
            .filter(|c| policy == BlankFieldPolicy::Blank || !c.is_empty())
            .map(String::from);

        Self {
            continent,
            country,
            city,
        }
    }

    /// 没有任何地区信息
    pub fn is_unknown(&self) -> bool {
        self.continent.is_none() && self.country.is_none() && self.city.is_none()
    }
}

/// 不可变的位置表
#[derive(Debug, Default)]
pub struct LocationTable {
    entries: HashMap<LocationKey, LocationRecord>,
}

impl LocationTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// 仅供加载阶段使用；重复键以后写入者为准
    pub(crate) fn insert(&mut self, key: LocationKey, record: LocationRecord) {
        self.entries.insert(key, record);
    }

    pub fn get(&self, key: LocationKey) -> Option<&LocationRecord> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(LocationKey, LocationRecord)> for LocationTable {
    fn from_iter<I: IntoIterator<Item = (LocationKey, LocationRecord)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_key_parse() {
        assert_eq!("100".parse::<LocationKey>().unwrap(), LocationKey(100));
        assert!("".parse::<LocationKey>().is_err());
        assert!("-1".parse::<LocationKey>().is_err());
        assert!("4294967296".parse::<LocationKey>().is_err());
        assert!("12a".parse::<LocationKey>().is_err());
    }

    #[test]
    fn test_absent_policy_drops_empty_pairs() {
        let rec = LocationRecord::from_columns(
            ("EU", "Europe"),
            ("", ""),
            Some(""),
            BlankFieldPolicy::Absent,
        );
        assert_eq!(
            rec.continent,
            Some(Continent {
                code: "EU".into(),
                name: "Europe".into()
            })
        );
        assert_eq!(rec.country, None);
        assert_eq!(rec.city, None);
    }

    #[test]
    fn test_absent_policy_keeps_half_filled_pair() {
        let rec =
            LocationRecord::from_columns(("", ""), ("FR", ""), None, BlankFieldPolicy::Absent);
        assert_eq!(rec.continent, None);
        assert_eq!(
            rec.country,
            Some(Country {
                code: "FR".into(),
                name: String::new()
            })
        );
    }

    #[test]
    fn test_blank_policy_keeps_everything() {
        let rec = LocationRecord::from_columns(("", ""), ("", ""), Some(""), BlankFieldPolicy::Blank);
        assert_eq!(rec.continent, Some(Continent::default()));
        assert_eq!(rec.country, Some(Country::default()));
        assert_eq!(rec.city, Some(String::new()));
    }

    #[test]
    fn test_unknown_record_serializes_empty() {
        let rec = LocationRecord::from_columns(("", ""), ("", ""), None, BlankFieldPolicy::Absent);
        assert!(rec.is_unknown());
        assert_eq!(serde_json::to_string(&rec).unwrap(), "{}");
    }

    #[test]
    fn test_serialization_shape() {
        let rec = LocationRecord::from_columns(
            ("EU", "Europe"),
            ("FR", "France"),
            Some("Paris"),
            BlankFieldPolicy::Absent,
        );
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "continent": {"code": "EU", "name": "Europe"},
                "country": {"code": "FR", "name": "France"},
                "city": "Paris"
            })
        );
    }

    #[test]
    fn test_blank_policy_from_str() {
        assert_eq!(
            "ABSENT".parse::<BlankFieldPolicy>().unwrap(),
            BlankFieldPolicy::Absent
        );
        assert_eq!(
            "blank".parse::<BlankFieldPolicy>().unwrap(),
            BlankFieldPolicy::Blank
        );
        assert!("omit".parse::<BlankFieldPolicy>().is_err());
    }

    #[test]
    fn test_table_get() {
        let table: LocationTable = [(LocationKey(1), LocationRecord::default())]
            .into_iter()
            .collect();
        assert_eq!(table.len(), 1);
        assert!(table.get(LocationKey(1)).is_some());
        assert!(table.get(LocationKey(2)).is_none());
    }
}
