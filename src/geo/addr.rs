//! 地址编解码
//!
//! 把文本形式的 IPv4 / IPv6 地址转换为定宽无符号整数（u32 / u128），
//! 并按前缀长度做掩码。两个地址族通过 [`AddressFamily`] 统一抽象，
//! 排序直接使用整数的 `Ord`，即大端数值序。

use std::fmt::Debug;
use std::hash::Hash;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::errors::{IpGeoError, Result};

/// 地址族能力接口：解析、掩码、比较
pub trait AddressFamily: Send + Sync + 'static {
    /// 定宽整数表示
    type Addr: Copy + Ord + Eq + Hash + Debug + Send + Sync + 'static;

    /// 地址位宽（32 或 128）
    const BITS: u8;

    /// 日志用名称
    const NAME: &'static str;

    /// 解析文本地址，失败返回 None
    fn parse(text: &str) -> Option<Self::Addr>;

    /// 保留高 `bits` 位，其余清零。调用方保证 `bits <= BITS`
    fn mask(addr: Self::Addr, bits: u8) -> Self::Addr;
}

/// IPv4 地址族
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ipv4 {}

/// IPv6 地址族
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ipv6 {}

impl AddressFamily for Ipv4 {
    type Addr = u32;
    const BITS: u8 = 32;
    const NAME: &'static str = "IPv4";

    fn parse(text: &str) -> Option<u32> {
        parse_v4(text)
    }

    fn mask(addr: u32, bits: u8) -> u32 {
        mask_v4(addr, bits)
    }
}

impl AddressFamily for Ipv6 {
    type Addr = u128;
    const BITS: u8 = 128;
    const NAME: &'static str = "IPv6";

    fn parse(text: &str) -> Option<u128> {
        parse_v6(text)
    }

    fn mask(addr: u128, bits: u8) -> u128 {
        mask_v6(addr, bits)
    }
}

/// 解析点分十进制 IPv4
///
/// 文本必须包含 `.`。`::ffff:a.b.c.d` 这种 IPv4 映射写法同样归入 IPv4。
pub fn parse_v4(text: &str) -> Option<u32> {
    if !text.contains('.') {
        return None;
    }

    if let Ok(v4) = text.parse::<Ipv4Addr>() {
        return Some(u32::from(v4));
    }

    text.parse::<Ipv6Addr>()
        .ok()
        .and_then(|v6| v6.to_ipv4_mapped())
        .map(u32::from)
}

/// 解析 IPv6（文本必须包含 `:`，包括 IPv4 映射写法）
pub fn parse_v6(text: &str) -> Option<u128> {
    if !text.contains(':') {
        return None;
    }
    text.parse::<Ipv6Addr>().ok().map(u128::from)
}

#[inline]
pub fn mask_v4(addr: u32, bits: u8) -> u32 {
    debug_assert!(bits <= 32);
    let mask = u32::MAX.checked_shl(32 - bits as u32).unwrap_or(0);
    addr & mask
}

#[inline]
pub fn mask_v6(addr: u128, bits: u8) -> u128 {
    debug_assert!(bits <= 128);
    let mask = u128::MAX.checked_shl(128 - bits as u32).unwrap_or(0);
    addr & mask
}

/// 解析 `address/prefixlength`，返回掩码后的网络地址与前缀长度
pub fn parse_cidr<F: AddressFamily>(text: &str) -> Result<(F::Addr, u8)> {
    let Some((address, bits)) = text.split_once('/') else {
        return Err(IpGeoError::field_parse(format!(
            "not a CIDR block: \"{}\"",
            text
        )));
    };

    let addr = F::parse(address).ok_or_else(|| {
        IpGeoError::field_parse(format!(
            "couldn't parse the {} address in \"{}\"",
            F::NAME,
            text
        ))
    })?;

    let bits = match bits.parse::<u8>() {
        Ok(b) if b <= F::BITS => b,
        _ => {
            return Err(IpGeoError::field_parse(format!(
                "prefix length out of range for {} in \"{}\"",
                F::NAME,
                text
            )));
        }
    };

    Ok((F::mask(addr, bits), bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_v4() {
        assert_eq!(parse_v4("1.2.3.4"), Some(0x0102_0304));
        assert_eq!(parse_v4("255.255.255.255"), Some(u32::MAX));
        assert_eq!(parse_v4("0.0.0.0"), Some(0));
        assert_eq!(parse_v4("::ffff:1.2.3.4"), Some(0x0102_0304));
        assert_eq!(parse_v4("1.2.3"), None);
        assert_eq!(parse_v4("256.1.1.1"), None);
        assert_eq!(parse_v4("2001:db8::1"), None);
        assert_eq!(parse_v4("not-an-ip"), None);
        assert_eq!(parse_v4(""), None);
    }

    #[test]
    fn test_parse_v6() {
        assert_eq!(parse_v6("::1"), Some(1));
        assert_eq!(
            parse_v6("2001:db8::"),
            Some(0x2001_0db8_0000_0000_0000_0000_0000_0000)
        );
        assert_eq!(parse_v6("::ffff:1.2.3.4"), Some(0xffff_0102_0304));
        assert_eq!(parse_v6("1.2.3.4"), None);
        assert_eq!(parse_v6("2001:db8::zz"), None);
    }

    #[test]
    fn test_mask_v4_bounds() {
        let addr = 0x0102_0304;
        assert_eq!(mask_v4(addr, 0), 0);
        assert_eq!(mask_v4(addr, 32), addr);
        assert_eq!(mask_v4(addr, 24), 0x0102_0300);
        assert_eq!(mask_v4(addr, 1), 0);
        assert_eq!(mask_v4(0x8000_0001, 1), 0x8000_0000);
    }

    #[test]
    fn test_mask_v6_crosses_word_boundary() {
        let addr = u128::MAX;
        assert_eq!(mask_v6(addr, 0), 0);
        assert_eq!(mask_v6(addr, 128), u128::MAX);
        assert_eq!(mask_v6(addr, 64), (u64::MAX as u128) << 64);
        assert_eq!(mask_v6(addr, 65), ((u64::MAX as u128) << 64) | (1u128 << 63));
    }

    #[test]
    fn test_ordering_high_word_first() {
        let low_only = parse_v6("::ffff:ffff:ffff:ffff").unwrap();
        let high_bit = parse_v6("0:0:0:1::").unwrap();
        assert!(low_only < high_bit);
    }

    #[test]
    fn test_parse_cidr() {
        assert_eq!(
            parse_cidr::<Ipv4>("1.2.3.99/24").unwrap(),
            (0x0102_0300, 24)
        );
        assert_eq!(parse_cidr::<Ipv4>("0.0.0.0/0").unwrap(), (0, 0));
        assert_eq!(
            parse_cidr::<Ipv6>("2001:db8::1/32").unwrap(),
            (0x2001_0db8u128 << 96, 32)
        );

        assert!(parse_cidr::<Ipv4>("1.2.3.0").is_err());
        assert!(parse_cidr::<Ipv4>("1.2.3.0/33").is_err());
        assert!(parse_cidr::<Ipv4>("1.2.3.0/-1").is_err());
        assert!(parse_cidr::<Ipv4>("2001:db8::/32").is_err());
        assert!(parse_cidr::<Ipv6>("2001:db8::/129").is_err());
        assert!(parse_cidr::<Ipv6>("1.2.3.0/24").is_err());
    }

    #[test]
    fn test_parse_cidr_error_kind() {
        let err = parse_cidr::<Ipv4>("1.2.3.0/40").unwrap_err();
        assert!(matches!(err, IpGeoError::FieldParse(_)));
        assert!(err.message().contains("prefix length"));
    }
}
