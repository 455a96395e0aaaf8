//! Region keys and the provincial metadata table.
//!
//! Raw region names in the feed carry administrative suffixes
//! (`湖北省`, `武汉市`, `广西壮族自治区`) while map features and URL
//! parameters often do not. [`normalize_region_name`] is the single place
//! where those suffixes are removed; every lookup in the crate goes
//! through it.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Administrative tokens removed from a raw region name.
const STRIP_KEY_PARTS: [&str; 6] = ["省", "市", "自治区", "回族", "维吾尔", "壮族"];

/// Errors raised when a region must be resolvable.
#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("unknown province: {name}")]
    UnknownProvince { name: String },
}

/// A region name with administrative suffixes stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RegionKey(String);

impl RegionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &RegionKey) -> bool {
        self.0.starts_with(prefix.as_str())
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip administrative tokens and surrounding whitespace from a name.
pub fn normalize_region_name(raw: &str) -> RegionKey {
    let stripped = STRIP_KEY_PARTS
        .iter()
        .fold(raw.trim().to_string(), |acc, part| acc.replace(part, ""));
    RegionKey(stripped.trim().to_string())
}

/// The provincial-level regions with a dedicated per-province data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize)]
pub enum Province {
    Anhui,
    Macau,
    Beijing,
    Chongqing,
    Fujian,
    Gansu,
    Guangdong,
    Guangxi,
    Guizhou,
    Hainan,
    Hebei,
    Henan,
    Heilongjiang,
    Hubei,
    Hunan,
    Jilin,
    Jiangsu,
    Jiangxi,
    Liaoning,
    InnerMongolia,
    Ningxia,
    Qinghai,
    Shandong,
    Shanxi,
    Shaanxi,
    Shanghai,
    Sichuan,
    Taiwan,
    Tianjin,
    Tibet,
    HongKong,
    Xinjiang,
    Yunnan,
    Zhejiang,
}

/// Static facts about a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProvinceMeta {
    /// Normalized Chinese name, identical to the province's [`RegionKey`].
    pub key: &'static str,
    /// File stem of the province's city-level dataset.
    pub data_file_stem: &'static str,
}

impl Province {
    pub const fn meta(self) -> ProvinceMeta {
        let (key, data_file_stem) = match self {
            Self::Anhui => ("安徽", "an_hui"),
            Self::Macau => ("澳门", "ao_men"),
            Self::Beijing => ("北京", "bei_jing"),
            Self::Chongqing => ("重庆", "chong_qing"),
            Self::Fujian => ("福建", "fu_jian"),
            Self::Gansu => ("甘肃", "gan_su"),
            Self::Guangdong => ("广东", "guang_dong"),
            Self::Guangxi => ("广西", "guang_xi"),
            Self::Guizhou => ("贵州", "gui_zhou"),
            Self::Hainan => ("海南", "hai_nan"),
            Self::Hebei => ("河北", "he_bei"),
            Self::Henan => ("河南", "he_nan"),
            Self::Heilongjiang => ("黑龙江", "hei_long_jiang"),
            Self::Hubei => ("湖北", "hu_bei"),
            Self::Hunan => ("湖南", "hu_nan"),
            Self::Jilin => ("吉林", "ji_lin"),
            Self::Jiangsu => ("江苏", "jiang_su"),
            Self::Jiangxi => ("江西", "jiang_xi"),
            Self::Liaoning => ("辽宁", "liao_ning"),
            Self::InnerMongolia => ("内蒙古", "nei_meng_gu"),
            Self::Ningxia => ("宁夏", "ning_xia"),
            Self::Qinghai => ("青海", "qing_hai"),
            Self::Shandong => ("山东", "shan_dong"),
            Self::Shanxi => ("山西", "shan_xi_1"),
            Self::Shaanxi => ("陕西", "shan_xi_3"),
            Self::Shanghai => ("上海", "shang_hai"),
            Self::Sichuan => ("四川", "si_chuan"),
            Self::Taiwan => ("台湾", "tai_wan"),
            Self::Tianjin => ("天津", "tian_jin"),
            Self::Tibet => ("西藏", "xi_zang"),
            Self::HongKong => ("香港", "xiang_gang"),
            Self::Xinjiang => ("新疆", "xin_jiang"),
            Self::Yunnan => ("云南", "yun_nan"),
            Self::Zhejiang => ("浙江", "zhe_jiang"),
        };
        ProvinceMeta { key, data_file_stem }
    }

    /// Look a province up by any spelling that normalizes to its key.
    pub fn lookup(name: &str) -> Option<Self> {
        let key = normalize_region_name(name);
        PROVINCES_BY_KEY.get(key.as_str()).copied()
    }

    /// Like [`Province::lookup`], but an unknown name is an error.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::UnknownProvince`] when the name does not
    /// belong to any province in the table.
    pub fn require(name: &str) -> Result<Self, RegionError> {
        Self::lookup(name).ok_or_else(|| RegionError::UnknownProvince {
            name: name.to_string(),
        })
    }

    /// Path of the province's city-level dataset under `base`.
    pub fn data_path(self, base: &Path) -> PathBuf {
        base.join(format!("{}.csv", self.meta().data_file_stem))
    }
}

static PROVINCES_BY_KEY: Lazy<HashMap<&'static str, Province>> =
    Lazy::new(|| Province::iter().map(|p| (p.meta().key, p)).collect());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_province_and_city_suffixes() {
        assert_eq!(normalize_region_name("湖北省").as_str(), "湖北");
        assert_eq!(normalize_region_name("武汉市").as_str(), "武汉");
        assert_eq!(normalize_region_name(" 北京市 ").as_str(), "北京");
    }

    #[test]
    fn strips_autonomous_region_qualifiers() {
        assert_eq!(normalize_region_name("广西壮族自治区").as_str(), "广西");
        assert_eq!(normalize_region_name("新疆维吾尔自治区").as_str(), "新疆");
        assert_eq!(normalize_region_name("宁夏回族自治区").as_str(), "宁夏");
        assert_eq!(normalize_region_name("内蒙古自治区").as_str(), "内蒙古");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_region_name("西藏自治区");
        assert_eq!(normalize_region_name(once.as_str()), once);
    }

    #[test]
    fn looks_up_provinces_by_raw_name() {
        assert_eq!(Province::lookup("湖北省"), Some(Province::Hubei));
        assert_eq!(Province::lookup("陕西"), Some(Province::Shaanxi));
        assert_eq!(Province::lookup("山西省"), Some(Province::Shanxi));
        assert_eq!(Province::lookup("武汉"), None);
    }

    #[test]
    fn every_province_key_is_normalized_and_unique() {
        assert_eq!(PROVINCES_BY_KEY.len(), Province::iter().count());
        for p in Province::iter() {
            let key = p.meta().key;
            assert_eq!(normalize_region_name(key).as_str(), key);
        }
    }

    #[test]
    fn unknown_province_is_an_error() {
        let err = Province::require("火星").unwrap_err();
        assert_eq!(err.to_string(), "unknown province: 火星");
    }

    #[test]
    fn builds_province_data_path() {
        let path = Province::Hubei.data_path(Path::new("data/provinces"));
        assert_eq!(path, PathBuf::from("data/provinces/hu_bei.csv"));
    }
}
