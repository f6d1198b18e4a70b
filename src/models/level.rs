use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 学习年级（弗拉芒中学 1-6 年级）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StudyLevel {
    #[default]
    Year1,
    Year2,
    Year3,
    Year4,
    Year5,
    Year6,
}

impl StudyLevel {
    /// 按顺序排列的全部年级
    pub const ALL: [StudyLevel; 6] = [
        StudyLevel::Year1,
        StudyLevel::Year2,
        StudyLevel::Year3,
        StudyLevel::Year4,
        StudyLevel::Year5,
        StudyLevel::Year6,
    ];

    /// 年级序号（1-6）
    pub fn number(self) -> u8 {
        match self {
            StudyLevel::Year1 => 1,
            StudyLevel::Year2 => 2,
            StudyLevel::Year3 => 3,
            StudyLevel::Year4 => 4,
            StudyLevel::Year5 => 5,
            StudyLevel::Year6 => 6,
        }
    }

    /// 提示词中使用的荷兰语名称
    pub fn label(self) -> &'static str {
        match self {
            StudyLevel::Year1 => "1ste middelbaar",
            StudyLevel::Year2 => "2ste middelbaar",
            StudyLevel::Year3 => "3ste middelbaar",
            StudyLevel::Year4 => "4ste middelbaar",
            StudyLevel::Year5 => "5ste middelbaar",
            StudyLevel::Year6 => "6ste middelbaar",
        }
    }

    /// 从序号解析
    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }
}

impl fmt::Display for StudyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for StudyLevel {
    type Err = String;

    /// 支持 "3"、"year3"、"YEAR_3" 以及 "3de middelbaar" 等写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-', ' '], "");

        let mut rest = normalized.as_str();
        rest = rest.strip_prefix("year").unwrap_or(rest);
        rest = rest.strip_suffix("middelbaar").unwrap_or(rest);
        let ordinal = rest;
        rest = ordinal
            .strip_suffix("ste")
            .or_else(|| ordinal.strip_suffix("de"))
            .unwrap_or(ordinal);

        if let Some(level) = rest.parse::<u8>().ok().and_then(Self::from_number) {
            return Ok(level);
        }

        Err(format!("无法解析年级: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(StudyLevel::Year1 < StudyLevel::Year6);
        let numbers: Vec<u8> = StudyLevel::ALL.iter().map(|l| l.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_parse_level_variants() {
        assert_eq!("3".parse::<StudyLevel>().unwrap(), StudyLevel::Year3);
        assert_eq!("year5".parse::<StudyLevel>().unwrap(), StudyLevel::Year5);
        assert_eq!("YEAR_2".parse::<StudyLevel>().unwrap(), StudyLevel::Year2);
        assert_eq!("1ste middelbaar".parse::<StudyLevel>().unwrap(), StudyLevel::Year1);
        assert_eq!("6de middelbaar".parse::<StudyLevel>().unwrap(), StudyLevel::Year6);
    }

    #[test]
    fn test_labels_use_ste_suffix_and_parse_back() {
        assert_eq!(StudyLevel::Year2.label(), "2ste middelbaar");
        assert_eq!(StudyLevel::Year6.label(), "6ste middelbaar");
        for level in StudyLevel::ALL {
            assert_eq!(level.label().parse::<StudyLevel>().unwrap(), level);
        }
    }

    #[test]
    fn test_parse_level_rejects_out_of_range() {
        assert!("0".parse::<StudyLevel>().is_err());
        assert!("7".parse::<StudyLevel>().is_err());
        assert!("12".parse::<StudyLevel>().is_err());
        assert!("hoger".parse::<StudyLevel>().is_err());
    }
}
