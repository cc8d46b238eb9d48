//! Grouping dimensions, query granularity and composite grouping keys.
//!
//! A grouping key identifies one cost-breakdown bucket. Multi-dimension
//! breakdowns (for example service plus a cost-allocation tag) join the
//! ordered dimension values with [`GROUP_KEY_DELIMITER`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delimiter placed between dimension values in a composite key.
pub const GROUP_KEY_DELIMITER: &str = " | ";

/// Key assigned to a group that carries no dimension values.
pub const UNKNOWN_GROUP_KEY: &str = "Unknown";

/// Separator between a tag key and its value in billing tag dimensions.
pub const TAG_VALUE_SEPARATOR: char = '$';

/// Build a composite grouping key from ordered dimension values.
pub fn build_group_key<S: AsRef<str>>(values: &[S]) -> String {
    if values.is_empty() {
        return UNKNOWN_GROUP_KEY.to_string();
    }
    values.iter().map(|v| v.as_ref()).collect::<Vec<&str>>().join(GROUP_KEY_DELIMITER)
}

/// Render a tag dimension value the way the billing API reports it (`key$value`).
pub fn tag_dimension_value(tag_key: &str, value: Option<&str>) -> String {
    format!("{}{}{}", tag_key, TAG_VALUE_SEPARATOR, value.unwrap_or(""))
}

/// Billing dimension used to break costs down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// AWS service name.
    Service,
    /// Member account id.
    LinkedAccount,
    /// AWS region code.
    Region,
    /// Usage type identifier.
    UsageType,
}

impl GroupBy {
    /// Dimension name understood by the billing API.
    pub fn dimension(&self) -> &'static str {
        match self {
            GroupBy::Service => "SERVICE",
            GroupBy::LinkedAccount => "LINKED_ACCOUNT",
            GroupBy::Region => "REGION",
            GroupBy::UsageType => "USAGE_TYPE",
        }
    }

    /// Command-line spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Service => "service",
            GroupBy::LinkedAccount => "linked_account",
            GroupBy::Region => "region",
            GroupBy::UsageType => "usage_type",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "service" => Ok(GroupBy::Service),
            "linked_account" => Ok(GroupBy::LinkedAccount),
            "region" => Ok(GroupBy::Region),
            "usage_type" => Ok(GroupBy::UsageType),
            _ => Err(Error::UnsupportedDimension(s.to_string())),
        }
    }
}

/// Time bucket size for billing queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Granularity {
    /// One bucket per UTC day.
    #[default]
    Daily,
    /// One bucket per hour.
    Hourly,
}

impl Granularity {
    /// API spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "DAILY",
            Granularity::Hourly => "HOURLY",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "DAILY" => Ok(Granularity::Daily),
            "HOURLY" => Ok(Granularity::Hourly),
            _ => Err(Error::InvalidGranularity(s.to_string())),
        }
    }
}
