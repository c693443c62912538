//! AWS IP range feed: document model, fetching and region filtering.

pub mod client;

pub use client::{HttpIpRangeSource, IpRangeSource};

use serde::Deserialize;

/// Public endpoint publishing AWS's IP address ranges.
pub const AWS_IP_RANGES_URL: &str = "https://ip-ranges.amazonaws.com/ip-ranges.json";

/// Service tag covering the whole of Amazon's address space in a region.
pub const AMAZON_SERVICE: &str = "AMAZON";

/// The `ip-ranges.json` document. Only IPv4 prefixes are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct IpRangeFeed {
    #[serde(rename = "syncToken", default)]
    pub sync_token: Option<String>,
    #[serde(rename = "createDate", default)]
    pub create_date: Option<String>,
    pub prefixes: Vec<IpPrefixEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IpPrefixEntry {
    pub ip_prefix: String,
    pub region: String,
    pub service: String,
    #[serde(default)]
    pub network_border_group: Option<String>,
}

impl IpRangeFeed {
    /// CIDRs tagged `AMAZON` in `region`, in feed order.
    ///
    /// Duplicates are kept and nothing is sorted; an empty result is valid.
    pub fn region_cidrs(&self, region: &str) -> Vec<String> {
        self.prefixes
            .iter()
            .filter(|entry| entry.service == AMAZON_SERVICE && entry.region == region)
            .map(|entry| entry.ip_prefix.clone())
            .collect()
    }
}
