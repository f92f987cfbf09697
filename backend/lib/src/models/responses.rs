use serde::Serialize;

use super::{shop::Shop, stats::GroupCounts};

#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub message: String,
    pub version: String,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shops_count: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: String,
    pub shops_count: u64,
    pub database: String,
}

/// Result of a keyword search.
///
/// `count` is the number of entries in `results`, i.e. after `limit` was
/// applied, not the number of matching records.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub category: Option<String>,
    pub count: usize,
    pub results: Vec<Shop>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: u64,
    pub by_category: GroupCounts,
    pub by_type: GroupCounts,
}
