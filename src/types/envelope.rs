//! Response envelope types.
//!
//! Every endpoint wraps its payload as `{ success, message?, data }`;
//! paginated admin resources add a `meta` block.

use serde::{Deserialize, Serialize};

/// Standard response wrapper used by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

/// Pagination metadata attached to admin list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

