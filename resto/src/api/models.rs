use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::query::{QuerySpec, SortSpec};

// Request models

/// Raw restaurant query parameters. Everything arrives as text and is
/// normalized by [`QuerySpec::from_params`], so a malformed value never
/// rejects the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestaurantQueryParams {
    pub search: Option<String>,
    pub borough: Option<String>,
    pub cuisine: Option<String>,
    pub max_score: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl RestaurantQueryParams {
    /// Builds params from decoded query pairs. A repeated key keeps its last
    /// value and unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut params = Self::default();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "search" => &mut params.search,
                "borough" => &mut params.borough,
                "cuisine" => &mut params.cuisine,
                "max_score" => &mut params.max_score,
                "sort_by" => &mut params.sort_by,
                "sort_dir" => &mut params.sort_dir,
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                _ => continue,
            };
            *slot = Some(value.clone());
        }

        params
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
}

impl ActionQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            action: pairs
                .iter()
                .rev()
                .find(|(key, _)| key == "action")
                .map(|(_, value)| value.clone()),
        }
    }
}

// Response models
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub meta: Option<PageMeta>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: None,
            timestamp: timestamp(),
        }
    }

    pub fn paginated(data: T, meta: PageMeta) -> Self {
        Self {
            meta: Some(meta),
            ..Self::success(data)
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            meta: None,
            timestamp: timestamp(),
        }
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMeta {
    pub total_count: u64,
    pub current_page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub filters_applied: FiltersApplied,
    pub sort: SortSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiltersApplied {
    pub search: String,
    pub borough: String,
    pub cuisine: String,
    pub max_score: Option<f64>,
}

impl PageMeta {
    pub fn new(spec: &QuerySpec, total_count: u64) -> Self {
        let per_page = spec.limit.max(1);
        let current_page = spec.page.max(1);
        let total_pages = total_count.div_ceil(per_page);

        Self {
            total_count,
            current_page,
            per_page,
            total_pages,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
            filters_applied: FiltersApplied {
                search: spec.search.clone().unwrap_or_default(),
                borough: spec.borough.clone().unwrap_or_default(),
                cuisine: spec.cuisine.clone().unwrap_or_default(),
                max_score: spec.max_score,
            },
            sort: spec.sort.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PingInfo {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CountInfo {
    pub total_restaurants: u64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct SampleInfo {
    pub name: String,
    pub borough: String,
    pub cuisine: String,
    pub restaurant_id: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct FilterOptions {
    pub boroughs: Vec<String>,
    pub cuisines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DebugInfo {
    pub available_databases: Vec<String>,
    pub collections_in_database: Vec<String>,
    pub restaurant_count: u64,
    pub sample_borough: String,
    pub database_used: String,
    pub collection_used: String,
    pub available_actions: Vec<String>,
}
