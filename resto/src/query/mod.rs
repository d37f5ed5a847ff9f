//! Turns request parameters into a MongoDB query plan.
//!
//! A [`QuerySpec`] is the normalized, request-scoped input. [`QueryPlan::build`]
//! lowers it to either a plain `find` (count + page) or, when a score threshold
//! is requested, an aggregation that resolves each restaurant's latest grade
//! before filtering, counting and paginating over that derived set.

pub mod filter;
pub mod row;

use mongodb::bson::{doc, Document};
use serde::Serialize;

use crate::api::models::RestaurantQueryParams;
use crate::utils::params::{coerce_int, coerce_score, non_empty};

pub use filter::{build_filter, latest_grade_stages};
pub use row::{Address, GradeRow, RestaurantRow};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 50;
pub const MAX_LIMIT: u64 = 100;
pub const DEFAULT_SORT_FIELD: &str = "name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(dir) if dir.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Field paths that would be read as operators, or that the server rejects,
    /// fall back to sorting by name.
    pub fn new(field: Option<&str>, direction: Option<&str>) -> Self {
        let column = match field.map(str::trim) {
            Some(f) if !f.is_empty() && !f.starts_with('$') && !f.contains('\0') => f.to_string(),
            _ => DEFAULT_SORT_FIELD.to_string(),
        };

        Self {
            column,
            direction: SortDirection::parse(direction),
        }
    }

    /// Sort document with `_id` appended as a tiebreaker so pages never overlap.
    pub fn to_document(&self) -> Document {
        let mut sort = Document::new();
        sort.insert(self.column.clone(), self.direction.as_i32());
        if self.column != "_id" {
            sort.insert("_id", 1);
        }
        sort
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub search: Option<String>,
    pub borough: Option<String>,
    pub cuisine: Option<String>,
    pub max_score: Option<f64>,
    pub sort: SortSpec,
    pub page: u64,
    pub limit: u64,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            search: None,
            borough: None,
            cuisine: None,
            max_score: None,
            sort: SortSpec::new(None, None),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl QuerySpec {
    pub fn from_params(params: &RestaurantQueryParams) -> Self {
        let page = coerce_int(params.page.as_deref())
            .map(|p| p.max(1) as u64)
            .unwrap_or(DEFAULT_PAGE);

        let limit = coerce_int(params.limit.as_deref())
            .map(|l| l.clamp(1, MAX_LIMIT as i64) as u64)
            .unwrap_or(DEFAULT_LIMIT);

        Self {
            search: non_empty(params.search.as_deref()),
            borough: non_empty(params.borough.as_deref()),
            cuisine: non_empty(params.cuisine.as_deref()),
            max_score: coerce_score(params.max_score.as_deref()),
            sort: SortSpec::new(params.sort_by.as_deref(), params.sort_dir.as_deref()),
            page,
            limit,
        }
    }

    /// Documents to skip before this page, capped at `i64::MAX` (the server
    /// reads skip as a signed 64-bit integer).
    pub fn skip(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    Find {
        filter: Document,
        sort: Document,
        skip: u64,
        limit: i64,
    },
    Aggregate {
        count_pipeline: Vec<Document>,
        page_pipeline: Vec<Document>,
    },
}

impl QueryPlan {
    pub fn build(spec: &QuerySpec) -> Self {
        let filter = build_filter(spec);
        let sort = spec.sort.to_document();
        let limit = spec.limit.clamp(1, MAX_LIMIT) as i64;

        match spec.max_score {
            None => QueryPlan::Find {
                filter,
                sort,
                skip: spec.skip(),
                limit,
            },
            Some(max_score) => {
                let stages = latest_grade_stages(filter, max_score);

                let mut count_pipeline = stages.clone();
                count_pipeline.push(doc! { "$count": "total" });

                let skip = spec.skip() as i64;
                let mut page_pipeline = stages;
                page_pipeline.push(doc! { "$sort": sort });
                page_pipeline.push(doc! { "$skip": skip });
                page_pipeline.push(doc! { "$limit": limit });

                QueryPlan::Aggregate {
                    count_pipeline,
                    page_pipeline,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RestaurantQueryParams {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RestaurantQueryParams::from_pairs(&pairs)
    }

    #[test]
    fn test_defaults() {
        let spec = QuerySpec::from_params(&RestaurantQueryParams::default());
        assert_eq!(spec, QuerySpec::default());
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, 50);
        assert_eq!(spec.sort.column, "name");
        assert_eq!(spec.sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_page_and_limit_are_normalized() {
        let spec = QuerySpec::from_params(&params(&[("page", "-1"), ("limit", "999")]));
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, 100);

        let spec = QuerySpec::from_params(&params(&[("page", "0"), ("limit", "0")]));
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, 1);

        let spec = QuerySpec::from_params(&params(&[("page", "abc"), ("limit", "xyz")]));
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, 50);

        let spec = QuerySpec::from_params(&params(&[("page", "3"), ("limit", "25")]));
        assert_eq!(spec.page, 3);
        assert_eq!(spec.limit, 25);
        assert_eq!(spec.skip(), 50);
    }

    #[test]
    fn test_skip_saturates_on_huge_pages() {
        let spec = QuerySpec::from_params(&params(&[("page", "9223372036854775807"), ("limit", "100")]));
        assert_eq!(spec.skip(), i64::MAX as u64);

        let spec = QuerySpec::from_params(&params(&[("page", "100000000000000000"), ("limit", "100")]));
        assert_eq!(spec.skip(), i64::MAX as u64);
        assert!(matches!(
            QueryPlan::build(&spec),
            QueryPlan::Find { skip, limit: 100, .. } if skip == i64::MAX as u64
        ));

        match QueryPlan::build(&QuerySpec { max_score: Some(5.0), ..spec }) {
            QueryPlan::Aggregate { page_pipeline, .. } => {
                assert_eq!(page_pipeline[4], doc! { "$skip": i64::MAX });
            }
            other => panic!("expected aggregate plan, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_for_hand_built_spec_stays_in_range() {
        let spec = QuerySpec {
            page: 0,
            limit: 0,
            ..QuerySpec::default()
        };
        assert_eq!(spec.skip(), 0);
        assert!(matches!(
            QueryPlan::build(&spec),
            QueryPlan::Find { skip: 0, limit: 1, .. }
        ));
    }

    #[test]
    fn test_invalid_max_score_is_ignored() {
        let spec = QuerySpec::from_params(&params(&[("max_score", "abc")]));
        assert_eq!(spec.max_score, None);
        assert!(matches!(QueryPlan::build(&spec), QueryPlan::Find { .. }));
    }

    #[test]
    fn test_sort_spec() {
        let sort = SortSpec::new(Some("borough"), Some("desc"));
        assert_eq!(sort.to_document(), doc! { "borough": -1, "_id": 1 });

        let sort = SortSpec::new(Some("$where"), Some("sideways"));
        assert_eq!(sort.column, "name");
        assert_eq!(sort.direction, SortDirection::Asc);

        let sort = SortSpec::new(Some(""), None);
        assert_eq!(sort.column, "name");

        let sort = SortSpec::new(Some("name"), Some("DESC"));
        assert_eq!(sort.direction, SortDirection::Desc);
        assert_eq!(sort.to_document(), doc! { "name": -1, "_id": 1 });

        assert_eq!(SortSpec::new(None, Some(" Desc ")).direction, SortDirection::Desc);

        let sort = SortSpec::new(Some("_id"), Some("desc"));
        assert_eq!(sort.to_document(), doc! { "_id": -1 });
    }

    #[test]
    fn test_find_plan_without_score() {
        let spec = QuerySpec::from_params(&params(&[
            ("borough", "Manhattan"),
            ("page", "2"),
            ("limit", "5"),
        ]));

        assert_eq!(
            QueryPlan::build(&spec),
            QueryPlan::Find {
                filter: doc! { "borough": "Manhattan" },
                sort: doc! { "name": 1, "_id": 1 },
                skip: 5,
                limit: 5,
            }
        );
    }

    #[test]
    fn test_aggregate_plan_counts_and_pages_the_same_stages() {
        let spec = QuerySpec::from_params(&params(&[
            ("cuisine", "Italian"),
            ("max_score", "20"),
            ("sort_by", "cuisine"),
            ("sort_dir", "desc"),
            ("page", "3"),
            ("limit", "10"),
        ]));

        let QueryPlan::Aggregate {
            count_pipeline,
            page_pipeline,
        } = QueryPlan::build(&spec)
        else {
            panic!("expected aggregate plan");
        };

        let stages = latest_grade_stages(doc! { "cuisine": "Italian" }, 20.0);
        assert_eq!(count_pipeline[..3], stages[..]);
        assert_eq!(page_pipeline[..3], stages[..]);

        assert_eq!(count_pipeline.len(), 4);
        assert_eq!(count_pipeline[3], doc! { "$count": "total" });

        assert_eq!(page_pipeline.len(), 6);
        assert_eq!(page_pipeline[3], doc! { "$sort": { "cuisine": -1, "_id": 1 } });
        assert_eq!(page_pipeline[4], doc! { "$skip": 20_i64 });
        assert_eq!(page_pipeline[5], doc! { "$limit": 10_i64 });
    }
}
