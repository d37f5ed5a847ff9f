use std::sync::Arc;

use common::{Error, Result};
use mongodb::bson::Document;
use tracing::{debug, info};

use crate::api::models::{CountInfo, DebugInfo, FilterOptions, PageMeta, PingInfo, SampleInfo};
use crate::query::{QueryPlan, QuerySpec, RestaurantRow};
use crate::storage::RestaurantStore;

pub const AVAILABLE_ACTIONS: [&str; 6] = [
    "ping",
    "count",
    "sample",
    "debug-info",
    "filter-options",
    "restaurants",
];

const NOT_AVAILABLE: &str = "N/A";

/// One page of restaurants with its pagination metadata.
#[derive(Debug)]
pub struct RestaurantPage {
    pub rows: Vec<RestaurantRow>,
    pub meta: PageMeta,
}

pub struct RestaurantService {
    store: Arc<dyn RestaurantStore>,
}

impl RestaurantService {
    pub fn new(store: Arc<dyn RestaurantStore>) -> Self {
        Self { store }
    }

    pub async fn search(&self, spec: &QuerySpec) -> Result<RestaurantPage> {
        let plan = QueryPlan::build(spec);
        debug!(?spec, "Executing restaurant query");

        let output = self
            .store
            .execute(&plan)
            .await
            .map_err(|e| e.context("Error getting restaurants"))?;

        let rows: Vec<RestaurantRow> = output
            .documents
            .into_iter()
            .map(RestaurantRow::from_document)
            .collect();

        info!(
            total = output.total,
            returned = rows.len(),
            page = spec.page,
            "Restaurant query served"
        );

        Ok(RestaurantPage {
            rows,
            meta: PageMeta::new(spec, output.total),
        })
    }

    pub async fn ping(&self) -> Result<PingInfo> {
        self.store
            .ping()
            .await
            .map_err(|e| e.context("Error pinging database"))?;

        Ok(PingInfo {
            message: "Database connection successful".to_string(),
        })
    }

    pub async fn count(&self) -> Result<CountInfo> {
        let total_restaurants = self
            .store
            .count_all()
            .await
            .map_err(|e| e.context("Error counting restaurants"))?;

        Ok(CountInfo { total_restaurants })
    }

    pub async fn sample(&self) -> Result<SampleInfo> {
        let sample = self
            .store
            .find_one()
            .await
            .map_err(|e| e.context("Error getting sample"))?
            .ok_or_else(|| Error::NotFound("No restaurants found in collection".to_string()))?;

        Ok(SampleInfo {
            name: string_or_na(&sample, "name"),
            borough: string_or_na(&sample, "borough"),
            cuisine: string_or_na(&sample, "cuisine"),
            restaurant_id: string_or_na(&sample, "restaurant_id"),
        })
    }

    pub async fn filter_options(&self) -> Result<FilterOptions> {
        let load = |field: &'static str| async move {
            let mut values = self.store.distinct_strings(field).await?;
            values.retain(|v| !v.is_empty());
            values.sort();
            values.dedup();
            Ok::<_, Error>(values)
        };

        let (boroughs, cuisines) = futures::try_join!(load("borough"), load("cuisine"))
            .map_err(|e| e.context("Error getting filter options"))?;

        Ok(FilterOptions { boroughs, cuisines })
    }

    pub async fn debug_info(&self) -> Result<DebugInfo> {
        let gather = async {
            let available_databases = self.store.list_databases().await?;
            let collections_in_database = self.store.list_collections().await?;
            let restaurant_count = self.store.count_all().await?;
            let sample = self.store.find_one().await?;

            Ok::<_, Error>(DebugInfo {
                available_databases,
                collections_in_database,
                restaurant_count,
                sample_borough: sample
                    .as_ref()
                    .map(|doc| string_or_na(doc, "borough"))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                database_used: self.store.database_name().to_string(),
                collection_used: self.store.collection_name().to_string(),
                available_actions: AVAILABLE_ACTIONS.iter().map(|a| a.to_string()).collect(),
            })
        };

        gather.await.map_err(|e| e.context("Debug error"))
    }
}

fn string_or_na(doc: &Document, key: &str) -> String {
    doc.get_str(key).unwrap_or(NOT_AVAILABLE).to_string()
}
