use async_trait::async_trait;
use common::config::MongoConfig;
use common::{Error, Result};
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use tracing::{debug, info};

use super::{PlanOutput, RestaurantStore};
use crate::query::QueryPlan;
use crate::utils::bson::bson_to_u64;

/// Restaurant collection backed by a MongoDB deployment.
///
/// The client owns the driver's connection pool; every operation checks a
/// connection out and hands it back when the operation completes.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: String,
    collection: Collection<Document>,
}

impl MongoStore {
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(config.app_name.clone());
        options.connect_timeout = Some(config.connect_timeout());
        options.server_selection_timeout = Some(config.server_selection_timeout());

        let client = Client::with_options(options)?;
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);

        info!(
            database = %config.database,
            collection = %config.collection,
            "MongoDB client initialized"
        );

        Ok(Self {
            client,
            database: config.database.clone(),
            collection,
        })
    }
}

#[async_trait]
impl RestaurantStore for MongoStore {
    async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn count_all(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn find_one(&self) -> Result<Option<Document>> {
        Ok(self.collection.find_one(doc! {}).await?)
    }

    async fn distinct_strings(&self, field: &str) -> Result<Vec<String>> {
        let values = self.collection.distinct(field, doc! {}).await?;

        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    async fn execute(&self, plan: &QueryPlan) -> Result<PlanOutput> {
        match plan {
            QueryPlan::Find {
                filter,
                sort,
                skip,
                limit,
            } => {
                debug!(%filter, %sort, skip, limit, "Running find");

                let total = self.collection.count_documents(filter.clone()).await?;
                let documents: Vec<Document> = self
                    .collection
                    .find(filter.clone())
                    .sort(sort.clone())
                    .skip(*skip)
                    .limit(*limit)
                    .await?
                    .try_collect()
                    .await?;

                Ok(PlanOutput { total, documents })
            }
            QueryPlan::Aggregate {
                count_pipeline,
                page_pipeline,
            } => {
                debug!(stages = page_pipeline.len(), "Running aggregation");

                let mut counts = self.collection.aggregate(count_pipeline.clone()).await?;
                let total = match counts.try_next().await? {
                    Some(row) => row
                        .get("total")
                        .and_then(bson_to_u64)
                        .ok_or_else(|| Error::Bson(format!("unexpected count result: {row}")))?,
                    None => 0,
                };

                let documents: Vec<Document> = self
                    .collection
                    .aggregate(page_pipeline.clone())
                    .await?
                    .try_collect()
                    .await?;

                Ok(PlanOutput { total, documents })
            }
        }
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        Ok(self.client.list_database_names().await?)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        Ok(self
            .client
            .database(&self.database)
            .list_collection_names()
            .await?)
    }

    fn database_name(&self) -> &str {
        &self.database
    }

    fn collection_name(&self) -> &str {
        self.collection.name()
    }
}
