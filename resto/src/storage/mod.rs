pub mod mongo;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use common::Result;
use mongodb::bson::Document;

use crate::query::QueryPlan;

pub use mongo::MongoStore;

/// Documents for one page plus the size of the whole matching set.
#[derive(Debug, Clone, Default)]
pub struct PlanOutput {
    pub total: u64,
    pub documents: Vec<Document>,
}

/// Read-only access to the restaurant collection.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn ping(&self) -> Result<()>;
    async fn count_all(&self) -> Result<u64>;
    async fn find_one(&self) -> Result<Option<Document>>;
    /// Distinct string values of `field`; non-string values are skipped.
    async fn distinct_strings(&self, field: &str) -> Result<Vec<String>>;
    async fn execute(&self, plan: &QueryPlan) -> Result<PlanOutput>;
    async fn list_databases(&self) -> Result<Vec<String>>;
    async fn list_collections(&self) -> Result<Vec<String>>;
    fn database_name(&self) -> &str;
    fn collection_name(&self) -> &str;
}
