use std::sync::Mutex;

use async_trait::async_trait;
use common::{Error, Result};
use mongodb::bson::Document;

use super::{PlanOutput, RestaurantStore};
use crate::query::QueryPlan;

/// Canned store for unit tests. Records every plan it is asked to run.
#[derive(Default)]
pub struct FakeStore {
    pub output: PlanOutput,
    pub sample: Option<Document>,
    pub boroughs: Vec<String>,
    pub cuisines: Vec<String>,
    pub failure: Option<String>,
    pub plans: Mutex<Vec<QueryPlan>>,
}

impl FakeStore {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn recorded_plans(&self) -> Vec<QueryPlan> {
        self.plans.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(Error::Other(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RestaurantStore for FakeStore {
    async fn ping(&self) -> Result<()> {
        self.check()
    }

    async fn count_all(&self) -> Result<u64> {
        self.check()?;
        Ok(self.output.total)
    }

    async fn find_one(&self) -> Result<Option<Document>> {
        self.check()?;
        Ok(self.sample.clone())
    }

    async fn distinct_strings(&self, field: &str) -> Result<Vec<String>> {
        self.check()?;
        Ok(match field {
            "borough" => self.boroughs.clone(),
            "cuisine" => self.cuisines.clone(),
            _ => Vec::new(),
        })
    }

    async fn execute(&self, plan: &QueryPlan) -> Result<PlanOutput> {
        self.plans.lock().unwrap().push(plan.clone());
        self.check()?;
        Ok(self.output.clone())
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        self.check()?;
        Ok(vec!["admin".into(), "restaurant_db".into()])
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        self.check()?;
        Ok(vec!["restaurants".into()])
    }

    fn database_name(&self) -> &str {
        "restaurant_db"
    }

    fn collection_name(&self) -> &str {
        "restaurants"
    }
}
