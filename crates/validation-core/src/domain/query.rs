//! Listing parameters and their resolution into a store filter.
//!
//! `model_id`/`model_alias` and `test_id`/`test_alias` name projects; each
//! is looked up in the catalog and replaced by the set of its instance
//! ids. All keys given for one side are intersected, so the store only
//! ever sees canonical instance-id sets.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use validation_state::{
    CatalogStore, InstanceSet, ProjectKey, ResultFilter, DEFAULT_PAGE_SIZE,
};

use super::error::{Result, ValidationError};
use super::validation::check_page_size;

fn default_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Query string of `GET /results/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultQuery {
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default)]
    pub from_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_code_id: Option<Uuid>,
}

impl Default for ResultQuery {
    fn default() -> Self {
        Self {
            size: DEFAULT_PAGE_SIZE,
            from_index: 0,
            model_id: None,
            model_alias: None,
            model_version_id: None,
            test_id: None,
            test_alias: None,
            test_code_id: None,
        }
    }
}

impl ResultQuery {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        ValidationError::check(check_page_size(self.size).into_iter().collect())
    }

    /// Whether any model-side or test-side key is present.
    pub fn is_filtered(&self) -> bool {
        self.model_id.is_some()
            || self.model_alias.is_some()
            || self.model_version_id.is_some()
            || self.test_id.is_some()
            || self.test_alias.is_some()
            || self.test_code_id.is_some()
    }

    /// Resolve project keys through `catalog` and build the store filter.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Invalid` when `size` exceeds the maximum.
    /// - `ServiceError::NotFound` when a named model or test does not exist.
    pub async fn resolve(&self, catalog: &dyn CatalogStore) -> Result<ResultFilter> {
        self.validate()?;

        let mut filter = ResultFilter::page(self.from_index, self.size);

        let model_keys = project_keys(self.model_id, self.model_alias.as_deref());
        for key in &model_keys {
            let model = catalog.get_model(key).await?;
            debug!(key = %key, instances = model.instances.len(), "resolved model");
            filter = filter.with_model_versions(model.instance_ids());
        }
        if let Some(id) = self.model_version_id {
            filter = filter.with_model_versions(InstanceSet::single(id));
        }

        let test_keys = project_keys(self.test_id, self.test_alias.as_deref());
        for key in &test_keys {
            let test = catalog.get_test(key).await?;
            debug!(key = %key, instances = test.instances.len(), "resolved test");
            filter = filter.with_test_codes(test.instance_ids());
        }
        if let Some(id) = self.test_code_id {
            filter = filter.with_test_codes(InstanceSet::single(id));
        }

        Ok(filter)
    }
}

fn project_keys(id: Option<Uuid>, alias: Option<&str>) -> Vec<ProjectKey> {
    id.map(ProjectKey::Id)
        .into_iter()
        .chain(alias.map(|a| ProjectKey::Alias(a.to_string())))
        .collect()
}
