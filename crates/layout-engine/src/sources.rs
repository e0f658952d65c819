//! Data sources available to expressions.

use std::collections::{BTreeMap, BTreeSet};

use layout_model::FormData;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExprError;

/// Identifiers of the instance the form belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstanceContext {
    pub instance_id: Option<String>,
    pub instance_owner_party_id: Option<String>,
    pub app_id: Option<String>,
    pub instance_owner_party_type: Option<String>,
}

impl InstanceContext {
    /// Looks up a key as used by the `instanceContext` expression function.
    pub fn get(&self, key: &str) -> Result<Option<&str>, ExprError> {
        let value = match key {
            "instanceId" => &self.instance_id,
            "instanceOwnerPartyId" => &self.instance_owner_party_id,
            "appId" => &self.app_id,
            "instanceOwnerPartyType" => &self.instance_owner_party_type,
            other => return Err(ExprError::UnknownInstanceContextKey(other.to_string())),
        };
        Ok(value.as_deref())
    }
}

/// Everything an expression may read while a tree is resolved.
#[derive(Debug, Clone, Default)]
pub struct DataSources {
    pub form_data: FormData,
    pub instance_context: InstanceContext,
    pub application_settings: BTreeMap<String, Value>,
    /// Component ids forced hidden by the host application.
    pub hidden_fields: BTreeSet<String>,
}

impl DataSources {
    pub fn new(form_data: FormData) -> Self {
        Self {
            form_data,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_instance_context(mut self, context: InstanceContext) -> Self {
        self.instance_context = context;
        self
    }

    #[must_use]
    pub fn with_application_settings(mut self, settings: BTreeMap<String, Value>) -> Self {
        self.application_settings = settings;
        self
    }

    #[must_use]
    pub fn with_hidden_fields<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_fields = ids.into_iter().map(Into::into).collect();
        self
    }
}
