//! Model catalog: the `provider -> model -> endpoint` mapping the monitor probes.
//!
//! The catalog is loaded wholesale from JSON and keeps the document's key
//! order, which fixes the order of every sweep:
//!
//! ```rust
//! use pulse::catalog::ModelsConfig;
//!
//! let json = r#"{
//!     "openai": {"gpt-4o": {"url": "https://api.openai.com", "model": "gpt-4o", "access_token": "sk-1"}},
//!     "anthropic": {"haiku": {"url": "https://api.example.com", "model": "haiku", "access_token": "t"}}
//! }"#;
//! let config = ModelsConfig::from_json(json).unwrap();
//! let names: Vec<_> = config.providers().iter().map(|p| p.name.as_str()).collect();
//! assert_eq!(names, ["openai", "anthropic"]);
//! ```

mod endpoint;
mod error;
pub mod store;

pub use endpoint::*;
pub use error::*;
pub use store::{
    load_static_file, load_with_fallback, ConfigSource, ConfigStore, FileConfigStore, LoadedConfig,
    MemoryConfigStore, PERSISTED_CONFIG_KEY,
};

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// A named model inside a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredModel {
    pub name: String,
    pub endpoint: ModelEndpoint,
}

/// A named group of model endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub name: String,
    pub models: Vec<ConfiguredModel>,
}

/// Ordered `provider -> model -> endpoint` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelsConfig {
    providers: Vec<Provider>,
}

impl ModelsConfig {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ModelsConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize back to pretty JSON, preserving order.
    pub fn to_json_pretty(&self) -> Result<String, ModelsConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Insert or replace a model. New providers and models are appended.
    pub fn insert(&mut self, provider: &str, model: &str, endpoint: ModelEndpoint) {
        let index = match self.providers.iter().position(|p| p.name == provider) {
            Some(i) => i,
            None => {
                self.providers.push(Provider {
                    name: provider.to_string(),
                    models: Vec::new(),
                });
                self.providers.len() - 1
            }
        };
        let models = &mut self.providers[index].models;
        match models.iter_mut().find(|m| m.name == model) {
            Some(existing) => existing.endpoint = endpoint,
            None => models.push(ConfiguredModel {
                name: model.to_string(),
                endpoint,
            }),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_model(mut self, provider: &str, model: &str, endpoint: ModelEndpoint) -> Self {
        self.insert(provider, model, endpoint);
        self
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Every `(provider, model)` pair in provider-then-model order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ConfiguredModel)> {
        self.providers
            .iter()
            .flat_map(|p| p.models.iter().map(move |m| (p.name.as_str(), m)))
    }

    pub fn get(&self, provider: &str, model: &str) -> Option<&ModelEndpoint> {
        self.providers
            .iter()
            .find(|p| p.name == provider)?
            .models
            .iter()
            .find(|m| m.name == model)
            .map(|m| &m.endpoint)
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub fn model_count(&self) -> usize {
        self.providers.iter().map(|p| p.models.len()).sum()
    }

    /// True when there is nothing to probe.
    pub fn is_empty(&self) -> bool {
        self.model_count() == 0
    }

    /// Copy with every access token masked.
    pub fn masked(&self) -> Self {
        Self {
            providers: self
                .providers
                .iter()
                .map(|p| Provider {
                    name: p.name.clone(),
                    models: p
                        .models
                        .iter()
                        .map(|m| ConfiguredModel {
                            name: m.name.clone(),
                            endpoint: m.endpoint.masked(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// JSON object decoded into a vector of entries in document order.
///
/// A repeated key keeps its first position and takes the last value.
struct OrderedEntries<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, V)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    match entries.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value,
                        None => entries.push((key, value)),
                    }
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl<'de> Deserialize<'de> for ModelsConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let OrderedEntries(providers) =
            OrderedEntries::<OrderedEntries<ModelEndpoint>>::deserialize(deserializer)?;
        Ok(Self {
            providers: providers
                .into_iter()
                .map(|(name, OrderedEntries(models))| Provider {
                    name,
                    models: models
                        .into_iter()
                        .map(|(name, endpoint)| ConfiguredModel { name, endpoint })
                        .collect(),
                })
                .collect(),
        })
    }
}

impl Serialize for Provider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.models.len()))?;
        for model in &self.models {
            map.serialize_entry(&model.name, &model.endpoint)?;
        }
        map.end()
    }
}

impl Serialize for ModelsConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.providers.len()))?;
        for provider in &self.providers {
            map.serialize_entry(&provider.name, provider)?;
        }
        map.end()
    }
}
