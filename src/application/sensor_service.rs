// Sensor service - Lists sensors and keeps the label resolver current
use crate::application::ports::{FetchError, SensorCatalog};
use crate::domain::sensor::Sensor;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Identifier -> user-assigned label. Unresolved identifiers label themselves.
#[derive(Debug, Default)]
pub struct LabelResolver {
    labels: RwLock<HashMap<String, String>>,
}

impl LabelResolver {
    pub fn resolve(&self, id: &str) -> String {
        self.labels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn replace_from(&self, sensors: &[Sensor]) {
        let labels = sensors
            .iter()
            .filter_map(|s| {
                s.label
                    .as_ref()
                    .filter(|l| !l.is_empty())
                    .map(|l| (s.unique_identifier.clone(), l.clone()))
            })
            .collect();
        *self.labels.write().unwrap_or_else(PoisonError::into_inner) = labels;
    }
}

#[derive(Clone)]
pub struct SensorService {
    catalog: Arc<dyn SensorCatalog>,
    labels: Arc<LabelResolver>,
}

impl SensorService {
    pub fn new(catalog: Arc<dyn SensorCatalog>, labels: Arc<LabelResolver>) -> Self {
        Self { catalog, labels }
    }

    pub async fn list_sensors(&self) -> Result<Vec<Sensor>, FetchError> {
        let sensors = self.catalog.list_sensors().await?;
        self.labels.replace_from(&sensors);
        tracing::debug!("Listed {} sensors", sensors.len());
        Ok(sensors)
    }
}
