// Prediction domain models
use serde::Serialize;

/// Predicted indoor humidity for one selected sensor, for tomorrow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorPrediction {
    pub unique_identifier: String,
    pub label: String,
    pub value: f64,
}

/// The "predictions for tomorrow" panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predictions {
    /// Selected sensors that have a prediction, in selection order.
    pub sensors: Vec<SensorPrediction>,
    pub tomorrow_outdoor_humidity: Option<f64>,
}
