//! Load model inference via ONNX Runtime.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;

use crate::features::FEATURE_COUNT;
use crate::types::{FeatureVector, ForecastError, ForecastResult};

/// A trained regressor mapping feature rows to load values, one per row.
pub trait LoadModel: Send + Sync {
    fn predict(&self, features: &[FeatureVector]) -> ForecastResult<Vec<f64>>;
}

impl<F> LoadModel for F
where
    F: Fn(&[FeatureVector]) -> Vec<f64> + Send + Sync,
{
    fn predict(&self, features: &[FeatureVector]) -> ForecastResult<Vec<f64>> {
        Ok(self(features))
    }
}

/// Regressor exported to ONNX, taking a `[n, 14]` float tensor.
pub struct OnnxLoadModel {
    session: Mutex<Session>,
}

impl OnnxLoadModel {
    /// Load the model once at startup; the session is shared across requests.
    pub fn load(path: &Path) -> ForecastResult<Self> {
        if !path.exists() {
            return Err(ForecastError::ModelNotAvailable(format!(
                "no model file at {}",
                path.display()
            )));
        }

        tracing::info!("Loading load model from {}", path.display());

        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| ForecastError::Model(format!("Failed to load ONNX model: {e}")))?;

        tracing::info!("Load model ready");
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl LoadModel for OnnxLoadModel {
    fn predict(&self, features: &[FeatureVector]) -> ForecastResult<Vec<f64>> {
        if features.is_empty() {
            return Ok(Vec::new());
        }

        let mut input = Array2::<f32>::zeros((features.len(), FEATURE_COUNT));
        for (mut row, f) in input.rows_mut().into_iter().zip(features) {
            for (cell, value) in row.iter_mut().zip(f.to_row()) {
                *cell = value;
            }
        }

        let input_tensor = Tensor::from_array(input)
            .map_err(|e| ForecastError::Model(format!("Failed to create input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ForecastError::Model("model session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ForecastError::Model(format!("ONNX inference failed: {e}")))?;

        // Regressors export either [n] or [n, 1]; both flatten to one value per row.
        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ForecastError::Model(format!("Failed to extract output: {e}")))?;

        let predictions: Vec<f64> = data.iter().map(|&v| v as f64).collect();
        if predictions.len() != features.len() {
            return Err(ForecastError::PredictionLength {
                expected: features.len(),
                actual: predictions.len(),
            });
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxLoadModel::load(&dir.path().join("model.onnx"))
            .err()
            .expect("load should fail");
        assert!(matches!(err, ForecastError::ModelNotAvailable(_)));
    }

    #[test]
    fn test_closure_as_model() {
        let model = |rows: &[FeatureVector]| -> Vec<f64> {
            rows.iter().map(|f| f.temperature * 2.0).collect()
        };
        let row = FeatureVector {
            temperature: 4.0,
            dew_point: 0.0,
            year: 2024,
            month_sin: 0.0,
            month_cos: 1.0,
            weekday_sin: 0.0,
            weekday_cos: 1.0,
            hour_sin: 0.0,
            hour_cos: 1.0,
            week_sin: 0.0,
            week_cos: 1.0,
            day_sin: 0.0,
            day_cos: 1.0,
            is_special_day: false,
        };
        assert_eq!(LoadModel::predict(&model, &[row, row]).unwrap(), vec![8.0, 8.0]);
    }
}
