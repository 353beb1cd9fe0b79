use serde::Serialize;

use crate::error::{PredictorError, Result};

/// Point-estimate regression metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionMetrics {
    pub count: usize,
    pub rmse: f64,
    pub mae: f64,
    /// Coefficient of determination; 0.0 when the labels are constant
    pub r2: f64,
}

impl RegressionMetrics {
    pub fn compute(predictions: &[f64], labels: &[f64]) -> Result<Self> {
        if predictions.len() != labels.len() {
            return Err(PredictorError::Validation(format!(
                "{} predictions for {} labels",
                predictions.len(),
                labels.len()
            )));
        }
        if labels.is_empty() {
            return Err(PredictorError::Validation(
                "cannot score an empty set".to_string(),
            ));
        }

        let n = labels.len() as f64;
        let mean = labels.iter().sum::<f64>() / n;
        let (mut sse, mut sae, mut sst) = (0.0, 0.0, 0.0);
        for (p, y) in predictions.iter().zip(labels) {
            let err = p - y;
            sse += err * err;
            sae += err.abs();
            sst += (y - mean).powi(2);
        }

        Ok(Self {
            count: labels.len(),
            rmse: (sse / n).sqrt(),
            mae: sae / n,
            r2: if sst > 0.0 { 1.0 - sse / sst } else { 0.0 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let m = RegressionMetrics::compute(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn mean_predictor_scores_zero_r2() {
        let m = RegressionMetrics::compute(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!((m.r2 - 0.0).abs() < 1e-12);
        assert!((m.mae - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(RegressionMetrics::compute(&[1.0], &[1.0, 2.0]).is_err());
        assert!(RegressionMetrics::compute(&[], &[]).is_err());
    }
}
