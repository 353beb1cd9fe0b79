use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::table::Dataset;
use crate::error::{PredictorError, Result};

/// Shuffle row indices with a fixed seed and cut off `test_fraction` of them
/// as the held-out set. Returns `(train, test)`.
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<(Dataset, Dataset)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PredictorError::Validation(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((dataset.len() as f64) * test_fraction).round() as usize;
    if n_test == 0 || n_test >= dataset.len() {
        return Err(PredictorError::Validation(format!(
            "cannot split {} rows with test_fraction {test_fraction}",
            dataset.len()
        )));
    }

    let (test_idx, train_idx) = indices.split_at(n_test);
    Ok((dataset.take(train_idx)?, dataset.take(test_idx)?))
}
