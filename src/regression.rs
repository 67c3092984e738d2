//! Arrival prediction through an external statistical model.
//!
//! The model itself (spatial regression, fitted elsewhere) is not part of this
//! crate. Callers construct a [`RegressionModel`] once and pass it to
//! [`predict_arrivals`], which checks the inputs and the shape of the answer.

use crate::error::{Error, Result};

/// A fitted model that scores rows by their probability of arriving.
pub trait RegressionModel {
    /// Arrival probability for each row.
    ///
    /// `locations[i]` and `labels[i]` describe row `i`. The model is fitted
    /// on the first `num_arrived` rows and applied to all of them; `k` is
    /// its smoothing parameter.
    fn predict(
        &self,
        locations: &[(f64, f64)],
        labels: &[f64],
        num_arrived: usize,
        k: usize,
    ) -> Result<Vec<f64>>;
}

impl<M: RegressionModel + ?Sized> RegressionModel for &M {
    fn predict(
        &self,
        locations: &[(f64, f64)],
        labels: &[f64],
        num_arrived: usize,
        k: usize,
    ) -> Result<Vec<f64>> {
        (**self).predict(locations, labels, num_arrived, k)
    }
}

/// Validate the inputs, delegate to `model`, and validate its output.
pub fn predict_arrivals<M>(
    model: &M,
    locations: &[(f64, f64)],
    labels: &[f64],
    num_arrived: usize,
    k: usize,
) -> Result<Vec<f64>>
where
    M: RegressionModel + ?Sized,
{
    if k == 0 {
        return Err(Error::InvalidParameter {
            name: "k",
            message: "must be positive",
        });
    }
    if labels.len() != locations.len() {
        return Err(Error::LengthMismatch {
            expected: locations.len(),
            found: labels.len(),
        });
    }
    if num_arrived > locations.len() {
        return Err(Error::InvalidParameter {
            name: "num_arrived",
            message: "must not exceed the number of rows",
        });
    }

    let probabilities = model
        .predict(locations, labels, num_arrived, k)
        .inspect_err(|err| tracing::warn!(%err, "regression model failed"))?;

    if probabilities.len() != locations.len() {
        return Err(Error::Collaborator(format!(
            "regression model returned {} probabilities for {} rows",
            probabilities.len(),
            locations.len()
        )));
    }
    Ok(probabilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Returns the label of arrived rows and 0.5 for the rest.
    struct Echo {
        calls: Cell<usize>,
    }

    impl RegressionModel for Echo {
        fn predict(
            &self,
            _locations: &[(f64, f64)],
            labels: &[f64],
            num_arrived: usize,
            _k: usize,
        ) -> Result<Vec<f64>> {
            self.calls.set(self.calls.get() + 1);
            Ok(labels
                .iter()
                .enumerate()
                .map(|(i, &l)| if i < num_arrived { l } else { 0.5 })
                .collect())
        }
    }

    struct Truncating;

    impl RegressionModel for Truncating {
        fn predict(&self, _: &[(f64, f64)], _: &[f64], _: usize, _: usize) -> Result<Vec<f64>> {
            Ok(vec![0.0])
        }
    }

    fn rows() -> (Vec<(f64, f64)>, Vec<f64>) {
        (vec![(0.0, 0.0), (1.0, 0.5), (2.0, 2.0)], vec![1.0, 0.0, 1.0])
    }

    #[test]
    fn test_predict_arrivals_delegates() {
        let model = Echo { calls: Cell::new(0) };
        let (locations, labels) = rows();
        let p = predict_arrivals(&model, &locations, &labels, 2, 4).unwrap();
        assert_eq!(p, vec![1.0, 0.0, 0.5]);
        assert_eq!(model.calls.get(), 1);
    }

    #[test]
    fn test_predict_arrivals_rejects_bad_input_before_calling() {
        let model = Echo { calls: Cell::new(0) };
        let (locations, labels) = rows();
        assert!(matches!(
            predict_arrivals(&model, &locations, &labels[..2], 1, 2),
            Err(Error::LengthMismatch { expected: 3, found: 2 })
        ));
        assert!(predict_arrivals(&model, &locations, &labels, 4, 2).is_err());
        assert!(predict_arrivals(&model, &locations, &labels, 1, 0).is_err());
        assert_eq!(model.calls.get(), 0);
    }

    #[test]
    fn test_predict_arrivals_checks_output_length() {
        let (locations, labels) = rows();
        assert!(matches!(
            predict_arrivals(&Truncating, &locations, &labels, 0, 2),
            Err(Error::Collaborator(_))
        ));
    }
}
