//! Simple moving averages

/// Trailing simple moving average.
///
/// Position `i` holds the mean of `values[i + 1 - window..=i]`. Positions
/// without a full window, or whose window holds a NaN or infinite value, are
/// `None`; the average resumes once the bad value leaves the window.
pub fn simple_moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return result;
    }

    // running sum of the finite values in the window, and count of the rest
    let mut sum = 0.0;
    let mut gaps = 0usize;

    for (i, &value) in values.iter().enumerate() {
        if value.is_finite() {
            sum += value;
        } else {
            gaps += 1;
        }

        if i >= window {
            let leaving = values[i - window];
            if leaving.is_finite() {
                sum -= leaving;
            } else {
                gaps -= 1;
            }
        }

        if i + 1 >= window && gaps == 0 {
            result[i] = Some(sum / window as f64);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_leading_positions_are_none() {
        let ma = simple_moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);

        assert_eq!(ma.len(), 5);
        assert!(ma[..2].iter().all(Option::is_none));
        assert_abs_diff_eq!(ma[2].unwrap(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ma[3].unwrap(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ma[4].unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_window_longer_than_series() {
        let ma = simple_moving_average(&[1.0, 2.0], 100);
        assert_eq!(ma, vec![None, None]);
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let values = [3.0, 1.5, 4.0];
        let ma = simple_moving_average(&values, 1);
        assert_eq!(ma, vec![Some(3.0), Some(1.5), Some(4.0)]);
    }

    #[test]
    fn test_recovers_after_nan() {
        let mut values: Vec<f64> = (0..10).map(f64::from).collect();
        values[1] = f64::NAN;

        let ma = simple_moving_average(&values, 3);

        // windows ending at 2 and 3 still hold the NaN
        assert!(ma[..4].iter().all(Option::is_none));
        assert_abs_diff_eq!(ma[4].unwrap(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ma[9].unwrap(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_infinite_value_does_not_poison_later_windows() {
        let ma = simple_moving_average(&[1.0, f64::INFINITY, 2.0, 4.0], 2);
        assert_eq!(ma[1], None);
        assert_eq!(ma[2], None);
        assert_abs_diff_eq!(ma[3].unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_window() {
        assert_eq!(simple_moving_average(&[1.0], 0), vec![None]);
    }
}
