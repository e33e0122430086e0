//! Min-max scaling of sensor columns.

use crate::core::frame::SensorFrame;

/// Rescale every sensor column so its minimum maps to 0 and its maximum
/// to 1, computed over non-null readings. Null readings are untouched.
/// A constant (or single-value) column maps to 0.
pub fn min_max(frame: &mut SensorFrame) {
    for sensor_idx in 0..frame.sensors().len() {
        let column = frame.column(sensor_idx);
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in column.iter().flatten() {
            min = min.min(*value);
            max = max.max(*value);
        }
        if min > max {
            continue; // all-null column
        }

        let span = max - min;
        for row in 0..frame.len() {
            if let Some(v) = frame.value(sensor_idx, row) {
                let scaled = if span == 0.0 { 0.0 } else { (v - min) / span };
                frame.set_value(sensor_idx, row, Some(scaled));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::SensorSeries;

    #[test]
    fn test_min_maps_to_zero_and_max_to_one() {
        let mut frame = SensorFrame::from_series(vec![SensorSeries::new(
            "EDA",
            vec![(0, Some(2.0)), (10, Some(4.0)), (20, Some(6.0))],
        )]);
        min_max(&mut frame);

        assert_eq!(frame.value(0, 0), Some(0.0));
        assert_eq!(frame.value(0, 1), Some(0.5));
        assert_eq!(frame.value(0, 2), Some(1.0));
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let mut frame = SensorFrame::from_series(vec![SensorSeries::new(
            "TEMP",
            vec![(0, Some(36.5)), (10, Some(36.5))],
        )]);
        min_max(&mut frame);

        assert_eq!(frame.value(0, 0), Some(0.0));
        assert_eq!(frame.value(0, 1), Some(0.0));
    }

    #[test]
    fn test_nulls_are_untouched() {
        let mut frame = SensorFrame::from_series(vec![SensorSeries::new(
            "EDA",
            vec![(0, Some(1.0)), (10, None), (20, Some(3.0))],
        )]);
        min_max(&mut frame);

        assert_eq!(frame.value(0, 1), None);
        assert_eq!(frame.value(0, 2), Some(1.0));
    }

    #[test]
    fn test_columns_scaled_independently() {
        let mut frame = SensorFrame::from_series(vec![
            SensorSeries::new("EDA", vec![(0, Some(0.0)), (10, Some(10.0))]),
            SensorSeries::new("TEMP", vec![(0, Some(35.0)), (10, Some(40.0))]),
        ]);
        min_max(&mut frame);

        let eda = frame.sensor_index("EDA").unwrap();
        let temp = frame.sensor_index("TEMP").unwrap();
        assert_eq!(frame.value(eda, 1), Some(1.0));
        assert_eq!(frame.value(temp, 0), Some(0.0));
        assert_eq!(frame.value(temp, 1), Some(1.0));
    }
}
