//! Выравнивание рядов для графика по датам: разбор значений,
//! общая ось дат и заполнение пропусков.

pub mod axis;
pub mod gap_filler;
pub mod point;
pub mod value;

pub use axis::{day_count, unify_axis};
pub use gap_filler::{fill_gaps, observed_values, GapPolicy};
pub use point::DataPoint;
pub use value::{
    format_number, parse_number_to_time, parse_time_to_number, parse_value_to_display,
    parse_value_to_number, step_value, Increments, StepDirection, ValueKind, MINUTES_PER_DAY,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn points(raw: &[(&str, &str)]) -> Vec<DataPoint> {
        raw.iter()
            .map(|(date, value)| DataPoint::from_raw(d(date), value, "", ValueKind::Number))
            .collect()
    }

    fn align(series: &[Vec<DataPoint>], policy: GapPolicy) -> Vec<Vec<Option<f64>>> {
        let axis = unify_axis(series);
        series
            .iter()
            .map(|s| fill_gaps(&axis, &observed_values(s), policy, 0.0))
            .collect()
    }

    #[test]
    fn test_two_series_zeroize() {
        let series = vec![
            points(&[("2024-01-01", "5"), ("2024-01-03", "7")]),
            points(&[("2024-01-02", "2")]),
        ];
        let aligned = align(&series, GapPolicy::Zeroize);
        assert_eq!(aligned[0], vec![Some(5.0), Some(0.0), Some(7.0)]);
        assert_eq!(aligned[1], vec![Some(0.0), Some(2.0), Some(0.0)]);
    }

    #[test]
    fn test_two_series_previous() {
        let series = vec![
            points(&[("2024-01-01", "5"), ("2024-01-03", "7")]),
            points(&[("2024-01-02", "2")]),
        ];
        let aligned = align(&series, GapPolicy::Previous);
        assert_eq!(aligned[0], vec![Some(5.0), Some(5.0), Some(7.0)]);
        assert_eq!(aligned[1], vec![Some(0.0), Some(2.0), Some(2.0)]);
    }

    #[test]
    fn test_empty_series_follows_axis_of_others() {
        let series = vec![
            points(&[("2024-01-01", "1"), ("2024-01-04", "4")]),
            Vec::new(),
        ];
        let skipped = align(&series, GapPolicy::Skip);
        assert_eq!(skipped[1], vec![None; 4]);
        let zeroed = align(&series, GapPolicy::Zeroize);
        assert_eq!(zeroed[1], vec![Some(0.0); 4]);
    }

    #[test]
    fn test_unparseable_value_is_a_gap() {
        let series = vec![points(&[("2024-01-01", "abc"), ("2024-01-02", "3")])];
        let axis = unify_axis(&series);
        assert_eq!(axis.len(), 2);
        let aligned = align(&series, GapPolicy::Skip);
        assert_eq!(aligned[0], vec![None, Some(3.0)]);
    }

    #[test]
    fn test_point_from_time_value() {
        let p = DataPoint::from_raw(d("2024-05-01"), "7:05", "late", ValueKind::Time);
        assert_eq!(p.numeric_value, Some(425.0));
        assert_eq!(p.display_value, "07:05");
        assert_eq!(p.note, "late");
    }
}
