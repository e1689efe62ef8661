use chrono::NaiveDate;

use super::point::DataPoint;

/// Непрерывная дневная ось от минимальной до максимальной даты по всем рядам.
///
/// Пустые ряды в определении границ не участвуют; если дат нет совсем,
/// ось пустая ("нечего рисовать").
pub fn unify_axis<S: AsRef<[DataPoint]>>(series: &[S]) -> Vec<NaiveDate> {
    let dates = series
        .iter()
        .flat_map(|points| points.as_ref().iter().map(|p| p.date));

    let (min, max) = match dates.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
        None => Some((d, d)),
        Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
    }) {
        Some(bounds) => bounds,
        None => return Vec::new(),
    };

    min.iter_days().take_while(|d| *d <= max).collect()
}

/// Количество дней между датами включительно (для проверок и логов)
pub fn day_count(from: NaiveDate, to: NaiveDate) -> usize {
    if to < from {
        return 0;
    }
    ((to - from).num_days() + 1) as usize
}
