use chrono::{Duration, NaiveDate, Utc};
use contracts::dashboards::d100_date_graph::dto::{
    axis_id_for, DateGraphRequest, DateGraphResponse, SeriesDataset,
};
use contracts::domain::a002_data_category::aggregate::DataCategoryId;
use contracts::domain::common::AggregateId;
use contracts::shared::series::{self, fill_gaps, observed_values, unify_axis, DataPoint};

use super::series_builder::{build_series, EntrySource, RepositoryEntrySource, SeriesError};
use crate::shared::config;

/// Эффективный период: недостающее начало берется за `default_range_days`
/// дней до конца (конец по умолчанию сегодня), обе границы включительно
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    default_range_days: u32,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), SeriesError> {
    let end = end.unwrap_or(today);
    let start = match start {
        Some(start) => start,
        None => end
            .checked_sub_signed(Duration::days(i64::from(default_range_days)))
            .ok_or_else(|| {
                SeriesError::InvalidRange(format!(
                    "no date {} days before {}",
                    default_range_days, end
                ))
            })?,
    };
    Ok((start, end))
}

/// Построить график по данным из хранилища
pub async fn get_date_graph(request: DateGraphRequest) -> anyhow::Result<DateGraphResponse> {
    let settings = config::settings();
    let today = Utc::now().date_naive();
    let response = compute_date_graph(
        &RepositoryEntrySource,
        &request,
        settings.chart.default_range_days,
        today,
    )
    .await?;
    Ok(response)
}

/// Серийное выравнивание: построение рядов, общая ось дат, заполнение пропусков
pub async fn compute_date_graph<S>(
    source: &S,
    request: &DateGraphRequest,
    default_range_days: u32,
    today: NaiveDate,
) -> Result<DateGraphResponse, SeriesError>
where
    S: EntrySource + ?Sized,
{
    let (start, end) = resolve_range(request.start, request.end, default_range_days, today)?;
    let empty = DateGraphResponse {
        start: Some(start),
        end: Some(end),
        ..Default::default()
    };
    if request.series.is_empty() || start > end {
        return Ok(empty);
    }

    let category_ids = request
        .series
        .iter()
        .map(|s| {
            DataCategoryId::from_string(&s.category_id)
                .map_err(|_| SeriesError::InvalidCategoryId(s.category_id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut built = build_series(source, &category_ids, start, end).await?;

    if let Some(bad) = built.iter().find(|s| !s.category.data_type.is_chartable()) {
        return Err(SeriesError::NotChartable {
            name: bad.category.name().to_string(),
            input_type: bad.category.data_type.input_type.to_string(),
        });
    }

    // стабильная сортировка: при равных датах сохраняется порядок источника
    // (последняя записанная запись первой), observed_values берет первую
    for s in built.iter_mut() {
        s.points.sort_by_key(|p| p.date);
    }

    let point_sets: Vec<&[DataPoint]> = built.iter().map(|s| s.points.as_slice()).collect();
    let axis = unify_axis(&point_sets);
    if axis.is_empty() {
        return Ok(empty);
    }

    let datasets = built
        .into_iter()
        .zip(request.series.iter())
        .enumerate()
        .map(|(index, (s, settings))| {
            let kind = s.category.value_kind();
            let default_fill =
                series::parse_value_to_number(&s.category.category.default_value, kind)
                    .unwrap_or(0.0);
            let data = fill_gaps(&axis, &observed_values(&s.points), settings.blanks, default_fill);
            SeriesDataset {
                label: s.category.name().to_string(),
                category_id: s.category.id().as_string(),
                axis_id: axis_id_for(index).to_string(),
                data,
                points: s.points,
                axis_min: settings.axis_min.as_bound(),
            }
        })
        .collect();

    Ok(DateGraphResponse {
        start: Some(start),
        end: Some(end),
        labels: axis.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
        datasets,
    })
}

#[cfg(test)]
mod tests {
    use super::super::series_builder::fake::InMemorySource;
    use super::*;
    use contracts::dashboards::d100_date_graph::dto::{AxisMin, SeriesSettings};
    use contracts::domain::a001_data_type::aggregate::InputType;
    use contracts::shared::series::GapPolicy;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn request(ids: &[(DataCategoryId, GapPolicy)], start: &str, end: &str) -> DateGraphRequest {
        DateGraphRequest {
            start: Some(d(start)),
            end: Some(d(end)),
            series: ids
                .iter()
                .map(|(id, blanks)| SeriesSettings {
                    category_id: id.to_string(),
                    blanks: *blanks,
                    axis_min: AxisMin::Auto,
                })
                .collect(),
        }
    }

    fn two_series() -> (InMemorySource, DataCategoryId, DataCategoryId) {
        let mut source = InMemorySource::default();
        let a = source.add_category("A", InputType::Number, "");
        let b = source.add_category("B", InputType::Number, "");
        source.add_entry(a, "2024-01-01", "5");
        source.add_entry(a, "2024-01-03", "7");
        source.add_entry(b, "2024-01-02", "2");
        (source, a, b)
    }

    #[tokio::test]
    async fn test_zeroize_example() {
        let (source, a, b) = two_series();
        let req = request(&[(a, GapPolicy::Zeroize), (b, GapPolicy::Zeroize)], "2024-01-01", "2024-01-31");
        let graph = compute_date_graph(&source, &req, 30, d("2024-02-01")).await.unwrap();
        assert_eq!(graph.labels, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(graph.datasets[0].data, vec![Some(5.0), Some(0.0), Some(7.0)]);
        assert_eq!(graph.datasets[1].data, vec![Some(0.0), Some(2.0), Some(0.0)]);
        assert_eq!(graph.datasets[0].axis_id, "y1");
        assert_eq!(graph.datasets[1].axis_id, "y2");
    }

    #[tokio::test]
    async fn test_previous_example() {
        let (source, a, b) = two_series();
        let req = request(&[(a, GapPolicy::Previous), (b, GapPolicy::Previous)], "2024-01-01", "2024-01-31");
        let graph = compute_date_graph(&source, &req, 30, d("2024-02-01")).await.unwrap();
        assert_eq!(graph.datasets[0].data, vec![Some(5.0), Some(5.0), Some(7.0)]);
        assert_eq!(graph.datasets[1].data, vec![Some(0.0), Some(2.0), Some(2.0)]);
    }

    #[tokio::test]
    async fn test_default_policy_uses_category_default() {
        let mut source = InMemorySource::default();
        let sleep = source.add_category("Sleep", InputType::Time, "08:00");
        source.add_entry(sleep, "2024-01-01", "07:30");
        source.add_entry(sleep, "2024-01-03", "06:00");
        let req = request(&[(sleep, GapPolicy::Default)], "2024-01-01", "2024-01-03");
        let graph = compute_date_graph(&source, &req, 30, d("2024-01-03")).await.unwrap();
        assert_eq!(graph.datasets[0].data, vec![Some(450.0), Some(480.0), Some(360.0)]);
    }

    #[tokio::test]
    async fn test_most_recent_duplicate_wins() {
        let mut source = InMemorySource::default();
        let a = source.add_category("A", InputType::Number, "");
        // источник отдает последнюю записанную запись первой
        source.add_entry(a, "2024-01-01", "9");
        source.add_entry(a, "2024-01-01", "1");
        let req = request(&[(a, GapPolicy::Skip)], "2024-01-01", "2024-01-01");
        let graph = compute_date_graph(&source, &req, 30, d("2024-01-01")).await.unwrap();
        assert_eq!(graph.datasets[0].data, vec![Some(9.0)]);
        assert_eq!(graph.datasets[0].points.len(), 2);
    }

    #[tokio::test]
    async fn test_text_category_is_rejected() {
        let mut source = InMemorySource::default();
        let notes = source.add_category("Notes", InputType::Text, "");
        let req = request(&[(notes, GapPolicy::Skip)], "2024-01-01", "2024-01-02");
        let err = compute_date_graph(&source, &req, 30, d("2024-01-02")).await.unwrap_err();
        assert!(matches!(err, SeriesError::NotChartable { .. }));
    }

    #[tokio::test]
    async fn test_inverted_range_and_empty_selection_are_empty() {
        let (source, a, _) = two_series();
        let inverted = request(&[(a, GapPolicy::Skip)], "2024-02-01", "2024-01-01");
        let graph = compute_date_graph(&source, &inverted, 30, d("2024-02-01")).await.unwrap();
        assert!(graph.is_empty());
        assert_eq!(source.fetches.load(std::sync::atomic::Ordering::SeqCst), 0);

        let none = request(&[], "2024-01-01", "2024-01-31");
        assert!(compute_date_graph(&source, &none, 30, d("2024-02-01")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_entries_in_range_is_empty_axis() {
        let (source, a, _) = two_series();
        let req = request(&[(a, GapPolicy::Zeroize)], "2023-01-01", "2023-01-31");
        let graph = compute_date_graph(&source, &req, 30, d("2024-02-01")).await.unwrap();
        assert!(graph.labels.is_empty());
        assert!(graph.datasets.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_category_id() {
        let source = InMemorySource::default();
        let req = DateGraphRequest {
            start: None,
            end: None,
            series: vec![SeriesSettings {
                category_id: "nope".into(),
                blanks: GapPolicy::Skip,
                axis_min: AxisMin::Zero,
            }],
        };
        let err = compute_date_graph(&source, &req, 30, d("2024-02-01")).await.unwrap_err();
        assert!(matches!(err, SeriesError::InvalidCategoryId(_)));
    }

    #[test]
    fn test_resolve_range_defaults() {
        let today = d("2024-03-31");
        // 30 дней назад плюс сегодня: 31 метка
        assert_eq!(resolve_range(None, None, 30, today).unwrap(), (d("2024-03-01"), today));
        assert_eq!(
            resolve_range(Some(d("2024-01-01")), None, 30, today).unwrap(),
            (d("2024-01-01"), today)
        );
        assert_eq!(
            resolve_range(None, Some(d("2024-01-10")), 0, today).unwrap(),
            (d("2024-01-10"), d("2024-01-10"))
        );
    }

    #[test]
    fn test_resolve_range_before_earliest_date() {
        let err = resolve_range(None, Some(NaiveDate::MIN), 30, d("2024-01-01")).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidRange(_)));

        // явное начало не вычисляется, переполнения нет
        assert_eq!(
            resolve_range(Some(NaiveDate::MIN), Some(NaiveDate::MIN), 30, d("2024-01-01")).unwrap(),
            (NaiveDate::MIN, NaiveDate::MIN)
        );
    }

    #[tokio::test]
    async fn test_early_end_without_start_is_rejected() {
        let source = InMemorySource::default();
        let req = DateGraphRequest {
            start: None,
            end: Some(NaiveDate::MIN),
            series: vec![],
        };
        let err = compute_date_graph(&source, &req, 30, d("2024-02-01")).await.unwrap_err();
        assert!(matches!(err, SeriesError::InvalidRange(_)));
        assert_eq!(
            crate::shared::error::status_for(&err.into()),
            axum::http::StatusCode::BAD_REQUEST
        );
    }
}
