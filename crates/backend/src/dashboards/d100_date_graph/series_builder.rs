use async_trait::async_trait;
use chrono::NaiveDate;
use contracts::domain::a002_data_category::aggregate::{DataCategoryId, DataCategoryWithType};
use contracts::domain::a003_data_entry::aggregate::DataEntry;
use contracts::shared::series::DataPoint;
use thiserror::Error;

use crate::domain::{a002_data_category, a003_data_entry};

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("invalid category id '{0}'")]
    InvalidCategoryId(String),

    #[error("data category {0} not found")]
    CategoryNotFound(DataCategoryId),

    #[error("category '{name}' has data type '{input_type}', which cannot be charted")]
    NotChartable { name: String, input_type: String },

    #[error("invalid date range: {0}")]
    InvalidRange(String),

    #[error("failed to retrieve data: {0}")]
    Retrieval(String),
}

/// Источник данных для построения рядов
#[async_trait]
pub trait EntrySource: Send + Sync {
    /// Записи категории с датой в [start, end]
    async fn fetch_entries_for_category_in_range(
        &self,
        category_id: DataCategoryId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<DataEntry>>;

    /// Категория вместе с ее типом данных
    async fn get_category(
        &self,
        category_id: DataCategoryId,
    ) -> anyhow::Result<Option<DataCategoryWithType>>;
}

/// Источник поверх репозиториев SQLite
pub struct RepositoryEntrySource;

#[async_trait]
impl EntrySource for RepositoryEntrySource {
    async fn fetch_entries_for_category_in_range(
        &self,
        category_id: DataCategoryId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<DataEntry>> {
        a003_data_entry::repository::list_by_category_in_range(category_id.value(), start, end).await
    }

    async fn get_category(
        &self,
        category_id: DataCategoryId,
    ) -> anyhow::Result<Option<DataCategoryWithType>> {
        a002_data_category::repository::get_with_type(category_id.value()).await
    }
}

/// Ряд одной категории: точки в порядке получения от источника
#[derive(Debug, Clone)]
pub struct BuiltSeries {
    pub category: DataCategoryWithType,
    pub points: Vec<DataPoint>,
}

/// Построить ряды по выбранным категориям за период.
///
/// Категория без записей в периоде дает пустой ряд. Ошибка источника
/// возвращается как есть, без повторов.
pub async fn build_series<S>(
    source: &S,
    category_ids: &[DataCategoryId],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<BuiltSeries>, SeriesError>
where
    S: EntrySource + ?Sized,
{
    let mut result = Vec::with_capacity(category_ids.len());

    for &category_id in category_ids {
        let category = source
            .get_category(category_id)
            .await
            .map_err(|e| SeriesError::Retrieval(e.to_string()))?
            .ok_or(SeriesError::CategoryNotFound(category_id))?;

        let entries = source
            .fetch_entries_for_category_in_range(category_id, start, end)
            .await
            .map_err(|e| SeriesError::Retrieval(e.to_string()))?;

        let kind = category.value_kind();
        let points: Vec<DataPoint> = entries
            .iter()
            .filter(|e| e.date >= start && e.date <= end)
            .map(|e| DataPoint::from_raw(e.date, &e.value, &e.note, kind))
            .collect();

        tracing::debug!(
            "Series '{}': {} of {} entries in range",
            category.name(),
            points.len(),
            entries.len()
        );
        result.push(BuiltSeries { category, points });
    }

    Ok(result)
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use contracts::domain::a001_data_type::aggregate::{DataType, InputType};
    use contracts::domain::a002_data_category::aggregate::DataCategory;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Источник в памяти для тестов
    #[derive(Default)]
    pub struct InMemorySource {
        pub categories: HashMap<DataCategoryId, DataCategoryWithType>,
        pub entries: Vec<DataEntry>,
        pub fail: bool,
        pub fetches: AtomicUsize,
    }

    impl InMemorySource {
        pub fn add_category(&mut self, name: &str, input_type: InputType, default_value: &str) -> DataCategoryId {
            let data_type = DataType::new_for_insert(input_type.to_string(), String::new(), input_type, false);
            let mut category = DataCategory::new_for_insert(name.into(), String::new(), data_type.base.id);
            category.default_value = default_value.into();
            let id = category.base.id;
            self.categories.insert(id, DataCategoryWithType::new(category, data_type));
            id
        }

        pub fn add_entry(&mut self, category_id: DataCategoryId, date: &str, value: &str) {
            self.entries.push(DataEntry::new_for_insert(
                category_id,
                date.parse().unwrap(),
                value.into(),
                String::new(),
            ));
        }
    }

    #[async_trait]
    impl EntrySource for InMemorySource {
        async fn fetch_entries_for_category_in_range(
            &self,
            category_id: DataCategoryId,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> anyhow::Result<Vec<DataEntry>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("storage unavailable");
            }
            // диапазон намеренно не фильтруется: это делает построитель
            Ok(self
                .entries
                .iter()
                .filter(|e| e.data_category_id == category_id)
                .cloned()
                .collect())
        }

        async fn get_category(
            &self,
            category_id: DataCategoryId,
        ) -> anyhow::Result<Option<DataCategoryWithType>> {
            Ok(self.categories.get(&category_id).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::InMemorySource;
    use super::*;
    use contracts::domain::a001_data_type::aggregate::InputType;
    use std::sync::atomic::Ordering;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_points_outside_range_are_dropped() {
        let mut source = InMemorySource::default();
        let weight = source.add_category("Weight", InputType::Number, "");
        source.add_entry(weight, "2023-12-31", "80");
        source.add_entry(weight, "2024-01-01", "81");
        source.add_entry(weight, "2024-01-05", "82.5");
        source.add_entry(weight, "2024-01-06", "83");

        let series = build_series(&source, &[weight], d("2024-01-01"), d("2024-01-05"))
            .await
            .unwrap();
        assert_eq!(series.len(), 1);
        let values: Vec<_> = series[0].points.iter().map(|p| p.numeric_value).collect();
        assert_eq!(values, vec![Some(81.0), Some(82.5)]);
    }

    #[tokio::test]
    async fn test_category_without_entries_yields_empty_series() {
        let mut source = InMemorySource::default();
        let mood = source.add_category("Mood", InputType::Number, "");
        let series = build_series(&source, &[mood], d("2024-01-01"), d("2024-01-31"))
            .await
            .unwrap();
        assert!(series[0].points.is_empty());
        assert_eq!(series[0].category.name(), "Mood");
    }

    #[tokio::test]
    async fn test_values_parsed_by_category_type() {
        let mut source = InMemorySource::default();
        let wake = source.add_category("Wake up", InputType::Time, "");
        let gym = source.add_category("Gym", InputType::Boolean, "");
        source.add_entry(wake, "2024-01-01", "06:45");
        source.add_entry(gym, "2024-01-01", "TRUE");

        let series = build_series(&source, &[wake, gym], d("2024-01-01"), d("2024-01-01"))
            .await
            .unwrap();
        assert_eq!(series[0].points[0].numeric_value, Some(405.0));
        assert_eq!(series[1].points[0].numeric_value, Some(1.0));
        assert_eq!(series[1].points[0].display_value, "Yes");
    }

    #[tokio::test]
    async fn test_missing_category_is_not_found() {
        let source = InMemorySource::default();
        let missing = DataCategoryId::new_v4();
        let err = build_series(&source, &[missing], d("2024-01-01"), d("2024-01-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, SeriesError::CategoryNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_retrieval_failure_surfaces_without_retry() {
        let mut source = InMemorySource::default();
        let weight = source.add_category("Weight", InputType::Number, "");
        source.fail = true;
        let err = build_series(&source, &[weight], d("2024-01-01"), d("2024-01-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, SeriesError::Retrieval(_)));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }
}
