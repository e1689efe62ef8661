//! Сквозной сценарий поверх временной SQLite базы.
//!
//! Соединение глобальное, поэтому весь сценарий идет одним тестом.

use chrono::NaiveDate;
use contracts::dashboards::d100_date_graph::dto::{AxisMin, DateGraphRequest, SeriesSettings};
use contracts::domain::a001_data_type::aggregate::DataTypeDto;
use contracts::domain::a002_data_category::aggregate::DataCategoryDto;
use contracts::domain::a003_data_entry::aggregate::DataEntryDto;
use contracts::shared::series::{GapPolicy, StepDirection};
use uuid::Uuid;

use crate::dashboards::d100_date_graph::series_builder::{RepositoryEntrySource, SeriesError};
use crate::dashboards::d100_date_graph::service::compute_date_graph;
use crate::domain::{a001_data_type, a002_data_category, a003_data_entry};
use crate::shared::data::db;
use crate::shared::error::status_for;
use axum::http::StatusCode;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn entry(category: Uuid, day: u32, value: &str) -> DataEntryDto {
    DataEntryDto {
        id: None,
        date: date(day),
        value: value.into(),
        note: None,
        data_category_id: category.to_string(),
    }
}

fn category(name: &str, data_type_id: &str) -> DataCategoryDto {
    DataCategoryDto {
        name: name.into(),
        data_type_id: data_type_id.into(),
        ..Default::default()
    }
}

async fn entry_count(id: Uuid) -> i64 {
    a002_data_category::repository::get_by_id(id)
        .await
        .unwrap()
        .unwrap()
        .entry_count
}

fn series(category_id: Uuid, blanks: GapPolicy) -> SeriesSettings {
    SeriesSettings {
        category_id: category_id.to_string(),
        blanks,
        axis_min: AxisMin::Auto,
    }
}

#[tokio::test]
async fn test_tracker_scenario() {
    let path = std::env::temp_dir().join(format!("tracker-test-{}.db", Uuid::new_v4()));
    if !db::is_initialized() {
        db::initialize_database(Some(path.to_str().unwrap()))
            .await
            .unwrap();
    }

    // --- типы данных ---
    assert_eq!(a001_data_type::service::seed_builtin_types().await.unwrap(), 5);
    assert_eq!(a001_data_type::service::seed_builtin_types().await.unwrap(), 0);
    let number = a001_data_type::repository::get_by_name("Number")
        .await
        .unwrap()
        .unwrap();
    let text = a001_data_type::repository::get_by_name("Text")
        .await
        .unwrap()
        .unwrap();

    let blank_name = a001_data_type::service::create(DataTypeDto {
        id: None,
        name: " ".into(),
        note: None,
        input_type: number.input_type,
        is_complex: None,
    })
    .await
    .unwrap_err();
    assert_eq!(status_for(&blank_name), StatusCode::BAD_REQUEST);

    // --- категории ---
    let mut weight_dto = category("Weight", &number.to_string_id());
    weight_dto.default_value = Some("70".into());
    weight_dto.positive_increment = Some(0.5);
    let weight = a002_data_category::service::create(weight_dto).await.unwrap();
    let mood = a002_data_category::service::create(category("Mood", &number.to_string_id()))
        .await
        .unwrap();
    let diary = a002_data_category::service::create(category("Diary", &text.to_string_id()))
        .await
        .unwrap();

    let mut bad_default = category("Broken", &number.to_string_id());
    bad_default.default_value = Some("abc".into());
    let err = a002_data_category::service::create(bad_default).await.unwrap_err();
    assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);

    let missing_type = a002_data_category::service::create(category(
        "Orphan",
        &Uuid::new_v4().to_string(),
    ))
    .await
    .unwrap_err();
    assert_eq!(status_for(&missing_type), StatusCode::BAD_REQUEST);

    // --- записи и счетчики ---
    let e1 = a003_data_entry::service::create(entry(weight, 1, "70")).await.unwrap();
    let e2 = a003_data_entry::service::create(entry(weight, 3, "72")).await.unwrap();
    let e3 = a003_data_entry::service::create(entry(mood, 2, "5")).await.unwrap();
    assert_eq!(entry_count(weight).await, 2);
    assert_eq!(entry_count(mood).await, 1);

    let invalid = a003_data_entry::service::create(entry(weight, 4, "heavy"))
        .await
        .unwrap_err();
    assert_eq!(status_for(&invalid), StatusCode::BAD_REQUEST);
    assert_eq!(entry_count(weight).await, 2);

    // перенос записи в другую категорию
    let mut moved = entry(weight, 2, "71");
    moved.id = Some(e3.to_string());
    a003_data_entry::service::update(moved).await.unwrap();
    assert_eq!(entry_count(weight).await, 3);
    assert_eq!(entry_count(mood).await, 0);

    assert!(a003_data_entry::service::delete(e2).await.unwrap());
    assert!(!a003_data_entry::service::delete(e2).await.unwrap());
    assert_eq!(entry_count(weight).await, 2);
    assert_eq!(a002_data_category::service::recount(weight).await.unwrap(), 2);

    a003_data_entry::service::create(entry(mood, 4, "3")).await.unwrap();
    a003_data_entry::service::create(entry(mood, 5, "4")).await.unwrap();

    // --- постраничный список ---
    let first = a003_data_entry::service::list_page(Some(3), None, 20).await.unwrap();
    let first_dates: Vec<NaiveDate> = first.items.iter().map(|e| e.date).collect();
    assert_eq!(first_dates, vec![date(5), date(4), date(2)]);
    let token = first.next_token.clone().unwrap();
    let second = a003_data_entry::service::list_page(Some(3), Some(&token), 20)
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].id.value(), e1);
    assert!(second.next_token.is_none());

    let bad_token = a003_data_entry::service::list_page(None, Some("%%%"), 20)
        .await
        .unwrap_err();
    assert_eq!(status_for(&bad_token), StatusCode::BAD_REQUEST);

    // --- экран дня ---
    let day = a003_data_entry::service::day_summary(date(1)).await.unwrap();
    assert_eq!(day.entries.len(), 1);
    assert_eq!(day.entries[0].data_category.name(), "Weight");
    let available: Vec<&str> = day.available_categories.iter().map(|c| c.name()).collect();
    assert!(available.contains(&"Mood"));
    assert!(!available.contains(&"Weight"));

    let added = a003_data_entry::service::add_day_entries(date(2), &[mood.to_string()])
        .await
        .unwrap();
    assert_eq!(added.len(), 1);
    let blank = a003_data_entry::service::get_by_id(added[0]).await.unwrap().unwrap();
    assert_eq!(blank.value, "");

    // --- кнопки +/- ---
    let stepped = a003_data_entry::service::step(added[0], StepDirection::Up)
        .await
        .unwrap();
    assert_eq!(stepped.value, "1");
    let stepped = a003_data_entry::service::step(e1, StepDirection::Up).await.unwrap();
    assert_eq!(stepped.value, "70.5");

    let note = a003_data_entry::service::create(entry(diary, 1, "quiet day"))
        .await
        .unwrap();
    let not_steppable = a003_data_entry::service::step(note, StepDirection::Up)
        .await
        .unwrap_err();
    assert_eq!(status_for(&not_steppable), StatusCode::BAD_REQUEST);

    // --- график ---
    let request = DateGraphRequest {
        start: Some(date(1)),
        end: Some(date(5)),
        series: vec![series(weight, GapPolicy::Zeroize), series(mood, GapPolicy::Previous)],
    };
    let graph = compute_date_graph(&RepositoryEntrySource, &request, 30, date(31))
        .await
        .unwrap();
    assert_eq!(
        graph.labels,
        vec!["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"]
    );
    assert_eq!(
        graph.datasets[0].data,
        vec![Some(70.5), Some(71.0), Some(0.0), Some(0.0), Some(0.0)]
    );
    assert_eq!(
        graph.datasets[1].data,
        vec![Some(0.0), Some(1.0), Some(1.0), Some(3.0), Some(4.0)]
    );
    assert_eq!(graph.datasets[1].axis_id, "y2");

    let text_chart = DateGraphRequest {
        start: Some(date(1)),
        end: Some(date(5)),
        series: vec![series(diary, GapPolicy::Skip)],
    };
    let err = compute_date_graph(&RepositoryEntrySource, &text_chart, 30, date(31))
        .await
        .unwrap_err();
    assert!(matches!(err, SeriesError::NotChartable { .. }));

    // --- удаление ---
    let conflict = a001_data_type::service::delete(number.base.id.value())
        .await
        .unwrap_err();
    assert_eq!(status_for(&conflict), StatusCode::CONFLICT);

    assert!(a002_data_category::service::delete(mood).await.unwrap());
    assert!(a002_data_category::service::get_by_id(mood).await.unwrap().is_none());
    let gone = a002_data_category::service::list_entries(mood).await.unwrap_err();
    assert_eq!(status_for(&gone), StatusCode::NOT_FOUND);
    let page = a003_data_entry::service::list_page(None, None, 20).await.unwrap();
    assert!(page.items.iter().all(|e| e.data_category_id.value() != mood));

    // Time, Boolean, Select Numeric никем не используются
    assert_eq!(a001_data_type::service::delete_unused().await.unwrap(), 3);
    assert_eq!(a001_data_type::service::list_all().await.unwrap().len(), 2);

    assert_eq!(a003_data_entry::service::delete_all().await.unwrap(), 3);
    assert_eq!(entry_count(weight).await, 0);

    let _ = std::fs::remove_file(&path);
}
