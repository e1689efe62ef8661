use contracts::dashboards::d100_date_graph::dto::{
    DateGraphRequest, DateGraphResponse, LiveChartMessage,
};
use contracts::shared::request_token::{RequestSequencer, RequestToken};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use super::series_builder::SeriesError;

/// Состояние одного подключения живого графика.
///
/// Каждый новый запрос или изменение данных запускает пересчет с новой
/// меткой; результат отправляется, только если его метка все еще последняя.
pub struct LiveChartSession {
    sequencer: RequestSequencer,
    current: Mutex<Option<DateGraphRequest>>,
    outbox: mpsc::UnboundedSender<String>,
}

impl LiveChartSession {
    pub fn new(outbox: mpsc::UnboundedSender<String>) -> Arc<Self> {
        Arc::new(Self {
            sequencer: RequestSequencer::new(),
            current: Mutex::new(None),
            outbox,
        })
    }

    /// Клиент прислал новый запрос графика.
    /// Метка выдается под той же блокировкой, что и запись запроса.
    pub async fn set_request(&self, request: DateGraphRequest) -> RequestToken {
        let mut current = self.current.lock().await;
        *current = Some(request);
        self.sequencer.begin()
    }

    /// Данные изменились; пересчитать последний запрос, если он был
    pub async fn invalidate(&self) -> Option<(RequestToken, DateGraphRequest)> {
        let current = self.current.lock().await;
        let request = current.clone()?;
        Some((self.sequencer.begin(), request))
    }

    /// Выполнить пересчет и отправить результат, если он не устарел.
    /// Возвращает true, если результат был отправлен.
    pub async fn run<F, Fut>(&self, token: RequestToken, request: DateGraphRequest, compute: F) -> bool
    where
        F: FnOnce(DateGraphRequest) -> Fut,
        Fut: Future<Output = anyhow::Result<DateGraphResponse>>,
    {
        let result = compute(request).await;

        if !self.sequencer.is_current(token) {
            tracing::debug!("Discarding stale chart result for token {}", token.value());
            return false;
        }

        let payload = match result {
            Ok(response) => serde_json::to_string(&LiveChartMessage {
                token: token.value(),
                response,
            }),
            Err(e) => {
                tracing::error!("Live chart recompute failed: {}", e);
                let status = if e.downcast_ref::<SeriesError>().is_some() {
                    "bad_request"
                } else {
                    "error"
                };
                serde_json::to_string(&serde_json::json!({
                    "token": token.value(),
                    "error": e.to_string(),
                    "status": status,
                }))
            }
        };

        match payload {
            Ok(text) => self.outbox.send(text).is_ok(),
            Err(e) => {
                tracing::error!("Failed to serialize live chart message: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    fn request() -> DateGraphRequest {
        DateGraphRequest {
            start: None,
            end: None,
            series: vec![],
        }
    }

    #[tokio::test]
    async fn test_stale_result_is_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = LiveChartSession::new(tx);

        let first = session.set_request(request()).await;
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let slow = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .run(first, request(), |_| async move {
                        let _ = release_rx.await;
                        Ok(DateGraphResponse {
                            labels: vec!["old".into()],
                            ..Default::default()
                        })
                    })
                    .await
            })
        };

        // второй запрос начат, пока первый еще считается
        let second = session.set_request(request()).await;
        let sent = session
            .run(second, request(), |_| async {
                Ok(DateGraphResponse {
                    labels: vec!["new".into()],
                    ..Default::default()
                })
            })
            .await;
        assert!(sent);

        let _ = release_tx.send(());
        assert!(!slow.await.unwrap());

        let message: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(message["labels"][0], "new");
        assert_eq!(message["token"], second.value());
        assert!(rx.try_recv().is_err());
    }

    fn request_ending(day: u32) -> DateGraphRequest {
        DateGraphRequest {
            end: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .map(|d| d + chrono::Duration::days(i64::from(day))),
            ..request()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_latest_token_carries_latest_request() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = LiveChartSession::new(tx);
        session.set_request(request_ending(0)).await;

        // запросы клиента и пересчеты по изменениям вперемешку
        let mut tasks = Vec::new();
        for i in 1..=200u32 {
            let session = Arc::clone(&session);
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    let request = request_ending(i);
                    let token = session.set_request(request.clone()).await;
                    Some((token, request))
                } else {
                    session.invalidate().await
                }
            }));
        }

        let mut issued = Vec::new();
        for task in tasks {
            issued.extend(task.await.unwrap());
        }
        let (latest_token, latest_request) = issued
            .into_iter()
            .max_by_key(|(token, _)| token.value())
            .unwrap();

        assert!(session.sequencer.is_current(latest_token));
        assert_eq!(session.current.lock().await.as_ref(), Some(&latest_request));
    }

    #[tokio::test]
    async fn test_invalidate_without_request_does_nothing() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = LiveChartSession::new(tx);
        assert!(session.invalidate().await.is_none());

        session.set_request(request()).await;
        let (token, _) = session.invalidate().await.unwrap();
        assert_eq!(token.value(), 2);
    }

    #[tokio::test]
    async fn test_compute_error_is_reported_to_client() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = LiveChartSession::new(tx);
        let token = session.set_request(request()).await;
        let sent = session
            .run(token, request(), |_| async {
                Err(SeriesError::InvalidCategoryId("x".into()).into())
            })
            .await;
        assert!(sent);
        let message: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(message["status"], "bad_request");
    }
}
