use contracts::shared::events::ChangeEvent;
use once_cell::sync::Lazy;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const HUB_CAPACITY: usize = 256;

static HUB: Lazy<ChangeHub> = Lazy::new(|| ChangeHub::new(HUB_CAPACITY));

/// Общий на процесс канал изменений
pub fn hub() -> &'static ChangeHub {
    &HUB
}

/// Опубликовать изменение в общий канал
pub fn publish(event: ChangeEvent) {
    hub().publish(event);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("subscriber lagged behind, {0} events skipped")]
    Lagged(u64),

    #[error("change hub closed")]
    Closed,
}

/// Рассылка событий изменения подписчикам (WebSocket и внутренние наблюдатели)
pub struct ChangeHub {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: ChangeEvent) {
        // Ошибка означает только отсутствие подписчиков
        match self.tx.send(event) {
            Ok(n) => tracing::debug!("Change event delivered to {} subscriber(s)", n),
            Err(_) => tracing::trace!("Change event dropped: no subscribers"),
        }
    }

    pub fn receiver(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Подписка через колбэки. Пересылка идет в отдельной задаче до тех пор,
    /// пока жив возвращенный `Subscription`.
    ///
    /// Отставший подписчик получает `on_error(Lagged)` и продолжает со
    /// следующего доступного события.
    pub fn subscribe<N, E>(&self, mut on_next: N, mut on_error: E) -> Subscription
    where
        N: FnMut(ChangeEvent) + Send + 'static,
        E: FnMut(SubscriptionError) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => on_next(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Change subscriber lagged by {} events", skipped);
                        on_error(SubscriptionError::Lagged(skipped));
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        on_error(SubscriptionError::Closed);
                        break;
                    }
                }
            }
        });
        Subscription { handle }
    }
}

/// Активная подписка; при удалении пересылка прекращается
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
