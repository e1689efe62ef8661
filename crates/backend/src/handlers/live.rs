use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
};
use contracts::dashboards::d100_date_graph::dto::DateGraphRequest;
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use crate::dashboards::d100_date_graph::live::LiveChartSession;
use crate::dashboards::d100_date_graph::service;
use crate::shared::events;

/// GET /api/live: поток событий изменений
pub async fn changes_ws(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(handle_changes_socket)
}

async fn handle_changes_socket(socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = events::hub().receiver();
    tracing::info!("Live feed client connected");

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(t) => t,
                        Err(e) => {
                            tracing::error!("Failed to serialize change event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Live feed client lagged, {} events skipped", skipped);
                    let notice = serde_json::json!({"lagged": skipped}).to_string();
                    if sender.send(Message::Text(notice)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // входящие сообщения не нужны, ждем закрытия
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }
    tracing::info!("Live feed client disconnected");
}

/// GET /api/d100/date-graph/live: живой график.
///
/// Клиент присылает DateGraphRequest в виде JSON; график пересчитывается на
/// каждый запрос и на каждое изменение данных. Устаревшие результаты не отправляются.
pub async fn date_graph_ws(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(handle_date_graph_socket)
}

fn spawn_recompute(
    session: &Arc<LiveChartSession>,
    token: contracts::shared::request_token::RequestToken,
    request: DateGraphRequest,
) {
    let session = Arc::clone(session);
    tokio::spawn(async move {
        session.run(token, request, service::get_date_graph).await;
    });
}

async fn handle_date_graph_socket(socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<String>();
    let session = LiveChartSession::new(outbox_tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = outbox_rx.recv().await {
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let changes_session = Arc::clone(&session);
    let _subscription = events::hub().subscribe(
        move |event| {
            if !event.affects_chart() {
                return;
            }
            let session = Arc::clone(&changes_session);
            tokio::spawn(async move {
                if let Some((token, request)) = session.invalidate().await {
                    spawn_recompute(&session, token, request);
                }
            });
        },
        |err| tracing::warn!("Live chart change feed: {}", err),
    );

    let request_session = Arc::clone(&session);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<DateGraphRequest>(&text) {
                    Ok(request) => {
                        let token = request_session.set_request(request.clone()).await;
                        spawn_recompute(&request_session, token, request);
                    }
                    Err(e) => {
                        tracing::warn!("Live chart: ignoring malformed request: {}", e);
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }
    tracing::debug!("Live chart client disconnected");
}
