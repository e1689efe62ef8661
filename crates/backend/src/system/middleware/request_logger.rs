use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

/// Размер в байтах с разделителем триад: 1234567 -> "1.234.567"
fn format_size(bytes: usize) -> String {
    let digits = bytes.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Голубой для 2xx, желтый для остального
fn status_color(status: StatusCode) -> &'static str {
    if status.is_success() {
        "36"
    } else {
        "33"
    }
}

fn print_line(status: StatusCode, method: &str, path: &str, millis: u128, size: &str) {
    // Время по МСК
    let timestamp = Utc::now() + chrono::Duration::hours(3);
    println!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        status_color(status),
        timestamp.format("%H:%M:%S"),
        millis,
        size,
        status.as_u16(),
        method,
        path
    );
}

/// Middleware: одна строка в консоль на каждый HTTP запрос
///
/// Upgrade-ответы (websocket) не буферизуются.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    if response.status() == StatusCode::SWITCHING_PROTOCOLS {
        print_line(response.status(), &method, &path, start.elapsed().as_millis(), "ws");
        return response;
    }

    let (parts, body) = response.into_parts();
    match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            print_line(
                parts.status,
                &method,
                &path,
                start.elapsed().as_millis(),
                &format_size(bytes.len()),
            );
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::warn!("Failed to read response body for {} {}: {}", method, path, e);
            print_line(parts.status, &method, &path, start.elapsed().as_millis(), "error");
            Response::from_parts(parts, Body::empty())
        }
    }
}
