use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::response::Html;
use chrono::Local;

use crate::api::server::AppState;

const NOT_AVAILABLE: &str = "N/A";

struct StatusPage {
    hostname: String,
    server_ip: String,
    client_ip: String,
    timestamp: String,
    load_average: String,
    memory_total: String,
    memory_available: String,
    request_number: u64,
}

pub(crate) async fn index(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Html<String> {
    let metrics = state.metrics.as_ref();

    let page = StatusPage {
        hostname: metrics.hostname().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        server_ip: local_ip_address::local_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|_| NOT_AVAILABLE.to_string()),
        client_ip: connect_info
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        load_average: or_not_available(metrics.load_average().map(|load| load[0])),
        memory_total: or_not_available(metrics.memory_total_mb()),
        memory_available: or_not_available(metrics.memory_available_mb()),
        request_number: state.requests.next(),
    };

    Html(render(&page))
}

fn or_not_available<T: ToString>(value: Option<T>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render(page: &StatusPage) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>HPA Test Application</title>
</head>
<body>
    <h1>HPA Test Application</h1>
    <h3>Server</h3>
    <p><strong>Hostname:</strong> {hostname}</p>
    <p><strong>Server IP:</strong> {server_ip}</p>
    <p><strong>Client IP:</strong> {client_ip}</p>
    <p><strong>Timestamp:</strong> {timestamp}</p>
    <p><strong>Load Average:</strong> {load_average}</p>
    <h3>Load test</h3>
    <ul>
        <li><a href="/stress?cpu=1&amp;duration=30">/stress?cpu=1&amp;duration=30</a> - moderate CPU stress (30s)</li>
        <li><a href="/stress?cpu=2&amp;duration=60">/stress?cpu=2&amp;duration=60</a> - high CPU stress (60s)</li>
        <li><a href="/stress?memory=50">/stress?memory=50</a> - memory stress (50MB)</li>
        <li><a href="/stress?action=health">/stress?action=health</a> - health check</li>
        <li><a href="/stress?action=info">/stress?action=info</a> - system information</li>
    </ul>
    <h3>System</h3>
    <p><strong>Total Memory:</strong> {memory_total} MB</p>
    <p><strong>Available Memory:</strong> {memory_available} MB</p>
    <p>This is request number <strong>{request_number}</strong> for this pod.</p>
</body>
</html>
"#,
        hostname = escape(&page.hostname),
        server_ip = page.server_ip,
        client_ip = page.client_ip,
        timestamp = page.timestamp,
        load_average = page.load_average,
        memory_total = page.memory_total,
        memory_available = page.memory_available,
        request_number = page.request_number,
    )
}
