//! 제공자 공통 HTTP 처리.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::error;

use crate::error::{ProviderError, ProviderResult};

/// Yahoo Finance는 브라우저가 아닌 User-Agent를 거부하는 경우가 있습니다.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; edutrade/0.1)";

/// 타임아웃이 설정된 HTTP 클라이언트를 생성합니다.
pub(crate) fn build_client(timeout: Duration) -> ProviderResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProviderError::Upstream(format!("HTTP 클라이언트 생성 실패: {}", e)))
}

/// 응답 본문을 읽고, 실패 상태 코드는 공통 규칙으로 분류합니다.
///
/// 429 → RateLimited, 404 → NotFound, 그 외 비성공 → Upstream.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    source: &str,
) -> ProviderResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(classify_status(status, &body, source));
    }

    serde_json::from_str(&body).map_err(|e| {
        error!(source, error = %e, "응답 파싱 실패");
        ProviderError::from(e)
    })
}

/// 실패 상태 코드를 오류로 분류합니다.
pub(crate) fn classify_status(status: StatusCode, body: &str, source: &str) -> ProviderError {
    let message = format!("{} HTTP {}: {}", source, status.as_u16(), truncate(body, 200));
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
        StatusCode::NOT_FOUND => ProviderError::NotFound(message),
        _ => ProviderError::Upstream(message),
    }
}

/// 최근 `limit`개만 남깁니다 (오래된 캔들부터 제거).
pub(crate) fn keep_last<T>(mut items: Vec<T>, limit: usize) -> Vec<T> {
    if items.len() > limit {
        items.drain(..items.len() - limit);
    }
    items
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
