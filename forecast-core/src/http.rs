use reqwest::{
    Client,
    header::{ACCEPT, USER_AGENT},
};
use serde::de::DeserializeOwned;

use crate::ForecastError;

/// GET `url` and decode the JSON body. Any non-2xx status is an error.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    user_agent: &str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ForecastError> {
    tracing::debug!(url, ?query, "GET");

    let res = http
        .get(url)
        .query(query)
        .header(USER_AGENT, user_agent)
        .header(ACCEPT, "application/geo+json, application/json")
        .send()
        .await
        .map_err(|source| ForecastError::Transport { url: url.to_string(), source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| ForecastError::Transport { url: url.to_string(), source })?;

    if !status.is_success() {
        return Err(ForecastError::Status {
            url: url.to_string(),
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| ForecastError::Parse {
        url: url.to_string(),
        source,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
