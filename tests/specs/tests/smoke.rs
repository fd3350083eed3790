// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `tailproxy` binary.

use std::time::Duration;

use tailproxy_specs::ProxyProcess;

const TIMEOUT: Duration = Duration::from_secs(10);

fn content_type(resp: &reqwest::Response) -> Option<String> {
    resp.headers().get("content-type").and_then(|v| v.to_str().ok()).map(str::to_owned)
}

#[tokio::test]
async fn listens_on_proxy_port() -> anyhow::Result<()> {
    let mut proxy = ProxyProcess::start()?;
    proxy.wait_ready(TIMEOUT).await?;

    assert!(!proxy.has_exited()?);
    let resp = reqwest::get(format!("http://127.0.0.1:{}/devices", proxy.port())).await?;
    assert_eq!(resp.status().as_u16(), 503);
    Ok(())
}

#[tokio::test]
async fn unknown_path_is_json_404() -> anyhow::Result<()> {
    let proxy = ProxyProcess::start()?;
    proxy.wait_ready(TIMEOUT).await?;

    let resp = reqwest::get(format!("{}/status", proxy.base_url())).await?;
    assert_eq!(resp.status().as_u16(), 404);
    assert_eq!(content_type(&resp).as_deref(), Some("application/json"));
    assert_eq!(resp.text().await?, r#"{"error":"not found"}"#);
    Ok(())
}

#[tokio::test]
async fn post_is_json_501() -> anyhow::Result<()> {
    let proxy = ProxyProcess::start()?;
    proxy.wait_ready(TIMEOUT).await?;

    let resp = reqwest::Client::new().post(format!("{}/devices", proxy.base_url())).send().await?;
    assert_eq!(resp.status().as_u16(), 501);
    assert_eq!(resp.text().await?, r#"{"error":"not implemented"}"#);
    Ok(())
}

#[tokio::test]
async fn devices_without_token_is_503() -> anyhow::Result<()> {
    let proxy = ProxyProcess::start()?;
    proxy.wait_ready(TIMEOUT).await?;

    let resp = reqwest::get(format!("{}/devices", proxy.base_url())).await?;
    assert_eq!(resp.status().as_u16(), 503);
    assert_eq!(content_type(&resp).as_deref(), Some("application/json"));
    assert_eq!(resp.text().await?, r#"{"error":"tailscale token unavailable"}"#);
    Ok(())
}

#[tokio::test]
async fn devices_with_unreachable_upstream_is_502() -> anyhow::Result<()> {
    let proxy = ProxyProcess::build().token("tskey-smoke\n").spawn()?;
    proxy.wait_ready(TIMEOUT).await?;

    let resp = reqwest::get(format!("{}/devices", proxy.base_url())).await?;
    assert_eq!(resp.status().as_u16(), 502);
    assert_eq!(content_type(&resp).as_deref(), Some("application/json"));

    let body: serde_json::Value = resp.json().await?;
    let error = body["error"].as_str().unwrap_or_default();
    assert!(!error.is_empty(), "expected a network error description, got: {body}");
    Ok(())
}

#[tokio::test]
async fn invalid_upstream_url_exits_with_usage_error() -> anyhow::Result<()> {
    let mut proxy = ProxyProcess::build().devices_url("ftp://example.com/devices").spawn()?;

    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while !proxy.has_exited()? {
        if tokio::time::Instant::now() > deadline {
            anyhow::bail!("tailproxy kept running with an invalid upstream URL");
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    Ok(())
}
