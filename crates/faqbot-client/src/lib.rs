// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use faqbot_app::{FaqContent, Topic};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeReply {
    pub message: String,
    pub topic_keys: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    welcome_path: String,
    query_path: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(
        base_url: &str,
        welcome_path: &str,
        query_path: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("backend.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("invalid backend.base_url {base_url:?}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "backend.base_url must use http or https, got scheme {:?}",
                parsed.scheme()
            );
        }

        let welcome_path = validate_path(welcome_path, "backend.welcome_path")?;
        let query_path = validate_path(query_path, "backend.query_path")?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            welcome_path,
            query_path,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn fetch_welcome(&self) -> Result<WelcomeReply> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, self.welcome_path))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: WelcomeEnvelope = response.json().context("decode welcome response")?;
        Ok(WelcomeReply {
            message: parsed.message,
            topic_keys: parsed.queries,
        })
    }

    pub fn fetch_topic(&self, key: &str) -> Result<Topic> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, self.query_path))
            .json(&QueryRequest { key })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: TopicEnvelope = response
            .json()
            .with_context(|| format!("decode topic response for {key:?}"))?;
        Topic::new(
            parsed.message,
            parsed.sub.unwrap_or_default().into_iter().collect(),
        )
    }

    /// Fetches the welcome message and then every announced topic, one
    /// request at a time; the next request starts only after the previous
    /// response arrives. Returns a complete snapshot, or the first error with
    /// nothing published -- a failed topic fetch aborts the whole cycle.
    pub fn load_content(&self) -> Result<FaqContent> {
        let welcome = self.fetch_welcome()?;
        let mut topics = Vec::with_capacity(welcome.topic_keys.len());
        for key in welcome.topic_keys {
            let topic = self
                .fetch_topic(&key)
                .with_context(|| format!("fetch topic {key:?}"))?;
            topics.push((key, topic));
        }
        FaqContent::new(welcome.message, topics)
    }
}

fn validate_path(path: &str, label: &str) -> Result<String> {
    let path = path.trim();
    if path.is_empty() {
        bail!("{label} must not be empty");
    }
    if !path.starts_with('/') {
        bail!("{label} must start with '/', got {path:?}");
    }
    Ok(path.to_owned())
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!("cannot reach FAQ backend {base_url} ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<BackendErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return anyhow!("backend error ({}): {}", status.as_u16(), error);
    }

    if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() {
        return anyhow!("backend error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("backend returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct WelcomeEnvelope {
    message: String,
    queries: Vec<String>,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct TopicEnvelope {
    message: String,
    sub: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct BackendErrorEnvelope {
    error: Option<String>,
}
