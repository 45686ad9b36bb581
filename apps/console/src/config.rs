use serde::{Deserialize, Serialize};

const DEFAULT_RAG_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_REST_API_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_CHART_LIMIT: u32 = 10;
const DEFAULT_REFRESH_SOURCE: &str = "inventory_data";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppProfile {
    Dev,
    Prod,
}

impl AppProfile {
    pub fn from_env(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("prod") | Some("production") => Self::Prod,
            _ => Self::Dev,
        }
    }
}

/// 进程入口处构造一次，之后以 `Arc` 传入客户端。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub rag_base_url: String,
    pub rest_base_url: String,
    pub secret_key: Option<String>,
    pub chart_limit: u32,
    pub refresh_source: String,
    pub profile: AppProfile,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rag_base_url: DEFAULT_RAG_API_BASE_URL.to_string(),
            rest_base_url: DEFAULT_REST_API_BASE_URL.to_string(),
            secret_key: None,
            chart_limit: DEFAULT_CHART_LIMIT,
            refresh_source: DEFAULT_REFRESH_SOURCE.to_string(),
            profile: AppProfile::Dev,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        crate::config::load_dotenv();

        Self::from_lookup(read_env)
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("AUDASH_RAG_API_BASE_URL") {
            config.rag_base_url = url;
        }

        if let Some(url) = lookup("AUDASH_REST_API_BASE_URL") {
            config.rest_base_url = url;
        }

        if let Some(key) = lookup("AUDASH_SECRET_KEY") {
            config.secret_key = Some(key);
        }

        if let Some(limit) =
            lookup("AUDASH_CHART_LIMIT").and_then(|value| value.trim().parse::<u32>().ok())
        {
            config.chart_limit = limit.max(1);
        }

        if let Some(source) = lookup("AUDASH_REFRESH_SOURCE") {
            config.refresh_source = source;
        }

        config.profile = AppProfile::from_env(lookup("AUDASH_PROFILE"));

        config
    }

    /// 后端要求 body 中携带 `secret_key`，未配置时发送空串。
    pub fn secret_key(&self) -> &str {
        self.secret_key.as_deref().map(str::trim).unwrap_or_default()
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| option_env_from_build(key).map(|s| s.to_string()))
        .filter(|value| !value.trim().is_empty())
}

fn option_env_from_build(key: &str) -> Option<&'static str> {
    match key {
        "AUDASH_RAG_API_BASE_URL" => option_env!("AUDASH_RAG_API_BASE_URL"),
        "AUDASH_REST_API_BASE_URL" => option_env!("AUDASH_REST_API_BASE_URL"),
        "AUDASH_SECRET_KEY" => option_env!("AUDASH_SECRET_KEY"),
        "AUDASH_CHART_LIMIT" => option_env!("AUDASH_CHART_LIMIT"),
        "AUDASH_REFRESH_SOURCE" => option_env!("AUDASH_REFRESH_SOURCE"),
        "AUDASH_PROFILE" => option_env!("AUDASH_PROFILE"),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            tracing::warn!("failed to load .env: {err}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn load_dotenv() {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.rag_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.rest_base_url, "http://localhost:3000");
        assert_eq!(config.chart_limit, 10);
        assert_eq!(config.refresh_source, "inventory_data");
        assert_eq!(config.secret_key(), "");
        assert_eq!(config.profile, AppProfile::Dev);
    }

    #[test]
    fn overrides_are_read_and_clamped() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("AUDASH_RAG_API_BASE_URL", "https://rag.internal/"),
            ("AUDASH_SECRET_KEY", "  s3cret "),
            ("AUDASH_CHART_LIMIT", "0"),
            ("AUDASH_PROFILE", "production"),
        ]));
        assert_eq!(config.rag_base_url, "https://rag.internal/");
        assert_eq!(config.secret_key(), "s3cret");
        assert_eq!(config.chart_limit, 1);
        assert_eq!(config.profile, AppProfile::Prod);
    }

    #[test]
    fn unparsable_limit_keeps_default() {
        let config = AppConfig::from_lookup(lookup_from(&[("AUDASH_CHART_LIMIT", "ten")]));
        assert_eq!(config.chart_limit, 10);
    }
}
