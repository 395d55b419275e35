use axum::http::{HeaderMap, header};
use url::Url;

// Hostnames allowed to call the chat endpoint
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins {
    hosts: Vec<String>,
}

impl AllowedOrigins {
    // Create from comma-separated hostnames "localhost, chat.example.com"
    pub fn from_list(list: &str) -> Self {
        let hosts = list
            .split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { hosts }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn is_allowed_host(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| h.eq_ignore_ascii_case(host))
    }

    // Origin first, Referer as fallback
    pub fn is_allowed(&self, headers: &HeaderMap) -> bool {
        let value = headers
            .get(header::ORIGIN)
            .or_else(|| headers.get(header::REFERER))
            .and_then(|v| v.to_str().ok());

        match value.and_then(domain_from_header) {
            Some(host) => self.is_allowed_host(&host),
            None => false,
        }
    }
}

// The header may hold several space-separated origins, only the first counts
pub fn domain_from_header(value: &str) -> Option<String> {
    let first = value.split_whitespace().next()?;
    let url = Url::parse(first).ok()?;
    url.host_str().map(|h| h.to_string())
}
