use crate::{Error, Result, SearchQuery, SearchResponse, SuggestionResult, WidgetConfig};
use reqwest::blocking::Client;

/// Path of the NPI dataset search endpoint, relative to the API base URI
pub const SEARCH_PATH: &str = "search/usgov.hhs.npi";

/// Anything that can answer a directory search
pub trait SearchBackend {
    fn search(&self, query: &SearchQuery) -> Result<Vec<SuggestionResult>>;
}

impl<B: SearchBackend + ?Sized> SearchBackend for Box<B> {
    fn search(&self, query: &SearchQuery) -> Result<Vec<SuggestionResult>> {
        (**self).search(query)
    }
}

/// Blocking HTTP client for the BloomAPI NPI search endpoint
pub struct BloomClient {
    search_url: url::Url,
    client: Client,
}

impl BloomClient {
    pub fn new(config: &WidgetConfig) -> Result<Self> {
        let base = config.normalized_base_uri();
        let base_url = url::Url::parse(&base).map_err(|source| Error::InvalidBaseUri {
            uri: base.clone(),
            source,
        })?;
        let search_url = base_url
            .join(SEARCH_PATH)
            .map_err(|source| Error::InvalidBaseUri { uri: base, source })?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("physician-complete/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { search_url, client })
    }

    pub fn search_url(&self) -> &url::Url {
        &self.search_url
    }
}

impl SearchBackend for BloomClient {
    fn search(&self, query: &SearchQuery) -> Result<Vec<SuggestionResult>> {
        log::debug!("GET {}?{}", self.search_url, query);

        let response = self
            .client
            .get(self.search_url.clone())
            .query(&query.params())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Status { status, body });
        }

        let body = response.text()?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_joins_base_with_or_without_slash() {
        let client = BloomClient::new(&WidgetConfig::default()).unwrap();
        assert_eq!(
            client.search_url().as_str(),
            "http://www.bloomapi.com/api/search/usgov.hhs.npi"
        );

        let config = WidgetConfig::default().with_api_base_uri("http://localhost:8080/v1");
        let client = BloomClient::new(&config).unwrap();
        assert_eq!(
            client.search_url().as_str(),
            "http://localhost:8080/v1/search/usgov.hhs.npi"
        );
    }

    #[test]
    fn test_invalid_base_uri() {
        let config = WidgetConfig::default().with_api_base_uri("::nope::");
        assert!(matches!(
            BloomClient::new(&config),
            Err(Error::InvalidBaseUri { .. })
        ));
    }
}
