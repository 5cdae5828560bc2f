use crate::config::CsrfConfig;
use rampart_http::HttpRequest;

/// One place a client may put its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Field of a JSON object or urlencoded form body
    BodyField(String),
    /// Request header, matched case-insensitively
    Header(String),
}

impl TokenSource {
    /// Look for a token in this channel. Empty values count as absent.
    pub fn extract(&self, request: &HttpRequest) -> Option<String> {
        let value = match self {
            TokenSource::BodyField(field) => body_field(request, field),
            TokenSource::Header(name) => request.header(name).map(str::to_string),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Ordered list of channels; the first one that yields a value wins.
#[derive(Debug, Clone)]
pub struct TokenSources {
    sources: Vec<TokenSource>,
}

impl TokenSources {
    pub fn new(sources: Vec<TokenSource>) -> Self {
        Self { sources }
    }

    /// Body field first, then each configured header in order
    pub fn from_config(config: &CsrfConfig) -> Self {
        let body = (!config.field_name.is_empty())
            .then(|| TokenSource::BodyField(config.field_name.clone()));
        let headers = config
            .header_names
            .iter()
            .map(|name| TokenSource::Header(name.clone()));

        Self::new(body.into_iter().chain(headers).collect())
    }

    pub fn find(&self, request: &HttpRequest) -> Option<String> {
        self.sources.iter().find_map(|source| source.extract(request))
    }

    pub fn sources(&self) -> &[TokenSource] {
        &self.sources
    }
}

fn body_field(request: &HttpRequest, field: &str) -> Option<String> {
    if request.body.is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(map)) =
        serde_json::from_slice::<serde_json::Value>(&request.body)
    {
        return map.get(field).and_then(|v| v.as_str()).map(str::to_string);
    }

    serde_urlencoded::from_bytes::<Vec<(String, String)>>(&request.body)
        .ok()?
        .into_iter()
        .find(|(key, _)| key == field)
        .map(|(_, value)| value)
}
