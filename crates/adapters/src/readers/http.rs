//! Remote documents fetched over HTTP(S).
//!
//! The reader POSTs to the configured URL. `-name=value` and `+name=value`
//! query entries become request headers (`+` wins on conflict), the URL
//! credentials become basic auth and `?verify=no` disables certificate
//! checks. A `yaml` or `text` `Content-Type` hints the document format.

use super::{MAX_BUFFER_SIZE, ReaderError, decode_document};
use notifyconf_domain::encoding::unquote;
use notifyconf_domain::patterns::static_regex;
use notifyconf_domain::{Sigil, mask_url, parse_bool};
use notifyconf_ports::{ConfigContent, ConfigFormat, ConfigReaderPort, IncludeMode, SourceLocation};
use notifyconf_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use regex::Regex;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

static MIME_IS_YAML: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"(?i)^\s*(text|application)/(x-)?yaml"));
static MIME_IS_TEXT: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"(?i)^\s*text/(plain|html)"));

const SCHEMAS: &[&str] = &["http", "https"];

/// HTTP reader settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReaderConfig {
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Connect timeout; `?cto=` overrides it per URL.
    pub connect_timeout: Duration,
    /// Read timeout; `?rto=` overrides it per URL.
    pub read_timeout: Duration,
}

impl Default for HttpReaderConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("notifyconf/", env!("CARGO_PKG_VERSION")).to_owned(),
            connect_timeout: Duration::from_secs(4),
            read_timeout: Duration::from_secs(4),
        }
    }
}

/// Reads `http://` and `https://` documents.
///
/// Remote documents may be included from any source.
#[derive(Debug, Clone, Default)]
pub struct HttpConfigReader {
    config: HttpReaderConfig,
}

impl HttpConfigReader {
    /// Create a reader with the given settings.
    #[must_use]
    pub const fn new(config: HttpReaderConfig) -> Self {
        Self { config }
    }
}

impl ConfigReaderPort for HttpConfigReader {
    fn schemas(&self) -> &[&str] {
        SCHEMAS
    }

    fn include_mode(&self) -> IncludeMode {
        IncludeMode::Always
    }

    fn read(&self, location: &SourceLocation) -> Result<ConfigContent> {
        let parsed = &location.parsed;
        let masked = mask_url(&location.url);
        let params = &parsed.params;

        let verify = params.get("verify").is_none_or(|value| parse_bool(value, true));
        let connect_timeout = timeout_param(params.get("cto"), self.config.connect_timeout);
        let read_timeout = timeout_param(params.get("rto"), self.config.read_timeout);

        let client = reqwest::blocking::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .danger_accept_invalid_certs(!verify)
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("config", "http_client_init_failed"),
                    format!("failed to build HTTP client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        let mut request = client
            .post(endpoint(location)?)
            .headers(request_headers(&self.config.user_agent, location)?);
        if let Some(user) = &parsed.user {
            let password = parsed.password.as_ref().map(|password| unquote(password.expose()));
            request = request.basic_auth(unquote(user), password);
        }

        let response = request
            .send()
            .map_err(|error| map_reqwest_error(&error, &masked))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReaderError::HttpStatus {
                location: masked,
                status: status.as_u16(),
            }
            .into());
        }

        let declared = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or_default();
        if declared > MAX_BUFFER_SIZE {
            return Err(ReaderError::TooLarge {
                location: masked,
                limit: MAX_BUFFER_SIZE,
            }
            .into());
        }
        let format_hint = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(format_from_content_type);

        let limit = u64::try_from(MAX_BUFFER_SIZE).unwrap_or(u64::MAX);
        let mut bytes = Vec::new();
        response
            .take(limit.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|error| ReaderError::Io {
                location: masked.clone(),
                message: error.to_string(),
                retriable: true,
            })?;

        let text = decode_document(bytes, params.get("encoding"), &masked)?;
        Ok(ConfigContent::text(text).with_hint(format_hint))
    }
}

/// Map a `Content-Type` onto a document format.
#[must_use]
pub fn format_from_content_type(content_type: &str) -> Option<ConfigFormat> {
    if MIME_IS_YAML.is_match(content_type) {
        Some(ConfigFormat::Yaml)
    } else if MIME_IS_TEXT.is_match(content_type) {
        Some(ConfigFormat::Text)
    } else {
        None
    }
}

fn endpoint(location: &SourceLocation) -> Result<Url> {
    let parsed = &location.parsed;
    let invalid = |reason: String| {
        ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            format!("invalid configuration URL: {reason}"),
        )
        .with_metadata("url", mask_url(&location.url))
    };
    let mut url = Url::parse(&format!("{}://{}", parsed.schema, parsed.host))
        .map_err(|error| invalid(error.to_string()))?;
    if parsed.port.is_some() {
        url.set_port(parsed.port)
            .map_err(|()| invalid("port not allowed".to_owned()))?;
    }
    url.set_path(parsed.fullpath.as_deref().unwrap_or("/"));
    Ok(url)
}

fn request_headers(user_agent: &str, location: &SourceLocation) -> Result<HeaderMap> {
    let params = &location.parsed.params;
    let mut merged: BTreeMap<&str, &str> = BTreeMap::new();
    for sigil in [Sigil::Minus, Sigil::Plus] {
        for (name, value) in params.partition(sigil) {
            merged.insert(name, value);
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent).unwrap_or(HeaderValue::from_static("notifyconf")),
    );
    for (name, value) in merged {
        let header_name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|_| {
            ErrorEnvelope::expected(ErrorCode::invalid_input(), "invalid HTTP header name")
                .with_metadata("header", name)
        })?;
        let mut header_value = HeaderValue::from_str(value).map_err(|_| {
            ErrorEnvelope::expected(ErrorCode::invalid_input(), "invalid HTTP header value")
                .with_metadata("header", name)
        })?;
        header_value.set_sensitive(true);
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

fn timeout_param(value: Option<&str>, default: Duration) -> Duration {
    value
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
        .map_or(default, Duration::from_secs_f64)
}

fn map_reqwest_error(error: &reqwest::Error, masked: &str) -> ErrorEnvelope {
    if error.is_timeout() {
        return ErrorEnvelope::unexpected(
            ErrorCode::timeout(),
            format!("configuration request to {masked} timed out"),
            ErrorClass::Retriable,
        );
    }
    if error.is_connect() {
        return ErrorEnvelope::unexpected(
            ErrorCode::io(),
            format!("connection to {masked} failed: {error}"),
            ErrorClass::Retriable,
        );
    }
    ErrorEnvelope::unexpected(
        ErrorCode::new("config", "fetch_failed"),
        format!("configuration request to {masked} failed: {error}"),
        ErrorClass::NonRetriable,
    )
}
