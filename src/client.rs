use std::str::FromStr;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, DATE};
use http::Request;
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::constants::FORMATS;
use crate::credential::{Credential, SigningCredential};
use crate::sign_request::{RequestSigner, SignRequest, SignatureAlgorithm};
use crate::time::{format_http_date, now};
use crate::utils::script_escape;
use crate::{Context, Error, Result};

/// Characters that cannot appear raw in a URI path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%')
    .add(b'\\')
    .add(b'^')
    .add(b'[')
    .add(b']')
    .add(b'|');

/// The raw response layer shared by every operation.
///
/// Statuses are passed through uninterpreted: a non-2xx response still
/// carries whatever body the server returned, and the JSON parse is
/// attempted on it all the same.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponse {
    /// HTTP status code, e.g. 200.
    pub status: u16,
    /// Value of the `content-type` response header, if any.
    pub content_type: Option<String>,
    /// Raw response body.
    pub body: String,
    /// The body escaped for embedding in a single-quoted script string.
    pub safe_json: String,
}

impl RawResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Envelope returned by [`StoryClient::get_index`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryIndex {
    /// Parsed JSON payload of the index.
    pub data: Value,
    /// App server base URL, joined with the requested path.
    pub app_server: String,
    /// Raw response details.
    #[serde(flatten)]
    pub response: RawResponse,
}

/// Envelope returned by [`StoryClient::get_story_by_id`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// The story id the request was made for.
    pub story_id: String,
    /// Parsed JSON payload of the story.
    pub data: Value,
    /// App server base URL, joined with the requested path.
    pub app_server: String,
    /// Raw response details.
    #[serde(flatten)]
    pub response: RawResponse,
}

/// Envelope returned by [`StoryClient::get_story_by_url`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryByUrl {
    /// The story url the request was made for.
    pub url: String,
    /// Parsed JSON payload of the story.
    pub data: Value,
    /// App server base URL, joined with the requested path.
    pub app_server: String,
    /// Raw response details.
    #[serde(flatten)]
    pub response: RawResponse,
}

/// Client for the story content API.
///
/// Holds immutable configuration and a signer; every operation performs
/// exactly one signed HTTP GET. The client never retries and keeps no state
/// across calls, so it can be shared freely between tasks.
///
/// ## Example
///
/// ```no_run
/// use storyserver_client::{Config, Context, ReqwestHttpSend, StoryClient};
///
/// # async fn example() -> storyserver_client::Result<()> {
/// let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
/// let config = Config::new()
///     .with_story_server("https://stories.example.com/api/v1")
///     .with_app_server("https://www.example.com")
///     .with_key_id("my-key-id")
///     .with_secret_key("my-secret-key")
///     .with_format("thumbnail", "450x300");
///
/// let client = StoryClient::new(ctx, config)?;
/// let story = client.get_story_by_id("21", "chapter/2").await?;
/// println!("{}", story.data);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StoryClient {
    ctx: Context,
    story_server: String,
    app_server: String,
    formats_header: String,
    credential: Credential,
    signer: RequestSigner,
}

impl StoryClient {
    /// Create a new client from the given context and configuration.
    ///
    /// Fails with `ConfigInvalid` when any of `story_server`, `app_server`,
    /// `key_id`, `secret_key` or `formats` is missing, and with
    /// `UnsupportedAlgorithm` when `algorithm` names an unknown scheme.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let story_server = config
            .story_server
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("story_server is required"))?
            .trim_end_matches('/')
            .to_string();
        let app_server = config
            .app_server
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("app_server is required"))?
            .trim_end_matches('/')
            .to_string();

        let key_id = config
            .key_id
            .clone()
            .ok_or_else(|| Error::config_invalid("key_id is required"))?;
        let secret_key = config
            .secret_key
            .clone()
            .ok_or_else(|| Error::config_invalid("secret_key is required"))?;
        let credential = Credential::new(key_id, secret_key);
        if !credential.is_valid() {
            return Err(Error::config_invalid("key_id and secret_key must not be empty"));
        }

        let formats = config
            .formats
            .as_ref()
            .ok_or_else(|| Error::config_invalid("formats is required"))?;
        let formats_header = serde_json::to_string(formats)
            .map_err(|e| Error::config_invalid("formats is not serializable").with_source(e))?;

        let algorithm = match config.algorithm.as_deref() {
            Some(v) => SignatureAlgorithm::from_str(v)?,
            None => SignatureAlgorithm::default(),
        };

        Ok(Self {
            ctx,
            story_server,
            app_server,
            formats_header,
            credential,
            signer: RequestSigner::new().with_algorithm(algorithm),
        })
    }

    /// Get the index of stories.
    ///
    /// Non-empty `story_ids` are sent comma-joined as the `ids` query
    /// parameter (`ids=3,5`); an empty slice omits the query string
    /// entirely. `path` is joined onto the app server base URL.
    pub async fn get_index(&self, story_ids: &[&str], path: &str) -> Result<StoryIndex> {
        let url = format!("{}/stories/{}", self.story_server, self.credential.key_id);
        let query = if story_ids.is_empty() {
            None
        } else {
            Some(format!("ids={}", story_ids.join(",")))
        };

        let (data, response) = self.request(&url, query.as_deref()).await?;

        Ok(StoryIndex {
            data,
            app_server: self.app_server_for(path),
            response,
        })
    }

    /// Get a story by its id.
    pub async fn get_story_by_id(&self, story_id: &str, path: &str) -> Result<Story> {
        let url = format!(
            "{}/stories/{}/{}",
            self.story_server, self.credential.key_id, story_id
        );

        let (data, response) = self.request(&url, None).await?;

        Ok(Story {
            story_id: story_id.to_string(),
            data,
            app_server: self.app_server_for(path),
            response,
        })
    }

    /// Get a story by its canonical url.
    ///
    /// The url is percent-encoded into a single path segment of the request.
    pub async fn get_story_by_url(&self, url: &str, path: &str) -> Result<StoryByUrl> {
        let request_url = format!(
            "{}/stories/{}/url/{}",
            self.story_server,
            self.credential.key_id,
            utf8_percent_encode(url, PATH_SEGMENT)
        );

        let (data, response) = self.request(&request_url, None).await?;

        Ok(StoryByUrl {
            url: url.to_string(),
            data,
            app_server: self.app_server_for(path),
            response,
        })
    }

    /// Join `path` onto the configured app server base URL.
    fn app_server_for(&self, path: &str) -> String {
        if path.is_empty() {
            self.app_server.clone()
        } else {
            format!("{}/{}", self.app_server, path)
        }
    }

    /// Execute one signed GET and decode the response.
    async fn request(&self, url: &str, query: Option<&str>) -> Result<(Value, RawResponse)> {
        let uri = match query {
            Some(q) => format!("{url}?{q}"),
            None => url.to_string(),
        };
        debug!("sending signed GET {uri}");

        let req = Request::get(uri.as_str()).body(Bytes::new())?;
        let (mut parts, _) = req.into_parts();
        parts.headers.insert(DATE, format_http_date(now()).parse()?);
        parts.headers.insert(FORMATS, self.formats_header.parse()?);
        self.signer
            .sign_request(&self.ctx, &mut parts, &self.credential)
            .await?;

        let resp = self
            .ctx
            .http_send_as_string(Request::from_parts(parts, Bytes::new()))
            .await?;

        let (parts, body) = resp.into_parts();
        let content_type = match parts.headers.get(CONTENT_TYPE) {
            Some(v) => Some(v.to_str()?.to_string()),
            None => None,
        };

        let data: Value = serde_json::from_str(&body)
            .map_err(|e| Error::response_malformed("response body is not valid JSON").with_source(e))?;
        let safe_json = script_escape(&body);

        Ok((
            data,
            RawResponse {
                status: parts.status.as_u16(),
                content_type,
                body,
                safe_json,
            },
        ))
    }
}
