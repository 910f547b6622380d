//! Signed HTTP client for the StoryServer content API.
//!
//! This crate builds signed GET requests against a story content server,
//! sends them over a pluggable transport, and reshapes the JSON responses
//! for a rendering layer.
//!
//! ## Overview
//!
//! The crate is built around a few pieces:
//!
//! - **Context**: a container holding the HTTP transport and environment
//!   access the client uses
//! - **RequestSigner**: implements the `Signature keyId=...` authorization
//!   header scheme (HMAC over a canonical header string, HMAC-SHA1 by
//!   default for wire compatibility)
//! - **StoryClient**: composes request URLs, signs them, performs one HTTP
//!   round trip per call and wraps results into envelopes
//!
//! ## Example
//!
//! ```no_run
//! use storyserver_client::{Config, Context, OsEnv, ReqwestHttpSend, StoryClient};
//!
//! #[tokio::main]
//! async fn main() -> storyserver_client::Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     // Credentials may also come from STORYSERVER_* env values.
//!     let config = Config::new()
//!         .with_story_server("https://stories.example.com/api/v1")
//!         .with_app_server("https://www.example.com")
//!         .with_format("thumbnail", "450x300")
//!         .with_format("large", "1024l")
//!         .from_env(&ctx);
//!
//!     let client = StoryClient::new(ctx, config)?;
//!
//!     let index = client.get_index(&[], "").await?;
//!     println!("index: {}", index.data);
//!
//!     let story = client.get_story_by_id("21", "chapter/2").await?;
//!     println!("story for {}: {}", story.app_server, story.data);
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! All failures surface as [`Error`] with an [`ErrorKind`] describing what
//! went wrong: invalid configuration, a missing signed header, an
//! unsupported algorithm, a failed transport round trip, or a response body
//! that is not JSON. Nothing is retried; non-2xx statuses are not treated
//! as errors and pass through in the response envelope.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod constants;
pub use constants::{
    STORYSERVER_APP_SERVER, STORYSERVER_KEY_ID, STORYSERVER_SECRET_KEY, STORYSERVER_STORY_SERVER,
};

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod http_send;
pub use http_send::ReqwestHttpSend;

mod credential;
pub use credential::{Credential, SigningCredential};

mod config;
pub use config::Config;

mod sign_request;
pub use sign_request::{RequestSigner, SignRequest, SignatureAlgorithm};

mod client;
pub use client::{RawResponse, Story, StoryByUrl, StoryClient, StoryIndex};
