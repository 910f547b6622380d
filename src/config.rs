use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

use crate::constants::*;
use crate::utils::Redact;
use crate::Context;

/// Config carries all the configuration for the story client.
#[derive(Clone, Default)]
pub struct Config {
    /// Base URL of the story content server, e.g. `https://stories.example.com/api/v1`.
    ///
    /// Will be loaded from env value [`STORYSERVER_STORY_SERVER`] if not set.
    pub story_server: Option<String>,
    /// Base URL of the app server that rendered links should point at.
    ///
    /// Will be loaded from env value [`STORYSERVER_APP_SERVER`] if not set.
    pub app_server: Option<String>,
    /// `key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`STORYSERVER_KEY_ID`]
    pub key_id: Option<String>,
    /// `secret_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`STORYSERVER_SECRET_KEY`]
    pub secret_key: Option<String>,
    /// Named image format presets, passed through verbatim to the server in
    /// the `formats` header. A `BTreeMap` keeps the serialized header
    /// deterministic.
    pub formats: Option<BTreeMap<String, String>>,
    /// Signature algorithm identifier, e.g. `hmac-sha1`.
    ///
    /// Defaults to `hmac-sha1` for wire compatibility when unset.
    pub algorithm: Option<String>,
}

impl Config {
    /// Create a new Config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set story_server.
    pub fn with_story_server(mut self, story_server: impl Into<String>) -> Self {
        self.story_server = Some(story_server.into());
        self
    }

    /// Set app_server.
    pub fn with_app_server(mut self, app_server: impl Into<String>) -> Self {
        self.app_server = Some(app_server.into());
        self
    }

    /// Set key_id.
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Set secret_key.
    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Add a named image format preset.
    pub fn with_format(mut self, name: impl Into<String>, size: impl Into<String>) -> Self {
        self.formats
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), size.into());
        self
    }

    /// Set the whole formats mapping at once.
    pub fn with_formats(mut self, formats: BTreeMap<String, String>) -> Self {
        self.formats = Some(formats);
        self
    }

    /// Set the signature algorithm identifier.
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(STORYSERVER_STORY_SERVER) {
            self.story_server.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(STORYSERVER_APP_SERVER) {
            self.app_server.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(STORYSERVER_KEY_ID) {
            self.key_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(STORYSERVER_SECRET_KEY) {
            self.secret_key.get_or_insert(v);
        }

        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("story_server", &self.story_server)
            .field("app_server", &self.app_server)
            .field("key_id", &self.key_id)
            .field("secret_key", &self.secret_key.as_ref().map(Redact::from))
            .field("formats", &self.formats)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}
