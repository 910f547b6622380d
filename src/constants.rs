/// Env var for the story server base URL.
pub const STORYSERVER_STORY_SERVER: &str = "STORYSERVER_STORY_SERVER";
/// Env var for the app server base URL.
pub const STORYSERVER_APP_SERVER: &str = "STORYSERVER_APP_SERVER";
/// Env var for the key id.
pub const STORYSERVER_KEY_ID: &str = "STORYSERVER_KEY_ID";
/// Env var for the secret key.
pub const STORYSERVER_SECRET_KEY: &str = "STORYSERVER_SECRET_KEY";

/// Header carrying the JSON-serialized image format presets.
pub const FORMATS: &str = "formats";
