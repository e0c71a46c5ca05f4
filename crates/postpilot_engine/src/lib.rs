//! Postpilot engine: backend clients and the command runner that executes
//! core effects off the caller's thread.
mod config;
mod engine;
mod error;
mod forum;
mod generate;
mod headlines;
mod http;
mod microblog;
mod types;

pub use config::{
    Credentials, EngineConfig, Endpoints, HttpSettings, DEFAULT_FEED_URL, DEFAULT_MODEL,
    GEMINI_API_KEY, REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET, REDDIT_PASSWORD, REDDIT_USERNAME,
    REDDIT_USER_AGENT, X_ACCESS_TOKEN,
};
pub use engine::{Backends, EngineHandle};
pub use error::{ErrorClass, ServiceError};
pub use forum::{ForumClient, RedditClient};
pub use generate::{clean_generated, clean_refined, refinement_prompt, GeminiClient, TextGenerator};
pub use headlines::{parse_feed, plain_text, HeadlineSource, RssHeadlineSource};
pub use microblog::{status_url, MicroblogClient, XClient};
pub use types::{Article, EngineCommand, EngineEvent, Receipt, Target};
