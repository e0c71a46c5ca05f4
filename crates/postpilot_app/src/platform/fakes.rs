//! In-process backends for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use postpilot_engine::{
    Article, Backends, ForumClient, HeadlineSource, MicroblogClient, Receipt, ServiceError,
    Target, TextGenerator,
};

/// Scripted backends that record every call.
#[derive(Default)]
pub struct FakeBackends {
    pub generated: Mutex<Option<Result<String, ServiceError>>>,
    pub refined: Mutex<Option<Result<String, ServiceError>>>,
    pub microblog_error: Mutex<Option<ServiceError>>,
    pub forum_error: Mutex<Option<ServiceError>>,
    pub articles: Mutex<Vec<Article>>,
    pub generate_panics: AtomicBool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackends {
    pub fn generating(text: &str) -> Arc<Self> {
        let fake = Self::default();
        *fake.generated.lock().unwrap() = Some(Ok(text.to_string()));
        Arc::new(fake)
    }

    pub fn backends(self: &Arc<Self>) -> Backends {
        Backends {
            generator: self.clone(),
            microblog: self.clone(),
            forum: self.clone(),
            headlines: self.clone(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl TextGenerator for FakeBackends {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        self.record(format!("generate:{prompt}"));
        if self.generate_panics.load(Ordering::SeqCst) {
            panic!("generator crashed");
        }
        self.generated
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(format!("draft for {prompt}")))
    }

    async fn refine(&self, text: &str, target: Target) -> Result<String, ServiceError> {
        self.record(format!("refine:{target}:{text}"));
        self.refined
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(format!("{text} #rust")))
    }
}

#[async_trait::async_trait]
impl MicroblogClient for FakeBackends {
    async fn post(&self, text: &str) -> Result<Receipt, ServiceError> {
        self.record(format!("x:{text}"));
        match self.microblog_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(Receipt {
                id: Some("42".to_string()),
                permalink: Some("https://x.com/i/status/42".to_string()),
                text: Some(text.to_string()),
            }),
        }
    }
}

#[async_trait::async_trait]
impl ForumClient for FakeBackends {
    async fn post(&self, title: &str, body: &str, board: &str) -> Result<Receipt, ServiceError> {
        self.record(format!("reddit:{board}:{title}:{body}"));
        match self.forum_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(Receipt {
                id: Some("1abc".to_string()),
                permalink: Some(format!("https://www.reddit.com/r/{board}/comments/1abc/")),
                text: None,
            }),
        }
    }
}

#[async_trait::async_trait]
impl HeadlineSource for FakeBackends {
    async fn fetch(&self, limit: usize) -> Result<Vec<Article>, ServiceError> {
        self.record(format!("headlines:{limit}"));
        Ok(self.articles.lock().unwrap().iter().take(limit).cloned().collect())
    }
}
