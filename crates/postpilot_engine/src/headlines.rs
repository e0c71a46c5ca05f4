use pilot_logging::{pilot_info, pilot_warn};
use scraper::Html;

use crate::http::{build_client, check_status, content_type, map_reqwest_error, read_limited};
use crate::{Article, EngineConfig, ServiceError};

pub(crate) const SERVICE: &str = "RSS";

#[async_trait::async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn fetch(&self, limit: usize) -> Result<Vec<Article>, ServiceError>;
}

/// Parses an RSS or Atom document into at most `limit` articles.
///
/// Entries without a title or link are skipped; summaries are reduced to
/// plain text.
pub fn parse_feed(bytes: &[u8], limit: usize) -> Result<Vec<Article>, ServiceError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|err| ServiceError::Decode {
        service: SERVICE,
        message: err.to_string(),
    })?;

    let articles = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry
                .title
                .map(|text| plain_text(&text.content))
                .filter(|title| !title.is_empty())?;
            let url = entry.links.into_iter().next()?.href;
            let summary = entry
                .summary
                .map(|text| plain_text(&text.content))
                .filter(|summary| !summary.is_empty());
            Some(Article {
                title,
                summary,
                url,
            })
        })
        .take(limit)
        .collect();
    Ok(articles)
}

/// Text content of an HTML fragment with whitespace runs collapsed.
pub fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_feed_content_type(value: &str) -> bool {
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.ends_with("/xml") || mime.ends_with("+xml") || mime == "text/plain"
}

pub struct RssHeadlineSource {
    feed_url: String,
    max_bytes: u64,
    client: reqwest::Client,
}

impl RssHeadlineSource {
    pub fn new(config: &EngineConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            feed_url: config.feed_url.clone(),
            max_bytes: config.http.max_bytes,
            client: build_client(SERVICE, &config.http)?,
        })
    }
}

#[async_trait::async_trait]
impl HeadlineSource for RssHeadlineSource {
    async fn fetch(&self, limit: usize) -> Result<Vec<Article>, ServiceError> {
        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .map_err(|err| map_reqwest_error(SERVICE, err))?;
        let response = check_status(SERVICE, response).await?;

        if let Some(value) = content_type(&response) {
            if !is_feed_content_type(&value) {
                pilot_warn!("Feed {} served unexpected content-type {}", self.feed_url, value);
                return Err(ServiceError::Decode {
                    service: SERVICE,
                    message: format!("unsupported content-type {value}"),
                });
            }
        }

        let bytes = read_limited(SERVICE, response, self.max_bytes).await?;
        let articles = parse_feed(&bytes, limit)?;
        pilot_info!("Fetched {} headlines from {}", articles.len(), self.feed_url);
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>AI</title>
<item><title>Model ships</title><link>https://example.com/a</link>
<description><![CDATA[<p>Big <b>news</b>   today.</p>]]></description></item>
<item><title></title><link>https://example.com/untitled</link></item>
<item><title>Second story</title><link>https://example.com/b</link></item>
<item><title>Third story</title><link>https://example.com/c</link></item>
</channel></rss>"#;

    #[test]
    fn parses_entries_and_flattens_summary() {
        let articles = parse_feed(FEED.as_bytes(), 10).unwrap();
        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].title, "Model ships");
        assert_eq!(articles[0].summary.as_deref(), Some("Big news today."));
        assert_eq!(articles[0].url, "https://example.com/a");
        assert_eq!(articles[1].summary, None);
    }

    #[test]
    fn respects_limit() {
        let articles = parse_feed(FEED.as_bytes(), 2).unwrap();
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["Model ships", "Second story"]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = parse_feed(b"not a feed", 5).unwrap_err();
        assert!(matches!(err, ServiceError::Decode { .. }));
    }

    #[test]
    fn content_type_allowlist() {
        assert!(is_feed_content_type("application/rss+xml; charset=UTF-8"));
        assert!(is_feed_content_type("text/xml"));
        assert!(is_feed_content_type("application/atom+xml"));
        assert!(!is_feed_content_type("text/html"));
        assert!(!is_feed_content_type("application/json"));
    }
}
