//! Inshorts scraper.
//!
//! Inshorts serves a category landing page as plain HTML and loads further
//! cards through an AJAX endpoint that takes the `min_news_id` of the last
//! page as its `news_offset`. The id lives in an inline `<script>` block.
//!
//! # Paging Protocol
//!
//! ```text
//! GET  https://www.inshorts.com/en/read/startup            -> HTML
//! POST https://www.inshorts.com/en/ajax/more_news          -> {"html": "..."}
//!      category=startup&news_offset=<min_news_id>
//! ```

use super::{FetchError, PageSource};
use crate::models::{ContentKind, Item};
use itertools::{EitherOrBoth, Itertools};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::error::Error;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_LANDING_URL: &str = "https://www.inshorts.com/en/read/startup";
pub const DEFAULT_MORE_URL: &str = "https://www.inshorts.com/en/ajax/more_news";
pub const DEFAULT_CATEGORY: &str = "startup";

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Headline selectors, most specific first.
static HEADLINE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"span[itemprop="headline"]"#,
        ".news-card-title span",
        ".news-card-title",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

/// Summary selectors, most specific first.
static BODY_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [r#"div[itemprop="articleBody"]"#, ".news-card-content div"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

static SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());

static MIN_NEWS_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"min_news_id\s*=\s*"(.*?)""#).unwrap());

/// Body of the `more_news` AJAX response.
#[derive(Debug, Deserialize)]
struct MoreNewsEnvelope {
    html: String,
}

/// HTTP client for one Inshorts category.
///
/// Holds a single [`Client`] whose default headers mimic the site's own
/// XHR requests; every page request reuses it.
#[derive(Debug, Clone)]
pub struct InshortsSource {
    client: Client,
    landing_url: Url,
    more_url: Url,
    category: String,
}

impl InshortsSource {
    /// Build a source for `category`, validating both endpoint URLs up front.
    pub fn new(
        landing_url: &str,
        more_url: &str,
        category: impl Into<String>,
    ) -> Result<Self, Box<dyn Error>> {
        let landing_url = Url::parse(landing_url)?;
        let more_url = Url::parse(more_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(REFERER, HeaderValue::from_str(landing_url.as_str())?);

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            landing_url,
            more_url,
            category: category.into(),
        })
    }
}

impl PageSource for InshortsSource {
    #[instrument(level = "debug", skip_all, fields(url = %self.landing_url))]
    async fn first_page(&self) -> Result<String, FetchError> {
        let resp = self.client.get(self.landing_url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::HttpStatus(resp.status().as_u16()));
        }
        Ok(resp.text().await?)
    }

    #[instrument(level = "debug", skip_all, fields(url = %self.more_url, %cursor))]
    async fn next_page(&self, cursor: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .post(self.more_url.clone())
            .form(&[("category", self.category.as_str()), ("news_offset", cursor)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(FetchError::HttpStatus(resp.status().as_u16()));
        }
        let body = resp.text().await?;
        let envelope: MoreNewsEnvelope =
            serde_json::from_str(&body).map_err(|e| FetchError::Envelope(e.to_string()))?;
        Ok(envelope.html)
    }
}

/// Select with the first selector in `chain` that matches anything.
fn select_first_matching<'a>(document: &'a Html, chain: &[Selector]) -> Vec<ElementRef<'a>> {
    chain
        .iter()
        .map(|sel| document.select(sel).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

fn node_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).join(" ")
}

/// Extract items from a page of Inshorts HTML.
///
/// Headlines and summaries are matched up by position. Items with a blank
/// headline are dropped, and in summary mode so are items with a blank body.
/// Source order is kept.
pub fn extract_items(html: &str, kind: ContentKind) -> Vec<Item> {
    let document = Html::parse_document(html);
    let headlines = select_first_matching(&document, &HEADLINE_SELECTORS);
    let bodies = select_first_matching(&document, &BODY_SELECTORS);
    debug!(
        headlines = headlines.len(),
        bodies = bodies.len(),
        "Matched card nodes"
    );

    headlines
        .into_iter()
        .zip_longest(bodies)
        .map(|pair| match pair {
            EitherOrBoth::Both(h, b) => Item::new(node_text(h), node_text(b)),
            EitherOrBoth::Left(h) => Item::new(node_text(h), String::new()),
            EitherOrBoth::Right(b) => Item::new(String::new(), node_text(b)),
        })
        .filter(|item| item.is_postable(kind))
        .collect()
}

/// Find the `min_news_id` cursor in the page's inline scripts. First match wins.
pub fn extract_cursor(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document.select(&SCRIPT_SELECTOR).find_map(|script| {
        let code = script.text().collect::<String>();
        MIN_NEWS_ID
            .captures(&code)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
        <html><body>
          <div class="news-card">
            <span itemprop="headline">AI startup raises $20M</span>
            <div itemprop="articleBody">The Bengaluru-based   startup said it will hire.</div>
          </div>
          <div class="news-card">
            <span itemprop="headline">  </span>
            <div itemprop="articleBody">Orphan summary</div>
          </div>
          <div class="news-card">
            <span itemprop="headline">Fintech firm files for IPO</span>
            <div itemprop="articleBody"></div>
          </div>
          <script type="text/javascript">var min_news_id = "abc123-9";</script>
        </body></html>
    "#;

    #[test]
    fn test_extract_headlines_skips_blank() {
        let items = extract_items(PAGE, ContentKind::Headline);
        let headlines: Vec<_> = items.iter().map(|i| i.headline.as_str()).collect();
        assert_eq!(
            headlines,
            vec!["AI startup raises $20M", "Fintech firm files for IPO"]
        );
        assert_eq!(items[1].body, "");
    }

    #[test]
    fn test_extract_summaries_skips_blank_and_collapses_whitespace() {
        let items = extract_items(PAGE, ContentKind::Summary);
        assert_eq!(
            items,
            vec![Item::new(
                "AI startup raises $20M",
                "The Bengaluru-based startup said it will hire."
            )]
        );
    }

    #[test]
    fn test_extract_drops_orphan_summary_without_headline() {
        let html = r#"
            <span itemprop="headline"> </span>
            <div itemprop="articleBody">Orphan</div>
        "#;
        assert!(extract_items(html, ContentKind::Summary).is_empty());
        assert!(extract_items(html, ContentKind::Headline).is_empty());
    }

    #[test]
    fn test_extract_falls_back_to_class_names() {
        let html = r#"
            <div class="news-card-title"><span>Fallback headline</span></div>
            <div class="news-card-content"><div>Fallback body</div></div>
        "#;
        let items = extract_items(html, ContentKind::Summary);
        assert_eq!(items, vec![Item::new("Fallback headline", "Fallback body")]);
    }

    #[test]
    fn test_extract_items_empty_page() {
        assert!(extract_items("<html></html>", ContentKind::Headline).is_empty());
    }

    #[test]
    fn test_extract_cursor() {
        assert_eq!(extract_cursor(PAGE), Some("abc123-9".to_string()));
    }

    #[test]
    fn test_extract_cursor_first_match_wins() {
        let html = r#"
            <script>var x = 1;</script>
            <script>min_news_id = "first"; min_news_id = "second";</script>
            <script>min_news_id="third"</script>
        "#;
        assert_eq!(extract_cursor(html), Some("first".to_string()));
    }

    #[test]
    fn test_extract_cursor_missing() {
        assert_eq!(extract_cursor("<script>var other = 2;</script>"), None);
        assert_eq!(extract_cursor("<p>min_news_id = \"not-a-script\"</p>"), None);
    }

    async fn source_for(server: &MockServer) -> InshortsSource {
        InshortsSource::new(
            &format!("{}/en/read/startup", server.uri()),
            &format!("{}/en/ajax/more_news", server.uri()),
            "startup",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_first_page_sends_xhr_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/read/startup"))
            .and(header("X-Requested-With", "XMLHttpRequest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let html = source_for(&server).await.first_page().await.unwrap();
        assert!(html.contains("min_news_id"));
    }

    #[tokio::test]
    async fn test_next_page_posts_cursor_and_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/en/ajax/more_news"))
            .and(body_string_contains("category=startup"))
            .and(body_string_contains("news_offset=abc123-9"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "html": "<p>more</p>" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let html = source_for(&server).await.next_page("abc123-9").await.unwrap();
        assert_eq!(html, "<p>more</p>");
    }

    #[tokio::test]
    async fn test_next_page_rejects_missing_html_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "news": [] })),
            )
            .mount(&server)
            .await;

        let err = source_for(&server).await.next_page("x").await.unwrap_err();
        assert!(matches!(err, FetchError::Envelope(_)));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source_for(&server).await.first_page().await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(503)));
    }

    #[test]
    fn test_new_rejects_bad_url() {
        assert!(InshortsSource::new("not a url", DEFAULT_MORE_URL, "startup").is_err());
    }
}
