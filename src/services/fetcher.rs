// src/services/fetcher.rs

//! Fetch a web page and reduce it to readable text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::FetchConfig;
use crate::errors::Result;

use super::BoxFuture;

pub trait PageFetcher: Send + Sync {
    fn fetch_text<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String>>;
}

pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_inner(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let html = response.text().await?;
        debug!(url, bytes = html.len(), "fetched page");
        Ok(html_to_text(&html))
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch_text<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.fetch_inner(url))
    }
}

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("static regex")
});

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex"));

static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*(br|/p|/div|/li|/tr|/h[1-6]|/title|/section|/article)\b[^>]*>")
        .expect("static regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));

/// Strip markup from an HTML document.
///
/// Script and style bodies are removed, block-level closings become line
/// breaks, every line is trimmed and split on double spaces, and empty
/// chunks are dropped.
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_OR_STYLE.replace_all(html, "");
    let text = COMMENT.replace_all(&text, "");
    let text = BLOCK_BREAK.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, "");
    let text = decode_entities(&text);

    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        // Last, so "&amp;lt;" stays "&lt;".
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_styles_and_tags() {
        let html = r#"<html><head><title>Page</title>
            <style>p { color: red; }</style>
            <script type="text/javascript">var x = "<p>";</script></head>
            <body><h1>Heading</h1><p>Hello &amp; welcome</p><!-- hidden --></body></html>"#;
        assert_eq!(html_to_text(html), "Page\nHeading\nHello & welcome");
    }

    #[test]
    fn splits_on_double_spaces() {
        assert_eq!(html_to_text("<p>left  right</p>"), "left\nright");
    }

    #[test]
    fn br_becomes_newline() {
        assert_eq!(html_to_text("one<br/>two<BR>three"), "one\ntwo\nthree");
    }

    #[test]
    fn escaped_ampersand_is_decoded_once() {
        assert_eq!(html_to_text("a &amp;lt; b"), "a &lt; b");
    }
}
