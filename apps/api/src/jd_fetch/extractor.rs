//! Fetches a job posting and reduces it to readable plain text.
//!
//! HTML pages are parsed with `scraper`. Blocks whose tag attributes look like
//! job-description sections are preferred; the whole `<body>` is the fallback.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Extracted text shorter than this is rejected.
pub const MIN_JD_TEXT_CHARS: usize = 120;

/// Focused sections are used only when they yield at least this much text.
pub const MIN_FOCUSED_TEXT_CHARS: usize = 180;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.8";

/// Attribute fragments that mark a block as part of the job description.
const SECTION_HINTS: &[&str] = &[
    "job",
    "description",
    "responsibilit",
    "qualif",
    "about",
    "role",
    "requirement",
    "what-youll-do",
    "what-you'll-do",
];

/// Elements whose content never counts as page text.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "svg", "iframe"];

/// Elements that end a line of text.
const BLOCK_TAGS: &[&str] = &["p", "li", "h1", "h2", "h3", "h4", "section", "div", "article", "br"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid URL format.")]
    InvalidUrl,

    #[error("Only http/https URLs are supported.")]
    UnsupportedScheme,

    #[error("Failed to fetch JD URL. {0}")]
    Fetch(#[source] reqwest::Error),

    #[error("JD URL fetch failed with status {0}.")]
    Status(u16),

    #[error("Failed to read JD page body. {0}")]
    Body(#[source] reqwest::Error),

    #[error(
        "Extracted JD text is too short ({length} chars). \
         The page may block crawling or require JavaScript rendering."
    )]
    TooShort { length: usize },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ExtractError {
    /// True when the caller supplied something unusable, as opposed to the
    /// remote page or the network failing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExtractError::InvalidUrl | ExtractError::UnsupportedScheme | ExtractError::TooShort { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedJd {
    pub source_url: String,
    pub title: Option<String>,
    pub jd_text: String,
}

#[derive(Clone)]
pub struct JdExtractor {
    client: Client,
}

impl JdExtractor {
    pub fn new(timeout: Duration) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(ExtractError::Client)?;
        Ok(Self { client })
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractedJd, ExtractError> {
        let url = validate_url(url)?;
        info!("Fetching JD page: {url}");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, ACCEPT_HTML)
            .send()
            .await
            .map_err(ExtractError::Fetch)?;

        let status = response.status();
        if !status.is_success() {
            warn!("JD fetch for {url} returned {status}");
            return Err(ExtractError::Status(status.as_u16()));
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.to_ascii_lowercase().contains("html"));

        let raw = response.text().await.map_err(ExtractError::Body)?;
        let extracted = extract_from_body(url.as_str(), &raw, is_html)?;

        info!(
            "Extracted {} chars of JD text from {}",
            extracted.jd_text.chars().count(),
            extracted.source_url
        );
        Ok(extracted)
    }
}

/// Parses and checks a user-supplied URL. Only http and https are accepted.
pub fn validate_url(input: &str) -> Result<Url, ExtractError> {
    let url = Url::parse(input.trim()).map_err(|_| ExtractError::InvalidUrl)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ExtractError::UnsupportedScheme),
    }
}

/// Turns a fetched body into an [`ExtractedJd`], enforcing the minimum length.
pub fn extract_from_body(source_url: &str, raw: &str, is_html: bool) -> Result<ExtractedJd, ExtractError> {
    let (title, jd_text) = if is_html {
        let document = Html::parse_document(raw);
        (extract_title(&document), extract_jd_text(&document))
    } else {
        (None, raw.trim().to_string())
    };

    let length = jd_text.chars().count();
    if length < MIN_JD_TEXT_CHARS {
        return Err(ExtractError::TooShort { length });
    }

    Ok(ExtractedJd {
        source_url: source_url.to_string(),
        title,
        jd_text,
    })
}

pub fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?;
    let text = clean_text(&title.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

/// Focused sections when they carry enough text, else the whole body.
pub fn extract_jd_text(document: &Html) -> String {
    let focused = focused_sections(document)
        .into_iter()
        .map(element_text)
        .collect::<Vec<_>>()
        .join("\n");
    let focused = clean_text(&focused);
    if focused.chars().count() >= MIN_FOCUSED_TEXT_CHARS {
        return focused;
    }

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());
    clean_text(&element_text(body))
}

/// `section`, `article` and `div` blocks whose attributes match a section hint.
/// Blocks nested inside an already chosen block are skipped.
fn focused_sections(document: &Html) -> Vec<ElementRef<'_>> {
    let Ok(selector) = Selector::parse("section, article, div") else {
        return Vec::new();
    };

    let mut picked = HashSet::new();
    let mut sections = Vec::new();

    for element in document.select(&selector) {
        if !has_section_hint(element) {
            continue;
        }
        if element.ancestors().any(|a| picked.contains(&a.id())) {
            continue;
        }
        picked.insert(element.id());
        sections.push(element);
    }

    sections
}

fn has_section_hint(element: ElementRef<'_>) -> bool {
    element.value().attrs().any(|(name, value)| {
        let name = name.to_ascii_lowercase();
        let value = value.to_ascii_lowercase();
        SECTION_HINTS
            .iter()
            .any(|hint| name.contains(hint) || value.contains(hint))
    })
}

/// Visible text of an element, one line per block element.
fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) => {
                let tag = el.name();
                if SKIPPED_TAGS.contains(&tag) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if BLOCK_TAGS.contains(&tag) {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Collapses runs of whitespace inside lines and keeps at most one blank line
/// between paragraphs.
pub fn clean_text(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() && lines.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_paragraph(words: usize) -> String {
        vec!["responsibility"; words].join(" ")
    }

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://jobs.example.com/123").is_ok());
        assert!(validate_url("  http://example.com/jd  ").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_garbage_and_other_schemes() {
        assert!(matches!(validate_url("not a url"), Err(ExtractError::InvalidUrl)));
        assert!(matches!(
            validate_url("ftp://example.com/jd.txt"),
            Err(ExtractError::UnsupportedScheme)
        ));
        assert!(validate_url("ftp://example.com").unwrap_err().is_client_error());
    }

    #[test]
    fn test_hundred_char_text_is_too_short() {
        let raw = "x".repeat(100);
        let err = extract_from_body("https://example.com", &raw, false).unwrap_err();
        assert!(matches!(err, ExtractError::TooShort { length: 100 }));
        assert!(err.is_client_error());
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_status_error_is_server_side() {
        assert!(!ExtractError::Status(503).is_client_error());
    }

    #[test]
    fn test_plain_text_body_is_trimmed_as_is() {
        let raw = format!("  {}  ", "Plain text job description. ".repeat(6));
        let out = extract_from_body("https://example.com/jd.txt", &raw, false).unwrap();
        assert_eq!(out.jd_text, raw.trim());
        assert_eq!(out.title, None);
    }

    #[test]
    fn test_focused_section_preferred_over_body() {
        let html = format!(
            r#"<html><head><title> Senior  Engineer | Acme </title></head>
            <body>
              <nav>Home Careers Login</nav>
              <div class="job-description"><p>{}</p></div>
              <footer>Copyright Acme</footer>
            </body></html>"#,
            long_paragraph(20)
        );
        let document = Html::parse_document(&html);
        assert_eq!(extract_title(&document).as_deref(), Some("Senior Engineer | Acme"));

        let text = extract_jd_text(&document);
        assert!(text.starts_with("responsibility"));
        assert!(!text.contains("Careers"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn test_short_focused_section_falls_back_to_body() {
        let html = format!(
            r#"<html><body>
              <div id="about">Short blurb</div>
              <main><p>{}</p></main>
            </body></html>"#,
            long_paragraph(5)
        );
        let text = extract_jd_text(&Html::parse_document(&html));
        assert!(text.contains("Short blurb"));
        assert!(text.contains("responsibility"));
    }

    #[test]
    fn test_scripts_and_styles_are_excluded() {
        let html = r#"<html><body>
            <script>var tracking = "secret";</script>
            <style>.a { color: red; }</style>
            <p>Visible requirement</p>
        </body></html>"#;
        let text = extract_jd_text(&Html::parse_document(html));
        assert_eq!(text, "Visible requirement");
    }

    #[test]
    fn test_nested_matching_blocks_are_not_duplicated() {
        let inner = long_paragraph(15);
        let html = format!(
            r#"<html><body><section class="job"><div class="description"><p>{inner}</p></div></section></body></html>"#
        );
        let text = extract_jd_text(&Html::parse_document(&html));
        assert_eq!(text, inner);
    }

    #[test]
    fn test_clean_text_collapses_whitespace_and_blank_lines() {
        let raw = "  Role:\t Backend \u{a0}Engineer \n\n\n\n  Requirements  \n";
        assert_eq!(clean_text(raw), "Role: Backend Engineer\n\nRequirements");
    }
}
