//! Selector queries over a loaded HTML document.

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::utils::{normalize_whitespace, resolve_url};

/// The HTML of a page's last navigation and the URL it was served from.
///
/// The source is kept as text and parsed per query, since the parsed tree
/// cannot be held across suspension points of a `Send` future.
#[derive(Debug, Clone, Default)]
pub struct Document {
    location: Option<Url>,
    html: Option<String>,
}

impl Document {
    pub fn load(&mut self, location: Url, html: String) {
        self.location = Some(location);
        self.html = Some(html);
    }

    pub fn clear(&mut self) {
        self.location = None;
        self.html = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.html.is_some()
    }

    fn parsed(&self) -> Result<Html> {
        self.html
            .as_deref()
            .map(Html::parse_document)
            .ok_or_else(|| AppError::fetch("page", "no document loaded"))
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }

    /// Whether any element matches `selector`.
    pub fn matches(&self, selector: &str) -> Result<bool> {
        let selector = Self::parse_selector(selector)?;
        let found = self.parsed()?.select(&selector).next().is_some();
        Ok(found)
    }

    /// Whitespace-normalised text of the first match.
    pub fn text(&self, selector: &str) -> Result<Option<String>> {
        let selector = Self::parse_selector(selector)?;
        let document = self.parsed()?;
        let text = document.select(&selector).next().map(|element| {
            let raw: String = element.text().collect();
            normalize_whitespace(&raw)
        });
        Ok(text)
    }

    /// Text of the first match with its line breaks kept.
    ///
    /// `<br>` and the start of `p`, `div` and `li` elements end a line. Source
    /// whitespace within a line is collapsed and each line is trimmed.
    pub fn multiline_text(&self, selector: &str) -> Result<Option<String>> {
        let selector = Self::parse_selector(selector)?;
        let document = self.parsed()?;
        let text = document.select(&selector).next().map(rendered_lines);
        Ok(text)
    }

    /// `attribute` of every match; `href`/`src` are resolved to absolute URLs.
    pub fn attributes(&self, selector: &str, attribute: &str) -> Result<Vec<String>> {
        let selector = Self::parse_selector(selector)?;
        let document = self.parsed()?;
        let resolve = matches!(attribute, "href" | "src");

        let values = document
            .select(&selector)
            .filter_map(|element| element.value().attr(attribute))
            .map(|value| match (&self.location, resolve) {
                (Some(base), true) => resolve_url(base, value),
                _ => value.to_string(),
            })
            .collect();
        Ok(values)
    }
}

fn rendered_lines(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in element.descendants().skip(1) {
        match node.value() {
            Node::Text(text) => {
                // Source newlines are layout, not content.
                raw.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            Node::Element(e) if matches!(e.name(), "br" | "p" | "div" | "li") => raw.push('\n'),
            _ => {}
        }
    }
    let lines: Vec<String> = raw.split('\n').map(normalize_whitespace).collect();
    lines.join("\n").trim().to_string()
}
