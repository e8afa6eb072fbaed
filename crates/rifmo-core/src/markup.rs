//! Pulls raw rhyme values out of a lookup page.
//!
//! Only this module knows how the page is laid out. It hands back attribute
//! values exactly as found (untrimmed, unfiltered); validation lives in
//! [crate::rhymes].

use scraper::{Html, Selector};

/// Exact rhymes on rifme.net.
pub const EXACT_SELECTOR: &str = "#tochnye li[data-w]";
/// Looser rhymes on rifme.net.
pub const LOOSER_SELECTOR: &str = "#meneestrogie li[data-w]";
pub const RHYME_ATTRIBUTE: &str = "data-w";

/// Splits a page into the two ordered candidate lists.
///
/// `looser` is only called when `exact` did not fill the caller's limit.
pub trait RhymeMarkup: Send + Sync {
    fn exact(&self, html: &str) -> Vec<String>;
    fn looser(&self, html: &str) -> Vec<String>;
}

/// CSS-selector based extraction. Defaults match rifme.net.
#[derive(Debug, Clone)]
pub struct RifmeMarkup {
    exact_selector: String,
    looser_selector: String,
    attribute: String,
}

impl Default for RifmeMarkup {
    fn default() -> Self {
        Self::new(EXACT_SELECTOR, LOOSER_SELECTOR, RHYME_ATTRIBUTE)
    }
}

impl RifmeMarkup {
    /// Use other selectors, e.g. after the site changes its markup.
    pub fn new(
        exact_selector: impl Into<String>,
        looser_selector: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            exact_selector: exact_selector.into(),
            looser_selector: looser_selector.into(),
            attribute: attribute.into(),
        }
    }

    fn extract(&self, html: &str, selector: &str) -> Vec<String> {
        let selector = match Selector::parse(selector) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(selector, error = %e, "invalid rhyme selector");
                return Vec::new();
            }
        };
        let doc = Html::parse_document(html);
        let values = doc
            .select(&selector)
            .filter_map(|el| el.value().attr(&self.attribute))
            .map(str::to_string)
            .collect();
        values
    }
}

impl RhymeMarkup for RifmeMarkup {
    fn exact(&self, html: &str) -> Vec<String> {
        self.extract(html, &self.exact_selector)
    }

    fn looser(&self, html: &str) -> Vec<String> {
        self.extract(html, &self.looser_selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <ul id="tochnye">
            <li data-w="рот">рот</li>
            <li data-w=" плот ">плот</li>
            <li>no attribute</li>
        </ul>
        <ul id="meneestrogie">
            <li data-w="год">год</li>
        </ul>
        <ul id="other"><li data-w="лишний">x</li></ul>
    </body></html>"#;

    #[test]
    fn sections_in_document_order() {
        let m = RifmeMarkup::default();
        assert_eq!(m.exact(PAGE), vec!["рот", " плот "]);
        assert_eq!(m.looser(PAGE), vec!["год"]);
    }

    #[test]
    fn missing_sections_are_empty() {
        let m = RifmeMarkup::default();
        assert!(m.exact("<p>nothing here</p>").is_empty());
        assert!(m.looser("").is_empty());
    }

    #[test]
    fn broken_markup_does_not_panic() {
        let m = RifmeMarkup::default();
        let html = r#"<ul id="tochnye"><li data-w="дом"><li data-w="ком"</ul"#;
        assert_eq!(m.exact(html).first().map(String::as_str), Some("дом"));
    }

    #[test]
    fn custom_selectors() {
        let m = RifmeMarkup::new("#other li[data-w]", "#none li", "data-w");
        assert_eq!(m.exact(PAGE), vec!["лишний"]);
        assert!(m.looser(PAGE).is_empty());
    }

    #[test]
    fn invalid_selector_yields_nothing() {
        let m = RifmeMarkup::new("[[[", "li[", "data-w");
        assert!(m.exact(PAGE).is_empty());
        assert!(m.looser(PAGE).is_empty());
    }
}
