//! Announcement banner extraction.
//!
//! Best effort: a missing or malformed banner is reported as `None`, never
//! as an error, so it cannot fail the departure cycle it runs in.

use scraper::{Html, Selector};

use crate::models::{LocatorSet, parse_selector};
use crate::utils::normalize_whitespace;

/// Pulls the banner text out of a loaded departure board document.
#[derive(Debug, Clone)]
pub struct AnnouncementExtractor {
    container: Option<Selector>,
    link: Option<Selector>,
}

impl AnnouncementExtractor {
    pub fn new(container: &str, link: &str) -> Self {
        Self {
            container: Self::compile(container),
            link: Self::compile(link),
        }
    }

    pub fn from_locators(locators: &LocatorSet) -> Self {
        Self::new(&locators.announcement_container, &locators.announcement_link)
    }

    fn compile(selector: &str) -> Option<Selector> {
        parse_selector(selector)
            .inspect_err(|e| log::warn!("Announcement locator disabled: {}", e))
            .ok()
    }

    /// Text of the link inside the first banner container, if any.
    pub fn extract(&self, document: &str) -> Option<String> {
        let (container_sel, link_sel) = (self.container.as_ref()?, self.link.as_ref()?);
        let html = Html::parse_document(document);

        let Some(container) = html.select(container_sel).next() else {
            log::debug!("No announcement container on the board");
            return None;
        };
        let Some(link) = container.select(link_sel).next() else {
            log::debug!("Announcement container has no link");
            return None;
        };

        let text = normalize_whitespace(&link.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    }
}

impl Default for AnnouncementExtractor {
    fn default() -> Self {
        Self::from_locators(&LocatorSet::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_link_text() {
        let doc = r#"<div class="messages_in"><p>Uwaga</p><a href="/x">  Objazd
            linii 8 </a></div>"#;
        assert_eq!(
            AnnouncementExtractor::default().extract(doc),
            Some("Objazd linii 8".to_string())
        );
    }

    #[test]
    fn missing_container_is_none() {
        let doc = r#"<span class="line">5</span>"#;
        assert_eq!(AnnouncementExtractor::default().extract(doc), None);
    }

    #[test]
    fn container_without_link_is_none() {
        let doc = r#"<div class="messages_in">Brak linku</div>"#;
        assert_eq!(AnnouncementExtractor::default().extract(doc), None);
    }

    #[test]
    fn empty_link_is_none() {
        let doc = r#"<div class="messages_in"><a href="/x">   </a></div>"#;
        assert_eq!(AnnouncementExtractor::default().extract(doc), None);
    }

    #[test]
    fn invalid_selector_disables_extraction() {
        let extractor = AnnouncementExtractor::new("[[broken", "a");
        let doc = r#"<div class="messages_in"><a>Objazd</a></div>"#;
        assert_eq!(extractor.extract(doc), None);
    }
}
