//! Croma — client-rendered results.
//!
//! The search page ships an empty shell and renders `li.product-item` cards
//! with JavaScript, so it needs the rendered-browser strategy. The browser
//! waits for a product title to exist before capturing the DOM.

use crate::adapter::{FieldMap, FieldSelector, SiteAdapter};
use crate::types::FetchStrategy;

/// Adapter for `croma.com`.
pub fn adapter() -> SiteAdapter {
    SiteAdapter {
        name: "croma".into(),
        base_url: "https://www.croma.com".into(),
        query_url_template: "https://www.croma.com/searchB?q={query}%3Arelevance&text={query}".into(),
        fetch_strategy: FetchStrategy::RenderedBrowser,
        result_container_selector: "li.product-item".into(),
        ready_selector: Some("li.product-item h3.product-title".into()),
        fields: FieldMap {
            title: Some(FieldSelector::text("h3.product-title")),
            price: Some(FieldSelector::text("span.old-price").with_nested("span.amount")),
            offer_price: Some(FieldSelector::text("span.amount.plp-srp-new-amount")),
            rating: Some(FieldSelector::text("span.rating-text")),
            review_count: Some(FieldSelector::text("span.rating-count")),
            product_link: Some(FieldSelector::href("h3.product-title a")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::types::FieldValue;

    const FIXTURE_CROMA_HTML: &str = include_str!("../../test-data/croma.html");

    #[test]
    fn adapter_is_valid() {
        assert!(adapter().validate().is_ok());
        assert_eq!(adapter().fetch_strategy, FetchStrategy::RenderedBrowser);
    }

    #[test]
    fn query_url_substitutes_every_placeholder() {
        assert_eq!(
            adapter().query_url("usb c hub"),
            "https://www.croma.com/searchB?q=usb+c+hub%3Arelevance&text=usb+c+hub"
        );
    }

    #[test]
    fn fixture_extracts_rendered_card() {
        let record = extract("croma", FIXTURE_CROMA_HTML, &adapter());
        let details = record.details().expect("fixture should extract");

        assert_eq!(
            details.title,
            FieldValue::Value("Logitech M331 Silent Plus Wireless Mouse".into())
        );
        assert_eq!(details.price, FieldValue::Value("₹1,695.00".into()));
        assert_eq!(details.offer_price, FieldValue::Value("₹1,199.00".into()));
        assert_eq!(details.rating, FieldValue::Value("4.4".into()));
        assert_eq!(details.review_count, FieldValue::Value("(212)".into()));
        assert_eq!(
            details.product_link,
            FieldValue::Value(
                "https://www.croma.com/logitech-m331-silent-plus-wireless-mouse/p/223621".into()
            )
        );
    }
}
