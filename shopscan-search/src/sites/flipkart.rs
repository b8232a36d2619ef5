//! Flipkart — server-rendered grid of `div[data-id]` product tiles.
//!
//! Class names are build hashes and rotate with Flipkart deployments. Title
//! and link selectors list both the list-view and grid-view variants.

use crate::adapter::{FieldMap, FieldSelector, SiteAdapter};
use crate::types::FetchStrategy;

/// Adapter for `flipkart.com`.
pub fn adapter() -> SiteAdapter {
    SiteAdapter {
        name: "flipkart".into(),
        base_url: "https://www.flipkart.com".into(),
        query_url_template: "https://www.flipkart.com/search?q={query}".into(),
        fetch_strategy: FetchStrategy::PlainHttp,
        result_container_selector: "div[data-id]".into(),
        ready_selector: None,
        fields: FieldMap {
            title: Some(FieldSelector::text("div.KzDlHZ, a.wjcEIp")),
            price: Some(FieldSelector::text("div.yRaY8j")),
            offer_price: Some(FieldSelector::text("div.Nx9bqj")),
            rating: Some(FieldSelector::text("div.XQDdHH")),
            review_count: Some(FieldSelector::text("span.Wphh3N")),
            product_link: Some(FieldSelector::href("a.CGtC98, a.wjcEIp")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::types::FieldValue;

    const FIXTURE_FLIPKART_HTML: &str = include_str!("../../test-data/flipkart.html");

    #[test]
    fn adapter_is_valid() {
        assert!(adapter().validate().is_ok());
    }

    #[test]
    fn fixture_extracts_grid_tile() {
        let record = extract("flipkart", FIXTURE_FLIPKART_HTML, &adapter());
        let details = record.details().expect("fixture should extract");

        assert_eq!(
            details.title,
            FieldValue::Value("Portronics Toad 23 Wireless Optical Mouse".into())
        );
        assert_eq!(details.price, FieldValue::Value("₹1,199".into()));
        assert_eq!(details.offer_price, FieldValue::Value("₹299".into()));
        assert_eq!(details.rating, FieldValue::Value("4.2".into()));
        assert_eq!(details.review_count, FieldValue::Value("(52,114)".into()));
    }

    #[test]
    fn fixture_relative_link_is_absolutised() {
        let record = extract("flipkart", FIXTURE_FLIPKART_HTML, &adapter());
        let details = record.details().expect("fixture should extract");
        assert_eq!(
            details.product_link,
            FieldValue::Value(
                "https://www.flipkart.com/portronics-toad-23-wireless-optical-mouse/p/itm1b5f7c0a4e2c2?pid=ACCFZGAQJGYCYDCM&lid=LSTACC"
                    .into()
            )
        );
    }
}
