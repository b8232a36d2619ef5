//! Snapdeal — server-rendered `product-tuple-listing` cards.
//!
//! The listing shows star ratings only as a CSS width on `filled-stars`,
//! so no rating selector is configured and the field is always unavailable.

use crate::adapter::{FieldMap, FieldSelector, SiteAdapter};
use crate::types::FetchStrategy;

/// Adapter for `snapdeal.com`.
pub fn adapter() -> SiteAdapter {
    SiteAdapter {
        name: "snapdeal".into(),
        base_url: "https://www.snapdeal.com".into(),
        query_url_template: "https://www.snapdeal.com/search?keyword={query}".into(),
        fetch_strategy: FetchStrategy::PlainHttp,
        result_container_selector: "div.product-tuple-listing".into(),
        ready_selector: None,
        fields: FieldMap {
            title: Some(FieldSelector::text("p.product-title")),
            price: Some(FieldSelector::text("span.product-desc-price")),
            offer_price: Some(FieldSelector::text("span.product-price")),
            rating: None,
            review_count: Some(FieldSelector::text("p.product-rating-count")),
            product_link: Some(FieldSelector::href("a.dp-widget-link")),
        },
    }
}
