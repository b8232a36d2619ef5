//! Amazon India — server-rendered search results.
//!
//! Results are `div[data-component-type=s-search-result]` cards. The list
//! price sits in a struck-through `a-text-price` box whose readable value
//! is the nested `a-offscreen` span; the visible copy next to it is
//! duplicated for screen layout.

use crate::adapter::{FieldMap, FieldSelector, SiteAdapter};
use crate::types::FetchStrategy;

/// Adapter for `amazon.in`.
pub fn adapter() -> SiteAdapter {
    SiteAdapter {
        name: "amazon".into(),
        base_url: "https://www.amazon.in".into(),
        query_url_template: "https://www.amazon.in/s?k={query}".into(),
        fetch_strategy: FetchStrategy::PlainHttp,
        result_container_selector: "div[data-component-type='s-search-result']".into(),
        ready_selector: None,
        fields: FieldMap {
            title: Some(FieldSelector::text("h2")),
            price: Some(FieldSelector::text("span.a-price.a-text-price").with_nested("span.a-offscreen")),
            offer_price: Some(FieldSelector::text("span.a-price-whole")),
            rating: Some(FieldSelector::text("span.a-icon-alt")),
            review_count: Some(FieldSelector::text("span.a-size-base.s-underline-text")),
            product_link: Some(FieldSelector::href("a.a-link-normal.s-line-clamp-2, h2 a")),
        },
    }
}
