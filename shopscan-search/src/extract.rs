//! Field extraction from a search results page.
//!
//! Parses the page, takes the first block matched by the adapter's result
//! container selector, and resolves each field of the [`FieldMap`] inside
//! that block. Field lookups return `Option`; a miss folds into the
//! unavailable marker through [`FieldValue::from_option`], so a page that
//! only carries some of the fields still yields a record.
//!
//! [`FieldMap`]: crate::adapter::FieldMap

use crate::adapter::{FieldSelector, SiteAdapter};
use crate::error::ExtractError;
use crate::types::{FieldValue, ProductDetails, ProductRecord};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extract the first product on the page into a record for `site`.
///
/// Never fails: extraction errors are reported in the record's `error`.
pub fn extract(site: &str, html: &str, adapter: &SiteAdapter) -> ProductRecord {
    match extract_details(html, adapter) {
        Ok(details) => ProductRecord::found(site, details),
        Err(err) => {
            tracing::debug!(site, error = %err, "extraction failed");
            ProductRecord::failed(site, err)
        }
    }
}

/// Extract the first product's fields, or say why the page has none.
///
/// # Errors
///
/// Returns [`ExtractError::NoProducts`] if the result container selector
/// matches nothing, and [`ExtractError::Structural`] if a selector does not
/// compile, a matched link element lacks its attribute, or a link cannot be
/// resolved against the adapter's base URL.
pub fn extract_details(html: &str, adapter: &SiteAdapter) -> Result<ProductDetails, ExtractError> {
    let document = Html::parse_document(html);
    let container = compile(&adapter.result_container_selector)?;

    // One representative result per site: the first block only.
    let block = document
        .select(&container)
        .next()
        .ok_or(ExtractError::NoProducts)?;

    let fields = &adapter.fields;
    let details = ProductDetails {
        title: field(block, fields.title.as_ref())?,
        price: field(block, fields.price.as_ref())?,
        offer_price: field(block, fields.offer_price.as_ref())?,
        rating: field(block, fields.rating.as_ref())?,
        review_count: field(block, fields.review_count.as_ref())?,
        product_link: FieldValue::from_option(
            lookup(block, fields.product_link.as_ref())?
                .map(|href| absolutize(&href, &adapter.base_url))
                .transpose()?,
        ),
    };

    tracing::trace!(
        site = adapter.name.as_str(),
        title = details.title.as_str(),
        "product block extracted"
    );
    Ok(details)
}

fn field(block: ElementRef<'_>, selector: Option<&FieldSelector>) -> Result<FieldValue, ExtractError> {
    lookup(block, selector).map(FieldValue::from_option)
}

/// Resolve one field inside a product block.
///
/// `Ok(None)` for every kind of absence: no selector configured, primary or
/// nested selector unmatched, empty text.
fn lookup(
    block: ElementRef<'_>,
    field: Option<&FieldSelector>,
) -> Result<Option<String>, ExtractError> {
    let Some(field) = field else {
        return Ok(None);
    };

    let primary = compile(&field.selector)?;
    let Some(mut element) = block.select(&primary).next() else {
        return Ok(None);
    };

    if let Some(nested) = field.nested.as_deref() {
        let nested = compile(nested)?;
        match element.select(&nested).next() {
            Some(inner) => element = inner,
            None => return Ok(None),
        }
    }

    let value = match field.attr.as_deref() {
        Some(attr) => element
            .value()
            .attr(attr)
            .map(|v| v.trim().to_owned())
            .ok_or_else(|| {
                ExtractError::Structural(format!(
                    "<{}> matched by {:?} has no {attr} attribute",
                    element.value().name(),
                    field.selector
                ))
            })?,
        None => normalise_whitespace(&element.text().collect::<String>()),
    };

    Ok((!value.is_empty()).then_some(value))
}

/// Make a link absolute. Already-absolute links are returned unchanged.
fn absolutize(href: &str, base_url: &str) -> Result<String, ExtractError> {
    if Url::parse(href).is_ok() {
        return Ok(href.to_owned());
    }

    let base = Url::parse(base_url)
        .map_err(|e| ExtractError::Structural(format!("invalid base URL {base_url:?}: {e}")))?;
    base.join(href)
        .map(String::from)
        .map_err(|e| ExtractError::Structural(format!("cannot resolve link {href:?}: {e}")))
}

fn compile(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css)
        .map_err(|e| ExtractError::Structural(format!("invalid selector {css:?}: {e:?}")))
}

/// Collapse whitespace runs to a single space and trim.
fn normalise_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::FieldMap;
    use crate::types::FetchStrategy;

    fn adapter() -> SiteAdapter {
        SiteAdapter {
            name: "shop".into(),
            base_url: "https://shop.example".into(),
            query_url_template: "https://shop.example/search?q={query}".into(),
            fetch_strategy: FetchStrategy::PlainHttp,
            result_container_selector: "div.result".into(),
            ready_selector: None,
            fields: FieldMap {
                title: Some(FieldSelector::text("h2")),
                price: Some(FieldSelector::text("div.mrp").with_nested("span.amount")),
                offer_price: Some(FieldSelector::text("span.offer")),
                rating: Some(FieldSelector::text("span.stars")),
                review_count: Some(FieldSelector::text("span.reviews")),
                product_link: Some(FieldSelector::href("h2 a")),
            },
        }
    }

    const FULL_BLOCK: &str = r#"<html><body>
<div class="result">
  <h2><a href="/p/first">  First
     Product </a></h2>
  <div class="mrp"><span class="amount">₹999</span></div>
  <span class="offer">₹499</span>
  <span class="stars">4.5 out of 5</span>
  <span class="reviews">1,024</span>
</div>
<div class="result">
  <h2><a href="/p/second">Second Product</a></h2>
</div>
</body></html>"#;

    #[test]
    fn extracts_all_fields_from_first_block() {
        let details = extract_details(FULL_BLOCK, &adapter()).expect("should extract");
        assert_eq!(details.title, FieldValue::Value("First Product".into()));
        assert_eq!(details.price, FieldValue::Value("₹999".into()));
        assert_eq!(details.offer_price, FieldValue::Value("₹499".into()));
        assert_eq!(details.rating, FieldValue::Value("4.5 out of 5".into()));
        assert_eq!(details.review_count, FieldValue::Value("1,024".into()));
        assert_eq!(
            details.product_link,
            FieldValue::Value("https://shop.example/p/first".into())
        );
    }

    #[test]
    fn no_container_match_is_no_products() {
        let record = extract("shop", "<html><body><p>nothing</p></body></html>", &adapter());
        assert_eq!(record.site, "shop");
        assert_eq!(record.error(), Some("no products found"));
        assert!(record.details().is_none());
    }

    #[test]
    fn missing_field_is_unavailable_and_siblings_survive() {
        let html = r#"<div class="result"><h2>Only Title</h2><span class="offer">₹10</span></div>"#;
        let details = extract_details(html, &adapter()).expect("should extract");
        assert_eq!(details.title, FieldValue::Value("Only Title".into()));
        assert_eq!(details.offer_price, FieldValue::Value("₹10".into()));
        assert_eq!(details.price, FieldValue::Unavailable);
        assert_eq!(details.rating, FieldValue::Unavailable);
        assert_eq!(details.review_count, FieldValue::Unavailable);
        assert_eq!(details.product_link, FieldValue::Unavailable);
    }

    #[test]
    fn wrapper_without_nested_value_is_unavailable() {
        let html = r#"<div class="result"><h2>T</h2><div class="mrp">no amount here</div></div>"#;
        let details = extract_details(html, &adapter()).expect("should extract");
        assert_eq!(details.price, FieldValue::Unavailable);
    }

    #[test]
    fn unconfigured_field_is_unavailable() {
        let mut site = adapter();
        site.fields.rating = None;
        let details = extract_details(FULL_BLOCK, &site).expect("should extract");
        assert_eq!(details.rating, FieldValue::Unavailable);
    }

    #[test]
    fn whitespace_only_text_is_unavailable() {
        let html = r#"<div class="result"><h2>T</h2><span class="stars">   </span></div>"#;
        let details = extract_details(html, &adapter()).expect("should extract");
        assert_eq!(details.rating, FieldValue::Unavailable);
    }

    #[test]
    fn absolute_link_passes_through_unchanged() {
        // Upper-case host would be lowercased by a URL round trip.
        let href = "https://CDN.Other.example/p/Thing?ref=sr_1_1";
        let html = format!(r#"<div class="result"><h2><a href="{href}">T</a></h2></div>"#);
        let details = extract_details(&html, &adapter()).expect("should extract");
        assert_eq!(details.product_link, FieldValue::Value(href.to_owned()));
    }

    #[test]
    fn protocol_relative_link_gets_base_scheme() {
        let html = r#"<div class="result"><h2><a href="//shop.example/p/x">T</a></h2></div>"#;
        let details = extract_details(html, &adapter()).expect("should extract");
        assert_eq!(
            details.product_link,
            FieldValue::Value("https://shop.example/p/x".into())
        );
    }

    #[test]
    fn anchor_without_href_is_structural_failure() {
        let html = r#"<div class="result"><h2><a name="x">T</a></h2></div>"#;
        let record = extract("shop", html, &adapter());
        let error = record.error().expect("should fail");
        assert!(error.starts_with("structural failure:"), "{error}");
        assert!(error.contains("href"), "{error}");
    }

    #[test]
    fn invalid_selector_is_structural_failure() {
        let mut site = adapter();
        site.fields.title = Some(FieldSelector::text("h2[[["));
        let record = extract("shop", FULL_BLOCK, &site);
        assert!(record
            .error()
            .is_some_and(|e| e.starts_with("structural failure:")));
    }

    #[test]
    fn empty_document_is_no_products() {
        assert_eq!(extract_details("", &adapter()), Err(ExtractError::NoProducts));
    }

    #[test]
    fn normalise_whitespace_collapses_runs() {
        assert_eq!(normalise_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(normalise_whitespace(" \n "), "");
    }
}
