use kuchiki::NodeRef;

use crate::page;

/// Anchors eligible for annotation live inside the content region.
const FOOTNOTE_SELECTOR: &str = ".post-body a.footnote";

/// One-shot pass copying each referenced footnote's trimmed text into
/// the referencing anchor's `title` attribute for hover preview.
/// Anchors whose target is missing are left untouched. Returns the
/// number of anchors annotated.
pub fn annotate_footnotes(doc: &NodeRef) -> usize {
    let Ok(anchors) = doc.select(FOOTNOTE_SELECTOR) else {
        return 0;
    };

    let mut annotated = 0;
    for anchor in anchors {
        let href = anchor
            .attributes
            .borrow()
            .get("href")
            .map(|s| s.to_string());
        let Some(href) = href else { continue };
        let Some(id) = href.strip_prefix('#') else {
            continue;
        };
        let Some(target) = page::element_by_id(doc, id) else {
            tracing::debug!(href = %href, "footnote target missing; skipping");
            continue;
        };
        let text = target.text_contents().trim().to_string();
        anchor.attributes.borrow_mut().insert("title", text);
        annotated += 1;
    }
    annotated
}
