use anyhow::Context as _;
use kuchiki::traits::TendrilSink as _;
use kuchiki::{ElementData, NodeDataRef, NodeRef};
use maud::{DOCTYPE, Markup, html};

/// Subtitle list the site ships with.
pub const DEFAULT_SUBTITLES: &[&str] = &[
    "# container manager",
    "build :all",
    "run dev",
    "run website",
    "update prod",
    "update --remote=prod",
    "run --remote=server",
    "diff prod",
    "shell $container",
    "logs $container",
    "attach $container",
    "init",
    "script main.rb",
    "repl python",
];

pub fn parse_document(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

pub fn serialize_document(doc: &NodeRef) -> anyhow::Result<String> {
    let mut out = Vec::new();
    doc.serialize(&mut out).context("serialize document")?;
    String::from_utf8(out).context("document not utf-8")
}

/// Fragment-reference lookup. Matches on the `id` attribute rather
/// than a CSS selector so ids that are not valid selector tokens
/// still resolve.
pub fn element_by_id(doc: &NodeRef, id: &str) -> Option<NodeDataRef<ElementData>> {
    let nodes = doc.select("[id]").ok()?;
    nodes
        .into_iter()
        .find(|n| n.attributes.borrow().get("id") == Some(id))
}

/// Sample page carrying the full DOM contract: theme controls,
/// a footnoted content region, and the rotator target.
pub fn builtin_page() -> String {
    let markup: Markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="color-scheme" content="light dark";
                title { "container manager" }
            }
            body {
                header class="site-header" {
                    h1 { "container manager" }
                    p id="live-subtitle" {}
                    button type="button" id="theme-toggle" { "Theme" }
                    button type="button" id="theme-reset" { "Reset" }
                }
                main class="post-body" {
                    p {
                        "Containers are declared once and rebuilt on demand."
                        sup { a class="footnote" href="#fn1" { "1" } }
                        " Remote hosts behave exactly like local ones."
                        sup { a class="footnote" href="#fn2" { "2" } }
                    }
                    section class="footnotes" {
                        ol {
                            li id="fn1" { "Rebuilds reuse the cached base layers." }
                            li id="fn2" { "Remote state is synced over ssh." }
                        }
                    }
                }
            }
        }
    };
    markup.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_by_id_resolves_and_misses() {
        let doc = parse_document(r#"<p id="a">one</p><p id="b">two</p>"#);
        assert_eq!(
            element_by_id(&doc, "b").map(|n| n.text_contents()),
            Some("two".to_string())
        );
        assert!(element_by_id(&doc, "c").is_none());
    }

    #[test]
    fn builtin_page_carries_dom_contract() {
        let page = builtin_page();
        let doc = parse_document(&page);
        for id in ["theme-toggle", "theme-reset", "live-subtitle", "fn1", "fn2"] {
            assert!(element_by_id(&doc, id).is_some(), "missing #{id}");
        }
        let anchors = doc.select(".post-body a.footnote").unwrap().count();
        assert_eq!(anchors, 2);
    }
}
