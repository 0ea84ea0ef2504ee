use std::path::{Path, PathBuf};

use kuchiki::traits::TendrilSink as _;
use kuchiki::NodeRef;
use page_enhance::{CliArgs, DEFAULT_SUBTITLES, SystemScheme};
use tempfile::tempdir;

fn args(state: &Path, out: &Path) -> CliArgs {
    CliArgs {
        input: None,
        builtin_page: true,
        out: Some(out.to_path_buf()),
        state: state.to_path_buf(),
        system_scheme: SystemScheme::Light,
        toggle: 0,
        reset: false,
        rotate_cycles: 0,
        tick_ms: 1.0,
    }
}

fn parse(path: &Path) -> NodeRef {
    let html = std::fs::read_to_string(path).unwrap();
    kuchiki::parse_html().one(html)
}

fn attr(doc: &NodeRef, selector: &str, name: &str) -> Option<String> {
    let node = doc.select_first(selector).unwrap();
    let attrs = node.attributes.borrow();
    attrs.get(name).map(str::to_string)
}

#[tokio::test]
async fn first_load_hides_reset_and_one_toggle_reveals_it() {
    let tmp = tempdir().unwrap();
    let state = tmp.path().join("state.json");
    let out = tmp.path().join("out.html");

    // Fresh load, no stored preference.
    page_enhance::run(args(&state, &out)).await.unwrap();
    let doc = parse(&out);
    assert_eq!(
        attr(&doc, "#theme-reset", "style").as_deref(),
        Some("display: none")
    );
    assert_eq!(attr(&doc, "body", "class"), None);

    // One toggle activation with a dark system scheme flips to light.
    let mut a = args(&state, &out);
    a.system_scheme = SystemScheme::Dark;
    a.toggle = 1;
    page_enhance::run(a).await.unwrap();

    let doc = parse(&out);
    assert_eq!(attr(&doc, "body", "class").as_deref(), Some("light-mode"));
    assert_eq!(
        attr(&doc, "#theme-reset", "style").as_deref(),
        Some("display: inline")
    );

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(json["entries"]["theme-toggle"], "light-mode");
}

#[tokio::test]
async fn repeated_toggles_alternate_preferences() {
    let tmp = tempdir().unwrap();
    let state = tmp.path().join("state.json");
    let out = tmp.path().join("out.html");

    // System light: unset -> dark, dark -> light, light -> dark.
    let mut a = args(&state, &out);
    a.toggle = 3;
    page_enhance::run(a).await.unwrap();

    let doc = parse(&out);
    assert_eq!(attr(&doc, "body", "class").as_deref(), Some("dark-mode"));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(json["entries"]["theme-toggle"], "dark-mode");
}

#[tokio::test]
async fn reset_clears_preference_and_hides_control() {
    let tmp = tempdir().unwrap();
    let state = tmp.path().join("state.json");
    let out = tmp.path().join("out.html");

    let mut a = args(&state, &out);
    a.toggle = 1;
    a.reset = true;
    page_enhance::run(a).await.unwrap();

    let doc = parse(&out);
    assert_eq!(attr(&doc, "body", "class"), None);
    assert_eq!(
        attr(&doc, "#theme-reset", "style").as_deref(),
        Some("display: none")
    );
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state).unwrap()).unwrap();
    assert!(json["entries"].get("theme-toggle").is_none());
}

#[tokio::test]
async fn builtin_page_footnotes_get_hover_titles() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out.html");
    page_enhance::run(args(&tmp.path().join("state.json"), &out))
        .await
        .unwrap();

    let doc = parse(&out);
    assert_eq!(
        attr(&doc, r##"a[href="#fn1"]"##, "title").as_deref(),
        Some("Rebuilds reuse the cached base layers.")
    );
    assert_eq!(
        attr(&doc, r##"a[href="#fn2"]"##, "title").as_deref(),
        Some("Remote state is synced over ssh.")
    );
}

#[tokio::test]
async fn custom_page_missing_footnote_target_is_skipped() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("page.html");
    let out = tmp.path().join("out.html");
    std::fs::write(
        &input,
        r##"<html><body>
<div class="post-body">
  <a class="footnote" href="#n1">1</a>
  <a class="footnote" href="#gone">2</a>
</div>
<span id="n1">  Hello world  </span>
</body></html>"##,
    )
    .unwrap();

    let mut a = args(&tmp.path().join("state.json"), &out);
    a.builtin_page = false;
    a.input = Some(input);
    page_enhance::run(a).await.unwrap();

    let doc = parse(&out);
    assert_eq!(
        attr(&doc, r##"a[href="#n1"]"##, "title").as_deref(),
        Some("Hello world")
    );
    assert_eq!(attr(&doc, r##"a[href="#gone"]"##, "title"), None);
}

#[tokio::test]
async fn rotator_leaves_a_revealed_subtitle_in_the_page() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out.html");

    let mut a = args(&tmp.path().join("state.json"), &out);
    a.rotate_cycles = 1;
    a.tick_ms = 0.01;
    page_enhance::run(a).await.unwrap();

    let doc = parse(&out);
    let subtitle = doc.select_first("#live-subtitle").unwrap().text_contents();
    assert!(
        DEFAULT_SUBTITLES.contains(&subtitle.as_str()),
        "unexpected subtitle {subtitle:?}"
    );
}

#[tokio::test]
async fn default_output_path_lands_next_to_input() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("page.html");
    std::fs::write(&input, "<html><body></body></html>").unwrap();

    let mut a = args(&tmp.path().join("state.json"), Path::new("ignored"));
    a.builtin_page = false;
    a.input = Some(input);
    a.out = None;
    page_enhance::run(a).await.unwrap();

    assert!(tmp.path().join("enhanced.html").exists());
    assert!(!PathBuf::from("ignored").exists());
}
