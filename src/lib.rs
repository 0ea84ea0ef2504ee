mod cli;
mod footnote;
mod page;
mod rotator;
mod store;
mod theme;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;

pub use cli::{Args as CliArgs, SystemScheme};
pub use page::DEFAULT_SUBTITLES;
pub use rotator::{DomSubtitle, StopHandle, SubtitleRotator, SubtitleSink, stop_channel};
pub use store::{FileStore, MemoryStore, PREFERENCE_KEY, PreferenceStore};
pub use theme::{DARK_MODE, LIGHT_MODE, Preference, ThemeController};

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let html = if args.builtin_page {
        page::builtin_page()
    } else {
        let input = args
            .input
            .as_deref()
            .context("pass --input <page.html> or --builtin-page")?;
        std::fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?
    };
    let doc = page::parse_document(&html);

    let store = store::FileStore::open(&args.state)?;
    let mut controller = theme::ThemeController::new(store, args.system_scheme);

    // Load behavior: reset visibility from the store, then the stored
    // preference class (the inline head script's job on the live site).
    controller.initialize(&doc);
    theme::apply_stored(&doc, controller.stored().as_deref());

    if args.toggle > 0 && page::element_by_id(&doc, theme::TOGGLE_ID).is_none() {
        tracing::warn!(id = theme::TOGGLE_ID, "page has no toggle control");
    }
    for _ in 0..args.toggle {
        let preference = controller.toggle(&doc)?;
        tracing::info!(preference = preference.class_name(), "toggle activated");
    }
    if args.reset {
        controller.reset(&doc)?;
        tracing::info!("preference cleared");
    }

    let annotated = footnote::annotate_footnotes(&doc);
    tracing::debug!(annotated, "footnotes annotated");

    if args.rotate_cycles > 0 {
        match page::element_by_id(&doc, rotator::SUBTITLE_TARGET_ID) {
            Some(target) => {
                let subtitles = DEFAULT_SUBTITLES.iter().map(|s| s.to_string()).collect();
                let mut rotator = SubtitleRotator::new(subtitles)
                    .with_tick(Duration::from_secs_f64(args.tick_ms / 1000.0));
                let mut sink = DomSubtitle::new(target.as_node().clone());
                rotator
                    .run_cycles(&mut sink, args.rotate_cycles as usize)
                    .await;
            }
            None => {
                tracing::warn!(
                    id = rotator::SUBTITLE_TARGET_ID,
                    "no subtitle element; skipping rotator"
                );
            }
        }
    }

    let out = output_path(&args);
    std::fs::write(&out, page::serialize_document(&doc)?)
        .with_context(|| format!("write {}", out.display()))?;
    tracing::info!(out = %out.display(), "enhanced page written");
    Ok(())
}

fn output_path(args: &CliArgs) -> PathBuf {
    if let Some(out) = &args.out {
        return out.clone();
    }
    match args.input.as_deref().and_then(|p| p.parent()) {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join("enhanced.html"),
        _ => PathBuf::from("enhanced.html"),
    }
}
