use std::time::Duration;

use kuchiki::NodeRef;
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng as _;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

/// Id of the element the rotator writes into.
pub const SUBTITLE_TARGET_ID: &str = "live-subtitle";

/// Time units (milliseconds at the default tick) before the first cycle.
pub const INITIAL_DELAY_UNITS: f64 = 2000.0;

/// Where the rotator writes each frame of the reveal.
pub trait SubtitleSink {
    fn set_text(&mut self, text: &str);
}

/// Sink backed by a DOM element; each frame replaces the element's
/// children with a single text node.
pub struct DomSubtitle {
    node: NodeRef,
}

impl DomSubtitle {
    pub fn new(node: NodeRef) -> Self {
        Self { node }
    }
}

impl SubtitleSink for DomSubtitle {
    fn set_text(&mut self, text: &str) {
        while let Some(child) = self.node.first_child() {
            child.detach();
        }
        if !text.is_empty() {
            self.node.append(NodeRef::new_text(text));
        }
    }
}

/// Uniform selection with the weak anti-repeat rule: a draw equal to
/// the previous cycle's index advances to the next index, wrapping.
/// A length-1 list always repeats; a length-2 list strictly alternates.
pub fn select_index(rng: &mut impl Rng, len: usize, last: Option<usize>) -> usize {
    let mut index = rng.random_range(0..len);
    if Some(index) == last {
        index = (index + 1) % len;
    }
    index
}

/// Delay from cycle start until character `i` is appended. Jitter is
/// strictly below the 180-unit spacing, so offsets are monotonic in `i`.
fn reveal_offset(rng: &mut impl Rng, i: usize) -> f64 {
    rng.random_range(0.0..50.0) + 180.0 * (i as f64 + 5.0)
}

/// Delay from cycle start until the next cycle begins.
pub fn advance_offset(len: usize) -> f64 {
    230.0 * (len as f64 + 5.0) + 2000.0
}

pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    /// Halts the rotator at the next scheduling point.
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

pub type StopSignal = watch::Receiver<bool>;

pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, rx)
}

/// Select/reveal/advance loop over a fixed subtitle list. State lives
/// in the instance; timing goes through the tokio clock so tests run
/// it under a paused runtime.
pub struct SubtitleRotator {
    subtitles: Vec<String>,
    tick: Duration,
    rng: StdRng,
    last: Option<usize>,
}

impl SubtitleRotator {
    pub fn new(subtitles: Vec<String>) -> Self {
        Self {
            subtitles,
            tick: Duration::from_millis(1),
            rng: StdRng::from_os_rng(),
            last: None,
        }
    }

    /// Real time per schedule unit (default one millisecond).
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Runs until the stop handle fires; the stop signal is the only
    /// way to end the loop.
    pub async fn run<S: SubtitleSink + ?Sized>(&mut self, sink: &mut S, mut stop: StopSignal) {
        if self.subtitles.is_empty() {
            return;
        }
        if !sleep_or_stop(Instant::now() + self.scaled(INITIAL_DELAY_UNITS), &mut stop).await {
            return;
        }
        while self.cycle(sink, &mut stop).await {}
    }

    /// Bounded variant for the CLI and tests: the initial delay, then
    /// exactly `cycles` full cycles.
    pub async fn run_cycles<S: SubtitleSink + ?Sized>(&mut self, sink: &mut S, cycles: usize) {
        if self.subtitles.is_empty() {
            return;
        }
        let (_handle, mut stop) = stop_channel();
        if !sleep_or_stop(Instant::now() + self.scaled(INITIAL_DELAY_UNITS), &mut stop).await {
            return;
        }
        for _ in 0..cycles {
            if !self.cycle(sink, &mut stop).await {
                return;
            }
        }
    }

    /// One full cycle. Returns false when stopped mid-cycle.
    async fn cycle<S: SubtitleSink + ?Sized>(&mut self, sink: &mut S, stop: &mut StopSignal) -> bool {
        let index = select_index(&mut self.rng, self.subtitles.len(), self.last);
        let item = self.subtitles[index].clone();
        let chars: Vec<char> = item.chars().collect();

        let start = Instant::now();
        sink.set_text("");
        let mut revealed = String::with_capacity(item.len());
        for (i, ch) in chars.iter().enumerate() {
            let offset = reveal_offset(&mut self.rng, i);
            if !sleep_or_stop(start + self.scaled(offset), stop).await {
                return false;
            }
            revealed.push(*ch);
            sink.set_text(&revealed);
        }
        tracing::debug!(index, subtitle = %item, "revealed subtitle");

        self.last = Some(index);
        sleep_or_stop(start + self.scaled(advance_offset(chars.len())), stop).await
    }

    fn scaled(&self, units: f64) -> Duration {
        self.tick.mul_f64(units)
    }
}

/// Waits until `deadline`, returning false if the stop signal fires
/// first (or its handle is gone).
async fn sleep_or_stop(deadline: Instant, stop: &mut StopSignal) -> bool {
    if *stop.borrow() {
        return false;
    }
    tokio::select! {
        _ = sleep_until(deadline) => true,
        res = stop.changed() => match res {
            Ok(()) => !*stop.borrow(),
            Err(_) => false,
        },
    }
}
