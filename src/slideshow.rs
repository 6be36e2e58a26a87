//! Cycles through a set of images on a timer.
//!
//! A [Slideshow] holds the images and tracks which one is active. A [SlideshowTimer] runs on its
//! own thread and emits a [SlideshowTick] every interval. Both are owned by a [SlideshowSlot],
//! which is the only way to start a timer: replacing or clearing the slot always stops the
//! previous timer first, so there's never more than one running.

use std::{
    sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};
use tracing::debug;

/// An image in a slideshow.
#[derive(Clone, Debug)]
pub(crate) struct Slide<T> {
    pub(crate) image: T,
    active: bool,
}

impl<T> Slide<T> {
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }
}

/// The clickable marker for a slide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Indicator {
    active: bool,
}

impl Indicator {
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }
}

/// A set of slides with exactly one of them active, unless there are none.
#[derive(Debug)]
pub(crate) struct Slideshow<T> {
    slides: Vec<Slide<T>>,
    indicators: Vec<Indicator>,
    current: Option<usize>,
}

impl<T> Slideshow<T> {
    pub(crate) fn new(images: Vec<T>) -> Self {
        let slides: Vec<_> =
            images.into_iter().enumerate().map(|(index, image)| Slide { image, active: index == 0 }).collect();
        let indicators = (0..slides.len()).map(|index| Indicator { active: index == 0 }).collect();
        let current = if slides.is_empty() { None } else { Some(0) };
        Self { slides, indicators, current }
    }

    pub(crate) fn len(&self) -> usize {
        self.slides.len()
    }

    /// The index of the active slide.
    pub(crate) fn current(&self) -> Option<usize> {
        self.current
    }

    pub(crate) fn slides(&self) -> &[Slide<T>] {
        &self.slides
    }

    pub(crate) fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    /// Move to the next slide, wrapping around after the last one.
    ///
    /// This does nothing unless there's at least 2 slides.
    pub(crate) fn advance(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        if self.slides.len() <= 1 {
            return;
        }
        self.activate((current + 1) % self.slides.len());
    }

    /// Make the slide at `target` the active one.
    pub(crate) fn select(&mut self, target: usize) -> Result<(), SelectError> {
        if target >= self.slides.len() {
            return Err(SelectError::OutOfRange { index: target, len: self.slides.len() });
        }
        self.activate(target);
        Ok(())
    }

    /// Select the slide after the current one, wrapping around.
    pub(crate) fn select_next(&mut self) -> Result<(), SelectError> {
        let current = self.current().ok_or(SelectError::Empty)?;
        self.select((current + 1) % self.slides.len())
    }

    /// Select the slide before the current one, wrapping around.
    pub(crate) fn select_previous(&mut self) -> Result<(), SelectError> {
        let current = self.current().ok_or(SelectError::Empty)?;
        let len = self.slides.len();
        self.select((current + len - 1) % len)
    }

    fn activate(&mut self, target: usize) {
        if let Some(current) = self.current {
            self.slides[current].active = false;
            self.indicators[current].active = false;
        }
        self.slides[target].active = true;
        self.indicators[target].active = true;
        self.current = Some(target);
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum SelectError {
    #[error("slide {index} is out of range, there are {len} slides")]
    OutOfRange { index: usize, len: usize },

    #[error("no slideshow is active")]
    Empty,
}

/// Emitted by a [SlideshowTimer] every time the active slide should move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SlideshowTick {
    pub(crate) generation: u64,
}

/// Where timer ticks are delivered.
pub(crate) trait TickSink: Clone + Send + 'static {
    /// Deliver a tick, returning `false` if nobody is listening anymore.
    fn deliver(&self, tick: SlideshowTick) -> bool;
}

impl TickSink for Sender<SlideshowTick> {
    fn deliver(&self, tick: SlideshowTick) -> bool {
        self.send(tick).is_ok()
    }
}

enum TimerCommand {
    Restart,
    Stop,
}

/// A thread that ticks at a fixed interval until it's dropped.
///
/// Dropping the timer blocks until its thread exits, so no ticks are emitted after that.
pub(crate) struct SlideshowTimer {
    commands: Sender<TimerCommand>,
    handle: Option<JoinHandle<()>>,
}

impl SlideshowTimer {
    fn start<S: TickSink>(interval: Duration, generation: u64, sink: S) -> Self {
        let (commands, receiver) = channel();
        let handle = thread::spawn(move || Self::run(interval, generation, receiver, sink));
        Self { commands, handle: Some(handle) }
    }

    /// Start counting the interval again from now.
    fn restart(&self) {
        let _ = self.commands.send(TimerCommand::Restart);
    }

    fn run<S: TickSink>(interval: Duration, generation: u64, commands: Receiver<TimerCommand>, sink: S) {
        loop {
            match commands.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if !sink.deliver(SlideshowTick { generation }) {
                        break;
                    }
                }
                Ok(TimerCommand::Restart) => continue,
                Ok(TimerCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("Slideshow timer for generation {generation} stopped");
    }
}

impl Drop for SlideshowTimer {
    fn drop(&mut self) {
        let _ = self.commands.send(TimerCommand::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct SlideshowOptions {
    pub(crate) interval: Duration,
    pub(crate) restart_on_select: bool,
}

struct LiveSlideshow<T> {
    slideshow: Slideshow<T>,
    timer: Option<SlideshowTimer>,
}

/// Holds at most one live slideshow along with its timer.
pub(crate) struct SlideshowSlot<T, S> {
    sink: S,
    options: SlideshowOptions,
    generation: u64,
    live: Option<LiveSlideshow<T>>,
}

impl<T, S: TickSink> SlideshowSlot<T, S> {
    pub(crate) fn new(sink: S, options: SlideshowOptions) -> Self {
        Self { sink, options, generation: 0, live: None }
    }

    /// Replace the current slideshow, if any, with one over the given images.
    ///
    /// The previous timer is stopped before this returns. A timer is only started if there's more
    /// than one image.
    pub(crate) fn replace(&mut self, images: Vec<T>) {
        self.clear();
        self.generation += 1;
        let slideshow = Slideshow::new(images);
        let timer = if slideshow.len() > 1 {
            debug!("Starting slideshow generation {} with {} images", self.generation, slideshow.len());
            Some(SlideshowTimer::start(self.options.interval, self.generation, self.sink.clone()))
        } else {
            None
        };
        self.live = Some(LiveSlideshow { slideshow, timer });
    }

    /// Tear down the current slideshow and its timer.
    pub(crate) fn clear(&mut self) {
        if self.live.take().is_some() {
            debug!("Slideshow generation {} torn down", self.generation);
        }
    }

    pub(crate) fn slideshow(&self) -> Option<&Slideshow<T>> {
        self.live.as_ref().map(|live| &live.slideshow)
    }

    /// Handle a timer tick, returning whether the active slide changed.
    ///
    /// Ticks from timers that were already torn down are ignored.
    pub(crate) fn on_tick(&mut self, tick: SlideshowTick) -> bool {
        if tick.generation != self.generation {
            debug!("Ignoring tick from stale slideshow generation {}", tick.generation);
            return false;
        }
        match &mut self.live {
            Some(live) if live.slideshow.len() > 1 => {
                live.slideshow.advance();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn select(&mut self, target: usize) -> Result<(), SelectError> {
        self.navigate(|slideshow| slideshow.select(target))
    }

    pub(crate) fn select_next(&mut self) -> Result<(), SelectError> {
        self.navigate(Slideshow::select_next)
    }

    pub(crate) fn select_previous(&mut self) -> Result<(), SelectError> {
        self.navigate(Slideshow::select_previous)
    }

    fn navigate<F>(&mut self, action: F) -> Result<(), SelectError>
    where
        F: FnOnce(&mut Slideshow<T>) -> Result<(), SelectError>,
    {
        let live = self.live.as_mut().ok_or(SelectError::Empty)?;
        action(&mut live.slideshow)?;
        if self.options.restart_on_select {
            if let Some(timer) = &live.timer {
                timer.restart();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use std::time::Instant;

    const FAST: Duration = Duration::from_millis(10);

    fn active_slides<T>(slideshow: &Slideshow<T>) -> Vec<usize> {
        slideshow.slides().iter().enumerate().filter(|(_, slide)| slide.is_active()).map(|(index, _)| index).collect()
    }

    fn active_indicators<T>(slideshow: &Slideshow<T>) -> Vec<usize> {
        slideshow.indicators().iter().enumerate().filter(|(_, i)| i.is_active()).map(|(index, _)| index).collect()
    }

    fn assert_active<T>(slideshow: &Slideshow<T>, expected: usize) {
        assert_eq!(slideshow.current(), Some(expected));
        assert_eq!(active_slides(slideshow), &[expected]);
        assert_eq!(active_indicators(slideshow), &[expected]);
    }

    type TestSlot = SlideshowSlot<u32, Sender<SlideshowTick>>;

    fn slot(interval: Duration, restart_on_select: bool) -> (TestSlot, Receiver<SlideshowTick>) {
        let (sender, receiver) = channel();
        let slot = SlideshowSlot::new(sender, SlideshowOptions { interval, restart_on_select });
        (slot, receiver)
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(7)]
    fn fresh_slideshow(#[case] count: u32) {
        let slideshow = Slideshow::new((0..count).collect());
        assert_eq!(slideshow.indicators().len(), count as usize);
        if count == 0 {
            assert_eq!(slideshow.current(), None);
            assert!(active_slides(&slideshow).is_empty());
            assert!(active_indicators(&slideshow).is_empty());
        } else {
            assert_active(&slideshow, 0);
        }
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    fn advance_is_cyclic(#[case] count: u32) {
        let mut slideshow = Slideshow::new((0..count).collect());
        for _ in 0..count {
            slideshow.advance();
        }
        assert_active(&slideshow, 0);
    }

    #[test]
    fn advance_four() {
        let mut slideshow = Slideshow::new(vec!['a', 'b', 'c', 'd']);
        for _ in 0..3 {
            slideshow.advance();
        }
        assert_active(&slideshow, 3);
        assert_eq!(slideshow.slides()[3].image, 'd');

        slideshow.advance();
        assert_active(&slideshow, 0);
    }

    #[test]
    fn advance_single() {
        let mut slideshow = Slideshow::new(vec!["only"]);
        slideshow.advance();
        assert_active(&slideshow, 0);
    }

    #[test]
    fn advance_empty() {
        let mut slideshow = Slideshow::<u8>::new(vec![]);
        slideshow.advance();
        assert_eq!(slideshow.current(), None);
        assert!(slideshow.slides().is_empty());
    }

    #[test]
    fn select() {
        let mut slideshow = Slideshow::new((0..5).collect::<Vec<_>>());
        slideshow.select(2).expect("select failed");
        assert_active(&slideshow, 2);

        slideshow.select(4).expect("select failed");
        assert_active(&slideshow, 4);
    }

    #[rstest]
    #[case::past_end(3, 3)]
    #[case::way_past_end(3, 100)]
    #[case::empty(0, 0)]
    fn select_out_of_range(#[case] count: u32, #[case] target: usize) {
        let mut slideshow = Slideshow::new((0..count).collect());
        let before = slideshow.current();
        let result = slideshow.select(target);
        assert_eq!(result, Err(SelectError::OutOfRange { index: target, len: count as usize }));
        assert_eq!(slideshow.current(), before);
    }

    #[test]
    fn next_and_previous_wrap() {
        let mut slideshow = Slideshow::new(vec![1, 2, 3]);
        slideshow.select_previous().expect("select failed");
        assert_active(&slideshow, 2);
        slideshow.select_next().expect("select failed");
        assert_active(&slideshow, 0);
        slideshow.select_next().expect("select failed");
        assert_active(&slideshow, 1);
    }

    #[test]
    fn next_on_empty() {
        let mut slideshow = Slideshow::<u8>::new(vec![]);
        assert_eq!(slideshow.select_next(), Err(SelectError::Empty));
        assert_eq!(slideshow.select_previous(), Err(SelectError::Empty));
    }

    #[test]
    fn timer_ticks() {
        let (mut slot, ticks) = slot(FAST, false);
        slot.replace(vec![1, 2, 3]);
        let tick = ticks.recv_timeout(Duration::from_secs(5)).expect("no tick");
        assert_eq!(tick, SlideshowTick { generation: 1 });

        assert!(slot.on_tick(tick));
        assert_active(slot.slideshow().unwrap(), 1);
    }

    #[rstest]
    #[case::empty(vec![])]
    #[case::single(vec![1])]
    fn no_timer_for_static_slideshows(#[case] images: Vec<u32>) {
        let (mut slot, ticks) = slot(FAST, false);
        slot.replace(images);
        assert!(ticks.recv_timeout(FAST * 10).is_err());
    }

    #[test]
    fn replace_stops_previous_timer() {
        let (mut slot, ticks) = slot(FAST, false);
        slot.replace(vec![1, 2]);
        ticks.recv_timeout(Duration::from_secs(5)).expect("no tick");

        slot.replace(vec![3, 4, 5]);
        // Anything the old timer sent went out before replace returned.
        let stale: Vec<_> = ticks.try_iter().collect();
        assert!(stale.iter().all(|tick| tick.generation == 1));

        let start = Instant::now();
        while start.elapsed() < FAST * 10 {
            if let Ok(tick) = ticks.recv_timeout(FAST) {
                assert_eq!(tick.generation, 2);
            }
        }
    }

    #[test]
    fn stale_ticks_ignored() {
        let (mut slot, _ticks) = slot(Duration::from_secs(60), false);
        slot.replace(vec![1, 2]);
        slot.replace(vec![3, 4]);
        assert!(!slot.on_tick(SlideshowTick { generation: 1 }));
        assert_active(slot.slideshow().unwrap(), 0);

        assert!(slot.on_tick(SlideshowTick { generation: 2 }));
        assert_active(slot.slideshow().unwrap(), 1);
    }

    #[test]
    fn clear_stops_timer() {
        let (mut slot, ticks) = slot(FAST, false);
        slot.replace(vec![1, 2]);
        slot.clear();
        assert!(slot.slideshow().is_none());

        let _: Vec<_> = ticks.try_iter().collect();
        assert!(ticks.recv_timeout(FAST * 10).is_err());
    }

    #[test]
    fn slot_navigation() {
        let (mut slot, _ticks) = slot(Duration::from_secs(60), false);
        assert_eq!(slot.select(0), Err(SelectError::Empty));

        slot.replace(vec![1, 2, 3, 4, 5]);
        slot.select(2).expect("select failed");
        assert_active(slot.slideshow().unwrap(), 2);
        slot.select_next().expect("select failed");
        assert_active(slot.slideshow().unwrap(), 3);
        slot.select_previous().expect("select failed");
        assert_active(slot.slideshow().unwrap(), 2);
        assert!(slot.select(5).is_err());
        assert_active(slot.slideshow().unwrap(), 2);
    }

    #[test]
    fn select_keeps_timer_phase() {
        let interval = Duration::from_millis(600);
        let (mut slot, ticks) = slot(interval, false);
        slot.replace(vec![1, 2, 3]);
        thread::sleep(Duration::from_millis(360));
        slot.select(2).expect("select failed");

        let selected_at = Instant::now();
        let tick = ticks.recv_timeout(Duration::from_secs(5)).expect("no tick");
        assert!(selected_at.elapsed() < interval, "tick took {:?}", selected_at.elapsed());
        assert!(slot.on_tick(tick));
        assert_active(slot.slideshow().unwrap(), 0);
    }

    #[test]
    fn restart_on_select() {
        let interval = Duration::from_millis(400);
        let (mut slot, ticks) = slot(interval, true);
        slot.replace(vec![1, 2, 3]);
        thread::sleep(Duration::from_millis(200));
        slot.select(2).expect("select failed");

        // The countdown started over so nothing shows up where the first tick would have been.
        assert!(ticks.recv_timeout(Duration::from_millis(300)).is_err());
        ticks.recv_timeout(Duration::from_secs(5)).expect("no tick");
    }
}
