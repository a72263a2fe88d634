//! Virtual timer queue driving every delayed callback on the page.
//!
//! Time is a `Duration` measured from bootstrap. The host advances the clock
//! once per frame and the site drains whatever has become due, so the whole
//! state machine stays single-threaded and deterministic under test.

use std::collections::BTreeMap;
use std::time::Duration;

use super::intro::IntroState;
use super::page::{ElementKey, Section};

/// Callbacks that can be scheduled on the page clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Move the intro sequence into the given stage.
    Intro(IntroState),
    /// The continue gate gave up waiting for input.
    ContinueTimeout,
    /// Start the staggered fade of a content section.
    RevealSection(Section),
    /// A fixed-duration fade has run its course.
    FadeSettled(ElementKey),
    /// Programmatic navigation scroll is assumed settled.
    KeyboardNavReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Groups timers so they can be cancelled in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelToken(u64);

#[derive(Debug, Clone)]
struct Pending {
    event: TimerEvent,
    token: Option<CancelToken>,
}

#[derive(Debug, Default)]
pub struct Timers {
    now: Duration,
    next_id: u64,
    next_token: u64,
    // Keyed by (due, id) so equal deadlines fire in scheduling order.
    pending: BTreeMap<(Duration, TimerId), Pending>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn token(&mut self) -> CancelToken {
        self.next_token += 1;
        CancelToken(self.next_token)
    }

    pub fn schedule(&mut self, delay: Duration, event: TimerEvent) -> TimerId {
        self.insert(delay, event, None)
    }

    pub fn schedule_with(
        &mut self,
        token: CancelToken,
        delay: Duration,
        event: TimerEvent,
    ) -> TimerId {
        self.insert(delay, event, Some(token))
    }

    fn insert(&mut self, delay: Duration, event: TimerEvent, token: Option<CancelToken>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending
            .insert((self.now + delay, id), Pending { event, token });
        id
    }

    /// Cancel a single timer. Unknown or already-fired ids are ignored.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.pending.keys().find(|(_, tid)| *tid == id).copied();
        match key {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }

    /// Cancel every pending timer created under `token`.
    pub fn cancel_all(&mut self, token: CancelToken) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, p| p.token != Some(token));
        let cancelled = before - self.pending.len();
        if cancelled > 0 {
            tracing::debug!(cancelled, "cancelled pending timers");
        }
        cancelled
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.keys().any(|(_, tid)| *tid == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_in(&self, token: CancelToken) -> usize {
        self.pending
            .values()
            .filter(|p| p.token == Some(token))
            .count()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Returns `None` once nothing else is due; the clock is
    /// then parked at `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerEvent> {
        let key = match self.pending.first_key_value() {
            Some((key, _)) if key.0 <= until => *key,
            _ => {
                self.now = self.now.max(until);
                return None;
            }
        };
        let pending = self.pending.remove(&key)?;
        self.now = self.now.max(key.0);
        Some(pending.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let mut timers = Timers::new();
        timers.schedule(ms(200), TimerEvent::KeyboardNavReset);
        timers.schedule(ms(100), TimerEvent::ContinueTimeout);
        timers.schedule(ms(100), TimerEvent::RevealSection(Section::About));

        assert_eq!(timers.pop_due(ms(50)), None);
        assert_eq!(timers.now(), ms(50));
        assert_eq!(timers.pop_due(ms(300)), Some(TimerEvent::ContinueTimeout));
        assert_eq!(timers.now(), ms(100));
        assert_eq!(
            timers.pop_due(ms(300)),
            Some(TimerEvent::RevealSection(Section::About))
        );
        assert_eq!(timers.pop_due(ms(300)), Some(TimerEvent::KeyboardNavReset));
        assert_eq!(timers.pop_due(ms(300)), None);
        assert_eq!(timers.now(), ms(300));
    }

    #[test]
    fn delays_are_relative_to_current_time() {
        let mut timers = Timers::new();
        assert_eq!(timers.pop_due(ms(1000)), None);
        timers.schedule(ms(10), TimerEvent::KeyboardNavReset);
        assert_eq!(timers.pop_due(ms(1005)), None);
        assert_eq!(timers.pop_due(ms(1010)), Some(TimerEvent::KeyboardNavReset));
    }

    #[test]
    fn cancel_all_only_touches_its_group() {
        let mut timers = Timers::new();
        let token = timers.token();
        let other = timers.token();
        timers.schedule_with(token, ms(10), TimerEvent::ContinueTimeout);
        timers.schedule_with(token, ms(20), TimerEvent::Intro(IntroState::ShowArt));
        timers.schedule_with(other, ms(30), TimerEvent::KeyboardNavReset);
        let free = timers.schedule(ms(40), TimerEvent::KeyboardNavReset);

        assert_eq!(timers.pending_in(token), 2);
        assert_eq!(timers.cancel_all(token), 2);
        assert_eq!(timers.pending_in(token), 0);
        assert_eq!(timers.pending_count(), 2);
        assert!(timers.is_pending(free));
    }

    #[test]
    fn cancel_single_timer() {
        let mut timers = Timers::new();
        let id = timers.schedule(ms(10), TimerEvent::KeyboardNavReset);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert_eq!(timers.pop_due(ms(100)), None);
    }
}
