//! Show/hide helpers with fixed-duration opacity fades.

use std::time::Duration;

use super::clock::{TimerEvent, Timers};
use super::page::{Element, Transition};

/// Fade an element up to full opacity over `duration`.
///
/// A hidden element only becomes displayed when `force_reflow` is set; the
/// starting opacity is then committed before the transition begins so the
/// fade is actually visible. `callback` fires after `duration` on a plain
/// timer, not on transition end.
pub fn fade_in(
    element: Option<&mut Element>,
    timers: &mut Timers,
    duration: Duration,
    force_reflow: bool,
    callback: Option<TimerEvent>,
) {
    let Some(element) = element else {
        return;
    };

    if force_reflow {
        element.displayed = true;
        // Commit whatever the element currently shows as the start value.
        element.opacity = element.opacity_at(timers.now());
        element.transition = None;
    }

    let now = timers.now();
    let from = match &element.transition {
        Some(t) => t.value_at(now),
        None => element.opacity,
    };
    element.transition = Some(Transition {
        from,
        to: 1.0,
        start: now,
        duration,
    });
    element.opacity = 1.0;

    if let Some(event) = callback {
        timers.schedule(duration, event);
    }
}

/// Immediately hide an element and reset it to the pre-fade state.
pub fn hide_element(element: Option<&mut Element>) {
    let Some(element) = element else {
        return;
    };
    element.displayed = false;
    element.transition = None;
    element.opacity = 0.0;
}

/// Drop a finished transition so the committed opacity stands on its own.
pub fn settle(element: Option<&mut Element>, now: Duration) {
    if let Some(element) = element
        && element.transition.is_some_and(|t| t.is_finished(now))
    {
        element.transition = None;
    }
}
