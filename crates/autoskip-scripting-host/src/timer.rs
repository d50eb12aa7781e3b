use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rquickjs::function::Rest;
use rquickjs::{Ctx, Exception, Function, Persistent, Value};

use crate::marshal::FromScript;
use crate::runtime::RuntimeShared;

/// Identifier handed back to scripts by `setTimeout`
pub type TimerId = u32;

/// A one-shot callback scheduled for a fixed instant
#[derive(Debug)]
pub struct TimeoutTimer<C> {
    pub id: TimerId,
    pub fire_at: Instant,
    pub callback: C,
}

impl<C> PartialEq for TimeoutTimer<C> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.id == other.id
    }
}

impl<C> Eq for TimeoutTimer<C> {}

impl<C> PartialOrd for TimeoutTimer<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap is a max-heap, so the ordering is reversed: the earliest
// deadline wins and equal deadlines pop in registration order.
impl<C> Ord for TimeoutTimer<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Pending timers ordered by deadline.
///
/// Ids are handed out once each, starting at 0, so a queue issues at most
/// `TimerId::MAX + 1` timers over its lifetime. Scheduling past that fails.
pub struct TimerQueue<C> {
    heap: BinaryHeap<TimeoutTimer<C>>,
    next_id: u64,
}

impl<C> TimerQueue<C> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_id: 0,
        }
    }

    /// Schedule `callback` to fire `delay` from now. `None` once every id
    /// has been used.
    pub fn schedule(&mut self, callback: C, delay: Duration) -> Option<TimerId> {
        self.schedule_at(callback, Instant::now() + delay)
    }

    pub fn schedule_at(&mut self, callback: C, fire_at: Instant) -> Option<TimerId> {
        let id = TimerId::try_from(self.next_id).ok()?;
        self.next_id += 1;
        self.heap.push(TimeoutTimer {
            id,
            fire_at,
            callback,
        });
        Some(id)
    }

    /// Deadline of the earliest timer, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|timer| timer.fire_at)
    }

    /// Remove and return the earliest timer if it is due at `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<TimeoutTimer<C>> {
        if self.heap.peek()?.fire_at <= now {
            self.heap.pop()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl<C> Default for TimerQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Callback type stored for script timers
pub(crate) type ScriptCallback = Persistent<Function<'static>>;

/// Install the global `setTimeout(callback, delayMs)` function.
pub(crate) fn install_set_timeout<'js>(ctx: &Ctx<'js>, shared: Rc<RuntimeShared>) -> rquickjs::Result<()> {
    let set_timeout = move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<TimerId> {
        let args = args.0;
        if args.len() < 2 {
            return Err(Exception::throw_type(
                &ctx,
                &format!("Expected 2 argument, but received {}", args.len()),
            ));
        }

        let callback = args[0]
            .as_function()
            .cloned()
            .ok_or_else(|| Exception::throw_type(&ctx, "Argument1 is not a Function"))?;
        let delay = i32::from_script(&ctx, &args[1])
            .ok_or_else(|| Exception::throw_type(&ctx, "Argument2 is not a Number"))?;
        let delay = Duration::from_millis(u64::from(delay.max(0).unsigned_abs()));

        let callback = Persistent::save(&ctx, callback);
        let id = shared
            .timers
            .borrow_mut()
            .schedule(callback, delay)
            .ok_or_else(|| Exception::throw_range(&ctx, "setTimeout(): timer ids exhausted"))?;
        tracing::trace!(target: "scripting", "Scheduled timer {} in {:?}", id, delay);
        Ok(id)
    };

    let function = Function::new(ctx.clone(), set_timeout)?.with_name("setTimeout")?;
    ctx.globals().set("setTimeout", function)
}
