use std::thread;
use std::time::Instant;

use tracing::trace;

use crate::context::ScriptContext;
use crate::error::{caught, describe_exception, Result, ScriptError};
use crate::timer::{ScriptCallback, TimeoutTimer};

impl ScriptContext<'_> {
    /// Run until no microtasks and no timers remain.
    ///
    /// Each iteration drains the microtask queue, then fires the earliest
    /// timer if it is due or sleeps until it is. The first uncaught exception
    /// from a microtask or timer callback stops the loop and is returned;
    /// timers still queued stay queued.
    pub fn run_loop(&self) -> Result<()> {
        let _active = self.activate();
        loop {
            self.drain_jobs()?;
            self.check_module_promises()?;

            let next = self.runtime.shared().timers.borrow().next_deadline();
            let Some(deadline) = next else {
                return Ok(());
            };

            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
                continue;
            }

            // Popped before the call so the callback may schedule new timers
            let due = self.runtime.shared().timers.borrow_mut().pop_due(now);
            if let Some(timer) = due {
                self.fire(timer)?;
            }
        }
    }

    /// Run every pending microtask
    pub fn drain_jobs(&self) -> Result<()> {
        loop {
            match self.runtime.engine().execute_pending_job() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(job) => {
                    let message = job.0.with(|ctx| describe_exception(&ctx, ctx.catch()));
                    return Err(ScriptError::Exception(message));
                }
            }
        }
    }

    fn fire(&self, timer: TimeoutTimer<ScriptCallback>) -> Result<()> {
        trace!(target: "scripting", "Firing timer {}", timer.id);
        self.context.with(|ctx| {
            let outcome = timer
                .callback
                .restore(&ctx)
                .and_then(|callback| callback.call::<_, ()>(()));
            outcome.map_err(|err| caught(&ctx, err))
        })
    }
}
