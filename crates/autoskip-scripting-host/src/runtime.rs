use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::context::{ContextState, ScriptContext};
use crate::error::{Result, ScriptError};
use crate::loader::{normalize_path, BaseDirLoader, BaseDirResolver};
use crate::timer::{ScriptCallback, TimerQueue};

/// State shared between the runtime, its contexts and the module loader
pub(crate) struct RuntimeShared {
    pub base_dir: PathBuf,
    pub timers: RefCell<TimerQueue<ScriptCallback>>,
    /// Contexts currently evaluating code, innermost last. The module
    /// loader reports loads to the innermost one.
    active: RefCell<Vec<Rc<ContextState>>>,
}

impl RuntimeShared {
    pub fn active_context(&self) -> Option<Rc<ContextState>> {
        self.active.borrow().last().cloned()
    }

    pub fn push_active(&self, state: Rc<ContextState>) {
        self.active.borrow_mut().push(state);
    }

    pub fn pop_active(&self) {
        self.active.borrow_mut().pop();
    }
}

/// One engine instance: owns the base directory used to resolve scripts and
/// the timer queue shared by every context created from it.
pub struct ScriptRuntime {
    shared: Rc<RuntimeShared>,
    runtime: rquickjs::Runtime,
}

impl ScriptRuntime {
    /// Create a runtime resolving scripts under `base_dir`. Relative paths
    /// are taken from the current working directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let absolute = std::path::absolute(base_dir).map_err(|source| ScriptError::Io {
            path: base_dir.display().to_string(),
            source,
        })?;
        let base_dir = normalize_path(&absolute);

        let runtime = rquickjs::Runtime::new()?;
        let shared = Rc::new(RuntimeShared {
            base_dir,
            timers: RefCell::new(TimerQueue::new()),
            active: RefCell::new(Vec::new()),
        });
        runtime.set_loader(
            BaseDirResolver::new(Rc::clone(&shared)),
            BaseDirLoader::new(Rc::clone(&shared)),
        );

        debug!(target: "scripting", "Created script runtime at {}", shared.base_dir.display());
        Ok(Self { shared, runtime })
    }

    /// Create a runtime rooted at the current working directory
    pub fn in_current_dir() -> Result<Self> {
        Self::new(".")
    }

    pub fn base_dir(&self) -> &Path {
        &self.shared.base_dir
    }

    /// Number of timers waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.shared.timers.borrow().len()
    }

    /// Cap the engine heap at `bytes`; 0 removes the cap. Allocations past
    /// it throw an out-of-memory error inside the script. Buffers handed
    /// over as [`ByteBuffer`](crate::ByteBuffer) keep their storage outside
    /// this heap.
    pub fn set_memory_limit(&self, bytes: usize) {
        self.runtime.set_memory_limit(bytes);
    }

    /// Bytes currently allocated on the engine heap
    pub fn memory_used(&self) -> u64 {
        self.runtime.memory_usage().memory_used_size.max(0) as u64
    }

    /// Run the cycle collector now
    pub fn run_gc(&self) {
        self.runtime.run_gc();
    }

    /// Create a context with `setTimeout` installed
    pub fn create_context(&self) -> Result<ScriptContext<'_>> {
        ScriptContext::new(self)
    }

    pub(crate) fn shared(&self) -> &Rc<RuntimeShared> {
        &self.shared
    }

    pub(crate) fn engine(&self) -> &rquickjs::Runtime {
        &self.runtime
    }
}

impl Drop for ScriptRuntime {
    fn drop(&mut self) {
        // Pending callbacks hold engine references and have to be released
        // before the engine itself goes away.
        let pending = self.shared.timers.borrow().len();
        if pending > 0 {
            debug!(target: "scripting", "Dropping {} pending timers", pending);
        }
        self.shared.timers.borrow_mut().clear();
    }
}
