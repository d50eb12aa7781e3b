use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use rquickjs::module::Declared;
use rquickjs::promise::PromiseState;
use rquickjs::{Ctx, Module, Persistent, Promise, Value};
use tracing::debug;

use crate::error::{caught, Result};
use crate::loader::{declare_module, read_script, ImportMeta};
use crate::marshal::{to_native, FromScript};
use crate::runtime::ScriptRuntime;
use crate::timer::install_set_timeout;
use crate::value::ScriptObject;

/// How source text is compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Classic script evaluated in the global scope
    Global,
    /// ES module, linked and evaluated
    Module,
    /// ES module, compiled and declared but not evaluated
    ModuleDeclare,
}

type LoadObserver = Box<dyn Fn(&str)>;

/// Per-context bookkeeping the loader and event loop need
#[derive(Default)]
pub(crate) struct ContextState {
    observers: RefCell<Vec<LoadObserver>>,
    /// Evaluation promises of modules still waiting on top-level await
    pub(crate) module_promises: RefCell<Vec<Persistent<Promise<'static>>>>,
}

impl ContextState {
    pub fn notify_loaded(&self, name: &str) {
        for observer in self.observers.borrow().iter() {
            observer(name);
        }
    }
}

/// Marks a context as the one currently evaluating code for as long as the
/// guard lives
pub(crate) struct ActiveGuard<'a> {
    runtime: &'a ScriptRuntime,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.runtime.shared().pop_active();
    }
}

/// A global scope inside a [`ScriptRuntime`]: evaluates text and files,
/// exposes the global object and drives the timer loop.
pub struct ScriptContext<'rt> {
    pub(crate) runtime: &'rt ScriptRuntime,
    pub(crate) state: Rc<ContextState>,
    pub(crate) context: rquickjs::Context,
}

impl<'rt> ScriptContext<'rt> {
    pub(crate) fn new(runtime: &'rt ScriptRuntime) -> Result<Self> {
        let context = rquickjs::Context::full(runtime.engine())?;
        let shared = Rc::clone(runtime.shared());
        context.with(|ctx| install_set_timeout(&ctx, shared).map_err(|err| caught(&ctx, err)))?;

        Ok(Self {
            runtime,
            state: Rc::new(ContextState::default()),
            context,
        })
    }

    pub fn runtime(&self) -> &'rt ScriptRuntime {
        self.runtime
    }

    pub(crate) fn activate(&self) -> ActiveGuard<'rt> {
        self.runtime.shared().push_active(Rc::clone(&self.state));
        ActiveGuard {
            runtime: self.runtime,
        }
    }

    /// Register a callback invoked with the normalized path of every script
    /// file this context loads, before the file is read.
    pub fn on_module_loaded(&self, observer: impl Fn(&str) + 'static) {
        self.state.observers.borrow_mut().push(Box::new(observer));
    }

    /// Run `f` with the engine context entered
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(Ctx<'_>) -> R,
    {
        self.context.with(f)
    }

    /// Run `f` against the global object, turning a thrown exception into
    /// [`ScriptError::Exception`](crate::ScriptError::Exception).
    pub fn with_global<F, R>(&self, f: F) -> Result<R>
    where
        F: for<'js> FnOnce(&ScriptObject<'js>) -> rquickjs::Result<R>,
    {
        self.context.with(|ctx| {
            let global = ScriptObject::global(&ctx);
            f(&global).map_err(|err| caught(&ctx, err))
        })
    }

    /// Evaluate a global-scope expression and convert its completion value,
    /// falling back to the default when it cannot be represented as `T`.
    pub fn eval<T>(&self, source: &str) -> Result<T>
    where
        T: for<'js> FromScript<'js> + Default,
    {
        let _active = self.activate();
        self.context.with(|ctx| match ctx.eval::<Value, _>(source) {
            Ok(value) => Ok(to_native(&ctx, &value)),
            Err(err) => Err(caught(&ctx, err)),
        })
    }

    /// Compile and run `source` under `mode`. `label` names the module for
    /// module modes; global scripts are only labelled in the log.
    pub fn eval_text(&self, source: &str, label: &str, mode: EvalMode) -> Result<()> {
        let _active = self.activate();
        debug!(target: "scripting", "Evaluating {} as {:?}", label, mode);
        self.evaluate(label, source.as_bytes().to_vec(), mode, None)
    }

    /// Read a file relative to the base directory and evaluate it. Module
    /// modes set `import.meta.url` and mark the file as the main module.
    pub fn eval_file(&self, path: impl AsRef<Path>, mode: EvalMode) -> Result<()> {
        let _active = self.activate();
        let source = read_script(
            self.runtime.base_dir(),
            path.as_ref(),
            Some(&self.state),
        )?;
        debug!(target: "scripting", "Evaluating {} as {:?}", source.name, mode);

        let meta = ImportMeta {
            url: &source.url,
            main: true,
        };
        self.evaluate(&source.name, source.bytes, mode, Some(meta))
    }

    fn evaluate(&self, label: &str, bytes: Vec<u8>, mode: EvalMode, meta: Option<ImportMeta<'_>>) -> Result<()> {
        self.context.with(|ctx| {
            let outcome = match mode {
                EvalMode::Global => ctx.eval::<(), _>(bytes),
                EvalMode::Module => declare_module(&ctx, label, bytes, meta)
                    .and_then(|module| self.evaluate_module(&ctx, module)),
                EvalMode::ModuleDeclare => declare_module(&ctx, label, bytes, meta).map(|_| ()),
            };
            outcome.map_err(|err| caught(&ctx, err))
        })
    }

    fn evaluate_module<'js>(&self, ctx: &Ctx<'js>, module: Module<'js, Declared>) -> rquickjs::Result<()> {
        let (_module, promise) = module.eval()?;
        match promise.state() {
            PromiseState::Pending => {
                // Top-level await: settled later by the event loop
                self.state
                    .module_promises
                    .borrow_mut()
                    .push(Persistent::save(ctx, promise));
                Ok(())
            }
            PromiseState::Resolved => Ok(()),
            PromiseState::Rejected => rejection(&promise),
        }
    }

    /// Report the first rejected module evaluation, keeping the ones that are
    /// still pending.
    pub(crate) fn check_module_promises(&self) -> Result<()> {
        let tracked = std::mem::take(&mut *self.state.module_promises.borrow_mut());
        if tracked.is_empty() {
            return Ok(());
        }

        self.context.with(|ctx| {
            let mut pending = Vec::with_capacity(tracked.len());
            let mut outcome = Ok(());
            for saved in tracked {
                if outcome.is_err() {
                    break;
                }
                let promise = match saved.clone().restore(&ctx) {
                    Ok(promise) => promise,
                    Err(err) => {
                        outcome = Err(caught(&ctx, err));
                        break;
                    }
                };
                match promise.state() {
                    PromiseState::Pending => pending.push(saved),
                    PromiseState::Resolved => {}
                    PromiseState::Rejected => outcome = rejection(&promise).map_err(|err| caught(&ctx, err)),
                }
            }
            self.state.module_promises.borrow_mut().extend(pending);
            outcome
        })
    }
}

impl Drop for ScriptContext<'_> {
    fn drop(&mut self) {
        self.state.module_promises.borrow_mut().clear();
    }
}

fn rejection<'js>(promise: &Promise<'js>) -> rquickjs::Result<()> {
    match promise.result::<Value<'js>>() {
        Some(Err(err)) => Err(err),
        _ => Ok(()),
    }
}
