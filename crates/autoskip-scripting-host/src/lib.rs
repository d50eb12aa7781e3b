//! Host runtime for running automation scripts on an embedded QuickJS engine
//!
//! A [`ScriptRuntime`] owns the engine, the base directory scripts are
//! resolved against and the timer queue. Each [`ScriptContext`] created from
//! it is a global scope with `setTimeout` installed; native functions are
//! exposed through [`ScriptObject::bind`] and converted with the traits in
//! [`marshal`].
//!
//! Everything here is single-threaded. Timer callbacks and microtasks run on
//! the thread that calls [`ScriptContext::run_loop`].

pub mod binder;
pub mod context;
pub mod error;
mod event_loop;
pub mod loader;
pub mod marshal;
pub mod runtime;
pub mod timer;
pub mod value;

pub use binder::{bind_function, NativeFunction};
pub use context::{EvalMode, ScriptContext};
pub use error::{HostError, Result, ScriptError};
pub use marshal::{field, to_native, to_script, ByteBuffer, Field, FromScript, Handle, IntoScript, Record};
pub use runtime::ScriptRuntime;
pub use timer::{TimerId, TimerQueue};
pub use value::ScriptObject;

/// Engine types hosts need when writing their own conversions
pub use rquickjs::{Ctx, Value};
