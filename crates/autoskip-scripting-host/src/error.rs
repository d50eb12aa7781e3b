use rquickjs::{Coerced, Ctx, FromJs, Value};
use thiserror::Error;

/// Failures surfaced by the scripting host to native callers
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A script file could not be opened or read. Raised before any script
    /// code runs, so it never carries a traceback.
    #[error("Failed to open file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An uncaught script exception, already formatted with its traceback
    #[error("{0}")]
    Exception(String),

    /// The engine itself failed (allocation, runtime creation, conversion)
    #[error("QuickJS: {0}")]
    Engine(#[from] rquickjs::Error),
}

impl ScriptError {
    /// Whether this error came from a thrown script value
    pub fn is_exception(&self) -> bool {
        matches!(self, ScriptError::Exception(_))
    }
}

pub type Result<T> = std::result::Result<T, ScriptError>;

/// Error returned by host functions that want to throw into the script
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<std::io::Error> for HostError {
    fn from(err: std::io::Error) -> Self {
        Self(err.to_string())
    }
}

/// Build the diagnostic for a thrown value: `String(exception)` followed by
/// the `stack` property when the exception has one.
pub(crate) fn describe_exception<'js>(ctx: &Ctx<'js>, exception: Value<'js>) -> String {
    let mut message = match Coerced::<String>::from_js(ctx, exception.clone()) {
        Ok(text) => text.0,
        Err(_) => {
            // Symbols and similar throw on ToString; drop that secondary error
            let _ = ctx.catch();
            String::from("<unprintable exception>")
        }
    };

    if let Some(object) = exception.as_object() {
        if let Ok(stack) = object.get::<_, Value>("stack") {
            if !stack.is_undefined() {
                if let Ok(stack) = Coerced::<String>::from_js(ctx, stack) {
                    message.push_str("\nTraceback:\n");
                    message.push_str(&stack.0);
                } else {
                    let _ = ctx.catch();
                }
            }
        }
    }

    message
}

/// Convert an engine error into a [`ScriptError`], taking the pending
/// exception out of the context when there is one.
pub(crate) fn caught<'js>(ctx: &Ctx<'js>, error: rquickjs::Error) -> ScriptError {
    match error {
        rquickjs::Error::Exception => ScriptError::Exception(describe_exception(ctx, ctx.catch())),
        other => ScriptError::Engine(other),
    }
}
