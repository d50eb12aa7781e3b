//! Script file lookup and ES module loading relative to the base directory

use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use rquickjs::loader::{Loader, Resolver};
use rquickjs::module::Declared;
use rquickjs::{Ctx, Module};
use tracing::debug;

use crate::context::ContextState;
use crate::error::{Result, ScriptError};
use crate::runtime::RuntimeShared;

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component where one exists. Nothing touches the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Express `path` relative to `base`, both already normalized. Paths outside
/// `base` come back with leading `..` segments.
pub fn relative_to(base: &Path, path: &Path) -> PathBuf {
    if let Ok(inside) = path.strip_prefix(base) {
        return inside.to_path_buf();
    }

    let base_parts: Vec<_> = base.components().collect();
    let path_parts: Vec<_> = path.components().collect();
    let common = base_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();

    // Different roots or prefixes (another drive on Windows): keep it as is
    if common == 0 && path.has_root() {
        return path.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }
    relative
}

/// Render a path with `/` separators regardless of platform
pub fn generic_string(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::RootDir => None,
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect();
    let joined = parts.join("/");
    if path.has_root() && !matches!(path.components().next(), Some(Component::Prefix(_))) {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Name a script the way the engine sees it: `path` (relative to the base
/// directory, or absolute) normalized and made relative to `base_dir`.
pub fn script_name(base_dir: &Path, path: &Path) -> String {
    let full = normalize_path(&base_dir.join(path));
    generic_string(&relative_to(base_dir, &full))
}

/// Resolve an import specifier against the importing module's name
pub fn resolve_specifier(base_dir: &Path, importer: &str, specifier: &str) -> String {
    let importer_dir = Path::new(importer).parent().unwrap_or_else(|| Path::new(""));
    script_name(base_dir, &importer_dir.join(specifier))
}

/// A script read from disk
#[derive(Debug)]
pub(crate) struct ScriptSource {
    /// Normalized name relative to the base directory
    pub name: String,
    /// `file://` URL of the absolute path
    pub url: String,
    pub bytes: Vec<u8>,
}

/// Values placed on a module's `import.meta`
#[derive(Debug, Clone, Copy)]
pub(crate) struct ImportMeta<'a> {
    pub url: &'a str,
    /// True only for the module a host evaluated directly
    pub main: bool,
}

/// Compile `bytes` as module `name` and fill in its `import.meta` object.
/// The source text is left untouched.
pub(crate) fn declare_module<'js>(
    ctx: &Ctx<'js>,
    name: &str,
    bytes: Vec<u8>,
    meta: Option<ImportMeta<'_>>,
) -> rquickjs::Result<Module<'js, Declared>> {
    let module = Module::declare(ctx.clone(), name, bytes)?;
    if let Some(meta) = meta {
        let object = module.meta()?;
        object.set("url", meta.url)?;
        object.set("main", meta.main)?;
    }
    Ok(module)
}

/// Normalize `path`, tell the context's observers about it, then read it
pub(crate) fn read_script(base_dir: &Path, path: &Path, state: Option<&ContextState>) -> Result<ScriptSource> {
    let name = script_name(base_dir, path);
    if let Some(state) = state {
        state.notify_loaded(&name);
    }

    let full = normalize_path(&base_dir.join(&name));
    let bytes = std::fs::read(&full).map_err(|source| ScriptError::Io {
        path: name.clone(),
        source,
    })?;
    debug!(target: "scripting", "Read {} ({} bytes)", name, bytes.len());

    let generic = generic_string(&full);
    let url = if generic.starts_with('/') {
        format!("file://{generic}")
    } else {
        format!("file:///{generic}")
    };
    Ok(ScriptSource { name, url, bytes })
}

/// Resolves specifiers relative to the importing module inside the base
/// directory
pub(crate) struct BaseDirResolver {
    shared: Rc<RuntimeShared>,
}

impl BaseDirResolver {
    pub fn new(shared: Rc<RuntimeShared>) -> Self {
        Self { shared }
    }
}

impl Resolver for BaseDirResolver {
    fn resolve<'js>(&mut self, _ctx: &Ctx<'js>, base: &str, name: &str) -> rquickjs::Result<String> {
        Ok(resolve_specifier(&self.shared.base_dir, base, name))
    }
}

/// Loads resolved modules from the base directory, declaring them without
/// evaluating so the engine can link them first
pub(crate) struct BaseDirLoader {
    shared: Rc<RuntimeShared>,
}

impl BaseDirLoader {
    pub fn new(shared: Rc<RuntimeShared>) -> Self {
        Self { shared }
    }
}

impl Loader for BaseDirLoader {
    fn load<'js>(&mut self, ctx: &Ctx<'js>, name: &str) -> rquickjs::Result<Module<'js, Declared>> {
        let active = self.shared.active_context();
        let source = read_script(&self.shared.base_dir, Path::new(name), active.as_deref())
            .map_err(|err| rquickjs::Error::new_loading_message(name, err.to_string()))?;
        let ScriptSource { name, url, bytes } = source;
        declare_module(ctx, &name, bytes, Some(ImportMeta { url: &url, main: false }))
    }
}
