use rquickjs::{Ctx, Exception, Object, Value};

use crate::binder::{bind_function, NativeFunction};
use crate::marshal::{to_native, FromScript, IntoScript};

/// Owning handle to a script value together with the context it lives in.
///
/// Dropping the handle releases its reference. It is deliberately not
/// `Clone`; use [`ScriptObject::take`] to move the value out.
pub struct ScriptObject<'js> {
    ctx: Ctx<'js>,
    value: Value<'js>,
}

impl<'js> ScriptObject<'js> {
    /// A fresh empty object
    pub fn new(ctx: &Ctx<'js>) -> rquickjs::Result<Self> {
        let object = Object::new(ctx.clone())?;
        Ok(Self::from_value(ctx, object.into_value()))
    }

    pub fn from_value(ctx: &Ctx<'js>, value: Value<'js>) -> Self {
        Self {
            ctx: ctx.clone(),
            value,
        }
    }

    /// The context's global object
    pub fn global(ctx: &Ctx<'js>) -> Self {
        Self::from_value(ctx, ctx.globals().into_value())
    }

    pub fn ctx(&self) -> &Ctx<'js> {
        &self.ctx
    }

    pub fn value(&self) -> &Value<'js> {
        &self.value
    }

    pub fn into_value(self) -> Value<'js> {
        self.value
    }

    pub fn is_undefined(&self) -> bool {
        self.value.is_undefined()
    }

    /// Move the held value into a new handle, leaving `undefined` behind
    pub fn take(&mut self) -> Self {
        let value = std::mem::replace(&mut self.value, Value::new_undefined(self.ctx.clone()));
        Self::from_value(&self.ctx, value)
    }

    fn as_object(&self) -> rquickjs::Result<&Object<'js>> {
        self.value
            .as_object()
            .ok_or_else(|| Exception::throw_type(&self.ctx, "cannot access properties of a non-object"))
    }

    pub fn set_property<T: IntoScript<'js>>(&self, name: &str, value: T) -> rquickjs::Result<()> {
        let value = value.into_script(&self.ctx)?;
        self.as_object()?.set(name, value)
    }

    /// Read a property, falling back to the type's default when it is
    /// missing or cannot be converted.
    pub fn get_property<T: FromScript<'js> + Default>(&self, name: &str) -> T {
        match self.value.as_object().map(|object| object.get::<_, Value<'js>>(name)) {
            Some(Ok(value)) => to_native(&self.ctx, &value),
            Some(Err(_)) => {
                let _ = self.ctx.catch();
                T::default()
            }
            None => T::default(),
        }
    }

    /// Install `native` as a function property. Returns `self` so bindings
    /// can be chained.
    pub fn bind<F, Args>(&self, name: &str, native: F) -> rquickjs::Result<&Self>
    where
        F: NativeFunction<'js, Args>,
    {
        let function = bind_function(&self.ctx, name, native)?;
        self.as_object()?.set(name, function)?;
        Ok(self)
    }
}

impl<'js> IntoScript<'js> for ScriptObject<'js> {
    fn into_script(self, _ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        Ok(self.value)
    }
}

impl std::fmt::Debug for ScriptObject<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptObject")
            .field("type", &self.value.type_of())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rquickjs::{Context, Runtime};

    fn with_ctx<R>(f: impl FnOnce(Ctx<'_>) -> R) -> R {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();
        context.with(f)
    }

    #[test]
    fn test_properties_round_trip() {
        with_ctx(|ctx| {
            let object = ScriptObject::new(&ctx).unwrap();
            object.set_property("name", "skip").unwrap();
            object.set_property("count", 3i32).unwrap();
            assert_eq!(object.get_property::<String>("name"), "skip");
            assert_eq!(object.get_property::<i32>("count"), 3);
            assert_eq!(object.get_property::<i32>("missing"), 0);
        });
    }

    #[test]
    fn test_take_leaves_undefined() {
        with_ctx(|ctx| {
            let mut object = ScriptObject::new(&ctx).unwrap();
            let moved = object.take();
            assert!(object.is_undefined());
            assert!(!moved.is_undefined());
            assert!(object.set_property("x", 1i32).is_err());
            let _ = ctx.catch();
        });
    }

    #[test]
    fn test_bind_chains_on_global() {
        with_ctx(|ctx| {
            let global = ScriptObject::global(&ctx);
            global
                .bind("_one", || 1i32)
                .unwrap()
                .bind("_neg", |v: i32| -v)
                .unwrap();
            let value: i32 = ctx.eval("_neg(_one())").unwrap();
            assert_eq!(value, -1);
        });
    }
}
