//! Exposes native functions as callable script functions
//!
//! Arguments are checked strictly: a wrong argument count throws a
//! `SyntaxError` and an argument that cannot be converted throws a
//! `TypeError`, both prefixed with the bound name.

use rquickjs::function::Rest;
use rquickjs::{Ctx, Exception, Function, Value};

use crate::marshal::{FromScript, IntoScript};

/// A native callable whose parameters and return value can cross into the
/// script. `Args` is the tuple of parameter types and only exists to keep the
/// per-arity implementations apart.
pub trait NativeFunction<'js, Args>: 'static {
    /// Number of arguments the script must pass
    const ARITY: usize;

    fn call_with(&self, ctx: &Ctx<'js>, name: &str, args: &[Value<'js>]) -> rquickjs::Result<Value<'js>>;
}

fn convert_arg<'js, T: FromScript<'js>>(
    ctx: &Ctx<'js>,
    name: &str,
    args: &[Value<'js>],
    index: usize,
) -> rquickjs::Result<T> {
    T::from_script(ctx, &args[index]).ok_or_else(|| {
        Exception::throw_type(
            ctx,
            &format!(
                "{name}(): The argument{index} cannot be converted to {}",
                T::TYPE_NAME
            ),
        )
    })
}

macro_rules! impl_native_function {
    ($arity:literal; $($arg:ident : $idx:tt),*) => {
        impl<'js, Func, Ret, $($arg,)*> NativeFunction<'js, ($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret + 'static,
            Ret: IntoScript<'js>,
            $($arg: FromScript<'js>,)*
        {
            const ARITY: usize = $arity;

            #[allow(unused_variables)]
            fn call_with(&self, ctx: &Ctx<'js>, name: &str, args: &[Value<'js>]) -> rquickjs::Result<Value<'js>> {
                let result = (self)($(convert_arg::<$arg>(ctx, name, args, $idx)?),*);
                result.into_script(ctx)
            }
        }
    };
}

impl_native_function!(0;);
impl_native_function!(1; A: 0);
impl_native_function!(2; A: 0, B: 1);
impl_native_function!(3; A: 0, B: 1, C: 2);
impl_native_function!(4; A: 0, B: 1, C: 2, D: 3);
impl_native_function!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_native_function!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

/// Wrap `native` in a script function named `name`.
///
/// The wrapper enforces the arity before converting anything, so a native
/// function never runs with missing arguments.
pub fn bind_function<'js, F, Args>(ctx: &Ctx<'js>, name: &str, native: F) -> rquickjs::Result<Function<'js>>
where
    F: NativeFunction<'js, Args>,
{
    let bound_name = name.to_string();
    let wrapper = move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<Value<'js>> {
        let args = args.0;
        if args.len() != F::ARITY {
            return Err(Exception::throw_syntax(
                &ctx,
                &format!(
                    "{bound_name}(): Expected {} argument, but received {}",
                    F::ARITY,
                    args.len()
                ),
            ));
        }
        native.call_with(&ctx, &bound_name, &args)
    };
    Function::new(ctx.clone(), wrapper)?.with_name(name)
}
