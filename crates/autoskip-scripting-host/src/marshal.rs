//! Conversions between native values and script values
//!
//! [`FromScript`] reports failure with `None` so callers can choose between
//! the lenient path ([`to_native`], falls back to `Default`) and the strict
//! path used by the binder (throws a `TypeError` naming the argument).

use rquickjs::{Array, ArrayBuffer, BigInt, Coerced, Ctx, Exception, FromJs, IntoJs, Object, Type, Value};

use crate::error::HostError;

/// A native value that can be read out of a script value
pub trait FromScript<'js>: Sized {
    /// Type name used in argument conversion errors
    const TYPE_NAME: &'static str;

    fn from_script(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self>;
}

/// A native value that can be handed to a script
pub trait IntoScript<'js> {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>>;
}

/// Convert a script value, falling back to the type's default when the
/// value cannot be represented.
pub fn to_native<'js, T>(ctx: &Ctx<'js>, value: &Value<'js>) -> T
where
    T: FromScript<'js> + Default,
{
    T::from_script(ctx, value).unwrap_or_default()
}

/// Convert a native value into a fresh script value owned by the caller
pub fn to_script<'js, T>(ctx: &Ctx<'js>, value: T) -> rquickjs::Result<Value<'js>>
where
    T: IntoScript<'js>,
{
    value.into_script(ctx)
}

/// An opaque OS handle (window, device context, pixel buffer).
///
/// Handles travel through scripts as BigInt so the full pointer width
/// survives the round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Handle(pub u64);

impl Handle {
    pub const NULL: Handle = Handle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn as_ptr<T>(self) -> *mut T {
        self.0 as usize as *mut T
    }

    pub fn from_ptr<T>(ptr: *mut T) -> Self {
        Handle(ptr as usize as u64)
    }
}

/// Raw bytes exchanged as an `ArrayBuffer`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer(pub Vec<u8>);

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// A named member of a [`Record`]
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    pub name: &'static str,
    pub value: T,
}

pub fn field<T>(name: &'static str, value: T) -> Field<T> {
    Field { name, value }
}

/// A tuple of [`Field`]s that becomes a plain object with one property per
/// field, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T>(pub T);

/// Writes a group of fields onto an object
pub trait Fields<'js> {
    fn write_fields(self, ctx: &Ctx<'js>, object: &Object<'js>) -> rquickjs::Result<()>;
}

impl<'js, T: IntoScript<'js>> Fields<'js> for Field<T> {
    fn write_fields(self, ctx: &Ctx<'js>, object: &Object<'js>) -> rquickjs::Result<()> {
        object.set(self.name, self.value.into_script(ctx)?)
    }
}

impl<'js, T: Fields<'js>> IntoScript<'js> for Record<T> {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        let object = Object::new(ctx.clone())?;
        self.0.write_fields(ctx, &object)?;
        object.into_js(ctx)
    }
}

/// Run one of the engine's own coercions (ToInt32, ToNumber, ...). A
/// coercion that throws, such as ToNumber on a Symbol, yields `None` and
/// leaves no exception pending.
fn coerce<'js, T>(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<T>
where
    Coerced<T>: FromJs<'js>,
{
    match Coerced::<T>::from_js(ctx, value.clone()) {
        Ok(coerced) => Some(coerced.0),
        Err(_) => {
            let _ = ctx.catch();
            None
        }
    }
}

/// Signed 64-bit view of a BigInt, wrapped modulo 2^64
fn big_int_bits<'js>(value: &Value<'js>) -> Option<i64> {
    value.as_big_int().and_then(|big| big.clone().to_i64().ok())
}

/// ToInt32. BigInts, which ToNumber refuses, keep their low 32 bits.
fn int32_of<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<i32> {
    if value.type_of() == Type::BigInt {
        return big_int_bits(value).map(|bits| bits as i32);
    }
    coerce::<i32>(ctx, value)
}

/// Numbers and BigInts alike wrap modulo 2^64
fn int64_of<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<i64> {
    coerce::<i64>(ctx, value)
}

macro_rules! impl_narrow_int {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl<'js> FromScript<'js> for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_script(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self> {
                    int32_of(ctx, value).map(|bits| bits as $ty)
                }
            }
        )*
    };
}

impl_narrow_int! {
    i8 => "Int8",
    u8 => "Uint8",
    i16 => "Int16",
    u16 => "Uint16",
    i32 => "Int32",
    u32 => "Uint32",
}

macro_rules! impl_small_int_into {
    ($($ty:ty),*) => {
        $(
            impl<'js> IntoScript<'js> for $ty {
                fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
                    Ok(Value::new_int(ctx.clone(), i32::from(self)))
                }
            }
        )*
    };
}

impl_small_int_into!(i8, u8, i16, u16, i32);

impl<'js> IntoScript<'js> for u32 {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        Ok(match i32::try_from(self) {
            Ok(small) => Value::new_int(ctx.clone(), small),
            Err(_) => Value::new_float(ctx.clone(), f64::from(self)),
        })
    }
}

impl<'js> FromScript<'js> for i64 {
    const TYPE_NAME: &'static str = "Int64";

    fn from_script(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self> {
        int64_of(ctx, value)
    }
}

impl<'js> IntoScript<'js> for i64 {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        BigInt::from_i64(ctx.clone(), self)?.into_js(ctx)
    }
}

impl<'js> FromScript<'js> for u64 {
    const TYPE_NAME: &'static str = "Uint64";

    fn from_script(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self> {
        int64_of(ctx, value).map(|bits| bits as u64)
    }
}

impl<'js> IntoScript<'js> for u64 {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        BigInt::from_u64(ctx.clone(), self)?.into_js(ctx)
    }
}

impl<'js> FromScript<'js> for Handle {
    const TYPE_NAME: &'static str = "Handle";

    fn from_script(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self> {
        u64::from_script(ctx, value).map(Handle)
    }
}

impl<'js> IntoScript<'js> for Handle {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        self.0.into_script(ctx)
    }
}

impl<'js> FromScript<'js> for f64 {
    const TYPE_NAME: &'static str = "Number";

    fn from_script(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self> {
        if value.type_of() == Type::BigInt {
            return big_int_bits(value).map(|bits| bits as f64);
        }
        coerce::<f64>(ctx, value)
    }
}

impl<'js> IntoScript<'js> for f64 {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        Ok(Value::new_float(ctx.clone(), self))
    }
}

impl<'js> FromScript<'js> for bool {
    const TYPE_NAME: &'static str = "Boolean";

    fn from_script(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self> {
        coerce::<bool>(ctx, value)
    }
}

impl<'js> IntoScript<'js> for bool {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        Ok(Value::new_bool(ctx.clone(), self))
    }
}

impl<'js> FromScript<'js> for String {
    const TYPE_NAME: &'static str = "String";

    fn from_script(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self> {
        match Coerced::<String>::from_js(ctx, value.clone()) {
            Ok(text) => Some(text.0),
            Err(_) => {
                let _ = ctx.catch();
                None
            }
        }
    }
}

impl<'js> IntoScript<'js> for String {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        self.as_str().into_script(ctx)
    }
}

impl<'js> IntoScript<'js> for &str {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        rquickjs::String::from_str(ctx.clone(), self)?.into_js(ctx)
    }
}

impl<'js> FromScript<'js> for ByteBuffer {
    const TYPE_NAME: &'static str = "ArrayBuffer";

    fn from_script(_ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self> {
        let buffer = ArrayBuffer::from_object(value.as_object()?.clone())?;
        buffer.as_bytes().map(|bytes| ByteBuffer(bytes.to_vec()))
    }
}

impl<'js> IntoScript<'js> for ByteBuffer {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        // The engine takes ownership of the allocation and frees it when the
        // buffer is collected.
        ArrayBuffer::new(ctx.clone(), self.0)?.into_js(ctx)
    }
}

impl<'js> FromScript<'js> for Value<'js> {
    const TYPE_NAME: &'static str = "Value";

    fn from_script(_ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self> {
        Some(value.clone())
    }
}

impl<'js> IntoScript<'js> for Value<'js> {
    fn into_script(self, _ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        Ok(self)
    }
}

impl<'js> IntoScript<'js> for () {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        Ok(Value::new_undefined(ctx.clone()))
    }
}

impl<'js, T: FromScript<'js>> FromScript<'js> for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_script(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self> {
        if value.is_undefined() || value.is_null() {
            return Some(None);
        }
        T::from_script(ctx, value).map(Some)
    }
}

impl<'js, T: IntoScript<'js>> IntoScript<'js> for Option<T> {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        match self {
            Some(value) => value.into_script(ctx),
            None => Ok(Value::new_null(ctx.clone())),
        }
    }
}

/// Host functions returning `Err` throw an `Error` carrying the message
impl<'js, T: IntoScript<'js>> IntoScript<'js> for Result<T, HostError> {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        match self {
            Ok(value) => value.into_script(ctx),
            Err(err) => Err(Exception::throw_message(ctx, &err.0)),
        }
    }
}

macro_rules! impl_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<'js, $($name: FromScript<'js>),+> FromScript<'js> for ($($name,)+) {
            const TYPE_NAME: &'static str = "Array";

            fn from_script(ctx: &Ctx<'js>, value: &Value<'js>) -> Option<Self> {
                let object = value.as_object()?;
                Some(($(
                    $name::from_script(ctx, &object.get::<u32, Value<'js>>($idx).ok()?)?,
                )+))
            }
        }

        impl<'js, $($name: IntoScript<'js>),+> IntoScript<'js> for ($($name,)+) {
            fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
                let array = Array::new(ctx.clone())?;
                $(array.set($idx, self.$idx.into_script(ctx)?)?;)+
                array.into_js(ctx)
            }
        }

        impl<'js, $($name: IntoScript<'js>),+> Fields<'js> for ($(Field<$name>,)+) {
            fn write_fields(self, ctx: &Ctx<'js>, object: &Object<'js>) -> rquickjs::Result<()> {
                $(self.$idx.write_fields(ctx, object)?;)+
                Ok(())
            }
        }
    };
}

impl_tuple!(A: 0);
impl_tuple!(A: 0, B: 1);
impl_tuple!(A: 0, B: 1, C: 2);
impl_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
