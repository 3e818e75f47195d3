use anyhow::{anyhow, Context};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use crate::dispatcher::ResponseFn;
use crate::response::HandlerOutput;

/// Conversion from the ordered captured values of a route into typed parameters.
///
/// Implemented for `()` (ignores every value) and for tuples of up to four
/// `FromStr` types. Values beyond the tuple's arity are ignored; missing
/// values are an error.
pub trait FromParams: Sized {
    fn from_params(values: &[String]) -> anyhow::Result<Self>;
}

impl FromParams for () {
    fn from_params(_values: &[String]) -> anyhow::Result<Self> {
        Ok(())
    }
}

/// Parse the value at `index` as `T`.
pub fn parse_param<T>(values: &[String], index: usize) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = values
        .get(index)
        .ok_or_else(|| anyhow!("missing path parameter #{index}"))?;
    raw.parse::<T>()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| {
            format!(
                "path parameter #{index} '{raw}' is not a valid {}",
                std::any::type_name::<T>()
            )
        })
}

macro_rules! impl_from_params {
    ($($idx:tt => $ty:ident),+) => {
        impl<$($ty),+> FromParams for ($($ty,)+)
        where
            $($ty: FromStr, $ty::Err: Display,)+
        {
            fn from_params(values: &[String]) -> anyhow::Result<Self> {
                Ok(($(parse_param::<$ty>(values, $idx)?,)+))
            }
        }
    };
}

impl_from_params!(0 => A);
impl_from_params!(0 => A, 1 => B);
impl_from_params!(0 => A, 1 => B, 2 => C);
impl_from_params!(0 => A, 1 => B, 2 => C, 3 => D);

/// Coerce captured values into `P`.
pub fn params<P: FromParams>(values: &[String]) -> anyhow::Result<P> {
    P::from_params(values)
}

/// Wrap a typed function as a [`ResponseFn`].
///
/// Coercion failures are returned as handler errors before `f` runs.
///
/// ```rust
/// use waypoint::response::{HandlerOutput, HandlerResponse};
/// use waypoint::typed;
///
/// let f = typed::response(|(id,): (u64,)| {
///     Ok(HandlerResponse::ok_json(serde_json::json!({ "id": id })).into())
/// });
/// assert!(f(&["42".to_string()]).is_ok());
/// assert!(f(&["abc".to_string()]).is_err());
/// ```
pub fn response<P, F>(f: F) -> ResponseFn
where
    P: FromParams + 'static,
    F: Fn(P) -> anyhow::Result<HandlerOutput> + Send + Sync + 'static,
{
    Arc::new(move |values: &[String]| f(P::from_params(values)?))
}
