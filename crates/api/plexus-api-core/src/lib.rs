//! plexus-api-core: values and the function capability (core, engine-agnostic)

pub mod coercion;
pub mod error;
pub mod function;
pub mod json;
pub mod repository;
pub mod value;

pub use error::{FunctionError, LookupError};
pub use function::{Argument, CallContext, Function, NativeFunction};
pub use repository::{FunctionLibrary, FunctionRepository, CORE_NAMESPACE};
pub use value::{PortRange, Value, ValueType};
