pub mod environment;
pub mod functions;
pub mod hash_key;
pub mod native_function;
pub mod values;

pub use environment::Environment;
pub use functions::{Function, HashObject};
pub use native_function::NativeFunction;
pub use values::{type_of, Type, Value};
