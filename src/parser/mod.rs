pub mod astnode;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod scanner;

pub use parser::parse;
