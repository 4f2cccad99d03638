pub mod errors;
pub mod expression;
pub mod term;

pub use errors::ExpressionError;
pub use expression::{AndGroup, Expression, OrTerm};
pub use term::{Comparator, Term};
