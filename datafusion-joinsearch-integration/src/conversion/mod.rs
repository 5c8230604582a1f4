/// Conversion of datafusion expressions and table references into join search input.
mod expr;
pub use expr::*;
mod operand;
pub use operand::*;
