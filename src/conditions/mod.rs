//! condition expression language for profile activation
//!
//! supports:
//! - string, number and boolean literals (`'a'`, `"a"`, `42`, `42.0f`, `true`)
//! - property aliases `${name}`, also inside string literals
//! - arithmetic `+ - * /`, comparisons `== != < <= > >=`, logic `&& ||`
//! - function calls: `length`, `upper`, `lower`, `substring`, `indexOf`,
//!   `contains`, `matches`, `inrange`, `if`, `not`, `exists`, `missing`,
//!   `property`, `toInt`
//!
//! ```ignore
//! let ctx = ActivationContext::new().with_system_properties(props);
//! let mut parser = ConditionParser::new(FunctionRegistry::new(&ctx));
//! let active = parser.parse("${os.name} == 'windows' && inrange(${java.version}, '[17,)')")?;
//! ```

mod convert;
mod error;
mod eval;
mod functions;
mod lexer;
mod parser;
mod types;

pub use convert::{to_boolean, to_double, to_int, to_string};
pub use error::{ConditionError, ConditionResult};
pub use eval::evaluate;
pub use functions::{Builtin, Function, FunctionRegistry};
pub use lexer::{lex, Span, Token, TokenKind};
pub use parser::parse_expression;
pub use types::{BinaryOp, Expr, UnaryOp, Value};

use tracing::debug;

/// parse a condition without evaluating it
pub fn compile(expression: &str) -> ConditionResult<Expr> {
    parse_expression(expression)
}

/// parses and evaluates conditions with one function registry
#[derive(Debug)]
pub struct ConditionParser<'a> {
    functions: FunctionRegistry<'a>,
}

impl<'a> ConditionParser<'a> {
    pub fn new(functions: FunctionRegistry<'a>) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &FunctionRegistry<'a> {
        &self.functions
    }

    /// registry access for installing overrides
    pub fn functions_mut(&mut self) -> &mut FunctionRegistry<'a> {
        &mut self.functions
    }

    /// parse and evaluate `expression`
    pub fn parse(&self, expression: &str) -> ConditionResult<Value> {
        let expr = parse_expression(expression)?;
        let value = evaluate(&expr, &self.functions)?;
        debug!(expression, value = %value, "evaluated condition");
        Ok(value)
    }
}
