//! Route tables: the monolingual base table, its multilingual transform and
//! the compiled matcher.
//!
//! - `rule`: Rules and their query templates
//! - `pattern`: Typed prefix/head/rest view of a pattern
//! - `transformer`: Language prefix injection and slug alternation
//! - `table`: Compiled first-match table
//! - `standard`: Default base table for hosts without their own
//! - `validator`: Checks run before a rebuild

mod pattern;
mod rule;
mod standard;
mod table;
mod transformer;
mod validator;

pub use pattern::{PatternHead, RoutePattern};
pub use rule::{QueryVars, RouteRule, RouteTarget};
pub use standard::{RouteProvider, StandardRoutes};
pub use table::{RouteMatch, RouteTable};
pub use transformer::RouteTableTransformer;
pub use validator::{RouteTableValidator, ValidationReport};
