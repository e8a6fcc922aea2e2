//! sqltree: SQL statements as typed trees
//!
//! Build expressions and statements through factory functions and fluent
//! combinators, then render them into dialect-configurable SQL text together
//! with the ordered list of bind parameters.
//!
//! ```rust,ignore
//! use sqltree::ast::*;
//!
//! let t = Table::named("t");
//! let stmt: Stmt = select().from(&t).with_where(t.col("a").eq(5)).into();
//! assert_eq!(render(&stmt), "select * from t a where a.a = 5");
//! ```

pub mod ast;
pub mod error;
pub mod telemetry;

pub use error::{Error, Result};
