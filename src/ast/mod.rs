//! SQL Abstract Syntax Tree (AST) module
//!
//! This module provides a type-safe representation of SQL statements that can be
//! constructed programmatically and rendered to SQL strings.
//!
//! # Architecture
//!
//! The AST is built from several components:
//!
//! - [`literal`]: constant values and host-value conversion
//! - [`expr`]: SQL expressions (columns, operators, predicates, functions) and
//!   the precedence-preserving combinators
//! - [`table`]: table references and joins
//! - [`window`]: window specifications and frames
//! - [`cte`]: Common Table Expressions (WITH clauses)
//! - [`stmt`]: SQL statements (SELECT, UNION / INTERSECT, UPDATE)
//! - [`types`]: SQL type representations
//! - [`params`]: bind placeholders and their collection
//! - [`alias`]: alias allocation for one render pass
//! - [`config`]: render configuration
//! - [`render`]: SQL string generation
//!
//! # Example
//!
//! ```rust,ignore
//! use sqltree::ast::*;
//!
//! let users = Table::named("users");
//! let id = Placeholder::new(1);
//! let stmt = select()
//!     .column(users.col("name"))
//!     .from(&users)
//!     .with_where(users.col("id").eq(&id));
//!
//! let sql = render(&stmt.into());
//! // select a.name from users a where a.id = ?
//! ```

mod alias;
mod config;
mod cte;
mod expr;
mod literal;
mod node;
mod params;
mod render;
mod stmt;
mod table;
mod types;
mod window;

// Re-export all public types
pub use alias::*;
pub use config::*;
pub use cte::*;
pub use expr::*;
pub use literal::*;
pub use node::*;
pub use params::*;
pub use render::*;
pub use stmt::*;
pub use table::*;
pub use types::*;
pub use window::*;

#[cfg(test)]
mod tests;
