//! Bounded page windows over relational queries.
//!
//! A [`Paginator`] applies ordering, limit and offset to a caller-supplied query, runs
//! the bounded fetch and the total count concurrently and folds both into a
//! [`PageResult`].
//!
//! ```ignore
//! let mut books = Vec::new();
//! let page = page_window::paginate(
//!     query,
//!     &mut books,
//!     [page_window::with_page(2), page_window::with_order("title DESC")],
//! )?;
//! assert!(page.max_page >= 1);
//! ```

#[macro_use]
extern crate cfg_if;
#[macro_use]
extern crate derive_more;
#[macro_use]
extern crate serde;

mod config;
mod env;
mod error;
mod paginator;
mod query;
mod result;

pub use crate::config::*;
pub use crate::env::*;
pub use crate::error::*;
pub use crate::paginator::*;
pub use crate::query::*;
pub use crate::result::*;

cfg_if! { if #[cfg(feature = "diesel")] {
    mod diesel;
    pub use crate::diesel::*;
} }

cfg_if! { if #[cfg(any(
    feature = "async-graphql-4",
    feature = "async-graphql-5",
    feature = "async-graphql-6"
))] {
    mod graphql;
    pub(crate) use crate::graphql::*;

    #[cfg(feature = "async-graphql-4")]
    pub(crate) use async_graphql_4 as async_graphql;
    #[cfg(feature = "async-graphql-5")]
    pub(crate) use async_graphql_5 as async_graphql;
    #[cfg(feature = "async-graphql-6")]
    pub(crate) use async_graphql_6 as async_graphql;
} }

#[cfg(test)]
pub(crate) mod testing;
