use crate::{LoadPage, LoadRelated, PageQuery};
use ::derivative::Derivative;
use ::diesel::backend::Backend;
use ::diesel::query_builder::*;
use ::diesel::query_dsl::LoadQuery;
use ::diesel::r2d2::{ConnectionManager, Pool, PoolError, R2D2Connection};
use ::diesel::serialize::ToSql;
use ::diesel::sql_types::BigInt;
use ::diesel::prelude::*;
use ::either::Either::*;
use ::itertools::intersperse;
use ::std::fmt::Debug;

static PAGE_SUBQUERY_ALIAS: &str = "page_q";
static COUNT_SUBQUERY_ALIAS: &str = "count_q";

#[derive(Debug, ::thiserror::Error)]
pub enum DieselPageError {
    #[error("failed to check out a pooled connection: {0}")]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Query(#[from] ::diesel::result::Error),
    #[error("unknown relation `{0}`")]
    UnknownRelation(String),
}

/// `select * from (<query>) order by .. limit ? offset ?`
///
/// Order clauses are spliced into the sql verbatim and must refer to columns of
/// the wrapped query's projection. Anything other than `<column> [ASC|DESC]`
/// fails to build.
#[derive(Clone, Debug)]
pub struct PagedQuery<Q> {
    query: Q,
    order: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl<Q> PagedQuery<Q> {
    pub fn new(query: Q) -> Self {
        Self {
            query,
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// The same window over a different query.
    fn rebase<Q2>(&self, query: Q2) -> PagedQuery<Q2> {
        PagedQuery {
            query,
            order: self.order.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }

    /// Order clauses must be `<column> [ASC|DESC]`; limit and offset must not be negative.
    fn check_window(&self) -> QueryResult<()> {
        if let Some(clause) = self.order.iter().find(|clause| !crate::is_sort_clause(clause)) {
            return Err(::diesel::result::Error::QueryBuilderError(
                format!("unsupported sort clause `{clause}`").into(),
            ));
        }
        if let Some(limit) = self.limit.filter(|limit| *limit < 0) {
            return Err(::diesel::result::Error::QueryBuilderError(
                format!("page limit must not be negative, got {limit}").into(),
            ));
        }
        if let Some(offset) = self.offset.filter(|offset| *offset < 0) {
            return Err(::diesel::result::Error::QueryBuilderError(
                format!("page offset must not be negative, got {offset}").into(),
            ));
        }
        Ok(())
    }
}

impl<Q> QueryId for PagedQuery<Q> {
    type QueryId = ();
    const HAS_STATIC_QUERY_ID: bool = false;
}

impl<Q: Query> Query for PagedQuery<Q> {
    type SqlType = Q::SqlType;
}

impl<Q, C> RunQueryDsl<C> for PagedQuery<Q> {}

impl<Q, DB> QueryFragment<DB> for PagedQuery<Q>
where
    DB: Backend,
    Q: QueryFragment<DB>,
    i64: ToSql<BigInt, DB>,
{
    fn walk_ast<'b>(&'b self, mut pass: AstPass<'_, 'b, DB>) -> QueryResult<()> {
        self.check_window()?;
        pass.unsafe_to_cache_prepared();

        pass.push_sql("select * from (");
        self.query.walk_ast(pass.reborrow())?;
        pass.push_sql(") as ");
        pass.push_sql(PAGE_SUBQUERY_ALIAS);

        if !self.order.is_empty() {
            pass.push_sql(" order by ");
            for item in intersperse(self.order.iter().map(Left), Right(())) {
                match item {
                    Left(clause) => pass.push_sql(clause),
                    Right(_) => pass.push_sql(", "),
                }
            }
        }
        if let Some(limit) = &self.limit {
            pass.push_sql(" limit ");
            pass.push_bind_param::<BigInt, _>(limit)?;
        }
        if let Some(offset) = &self.offset {
            pass.push_sql(" offset ");
            pass.push_bind_param::<BigInt, _>(offset)?;
        }

        Ok(())
    }
}

/// `select count(*) from (<query>)`
#[derive(Clone, Debug)]
pub struct CountQuery<Q> {
    query: Q,
}

impl<Q> CountQuery<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }
}

impl<Q> QueryId for CountQuery<Q> {
    type QueryId = ();
    const HAS_STATIC_QUERY_ID: bool = false;
}

impl<Q> Query for CountQuery<Q> {
    type SqlType = BigInt;
}

impl<Q, C> RunQueryDsl<C> for CountQuery<Q> {}

impl<Q, DB> QueryFragment<DB> for CountQuery<Q>
where
    DB: Backend,
    Q: QueryFragment<DB>,
{
    fn walk_ast<'b>(&'b self, mut pass: AstPass<'_, 'b, DB>) -> QueryResult<()> {
        pass.push_sql("select count(*) from (");
        self.query.walk_ast(pass.reborrow())?;
        pass.push_sql(") as ");
        pass.push_sql(COUNT_SUBQUERY_ALIAS);
        Ok(())
    }
}

/// Named relations from an owner model to rows of type `R`.
///
/// ```ignore
/// impl HasRelation<Book> for Author {
///     type Query = Filter<books::table, Eq<books::author_id, i64>>;
///
///     fn relation(&self, name: &str) -> Option<Self::Query> {
///         match name {
///             "Books" => Some(books::table.filter(books::author_id.eq(self.id))),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait HasRelation<R> {
    /// Query selecting the related rows scoped to `self`.
    type Query;

    fn relation(&self, name: &str) -> Option<Self::Query>;
}

/// A diesel query paired with the pool its page and count queries run on.
///
/// The query must be a complete select statement; wrap a bare table with
/// `.as_query()` or a `.select(..)`.
///
/// Count and fetch each check out their own connection, so the pool needs room
/// for two connections per in-flight pagination.
#[derive(Derivative)]
#[derivative(Clone(bound = "Q: Clone"), Debug(bound = "Q: Debug"))]
pub struct PooledQuery<C: R2D2Connection + 'static, Q> {
    #[derivative(Debug = "ignore")]
    pool: Pool<ConnectionManager<C>>,
    query: PagedQuery<Q>,
}

impl<C: R2D2Connection + 'static, Q> PooledQuery<C, Q> {
    pub fn new(pool: Pool<ConnectionManager<C>>, query: Q) -> Self {
        Self {
            pool,
            query: PagedQuery::new(query),
        }
    }
}

impl<C: R2D2Connection + 'static> PooledQuery<C, ()> {
    /// A handle for related pagination only; relations supply their own query.
    pub fn from_pool(pool: Pool<ConnectionManager<C>>) -> Self {
        Self::new(pool, ())
    }
}

impl<C, Q> PageQuery for PooledQuery<C, Q>
where
    C: R2D2Connection + 'static,
    Q: Clone + Send,
{
    type Error = DieselPageError;

    fn order(mut self, clause: &str) -> Self {
        self.query.order.push(clause.to_owned());
        self
    }

    fn limit(mut self, limit: i64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    fn offset(mut self, offset: i64) -> Self {
        self.query.offset = Some(offset);
        self
    }
}

impl<C, Q, T> LoadPage<T> for PooledQuery<C, Q>
where
    C: R2D2Connection + 'static,
    Q: Clone + Send,
    PagedQuery<Q>: for<'a> LoadQuery<'a, C, T>,
    CountQuery<Q>: for<'a> LoadQuery<'a, C, i64>,
{
    fn load_page(&self, records: &mut Vec<T>) -> Result<(), DieselPageError> {
        let mut conn = self.pool.get()?;
        *records = self.query.clone().load::<T>(&mut *conn)?;
        Ok(())
    }

    fn count(&self) -> Result<i64, DieselPageError> {
        let mut conn = self.pool.get()?;
        let total = CountQuery::new(self.query.query.clone()).get_result::<i64>(&mut *conn)?;
        Ok(total)
    }
}

impl<C, Q, O, R> LoadRelated<O, R> for PooledQuery<C, Q>
where
    C: R2D2Connection + 'static,
    Q: Clone + Send,
    O: HasRelation<R> + ?Sized,
    O::Query: Clone + Send,
    PagedQuery<O::Query>: for<'a> LoadQuery<'a, C, R>,
    CountQuery<O::Query>: for<'a> LoadQuery<'a, C, i64>,
{
    type Association = O::Query;

    fn association(&self, owner: &O, relation: &str) -> Result<O::Query, DieselPageError> {
        owner
            .relation(relation)
            .ok_or_else(|| DieselPageError::UnknownRelation(relation.to_owned()))
    }

    fn count_related(&self, association: &O::Query) -> Result<i64, DieselPageError> {
        let mut conn = self.pool.get()?;
        let total = CountQuery::new(association.clone()).get_result::<i64>(&mut *conn)?;
        Ok(total)
    }

    fn load_related(&self, association: &O::Query, records: &mut Vec<R>) -> Result<(), DieselPageError> {
        let mut conn = self.pool.get()?;
        *records = self.query.rebase(association.clone()).load::<R>(&mut *conn)?;
        Ok(())
    }
}
