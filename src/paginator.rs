use crate::{LoadPage, LoadRelated, PageConfig, PageError, PageOption, PageQuery, PageResult};
use ::std::panic::resume_unwind;
use ::std::thread;
use ::tracing::{debug, trace};

type CountOutcome<E> = Result<i64, E>;

/// Error type produced when paginating with `Q`.
pub type PageQueryError<Q> = PageError<<Q as PageQuery>::Error>;

/// The two pagination operations.
///
/// Records are written into a caller-owned destination which the returned
/// [`PageResult`] borrows. The destination is written by the fetch before any
/// failure is reported, so its contents are unspecified when an error comes back.
pub trait Paginate {
    type Query: PageQuery;

    fn paginate<'a, T>(
        &self,
        records: &'a mut Vec<T>,
    ) -> Result<PageResult<&'a [T]>, PageQueryError<Self::Query>>
    where
        Self::Query: LoadPage<T>;

    /// Paginates the rows reachable from `owner` through `relation`.
    ///
    /// Fails without touching `records` when the relation cannot be resolved.
    fn paginate_related<'a, O, R>(
        &self,
        owner: &O,
        records: &'a mut Vec<R>,
        relation: &str,
    ) -> Result<PageResult<&'a [R]>, PageQueryError<Self::Query>>
    where
        O: ?Sized,
        Self::Query: LoadRelated<O, R>;
}

/// Binds a query handle to a [`PageConfig`].
#[derive(Clone, Debug)]
pub struct Paginator<Q> {
    query: Q,
    config: PageConfig,
}

impl<Q: PageQuery> Paginator<Q> {
    pub fn new(query: Q, options: impl IntoIterator<Item = PageOption>) -> Self {
        Self::with_config(query, PageConfig::from_options(options))
    }

    pub fn with_config(query: Q, config: PageConfig) -> Self {
        Self { query, config }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// The caller's query with every order clause applied.
    fn prepare(&self) -> Q {
        self.config
            .order
            .iter()
            .fold(self.query.clone(), |query, clause| query.order(clause))
    }

    fn window(&self, query: Q) -> Q {
        let PageConfig { page, limit, order } = &self.config;
        let offset = self.config.offset();
        debug!(page, limit, offset, ?order, "paginating");
        query.limit(*limit).offset(offset)
    }
}

impl<Q: PageQuery> Paginate for Paginator<Q> {
    type Query = Q;

    fn paginate<'a, T>(&self, records: &'a mut Vec<T>) -> Result<PageResult<&'a [T]>, PageQueryError<Q>>
    where
        Q: LoadPage<T>,
    {
        let query = self.prepare();
        let counter = query.clone();
        let window = self.window(query);

        let total = join(move || counter.count(), || window.load_page(records))?;

        Ok(PageResult::new(&self.config, records.as_slice(), total))
    }

    fn paginate_related<'a, O, R>(
        &self,
        owner: &O,
        records: &'a mut Vec<R>,
        relation: &str,
    ) -> Result<PageResult<&'a [R]>, PageQueryError<Q>>
    where
        O: ?Sized,
        Q: LoadRelated<O, R>,
    {
        let query = self.prepare();
        let association = query
            .association(owner, relation)
            .map_err(|source| PageError::Relation {
                relation: relation.to_owned(),
                source,
            })?;

        let counter = query.clone();
        let counted = association.clone();
        let window = self.window(query);

        let total = join(
            move || counter.count_related(&counted),
            || window.load_related(&association, records),
        )?;

        Ok(PageResult::new(&self.config, records.as_slice(), total))
    }
}

/// Runs `count` on a scoped thread while `fetch` runs on the current one.
///
/// Both always run to completion; a count failure wins over a fetch failure.
fn join<E: Send>(
    count: impl FnOnce() -> CountOutcome<E> + Send,
    fetch: impl FnOnce() -> Result<(), E>,
) -> Result<i64, PageError<E>> {
    let (counted, fetched) = thread::scope(|scope| {
        let count = scope.spawn(count);
        let fetched = fetch();
        let counted = count.join().unwrap_or_else(|panic| resume_unwind(panic));
        (counted, fetched)
    });

    let total = counted.map_err(PageError::Count)?;
    fetched.map_err(PageError::Fetch)?;
    trace!(total, "joined count");
    Ok(total)
}

/// One-shot form of [`Paginate::paginate`].
pub fn paginate<'a, Q, T>(
    query: Q,
    records: &'a mut Vec<T>,
    options: impl IntoIterator<Item = PageOption>,
) -> Result<PageResult<&'a [T]>, PageQueryError<Q>>
where
    Q: LoadPage<T>,
{
    Paginator::new(query, options).paginate(records)
}

/// One-shot form of [`Paginate::paginate_related`].
pub fn paginate_related<'a, Q, O, R>(
    query: Q,
    owner: &O,
    records: &'a mut Vec<R>,
    relation: &str,
    options: impl IntoIterator<Item = PageOption>,
) -> Result<PageResult<&'a [R]>, PageQueryError<Q>>
where
    O: ?Sized,
    Q: LoadRelated<O, R>,
{
    Paginator::new(query, options).paginate_related(owner, records, relation)
}
