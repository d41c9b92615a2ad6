/// A query value the paginator can narrow to a page window.
///
/// Builders consume and return the query so every sub-operation works on its own
/// clone; the handle a caller passes in is never mutated.
pub trait PageQuery: Clone + Send {
    type Error: Send;

    /// Appends a sort clause after any clauses already applied.
    fn order(self, clause: &str) -> Self;
    fn limit(self, limit: i64) -> Self;
    fn offset(self, offset: i64) -> Self;
}

/// Execution of a query whose rows load as `T`.
pub trait LoadPage<T>: PageQuery {
    /// Replaces the contents of `records` with the rows of this query.
    fn load_page(&self, records: &mut Vec<T>) -> Result<(), Self::Error>;

    /// Number of rows the query matches, ignoring any limit or offset.
    fn count(&self) -> Result<i64, Self::Error>;
}

/// Execution of named relations from an owner `O` to related rows `R`.
///
/// Join semantics (one-to-many, many-to-many) live entirely in the
/// implementation's `Association`.
pub trait LoadRelated<O: ?Sized, R>: PageQuery {
    type Association: Clone + Send;

    fn association(&self, owner: &O, relation: &str) -> Result<Self::Association, Self::Error>;

    /// Number of related rows, ignoring any limit or offset.
    fn count_related(&self, association: &Self::Association) -> Result<i64, Self::Error>;

    /// Replaces the contents of `records` with the related rows, honoring the
    /// order, limit and offset applied to `self`.
    fn load_related(
        &self,
        association: &Self::Association,
        records: &mut Vec<R>,
    ) -> Result<(), Self::Error>;
}
