use ::thiserror::Error;

/// Failure of a pagination call, naming the sub-operation that failed.
///
/// `E` is the error type of the underlying query collaborator.
#[derive(Debug, Error, IsVariant)]
pub enum PageError<E> {
    #[error("failed to resolve relation `{relation}`: {source}")]
    Relation {
        relation: String,
        #[source]
        source: E,
    },
    #[error("failed to count records: {0}")]
    Count(#[source] E),
    #[error("failed to fetch records: {0}")]
    Fetch(#[source] E),
}

impl<E> PageError<E> {
    /// The collaborator error, whichever sub-operation raised it.
    pub fn into_inner(self) -> E {
        match self {
            Self::Relation { source, .. } | Self::Count(source) | Self::Fetch(source) => source,
        }
    }
}
