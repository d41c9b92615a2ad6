use crate::async_graphql;
use crate::PageConfig;

/// Rejects page sizes below 1 or above `PAGINATION_MAX_COUNT` when it is set.
#[cfg(any(
    feature = "async-graphql-4",
    feature = "async-graphql-5",
    feature = "async-graphql-6"
))]
#[derive(Clone, Copy, Debug)]
pub(crate) struct GraphqlPaginationLimitValidator;

impl GraphqlPaginationLimitValidator {
    fn validate(limit: i64, max_count: Option<u32>) -> Result<(), String> {
        PageConfig::check_limit(limit, max_count).map_err(|err| err.to_string())
    }
}

#[cfg(feature = "async-graphql-4")]
impl async_graphql::CustomValidator<i64> for GraphqlPaginationLimitValidator {
    fn check(&self, value: &i64) -> Result<(), String> {
        Self::validate(*value, *crate::pagination_max_count())
    }
}

#[cfg(any(feature = "async-graphql-5", feature = "async-graphql-6"))]
impl async_graphql::CustomValidator<i64> for GraphqlPaginationLimitValidator {
    fn check(&self, value: &i64) -> Result<(), async_graphql::InputValueError<i64>> {
        Self::validate(*value, *crate::pagination_max_count()).map_err(Into::into)
    }
}
