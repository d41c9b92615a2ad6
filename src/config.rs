use crate::{default_limit, pagination_max_count};
use ::regex::Regex;
use ::std::sync::OnceLock;
use ::thiserror::Error;

#[cfg(feature = "async-graphql-4")]
use async_graphql_4 as async_graphql;
#[cfg(feature = "async-graphql-5")]
use async_graphql_5 as async_graphql;
#[cfg(feature = "async-graphql-6")]
use async_graphql_6 as async_graphql;

/// Window settings for a single pagination call.
///
/// Missing fields deserialize to their defaults, so the type can be read straight
/// from request parameters. Deserialized values are checked with
/// [`PageConfig::validate`] against `PAGINATION_MAX_COUNT`; values built from
/// options in code are taken as given.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "PageConfigParams")]
#[cfg_attr(
    any(
        feature = "async-graphql-4",
        feature = "async-graphql-5",
        feature = "async-graphql-6"
    ),
    derive(async_graphql::InputObject)
)]
pub struct PageConfig {
    /// 1-based page number
    #[cfg_attr(
        any(
            feature = "async-graphql-4",
            feature = "async-graphql-5",
            feature = "async-graphql-6"
        ),
        graphql(default = 1)
    )]
    pub page: i64,
    #[cfg_attr(
        any(
            feature = "async-graphql-4",
            feature = "async-graphql-5",
            feature = "async-graphql-6"
        ),
        graphql(
            default_with = "crate::default_limit()",
            validator(custom = "crate::GraphqlPaginationLimitValidator")
        )
    )]
    pub limit: i64,
    /// sort clauses, earlier clauses take precedence; set from code only over graphql
    #[cfg_attr(
        any(
            feature = "async-graphql-4",
            feature = "async-graphql-5",
            feature = "async-graphql-6"
        ),
        graphql(skip)
    )]
    pub order: Vec<String>,
}

/// Rejected request-supplied page settings.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PageConfigError {
    #[error("page must be at least 1, got {0}")]
    Page(i64),
    #[error("page limit must be between 1 and {max}, got {limit}")]
    Limit { limit: i64, max: i64 },
    #[error("unsupported sort clause `{0}`, expected `<column> [ASC|DESC]`")]
    Order(String),
}

/// Wire shape of [`PageConfig`] before validation.
#[derive(Deserialize)]
#[serde(default)]
struct PageConfigParams {
    page: i64,
    limit: i64,
    order: Vec<String>,
}

impl Default for PageConfigParams {
    fn default() -> Self {
        let PageConfig { page, limit, order } = PageConfig::default();
        Self { page, limit, order }
    }
}

impl TryFrom<PageConfigParams> for PageConfig {
    type Error = PageConfigError;

    fn try_from(params: PageConfigParams) -> Result<Self, Self::Error> {
        let PageConfigParams { page, limit, order } = params;
        let config = Self { page, limit, order };
        config.validate(*pagination_max_count())?;
        Ok(config)
    }
}

/// Whether `clause` is a plain `column`, `table.column`, optionally followed by
/// `ASC` or `DESC`.
pub fn is_sort_clause(clause: &str) -> bool {
    static SORT_CLAUSE_REGEX: OnceLock<Regex> = OnceLock::new();
    SORT_CLAUSE_REGEX
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)?(?:\s+(?i:asc|desc))?$")
                .expect("sort clause pattern must compile")
        })
        .is_match(clause)
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::with_default_limit(default_limit())
    }
}

impl PageConfig {
    /// First page of `limit` records with no ordering.
    pub fn with_default_limit(limit: i64) -> Self {
        Self {
            page: 1,
            limit,
            order: Vec::new(),
        }
    }

    /// Applies `options` in order over the default configuration.
    pub fn from_options(options: impl IntoIterator<Item = PageOption>) -> Self {
        let mut config = Self::default();
        config.apply(options);
        config
    }

    pub fn apply(&mut self, options: impl IntoIterator<Item = PageOption>) {
        for option in options {
            option.apply(self);
        }
    }

    /// Rejects a page below 1, a limit outside `1..=max_count` and any order
    /// clause other than `<column> [ASC|DESC]`.
    pub fn validate(&self, max_count: Option<u32>) -> Result<(), PageConfigError> {
        if self.page < 1 {
            return Err(PageConfigError::Page(self.page));
        }
        Self::check_limit(self.limit, max_count)?;
        match self.order.iter().find(|clause| !is_sort_clause(clause)) {
            Some(clause) => Err(PageConfigError::Order(clause.clone())),
            None => Ok(()),
        }
    }

    pub fn check_limit(limit: i64, max_count: Option<u32>) -> Result<(), PageConfigError> {
        let max = max_count.map_or(i64::MAX, i64::from);
        match (1..=max).contains(&limit) {
            true => Ok(()),
            false => Err(PageConfigError::Limit { limit, max }),
        }
    }

    /// Number of leading rows skipped before the window begins.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// A single mutation of a [`PageConfig`].
#[derive(Clone, Debug, Eq, Hash, IsVariant, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageOption {
    Page(i64),
    Limit(i64),
    Order(String),
}

impl PageOption {
    pub fn apply(self, config: &mut PageConfig) {
        match self {
            Self::Page(page) => config.page = page,
            Self::Limit(limit) => config.limit = limit,
            Self::Order(clause) => config.order.push(clause),
        }
    }
}

/// Overwrites the page number.
pub fn with_page(page: i64) -> PageOption {
    PageOption::Page(page)
}

/// Overwrites the page size.
pub fn with_limit(limit: i64) -> PageOption {
    PageOption::Limit(limit)
}

/// Appends a sort clause such as `"name DESC"`; repeated calls accumulate.
pub fn with_order(clause: impl Into<String>) -> PageOption {
    PageOption::Order(clause.into())
}
