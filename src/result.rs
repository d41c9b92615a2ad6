use crate::PageConfig;

/// One page of records plus the metadata needed to navigate around it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<R> {
    pub current_page: i64,
    /// never less than 1, even for an empty result set
    pub max_page: i64,
    pub records_per_page: i64,
    pub total_records: i64,
    pub records: R,
}

impl<R> PageResult<R> {
    pub fn new(config: &PageConfig, records: R, total_records: i64) -> Self {
        Self {
            current_page: config.page,
            max_page: max_page(total_records, config.limit),
            records_per_page: config.limit,
            total_records,
            records,
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.current_page <= 1
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page >= self.max_page
    }

    /// Converts the records container, keeping the page metadata.
    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> PageResult<U> {
        PageResult {
            current_page: self.current_page,
            max_page: self.max_page,
            records_per_page: self.records_per_page,
            total_records: self.total_records,
            records: f(self.records),
        }
    }
}

impl<T: Clone> PageResult<&[T]> {
    pub fn into_owned(self) -> PageResult<Vec<T>> {
        self.map(<[T]>::to_vec)
    }
}

/// Number of pages needed to hold `total` records, `limit` per page. At least 1.
///
/// A non-positive `limit` has no meaningful answer and yields 1.
pub fn max_page(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 1;
    }
    let pages = total / limit + i64::from(total % limit != 0);
    pages.max(1)
}
