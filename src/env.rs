use ::std::sync::OnceLock;

/// Page size used when no environment override is present.
pub const DEFAULT_LIMIT: i64 = 20;

/// Default page size for configurations built without an explicit limit.
///
/// Read once from `PAGINATION_DEFAULT_LIMIT` on first use, so it is start-up
/// configuration: later changes to the environment are not observed.
pub fn default_limit() -> i64 {
    static PAGINATION_DEFAULT_LIMIT: OnceLock<i64> = OnceLock::new();
    *PAGINATION_DEFAULT_LIMIT.get_or_init(|| match std::env::var("PAGINATION_DEFAULT_LIMIT") {
        Err(_) => DEFAULT_LIMIT,
        Ok(limit) => match limit.parse::<i64>() {
            Ok(limit) if limit > 0 => limit,
            _ => {
                tracing::warn!(
                    value = %limit,
                    fallback = DEFAULT_LIMIT,
                    "PAGINATION_DEFAULT_LIMIT must be a positive integer"
                );
                DEFAULT_LIMIT
            }
        },
    })
}

pub fn pagination_max_count() -> &'static Option<u32> {
    static PAGINATION_MAX_COUNT: OnceLock<Option<u32>> = OnceLock::new();
    PAGINATION_MAX_COUNT.get_or_init(|| {
        std::env::var("PAGINATION_MAX_COUNT").ok().and_then(|count| match count.parse::<u32>() {
            Ok(count) => Some(count),
            Err(err) => {
                tracing::warn!(value = %count, %err, "ignoring invalid PAGINATION_MAX_COUNT");
                None
            }
        })
    })
}
