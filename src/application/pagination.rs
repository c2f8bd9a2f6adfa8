//! Page-number pagination for list endpoints.

use std::num::NonZeroU32;

use serde::Serialize;
use thiserror::Error;

use crate::cache::QueryParams;

pub const PAGE_PARAM: &str = "page";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page `{0}` is not a positive integer")]
    Malformed(String),
    #[error("page {requested} is beyond the last page ({last})")]
    OutOfRange { requested: u64, last: u64 },
}

/// Rows to fetch for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

/// Pagination fields appended to list envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: NonZeroU32,
}

impl Paginator {
    pub fn new(page_size: NonZeroU32) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.get()
    }

    /// Requested page number; an absent parameter means the first page.
    pub fn requested_page(params: &QueryParams) -> Result<u64, PaginationError> {
        match params.get(PAGE_PARAM) {
            None => Ok(1),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(page) if page >= 1 => Ok(page),
                _ => Err(PaginationError::Malformed(raw.to_string())),
            },
        }
    }

    /// Number of pages for `count` rows. An empty collection still has one page.
    pub fn last_page(&self, count: u64) -> u64 {
        count.div_ceil(u64::from(self.page_size.get())).max(1)
    }

    pub fn window(&self, page: u64, count: u64) -> Result<PageWindow, PaginationError> {
        let last = self.last_page(count);
        if page > last {
            return Err(PaginationError::OutOfRange {
                requested: page,
                last,
            });
        }

        let size = i64::from(self.page_size.get());
        let offset = i64::try_from(page - 1)
            .ok()
            .and_then(|index| index.checked_mul(size))
            .ok_or(PaginationError::OutOfRange {
                requested: page,
                last,
            })?;

        Ok(PageWindow {
            limit: size,
            offset,
        })
    }

    /// Count plus relative links to the neighbouring pages, keeping other parameters.
    pub fn meta(&self, path: &str, params: &QueryParams, page: u64, count: u64) -> PageMeta {
        let last = self.last_page(count);

        let next = (page < last).then(|| {
            let mut next_params = params.clone();
            next_params.set(PAGE_PARAM, (page + 1).to_string());
            link(path, &next_params)
        });

        let previous = (page > 1).then(|| {
            let mut previous_params = params.clone();
            if page == 2 {
                previous_params.remove(PAGE_PARAM);
            } else {
                previous_params.set(PAGE_PARAM, (page - 1).to_string());
            }
            link(path, &previous_params)
        });

        PageMeta {
            count,
            next,
            previous,
        }
    }
}

fn link(path: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", params.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paginator(size: u32) -> Paginator {
        Paginator::new(NonZeroU32::new(size).expect("non-zero"))
    }

    #[test]
    fn requested_page_defaults_to_first() {
        assert_eq!(Paginator::requested_page(&QueryParams::new()), Ok(1));
        assert_eq!(
            Paginator::requested_page(&QueryParams::parse(Some("page=3"))),
            Ok(3)
        );
    }

    #[test]
    fn requested_page_rejects_non_positive_values() {
        for raw in ["page=0", "page=-1", "page=abc", "page=1.5", "page="] {
            let params = QueryParams::parse(Some(raw));
            assert!(
                matches!(
                    Paginator::requested_page(&params),
                    Err(PaginationError::Malformed(_))
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn window_covers_requested_page() {
        let paginator = paginator(10);
        assert_eq!(
            paginator.window(2, 25),
            Ok(PageWindow {
                limit: 10,
                offset: 10
            })
        );
        assert_eq!(
            paginator.window(1, 0),
            Ok(PageWindow {
                limit: 10,
                offset: 0
            })
        );
        assert_eq!(
            paginator.window(4, 25),
            Err(PaginationError::OutOfRange {
                requested: 4,
                last: 3
            })
        );
    }

    #[test]
    fn meta_links_preserve_filters() {
        let paginator = paginator(10);
        let params = QueryParams::parse(Some("category=home&page=2"));
        let meta = paginator.meta("/products/", &params, 2, 35);

        assert_eq!(meta.count, 35);
        assert_eq!(
            meta.next.as_deref(),
            Some("/products/?category=home&page=3")
        );
        assert_eq!(meta.previous.as_deref(), Some("/products/?category=home"));
    }

    #[test]
    fn meta_omits_links_at_the_edges() {
        let paginator = paginator(10);
        let first = paginator.meta("/categories/", &QueryParams::new(), 1, 10);
        assert_eq!(first.next, None);
        assert_eq!(first.previous, None);

        let third = paginator.meta("/categories/", &QueryParams::parse(Some("page=3")), 3, 30);
        assert_eq!(third.previous.as_deref(), Some("/categories/?page=2"));
        assert_eq!(third.next, None);
    }
}
