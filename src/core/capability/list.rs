//! Purpose: Collection listing on top of the transport's page stream.
//! Exports: `Paged`, `Items`, `MAX_PAGE_SIZE`.
//! Role: Decodes raw pages into records and enforces page and item limits.
//! Invariants: No page is requested once `limit` items have been yielded.
//! Invariants: An error ends the stream after it has been yielded once.
#![allow(clippy::result_large_err)]

use crate::core::capability::Listable;
use crate::core::error::ApiResult;
use crate::core::http::{Pages, Query};
use crate::core::model::{Interface, Model, Resource};
use serde_json::Value;
use std::collections::VecDeque;

pub const MAX_PAGE_SIZE: u64 = 100;

const SEARCH_PAGE_LIMIT: usize = 5;

type Decoder<M> = Box<dyn Fn(Value) -> ApiResult<Vec<M>> + Send>;

/// Decoded pages, at most `page_limit` of them.
pub struct Paged<M> {
    pages: Pages,
    decode: Decoder<M>,
    page_limit: Option<usize>,
    fetched: usize,
    done: bool,
}

impl<M> Paged<M> {
    pub(crate) fn new(pages: Pages, page_limit: Option<usize>, decode: Decoder<M>) -> Self {
        Self {
            pages,
            decode,
            page_limit,
            fetched: 0,
            done: false,
        }
    }
}

impl<M> Iterator for Paged<M> {
    type Item = ApiResult<Vec<M>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.page_limit.is_some_and(|limit| self.fetched >= limit) {
            return None;
        }
        let page = match self.pages.next() {
            Some(Ok(page)) => page,
            Some(Err(err)) => {
                self.done = true;
                return Some(Err(err));
            }
            None => {
                self.done = true;
                return None;
            }
        };
        self.fetched += 1;
        let decoded = (self.decode)(page);
        if decoded.is_err() {
            self.done = true;
        }
        Some(decoded)
    }
}

/// Records flattened out of `Paged`, at most `limit` of them.
pub struct Items<M> {
    pages: Paged<M>,
    buffer: VecDeque<M>,
    limit: Option<usize>,
    yielded: usize,
}

impl<M> Items<M> {
    pub(crate) fn new(pages: Paged<M>, limit: Option<usize>) -> Self {
        Self {
            pages,
            buffer: VecDeque::new(),
            limit,
            yielded: 0,
        }
    }
}

impl<M> Iterator for Items<M> {
    type Item = ApiResult<M>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.limit.is_some_and(|limit| self.yielded >= limit) {
                return None;
            }
            if let Some(item) = self.buffer.pop_front() {
                self.yielded += 1;
                return Some(Ok(item));
            }
            match self.pages.next()? {
                Ok(batch) => self.buffer.extend(batch),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl<T: Listable> Interface<T> {
    /// First page only.
    pub fn list(&self, query: &Query) -> ApiResult<Vec<Model<T>>> {
        let page = self.raw_get(&[], query, None)?;
        self.load_page(page)
    }

    /// A single record (the server's default order puts the most recent first).
    pub fn one(&self, query: &Query) -> ApiResult<Option<Model<T>>> {
        let query = query.clone().with("page_size", 1);
        Ok(self.list(&query)?.into_iter().next())
    }

    pub fn list_pages(&self, page_limit: Option<usize>, query: Query) -> Paged<Model<T>> {
        let interface = self.clone();
        Paged::new(
            self.raw_pages(&[], query, None),
            page_limit,
            Box::new(move |page| interface.load_page(page)),
        )
    }

    pub fn all(&self, page_limit: Option<usize>, limit: Option<usize>, query: Query) -> Items<Model<T>> {
        Items::new(self.list_pages(page_limit, query), limit)
    }

    /// The `n` most recent records.
    pub fn last(&self, n: usize, query: Query) -> ApiResult<Vec<Model<T>>> {
        self.bounded(n, query)
    }

    /// The `n` least recently modified records.
    pub fn first(&self, n: usize, query: Query) -> ApiResult<Vec<Model<T>>> {
        self.bounded(n, query.with("sort", "modifiedAt:asc"))
    }

    fn bounded(&self, n: usize, query: Query) -> ApiResult<Vec<Model<T>>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let requested = query
            .get("page_size")
            .and_then(Value::as_u64)
            .unwrap_or(MAX_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let page_size = requested.min(n as u64);
        self.all(None, Some(n), query.with("page_size", page_size))
            .collect()
    }

    /// Records matching `predicate`, stopping after `limit` hits or `page_limit` pages.
    pub fn search(
        &self,
        mut predicate: impl FnMut(&Model<T>) -> bool,
        limit: usize,
        page_limit: Option<usize>,
        query: Query,
    ) -> ApiResult<Vec<Model<T>>> {
        let mut found = Vec::new();
        if limit == 0 {
            return Ok(found);
        }
        for model in self.all(page_limit, None, query) {
            let model = model?;
            if predicate(&model) {
                found.push(model);
                if found.len() >= limit {
                    break;
                }
            }
        }
        Ok(found)
    }

    pub fn find_by_name(&self, name: &str) -> ApiResult<Option<Model<T>>> {
        let found = self.search(
            |model| Resource::name(model.data()) == Some(name),
            1,
            Some(SEARCH_PAGE_LIMIT),
            Query::new().with("name", name),
        )?;
        Ok(found.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::{Items, Paged};
    use crate::core::backend::{Backend, HttpRequest, HttpResponse};
    use crate::core::error::{ApiResult, Error, ErrorKind};
    use crate::core::http::{Http, Query};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Serves `total` numbered items in pages of `page_size`, counting requests.
    struct Numbers {
        total: usize,
        page_size: usize,
        calls: AtomicUsize,
    }

    impl Backend for Numbers {
        fn execute(&self, request: &HttpRequest) -> ApiResult<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let start: usize = request
                .query_param("nextToken")
                .map(|token| token.parse().map_err(|_| Error::new(ErrorKind::Internal)))
                .transpose()?
                .unwrap_or(0);
            let end = (start + self.page_size).min(self.total);
            let mut page = json!({"numbers": (start..end).collect::<Vec<_>>()});
            if end < self.total {
                page["nextToken"] = json!(end.to_string());
            }
            Ok(HttpResponse::json(200, &page))
        }
    }

    fn numbers(total: usize, page_size: usize) -> (Arc<Numbers>, Paged<u64>) {
        let backend = Arc::new(Numbers {
            total,
            page_size,
            calls: AtomicUsize::new(0),
        });
        let http = Http::new(
            url::Url::parse("https://example.test/api").expect("url"),
            Duration::from_secs(1),
            backend.clone(),
        );
        let paged = Paged::new(
            http.pages("numbers", Query::new(), None),
            None,
            Box::new(|page: Value| {
                Ok(page["numbers"]
                    .as_array()
                    .map(|items| items.iter().filter_map(Value::as_u64).collect())
                    .unwrap_or_default())
            }),
        );
        (backend, paged)
    }

    #[test]
    fn item_limit_stops_fetching() {
        let (backend, paged) = numbers(25, 10);
        let items: Vec<u64> = Items::new(paged, Some(12))
            .collect::<Result<_, _>>()
            .expect("items");
        assert_eq!(items.len(), 12);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn page_limit_caps_requests() {
        let (backend, mut paged) = numbers(25, 10);
        paged.page_limit = Some(2);
        let pages: Vec<Vec<u64>> = paged.collect::<Result<_, _>>().expect("pages");
        assert_eq!(pages.len(), 2);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unlimited_walks_every_page() {
        let (backend, paged) = numbers(25, 10);
        let items: Vec<u64> = Items::new(paged, None)
            .collect::<Result<_, _>>()
            .expect("items");
        assert_eq!(items, (0..25).collect::<Vec<u64>>());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }
}
