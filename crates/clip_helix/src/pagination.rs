use std::{collections::HashSet, future::Future};

use futures::{stream, Stream, TryStreamExt};
use serde::Deserialize;

use crate::MetadataError;

/// One page of a Helix list endpoint.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub cursor: Option<String>,
}

struct Cursor {
    after: Option<String>,
    seen: HashSet<String>,
    pages: usize,
    exhausted: bool,
}

/// Lazily walks a cursor-paginated endpoint and yields its records in page order.
///
/// `fetch_page` receives the cursor to send as `after` (`None` for the first page).
/// Iteration stops when a page has no records, when no cursor is returned, when
/// the server repeats a cursor it already handed out, or after `max_pages` pages.
/// The first error ends the stream.
pub fn paginate<'a, T, F, Fut>(
    max_pages: usize,
    fetch_page: F,
) -> impl Stream<Item = Result<T, MetadataError>> + 'a
where
    T: 'a,
    F: FnMut(Option<String>) -> Fut + 'a,
    Fut: Future<Output = Result<Page<T>, MetadataError>> + 'a,
{
    let cursor = Cursor {
        after: None,
        seen: HashSet::new(),
        pages: 0,
        exhausted: false,
    };

    stream::try_unfold(
        (fetch_page, cursor),
        move |(mut fetch_page, mut cursor)| async move {
            if cursor.exhausted {
                return Ok(None);
            }
            if cursor.pages >= max_pages {
                tracing::warn!(max_pages, "Page limit reached, stopping pagination");
                return Ok(None);
            }

            let page = fetch_page(cursor.after.take()).await?;
            cursor.pages += 1;

            if page.data.is_empty() {
                return Ok(None);
            }

            match page.pagination.cursor.filter(|c| !c.is_empty()) {
                Some(next) if cursor.seen.insert(next.clone()) => cursor.after = Some(next),
                Some(repeated) => {
                    tracing::warn!(cursor = %repeated, "Server repeated a pagination cursor");
                    cursor.exhausted = true;
                }
                None => cursor.exhausted = true,
            }

            let records = stream::iter(page.data.into_iter().map(Ok::<T, MetadataError>));
            Ok::<_, MetadataError>(Some((records, (fetch_page, cursor))))
        },
    )
    .try_flatten()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::{future, TryStreamExt};

    use super::*;

    fn page(data: Vec<u32>, cursor: Option<&str>) -> Page<u32> {
        Page {
            data,
            pagination: Pagination {
                cursor: cursor.map(str::to_string),
            },
        }
    }

    /// Serves `pages` in order and records the cursor each request carried.
    fn scripted(
        pages: Vec<Page<u32>>,
    ) -> (
        Arc<Mutex<Vec<Option<String>>>>,
        impl FnMut(Option<String>) -> future::Ready<Result<Page<u32>, MetadataError>>,
    ) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        let mut pages = pages.into_iter();
        let fetch = move |after: Option<String>| {
            recorded.lock().unwrap().push(after);
            future::ready(Ok(pages.next().unwrap_or_else(|| page(vec![], None))))
        };
        (requests, fetch)
    }

    #[tokio::test]
    async fn test_concatenates_pages_in_order() {
        let (requests, fetch) = scripted(vec![
            page(vec![1, 2, 3], Some("c1")),
            page(vec![4, 5], Some("c2")),
            page(vec![6], None),
        ]);

        let records: Vec<u32> = paginate(100, fetch).try_collect().await.unwrap();

        assert_eq!(records, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(
            *requests.lock().unwrap(),
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_stops_on_empty_page_even_with_cursor() {
        let (requests, fetch) = scripted(vec![
            page(vec![1], Some("c1")),
            page(vec![], Some("c2")),
            page(vec![99], None),
        ]);

        let records: Vec<u32> = paginate(100, fetch).try_collect().await.unwrap();

        assert_eq!(records, vec![1]);
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_cursor_is_treated_as_last_page() {
        let (requests, fetch) = scripted(vec![page(vec![1, 2], Some(""))]);

        let records: Vec<u32> = paginate(100, fetch).try_collect().await.unwrap();

        assert_eq!(records, vec![1, 2]);
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_cursor_terminates() {
        let requests = Arc::new(Mutex::new(0usize));
        let counter = requests.clone();
        // a faulty server that always answers with the same cursor
        let fetch = move |_after: Option<String>| {
            *counter.lock().unwrap() += 1;
            future::ready(Ok(page(vec![7], Some("stuck"))))
        };

        let records: Vec<u32> = paginate(1_000, fetch).try_collect().await.unwrap();

        assert_eq!(records, vec![7, 7]);
        assert_eq!(*requests.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_page_limit_bounds_iteration() {
        let calls = Arc::new(Mutex::new(0usize));
        let counter = calls.clone();
        // fresh cursor on every page, never ends on its own
        let fetch = move |_after: Option<String>| {
            let mut n = counter.lock().unwrap();
            *n += 1;
            let served = *n;
            future::ready(Ok(page(vec![served as u32], Some(&format!("c{served}")))))
        };

        let records: Vec<u32> = paginate(5, fetch).try_collect().await.unwrap();

        assert_eq!(records, vec![1, 2, 3, 4, 5]);
        assert_eq!(*calls.lock().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_error_ends_stream() {
        let mut served = 0;
        let fetch = move |_after: Option<String>| {
            served += 1;
            future::ready(if served == 1 {
                Ok(page(vec![1], Some("c1")))
            } else {
                Err(MetadataError::Status {
                    endpoint: "clips".to_string(),
                    status: 503,
                    body: "unavailable".to_string(),
                })
            })
        };

        let result: Result<Vec<u32>, _> = paginate(100, fetch).try_collect().await;

        assert!(matches!(
            result,
            Err(MetadataError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_is_lazy_until_polled() {
        let (requests, fetch) = scripted(vec![page(vec![1], None)]);

        let stream = paginate(100, fetch);
        assert!(requests.lock().unwrap().is_empty());

        let records: Vec<u32> = stream.try_collect().await.unwrap();
        assert_eq!(records, vec![1]);
        assert_eq!(requests.lock().unwrap().len(), 1);
    }
}
