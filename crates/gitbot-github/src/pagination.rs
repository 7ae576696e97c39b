//! Page-walking helpers shared by every list operation.

use std::future::Future;

use crate::github_api::{GithubApiError, Page, PageRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregated<T> {
    /// The first page came back empty; no further pages were requested.
    NothingFound,
    Collected(Vec<T>),
}

impl<T> Aggregated<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::NothingFound => Vec::new(),
            Self::Collected(items) => items,
        }
    }
}

/// Walks pages starting at page 1, keeping every item `transform` maps to `Some`.
pub async fn collect_pages<T, U, F, Fut, M>(
    mut fetch: F,
    mut transform: M,
) -> Result<Aggregated<U>, GithubApiError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, GithubApiError>>,
    M: FnMut(T) -> Option<U>,
{
    let mut request = PageRequest::first();
    let mut collected = Vec::new();
    loop {
        let page = fetch(request).await?;
        if request.page == 1 && page.items.is_empty() {
            return Ok(Aggregated::NothingFound);
        }
        collected.extend(page.items.into_iter().filter_map(&mut transform));
        match page.next_page {
            Some(next) if next > request.page => request = PageRequest::new(next),
            _ => break,
        }
    }
    Ok(Aggregated::Collected(collected))
}

/// Walks pages until `predicate` matches, returning the first match.
pub async fn find_in_pages<T, F, Fut, P>(
    mut fetch: F,
    mut predicate: P,
) -> Result<Option<T>, GithubApiError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, GithubApiError>>,
    P: FnMut(&T) -> bool,
{
    let mut request = PageRequest::first();
    loop {
        let page = fetch(request).await?;
        if let Some(found) = page.items.into_iter().find(|item| predicate(item)) {
            return Ok(Some(found));
        }
        match page.next_page {
            Some(next) if next > request.page => request = PageRequest::new(next),
            _ => return Ok(None),
        }
    }
}
