use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::transport::{FetchError, Transport};

/// Lazily walks a paginated list endpoint, one request per `next()`.
///
/// Yields each page's items in API order. Iteration ends after a page with
/// fewer than `per_page` items, or right after an error has been yielded.
pub struct Pages<'a, T: ?Sized, I> {
    transport: &'a T,
    path: String,
    query: Vec<(&'static str, String)>,
    per_page: usize,
    next_page: Option<u32>,
    _item: PhantomData<fn() -> I>,
}

impl<'a, T: Transport + ?Sized, I> Pages<'a, T, I> {
    pub fn new(
        transport: &'a T,
        path: impl Into<String>,
        query: Vec<(&'static str, String)>,
        per_page: usize,
    ) -> Self {
        Self {
            transport,
            path: path.into(),
            query,
            per_page,
            next_page: Some(1),
            _item: PhantomData,
        }
    }
}

impl<T: Transport + ?Sized, I: DeserializeOwned> Iterator for Pages<'_, T, I> {
    type Item = Result<Vec<I>, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.next_page.take()?;

        let mut query = self.query.clone();
        query.push(("per_page", self.per_page.to_string()));
        query.push(("page", page.to_string()));

        let items = self
            .transport
            .get(&self.path, &query)
            .and_then(|value| {
                serde_json::from_value::<Vec<I>>(value).map_err(|source| FetchError::Decode {
                    path: self.path.clone(),
                    source,
                })
            });

        if let Ok(items) = &items {
            if items.len() >= self.per_page {
                self.next_page = Some(page + 1);
            }
        }
        Some(items)
    }
}
