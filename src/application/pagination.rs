//! Page-number pagination with query-string preserving links.

use serde::Serialize;
use url::form_urlencoded;

const PAGE_PARAM: &str = "page";

/// Requested page window. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Build a request from the raw `page` parameter; missing or unparsable values mean page 1.
    pub fn from_param(raw: Option<&str>, per_page: u32) -> Self {
        let page = raw
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(1);
        Self::new(page, per_page)
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.per_page as usize)
    }
}

/// One page of results plus enough metadata to render navigation.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    #[serde(skip)]
    preserved_query: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub page: u32,
    pub url: String,
    pub active: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let per_page = u64::from(request.per_page);
        let last_page = total.div_ceil(per_page).max(1);
        Self {
            items,
            current_page: request.page,
            per_page: request.per_page,
            total,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            preserved_query: Vec::new(),
        }
    }

    /// Slice an already filtered, ordered collection.
    pub fn from_slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.per_page as usize)
            .collect();
        Self::new(items, request, total)
    }

    /// Keep every parameter of `raw_query` except `page` on generated links.
    pub fn with_query_string(mut self, raw_query: &str) -> Self {
        self.preserved_query = form_urlencoded::parse(raw_query.trim_start_matches('?').as_bytes())
            .filter(|(key, _)| key != PAGE_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        self
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
            preserved_query: self.preserved_query,
        }
    }

    pub fn page_url(&self, page: u32) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.preserved_query {
            serializer.append_pair(key, value);
        }
        serializer.append_pair(PAGE_PARAM, &page.to_string());
        format!("?{}", serializer.finish())
    }

    pub fn links(&self) -> Vec<PageLink> {
        (1..=self.last_page)
            .map(|page| PageLink {
                page,
                url: self.page_url(page),
                active: page == self.current_page,
            })
            .collect()
    }

    pub fn next_page_url(&self) -> Option<String> {
        (self.current_page < self.last_page).then(|| self.page_url(self.current_page + 1))
    }

    pub fn previous_page_url(&self) -> Option<String> {
        (self.current_page > 1).then(|| self.page_url(self.current_page - 1))
    }
}
