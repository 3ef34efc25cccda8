//! Length-aware pagination in the shape the frontend paginator expects.
//!
//! ```json
//! { "data": [..],
//!   "meta": { "current_page": 2, "from": 11, "to": 20, "last_page": 5,
//!             "per_page": 10, "total": 43, "path": "/api/v1/leads" },
//!   "links": [{ "url": "/api/v1/leads?page=1", "label": "&laquo; Previous", "active": false }, ..] }
//! ```

use serde::Serialize;

use crate::search::{clamp_limit, clamp_page, DEFAULT_PER_PAGE, MAX_PER_PAGE};

/// Pages shown on each side of the current page in the link window.
pub const ON_EACH_SIDE: i64 = 3;

pub const PREVIOUS_LABEL: &str = "&laquo; Previous";
pub const NEXT_LABEL: &str = "Next &raquo;";
pub const GAP_LABEL: &str = "...";

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: clamp_page(page),
            per_page: clamp_limit(per_page, DEFAULT_PER_PAGE, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    pub links: Vec<PageLink>,
}

impl<T> Paginated<T> {
    /// Assemble a page. `query` holds the active filters, echoed into every
    /// link URL ahead of the `page` parameter.
    pub fn new(
        data: Vec<T>,
        total: i64,
        request: PageRequest,
        path: &str,
        query: &[(String, String)],
    ) -> Self {
        let last_page = last_page(total, request.per_page);
        let count = data.len() as i64;
        let (from, to) = if count == 0 {
            (None, None)
        } else {
            (
                Some(request.offset() + 1),
                Some(request.offset() + count),
            )
        };
        let meta = PageMeta {
            current_page: request.page,
            from,
            to,
            last_page,
            per_page: request.per_page,
            total,
            path: path.to_string(),
        };
        let links = build_links(request.page, last_page, |page| page_url(path, query, page));
        Self { data, meta, links }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
            links: self.links,
        }
    }
}

pub fn last_page(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        return 1;
    }
    (total + per_page - 1) / per_page
}

/// `{path}?{query}&page={page}` with form-urlencoded values.
pub fn page_url(path: &str, query: &[(String, String)], page: i64) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in query.iter().filter(|(k, _)| k != "page") {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("page", &page.to_string());
    format!("{path}?{}", serializer.finish())
}

/// A run of page numbers or a gap marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowItem {
    Pages(Vec<i64>),
    Gap,
}

/// Sliding window of page numbers around `current`.
///
/// Short paginators list every page. Longer ones show the first pages, a
/// slider around the current page and the last pages, separated by gaps.
pub fn url_window(current: i64, last: i64) -> Vec<WindowItem> {
    use WindowItem::{Gap, Pages};

    let range = |a: i64, b: i64| Pages((a.max(1)..=b.min(last)).collect());

    if last < ON_EACH_SIDE * 2 + 8 {
        return vec![range(1, last)];
    }

    let window = ON_EACH_SIDE + 4;
    if current <= window {
        vec![range(1, window + ON_EACH_SIDE), Gap, range(last - 1, last)]
    } else if current > last - window {
        vec![range(1, 2), Gap, range(last - (window + ON_EACH_SIDE - 1), last)]
    } else {
        vec![
            range(1, 2),
            Gap,
            range(current - ON_EACH_SIDE, current + ON_EACH_SIDE),
            Gap,
            range(last - 1, last),
        ]
    }
}

fn build_links(current: i64, last: i64, url: impl Fn(i64) -> String) -> Vec<PageLink> {
    let mut links = vec![PageLink {
        url: (current > 1).then(|| url(current - 1)),
        label: PREVIOUS_LABEL.to_string(),
        active: false,
    }];

    for item in url_window(current, last) {
        match item {
            WindowItem::Pages(pages) => links.extend(pages.into_iter().map(|page| PageLink {
                url: Some(url(page)),
                label: page.to_string(),
                active: page == current,
            })),
            WindowItem::Gap => links.push(PageLink {
                url: None,
                label: GAP_LABEL.to_string(),
                active: false,
            }),
        }
    }

    links.push(PageLink {
        url: (current < last).then(|| url(current + 1)),
        label: NEXT_LABEL.to_string(),
        active: false,
    });
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels<T>(page: &Paginated<T>) -> Vec<&str> {
        page.links.iter().map(|l| l.label.as_str()).collect()
    }

    #[test]
    fn request_is_clamped() {
        let req = PageRequest::new(Some(0), Some(1000));
        assert_eq!(req, PageRequest { page: 1, per_page: 100 });
        assert_eq!(PageRequest::new(Some(3), None).offset(), 20);
    }

    #[test]
    fn meta_for_middle_page() {
        let page = Paginated::new(vec![0; 10], 43, PageRequest::new(Some(2), None), "/leads", &[]);
        assert_eq!(page.meta.from, Some(11));
        assert_eq!(page.meta.to, Some(20));
        assert_eq!(page.meta.last_page, 5);
        assert_eq!(page.meta.total, 43);
    }

    #[test]
    fn empty_page_has_no_range() {
        let page: Paginated<i32> = Paginated::new(vec![], 0, PageRequest::default(), "/leads", &[]);
        assert_eq!(page.meta.from, None);
        assert_eq!(page.meta.to, None);
        assert_eq!(page.meta.last_page, 1);
        assert_eq!(labels(&page), vec![PREVIOUS_LABEL, "1", NEXT_LABEL]);
        assert!(page.links[0].url.is_none());
        assert!(page.links[2].url.is_none());
    }

    #[test]
    fn links_carry_filters() {
        let query = vec![
            ("status".to_string(), "pending".to_string()),
            ("search".to_string(), "fiber net".to_string()),
            ("page".to_string(), "1".to_string()),
        ];
        let page = Paginated::new(vec![1; 10], 25, PageRequest::new(Some(1), None), "/api/v1/projects", &query);
        let next = page.links.last().unwrap();
        assert_eq!(
            next.url.as_deref(),
            Some("/api/v1/projects?status=pending&search=fiber+net&page=2")
        );
        assert!(page.links[1].active);
    }

    #[test]
    fn short_paginator_lists_every_page() {
        assert_eq!(url_window(5, 13), vec![WindowItem::Pages((1..=13).collect())]);
    }

    #[test]
    fn window_near_start() {
        assert_eq!(
            url_window(2, 30),
            vec![
                WindowItem::Pages((1..=10).collect()),
                WindowItem::Gap,
                WindowItem::Pages(vec![29, 30]),
            ]
        );
    }

    #[test]
    fn window_near_end() {
        assert_eq!(
            url_window(28, 30),
            vec![
                WindowItem::Pages(vec![1, 2]),
                WindowItem::Gap,
                WindowItem::Pages((21..=30).collect()),
            ]
        );
    }

    #[test]
    fn window_in_the_middle() {
        assert_eq!(
            url_window(15, 30),
            vec![
                WindowItem::Pages(vec![1, 2]),
                WindowItem::Gap,
                WindowItem::Pages((12..=18).collect()),
                WindowItem::Gap,
                WindowItem::Pages(vec![29, 30]),
            ]
        );
    }

    #[test]
    fn map_preserves_meta() {
        let page = Paginated::new(vec![1, 2], 2, PageRequest::default(), "/p", &[]);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.data, vec![10, 20]);
        assert_eq!(mapped.meta.total, 2);
    }
}
