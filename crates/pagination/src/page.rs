use crate::request::PageRequest;
use serde::Serialize;

/// `ceil(total / page_size)`, and 0 for an empty collection.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// The envelope every collection endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub has_more: bool,
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

impl<T> Page<T> {
    /// Wraps one window of an ordered collection holding `total` rows.
    pub fn new(data: Vec<T>, total: u64, request: &PageRequest) -> Self {
        let window = request.window();
        let returned = data.len() as u64;
        let (page, page_size) = match *request {
            PageRequest::Paged { page, page_size } => (Some(page), Some(page_size)),
            PageRequest::Sliced { .. } => (None, None),
        };
        Self {
            data,
            total,
            limit: window.limit,
            offset: window.offset,
            has_more: window.offset.saturating_add(returned) < total,
            total_pages: total_pages(total, window.limit),
            page,
            page_size,
        }
    }

    /// Converts the rows while keeping the envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
            has_more: self.has_more,
            total_pages: self.total_pages,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 100), 1);
    }

    #[test]
    fn offset_past_the_end_is_an_empty_page() {
        let request = PageRequest::Sliced {
            limit: 5,
            offset: 100,
        };
        let page: Page<i32> = Page::new(Vec::new(), 15, &request);
        assert!(page.data.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn page_form_serializes_page_fields() {
        let request = PageRequest::Paged {
            page: 2,
            page_size: 10,
        };
        let page = Page::new(vec![11, 12, 13], 13, &request);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["offset"], 10);
        assert_eq!(json["hasMore"], false);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["page"], 2);
        assert_eq!(json["pageSize"], 10);

        let sliced = Page::new(vec![1], 13, &PageRequest::Sliced { limit: 1, offset: 0 });
        let json = serde_json::to_value(&sliced).unwrap();
        assert_eq!(json["hasMore"], true);
        assert!(json.get("page").is_none());
        assert!(json.get("pageSize").is_none());
    }

    #[test]
    fn map_keeps_the_envelope() {
        let request = PageRequest::Sliced { limit: 2, offset: 0 };
        let page = Page::new(vec![1, 2], 5, &request).map(|n| n * 10);
        assert_eq!(page.data, vec![10, 20]);
        assert!(page.has_more);
        assert_eq!(page.total, 5);
    }

    proptest! {
        #[test]
        fn window_over_a_collection_is_consistent(
            total in 0u64..500,
            limit in 1u64..=100,
            offset in 0u64..600,
        ) {
            let request = PageRequest::Sliced { limit, offset };
            let window = request.window();
            let rows: Vec<u64> = (0..total).collect();
            let data = window.slice(&rows);
            let returned = data.len() as u64;
            let page = Page::new(data, total, &request);

            prop_assert!(page.offset + returned <= total || returned == 0);
            prop_assert!(returned <= limit);
            prop_assert_eq!(page.has_more, offset + returned < total);
            prop_assert_eq!(page.total_pages, (total + limit - 1) / limit);
        }
    }
}
