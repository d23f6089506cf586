use core_types::Window;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default and maximum number of rows per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: 10,
            max_size: 100,
        }
    }
}

impl PageLimits {
    /// A requested size, or the default when it is missing, malformed or not positive.
    fn size(&self, raw: Option<&str>) -> u64 {
        match parse(raw) {
            Some(size) if size > 0 => (size as u64).min(self.max_size),
            _ => self.default_size,
        }
    }
}

/// A normalised collection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// 1-based page number and page size.
    Paged { page: u64, page_size: u64 },
    /// Raw limit and offset.
    Sliced { limit: u64, offset: u64 },
}

impl PageRequest {
    /// Builds a request from raw query parameters, falling back to defaults
    /// for anything missing or malformed.
    pub fn from_params(params: &HashMap<String, String>, limits: &PageLimits) -> Self {
        let get = |key: &str| params.get(key).map(String::as_str);

        if get("page").is_some() || get("pageSize").is_some() {
            let page = match parse(get("page")) {
                Some(page) if page > 0 => page as u64,
                _ => 1,
            };
            PageRequest::Paged {
                page,
                page_size: limits.size(get("pageSize")),
            }
        } else {
            let offset = match parse(get("offset")) {
                Some(offset) if offset > 0 => offset as u64,
                _ => 0,
            };
            PageRequest::Sliced {
                limit: limits.size(get("limit")),
                offset,
            }
        }
    }

    /// The rows this request covers.
    pub fn window(&self) -> Window {
        match *self {
            PageRequest::Paged { page, page_size } => {
                Window::new(page_size, page.saturating_sub(1).saturating_mul(page_size))
            }
            PageRequest::Sliced { limit, offset } => Window::new(limit, offset),
        }
    }
}

fn parse(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
}
