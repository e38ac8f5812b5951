//! Page-number pagination for list pages

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

/// `?page=N` query parameter (1-based, or `last`)
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Position of the current page within a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageObj {
    pub number: i64,
    pub num_pages: i64,
    pub per_page: i64,
    /// Total number of objects across all pages
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageObj {
    /// Resolve the requested page against the total object count.
    /// An empty list still has a (single, empty) first page.
    pub fn resolve(raw: Option<&str>, per_page: i64, count: i64) -> AppResult<Self> {
        let num_pages = if count <= 0 {
            1
        } else {
            (count + per_page - 1) / per_page
        };

        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(s) => s
                .parse::<i64>()
                .map_err(|_| AppError::NotFound("Page is not 'last', nor can it be converted to an int".to_string()))?,
        };

        if number < 1 || number > num_pages {
            return Err(AppError::NotFound(format!("Invalid page ({})", number)));
        }

        Ok(Self {
            number,
            num_pages,
            per_page,
            count: count.max(0),
            has_next: number < num_pages,
            has_previous: number > 1,
        })
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }
}

/// Page context for list views
#[derive(Debug, Serialize, ToSchema)]
pub struct ListPage<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub object_list: Vec<T>,
    pub is_paginated: bool,
    pub page_obj: PageObj,
}

impl<T> ListPage<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(object_list: Vec<T>, page_obj: PageObj) -> Self {
        Self {
            object_list,
            is_paginated: page_obj.num_pages > 1,
            page_obj,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_has_first_page() {
        let page = PageObj::resolve(None, 10, 0).unwrap();
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
        assert!(PageObj::resolve(Some("2"), 10, 0).is_err());
    }

    #[test]
    fn test_page_bounds() {
        // 7 books, 3 per page
        let page = PageObj::resolve(Some("3"), 3, 7).unwrap();
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.offset(), 6);
        assert_eq!(page.limit(), 3);
        assert!(!page.has_next);
        assert!(page.has_previous);

        assert!(matches!(PageObj::resolve(Some("4"), 3, 7), Err(AppError::NotFound(_))));
        assert!(matches!(PageObj::resolve(Some("0"), 3, 7), Err(AppError::NotFound(_))));
        assert!(matches!(PageObj::resolve(Some("two"), 3, 7), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_last_page() {
        let page = PageObj::resolve(Some("last"), 10, 25).unwrap();
        assert_eq!(page.number, 3);
        assert_eq!(page.offset(), 20);
    }
}
