use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// `?page=` / `?limit=` query parameters shared by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn skip(&self) -> u64 {
        (self.page() - 1) * self.limit() as u64
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub total_pages: u64,
    pub total: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, query: &PageQuery, total: u64) -> Self {
        let limit = query.limit() as u64;
        Paginated {
            items,
            page: query.page(),
            total_pages: (total + limit - 1) / limit,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<u64>, limit: Option<i64>) -> PageQuery {
        PageQuery { page, limit }
    }

    #[test]
    fn defaults_to_first_page_of_ten() {
        let q = query(None, None);
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.skip(), 0);
    }

    #[test]
    fn page_zero_is_treated_as_page_one() {
        let q = query(Some(0), None);
        assert_eq!(q.page(), 1);
        assert_eq!(q.skip(), 0);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(query(None, Some(0)).limit(), 1);
        assert_eq!(query(None, Some(500)).limit(), 100);
    }

    #[test]
    fn skip_advances_by_limit() {
        let q = query(Some(3), Some(10));
        assert_eq!(q.skip(), 20);
    }

    #[test]
    fn total_pages_uses_ceiling_division() {
        let q = query(Some(3), Some(10));
        let page = Paginated::new(vec![(); 5], &q, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 3);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn exact_multiple_has_no_phantom_page() {
        let q = query(Some(1), Some(10));
        let page = Paginated::new(vec![(); 10], &q, 30);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn empty_collection_has_zero_pages() {
        let q = query(None, None);
        let page: Paginated<()> = Paginated::new(vec![], &q, 0);
        assert_eq!(page.total_pages, 0);
    }
}
