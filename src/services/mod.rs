pub mod articles;
pub mod codes;
pub mod customers;
pub mod dashboard;
pub mod employees;
pub mod lookups;
pub mod offers;
pub mod orders;
pub mod portal;

use serde::Serialize;

/// One page of query results, as produced by the service layer. Handlers
/// wrap this into the API pagination envelope.
#[derive(Debug, Serialize)]
pub struct PageData<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> PageData<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageData<U> {
        PageData {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}
