//! Response shapes shared by every handler.

mod pagination;
mod response;

pub use pagination::{Paginated, PaginationMeta};
pub use response::ApiResponse;
