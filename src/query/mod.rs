pub mod columns;
pub mod features;
pub mod filter;
pub mod list_query;
pub mod order;
pub mod pagination;
pub mod projection;

pub use features::{build_query, QueryDescriptor, QueryFeatures};
pub use list_query::ListQuery;
