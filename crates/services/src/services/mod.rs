pub mod debounce;
pub mod filters;
pub mod inventory;
pub mod mutations;
pub mod notification;
pub mod query_cache;
pub mod refetch;
pub mod shell;
