pub mod notify;
pub mod rate_limit;
pub mod storage;
