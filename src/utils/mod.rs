pub mod branch_cache;
pub mod branch_filter;
pub mod db_utils;
pub mod demo_seed;
pub mod qr_cache;
pub mod qr_token;
