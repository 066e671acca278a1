pub mod availability;
pub mod db_utils;
pub mod list_cache;
