pub mod db_utils;
pub mod document_filter;
pub mod employee_cache;
