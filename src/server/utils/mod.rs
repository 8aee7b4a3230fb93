pub mod filename_utils;
pub mod url_guard_utils;
