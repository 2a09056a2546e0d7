pub mod arf_delete;
pub mod arf_download;
pub mod arf_html;
pub mod arf_parsed;
pub mod health;
pub mod parse_report;
pub mod submit_report;
