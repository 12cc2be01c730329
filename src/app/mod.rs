pub mod desktop_entry;
pub mod override_service;
pub mod scan_service;
pub mod view_index;
