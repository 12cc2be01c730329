pub mod db;
pub mod desktop_cache;
pub mod logging;
pub mod systemd;
