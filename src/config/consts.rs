// src/config/consts.rs

// Local store
pub const STORE_DIR: &str = ".store";
pub const DEBUG_LOG_FILE: &str = "debug.log";
pub const LOCK_FILE: &str = "run.lock";

// Persistence keys
pub const SNAPSHOT_KEY: &str = "estado_atual.json";
pub const LEDGER_KEY: &str = "historico_status.json";

// Remote store (GitHub contents API)
pub const GITHUB_API: &str = "https://api.github.com";
pub const GITHUB_BRANCH: &str = "main";
pub const GITHUB_DATA_DIR: &str = "data";
pub const USER_AGENT: &str = "menu_watch/0.3";

// Telegram
pub const TELEGRAM_API: &str = "https://api.telegram.org";

// Time: fixed UTC-3, no DST
pub const UTC_OFFSET_HOURS: i64 = -3;
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_REPORT_STEM: &str = "historico_produtos";

// Notification caps
pub const MAX_DISAPPEARED_LISTED: usize = 10;
pub const MAX_OFF_LISTED: usize = 5;
pub const MAX_CHANGES_LISTED: usize = 10;

// Presentation sentinels
pub const NO_SAMPLE: &str = "N/A";
pub const NEVER: &str = "Nunca";

// Logging
pub const LOG_ENV: &str = "MENU_WATCH_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "info";
