// src/config/consts.rs

// Report site
pub const REPORT_HOST: &str = "www.fflogs.com";
pub const SUMMARY_SUFFIX: &str = "&type=summary";

// Report markup anchors
pub const READY_SELECTOR: &str = "#summary-damage-done-0";
pub const COMPOSITION_TABLE_CLASS: &str = "composition-table";
pub const BOSS_TITLE_ID: &str = "filter-fight-boss-text";
pub const FIGHT_DETAILS_ID: &str = "filter-fight-details-text";
pub const DAMAGE_TABLE_ID: &str = "summary-damage-done-0";
pub const HEALING_TABLE_ID: &str = "summary-healing-done-0";
pub const DEATHS_TABLE_ID: &str = "summary-deaths-0";
pub const PERCENT_CLASS: &str = "report-amount-percent";
pub const DEATH_ABILITY_PREFIX: &str = "death-ability";

// Profile markup anchors
pub const PROFILE_BIO_CLASS: &str = "character__selfintroduction";
pub const PROFILE_NAME_CLASS: &str = "frame__chara__name";
pub const PROFILE_WORLD_CLASS: &str = "frame__chara__world";

// Policy
pub const DEATH_PENALTY: f64 = 10.0;
pub const WIPE_PENALTY: f64 = 7.0;
pub const MECHANIC_PENALTY: f64 = 5.0;
pub const DAMAGE_WEIGHT: f64 = 3.0;
pub const HEALING_WEIGHT: f64 = 1.0;
pub const DEFAULT_ACCEPT_THRESHOLD: f64 = -60.0;
pub const DEFAULT_REJECT_THRESHOLD: f64 = -20.0;

// Render
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
pub const RENDER_TIMEOUT_SECS: f64 = 15.0;
/// Upper bound accepted from config.
pub const MAX_RENDER_TIMEOUT_SECS: f64 = 600.0;
pub const POLL_INTERVAL_MS: u64 = 250;
pub const USER_AGENT: &str = concat!("cerberus/", env!("CARGO_PKG_VERSION"));

// Local files
pub const DEFAULT_CONFIG_FILE: &str = "cerberus.json";
pub const STORE_DIR: &str = ".store";
pub const USERS_FILE: &str = "users.csv";
pub const STORE_SEP: char = ',';
pub const LOG_FILE: &str = "debug.log";
pub const AUDIT_FILE: &str = "audit.log";
pub const ROLE_SEP: char = ';';

// Roles
pub const DEFAULT_ROLE: &str = "drs";
