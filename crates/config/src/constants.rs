pub const TOP_LEVEL_DOMAIN: &str = "org";
pub const AUTHOR: &str = "litsearch";
pub const APP_NAME: &str = "litsearch";

pub const CONFIG_FILE_NAME: &str = "litsearch.toml";

/// Sub-directory of the data directory holding one index per collection
pub const INDEX_DIR_NAME: &str = "fulltext-index";

pub const ENV_CONFIG_DIR: &str = "LITSEARCH_CONFIG_DIR";
pub const ENV_DATA_DIR: &str = "LITSEARCH_DATA_DIR";
pub const ENV_CACHE_DIR: &str = "CACHE_DIRECTORY";
