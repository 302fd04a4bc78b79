//! External variable names read by the built-in schema.
//!
//! Names are shared across runtimes unless noted. Internal keys are in `keys`.

// ─── Runtime identity ────────────────────────────────────────────────────────
pub const RUNTIME: &str = "RUNTIME";
pub const NODE_ENV: &str = "NODE_ENV";
pub const DENO_ENV: &str = "DENO_ENV";
pub const WORKER_ENV: &str = "WORKER_ENV";
pub const CLOUD_PLATFORM: &str = "CLOUD_PLATFORM";

// ─── Observability ───────────────────────────────────────────────────────────
pub const LOG_LEVEL: &str = "LOG_LEVEL";

// ─── Blocklists ──────────────────────────────────────────────────────────────
pub const CF_BLOCKLIST_URL: &str = "CF_BLOCKLIST_URL";
pub const CF_LATEST_BLOCKLIST_TIMESTAMP: &str = "CF_LATEST_BLOCKLIST_TIMESTAMP";
pub const CF_DNS_RESOLVER_URL: &str = "CF_DNS_RESOLVER_URL";
pub const CF_ON_INVALID_FLAG_STOP_PROCESSING: &str = "CF_ON_INVALID_FLAG_STOP_PROCESSING";
/// Blocklist download timeout (ms). Also read raw by the worker timeout.
pub const CF_BLOCKLIST_DOWNLOAD_TIMEOUT: &str = "CF_BLOCKLIST_DOWNLOAD_TIMEOUT";
pub const TD_NODE_COUNT: &str = "TD_NODE_COUNT";
pub const TD_PARTS: &str = "TD_PARTS";

// ─── Cache / TLS ─────────────────────────────────────────────────────────────
pub const CACHE_TTL: &str = "CACHE_TTL";
pub const TLS_KEY_PATH: &str = "TLS_KEY_PATH";
pub const TLS_CRT_PATH: &str = "TLS_CRT_PATH";
/// Worker-only.
pub const IS_AGGREGATE_CACHE_REQ: &str = "IS_AGGREGATE_CACHE_REQ";

/// Worker-only base timeout (ms), read straight from global scope.
pub const WORKER_TIMEOUT: &str = "WORKER_TIMEOUT";

/// Internal keys of the built-in schema, plus the derived worker key.
pub mod keys {
    pub const RUN_TIME: &str = "runTime";
    pub const RUN_TIME_ENV: &str = "runTimeEnv";
    pub const CLOUD_PLATFORM: &str = "cloudPlatform";
    pub const LOG_LEVEL: &str = "logLevel";
    pub const BLOCKLIST_URL: &str = "blocklistUrl";
    pub const LATEST_TIMESTAMP: &str = "latestTimestamp";
    pub const DNS_RESOLVER_URL: &str = "dnsResolverUrl";
    pub const ON_INVALID_FLAG_STOP_PROCESSING: &str = "onInvalidFlagStopProcessing";
    pub const FETCH_TIMEOUT: &str = "fetchTimeout";
    pub const TD_NODE_COUNT: &str = "tdNodeCount";
    pub const TD_PARTS: &str = "tdParts";
    pub const CACHE_TTL: &str = "cacheTtl";
    pub const TLS_KEY_PATH: &str = "tlsKeyPath";
    pub const TLS_CRT_PATH: &str = "tlsCrtPath";
    pub const IS_AGG_CACHE_REQ: &str = "isAggCacheReq";

    /// Derived on worker hosts only: WORKER_TIMEOUT + CF_BLOCKLIST_DOWNLOAD_TIMEOUT.
    pub const WORKER_TIMEOUT: &str = "workerTimeout";
}
