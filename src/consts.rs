pub mod binding_consts {
    //! Data Binding Configuration Constants
    //!
    //! This module contains all configuration constants for the dashboard
    //! binding layer, organized by functional area.

    // =============================================================================
    // CACHE CONFIGURATION
    // =============================================================================

    /// Default time-to-live of a cached data source result (milliseconds)
    pub const DEFAULT_CACHE_TTL_MS: u64 = 30_000;

    /// Dot path extracted from a response envelope when none is configured
    pub const DEFAULT_DATA_PATH: &str = "data";

    // =============================================================================
    // REFRESH CONFIGURATION
    // =============================================================================

    /// Default auto-refresh interval (milliseconds)
    pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 30_000;

    /// Maximum number of events buffered between the manager and its consumer
    pub const EVENT_QUEUE_SIZE: usize = 100;

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    /// HTTP client configuration
    pub mod http {
        use std::time::Duration;

        /// Total and connect timeout for outbound calls (seconds)
        pub const REQUEST_TIMEOUT_SECS: u64 = 10;

        /// Base path of the first API group
        pub const API_V1_PREFIX: &str = "/api/v1";

        /// Base path of the second API group
        pub const API_V2_PREFIX: &str = "/api/v2";

        /// Authentication endpoint, called without a bearer token
        pub const AUTH_ENDPOINT: &str = "/token";

        /// Helper function to get the request timeout
        pub const fn request_timeout() -> Duration {
            Duration::from_secs(REQUEST_TIMEOUT_SECS)
        }
    }

    // =============================================================================
    // FILE LOCATIONS
    // =============================================================================

    /// Directory under $HOME holding the CLI's files
    pub const CONFIG_DIR: &str = ".dashboard-binding";

    /// Session (token store) file name
    pub const SESSION_FILE: &str = "session.json";

    /// Dashboard configuration file name
    pub const DASHBOARD_FILE: &str = "dashboard.json";
}
