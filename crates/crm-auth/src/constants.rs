//! Session storage keys and auth endpoint defaults
//!
//! The key names are shared with the mobile application's local storage, so
//! a session written by either side is readable by the other.

/// Storage key holding the current access token
pub const ACCESS_TOKEN_KEY: &str = "authToken";

/// Storage key holding the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Storage key holding the JSON-encoded user profile
pub const USER_KEY: &str = "userData";

/// Every key removed when a session ends
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

/// Refresh endpoint path, relative to the API base address
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh";
