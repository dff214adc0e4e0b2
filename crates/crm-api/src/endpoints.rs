//! API endpoint paths, relative to the configured base URL

pub const LOGIN: &str = "/api/token/";
pub const REGISTER: &str = "/api/auth/register";
pub const LOGOUT: &str = "/api/auth/logout";
pub const FORGOT_PASSWORD: &str = "/api/auth/forgot-password";
pub const RESET_PASSWORD: &str = "/api/auth/reset-password";

pub const USER_PROFILE: &str = "/api/user/profile";
pub const CHANGE_PASSWORD: &str = "/api/user/change-password";

pub const CUSTOMERS: &str = "/customers";
pub const CUSTOMER_SEARCH: &str = "/customers/search";

pub fn customer(id: &str) -> String {
    format!("{CUSTOMERS}/{id}")
}

pub const LEADS: &str = "/leads";

pub fn lead(id: &str) -> String {
    format!("{LEADS}/{id}")
}

pub fn lead_convert(id: &str) -> String {
    format!("{LEADS}/{id}/convert")
}

pub const DASHBOARD_STATS: &str = "/dashboard/stats";
pub const DASHBOARD_RECENT_ACTIVITIES: &str = "/dashboard/recent-activities";
pub const DASHBOARD_CHARTS: &str = "/dashboard/charts";

pub const NOTIFICATIONS: &str = "/notifications";
pub const NOTIFICATIONS_MARK_ALL_READ: &str = "/notifications/mark-all-read";

pub fn notification_read(id: &str) -> String {
    format!("{NOTIFICATIONS}/{id}/read")
}
