//! Coarse device detection from a `User-Agent` header

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

/// What little we can tell about a client from its user agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            device_type: DeviceType::Desktop,
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
        }
    }
}

const UNKNOWN: &str = "Unknown";

/// Classify a user agent string.
///
/// Matching is substring based and order matters: Chrome user agents also
/// mention Safari, and Android ones also mention Linux.
pub fn parse_device_info(user_agent: &str) -> DeviceInfo {
    let ua = user_agent.to_lowercase();

    let device_type = if ["ipad", "tablet"].iter().any(|m| ua.contains(m)) {
        DeviceType::Tablet
    } else if ["mobile", "android", "iphone"].iter().any(|m| ua.contains(m)) {
        DeviceType::Mobile
    } else {
        DeviceType::Desktop
    };

    let browser = if ua.contains("edg") {
        "Edge"
    } else if ua.contains("chrome") || ua.contains("crios") {
        "Chrome"
    } else if ua.contains("firefox") || ua.contains("fxios") {
        "Firefox"
    } else if ua.contains("safari") {
        "Safari"
    } else if ua.contains("okhttp") || ua.contains("expo") || ua.contains("cfnetwork") {
        "App"
    } else {
        UNKNOWN
    };

    let os = if ua.contains("android") {
        "Android"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ios") {
        "iOS"
    } else if ua.contains("windows") {
        "Windows"
    } else if ua.contains("mac os") || ua.contains("macintosh") {
        "macOS"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        UNKNOWN
    };

    DeviceInfo {
        device_type,
        browser: browser.to_string(),
        os: os.to_string(),
    }
}
