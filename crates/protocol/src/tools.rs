//! Payloads of the tool endpoints

use serde::{Deserialize, Serialize};

/// Reply of `GET /tools/ip/{ip}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpLocation {
    pub ip: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub isp: String,
    pub latitude: f64,
    pub longitude: f64,
}
