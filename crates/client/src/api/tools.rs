//! Utility endpoints

use eden_console_protocol::IpLocation;

use super::endpoint;
use crate::error::{RequestError, Result};
use crate::session::SessionController;
use crate::transport::{segment, ApiRequest};

pub struct ToolsApi<'a> {
    session: &'a SessionController,
}

impl<'a> ToolsApi<'a> {
    pub const fn new(session: &'a SessionController) -> Self {
        Self { session }
    }

    /// Geolocation of an IP address
    pub async fn locate_ip(&self, ip: &str) -> Result<IpLocation> {
        let ip = ip.trim();
        if ip.parse::<std::net::IpAddr>().is_err() {
            return Err(self
                .session
                .reject(RequestError::Validation(format!("not an IP address: {ip:?}"))));
        }
        let path = format!("{}/{}", endpoint("tools/ip"), segment(ip));
        self.session.fetch(&ApiRequest::get(path)).await
    }
}
