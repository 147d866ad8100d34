//! NSX-T Manager REST transport.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::api::{DhcpClient, LogicalPortClient, LogicalRouterPortClient, TransportZoneClient};
use crate::config::ManagerConfig;
use crate::error::{ClientError, Result};
use crate::types::{
    DhcpServer, DhcpServerStatus, HeatmapTransportZoneStatus, ListResult, LogicalPort,
    LogicalPortOperationalStatus, LogicalPortStatusSummary, LogicalRouterPort,
    LogicalRouterPortStatisticsSummary, TransportZone, TransportZoneStatus,
};

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Longest error body kept in [`ClientError::Http`].
const MAX_ERROR_BODY: usize = 512;

/// Client for the NSX-T Manager API v1 using HTTP basic authentication.
#[derive(Debug, Clone)]
pub struct NsxtClient {
    http: Client,
    base: Url,
    username: String,
    password: String,
}

impl NsxtClient {
    pub fn new(config: &ManagerConfig) -> Result<Self> {
        let base = Url::parse(&config.url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.url, e)))?;

        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.url.clone()));
        }

        let http = Client::builder()
            .use_rustls_tls()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Build `{base}/api/v1/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let path = url.path().to_string();
        trace!(%path, "NSX-T API request");

        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut end = MAX_ERROR_BODY;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body.truncate(end);
            }
            return Err(ClientError::Http {
                path,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode { path, source })
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        self.get_json(url).await
    }

    /// Fetch every page of a list endpoint.
    async fn list_all<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen: HashSet<String> = HashSet::new();
        let mut pages = 0usize;

        loop {
            let mut url = self.endpoint(segments)?;
            if let Some(cursor) = &cursor {
                url.query_pairs_mut().append_pair("cursor", cursor);
            }

            let page: ListResult<T> = self.get_json(url).await?;
            pages += 1;

            let next = page.next_cursor().map(str::to_string);
            items.extend(page.results);

            match next {
                Some(next) if seen.insert(next.clone()) => cursor = Some(next),
                Some(next) => {
                    warn!(
                        resource = %segments.join("/"),
                        cursor = %next,
                        "Cursor already visited, stopping pagination"
                    );
                    break;
                }
                None => break,
            }
        }

        debug!(
            resource = %segments.join("/"),
            pages,
            count = items.len(),
            "Listed NSX-T resources"
        );

        Ok(items)
    }
}

#[async_trait]
impl TransportZoneClient for NsxtClient {
    async fn list_all_transport_zones(&self) -> Result<Vec<TransportZone>> {
        self.list_all(&["transport-zones"]).await
    }

    async fn get_transport_zone_status(&self, zone_id: &str) -> Result<TransportZoneStatus> {
        self.get(&["transport-zones", zone_id, "status"]).await
    }

    async fn get_heatmap_transport_zone_status(
        &self,
        zone_id: &str,
    ) -> Result<HeatmapTransportZoneStatus> {
        self.get(&["heatmap", "transport-zones", zone_id, "heatmap-status"])
            .await
    }
}

#[async_trait]
impl LogicalPortClient for NsxtClient {
    async fn list_all_logical_ports(&self) -> Result<Vec<LogicalPort>> {
        self.list_all(&["logical-ports"]).await
    }

    async fn get_logical_port_status_summary(&self) -> Result<LogicalPortStatusSummary> {
        self.get(&["logical-ports", "status"]).await
    }

    async fn get_logical_port_operational_status(
        &self,
        port_id: &str,
    ) -> Result<LogicalPortOperationalStatus> {
        self.get(&["logical-ports", port_id, "status"]).await
    }
}

#[async_trait]
impl LogicalRouterPortClient for NsxtClient {
    async fn list_all_logical_router_ports(&self) -> Result<Vec<LogicalRouterPort>> {
        self.list_all(&["logical-router-ports"]).await
    }

    async fn get_logical_router_port_statistics_summary(
        &self,
        port_id: &str,
    ) -> Result<LogicalRouterPortStatisticsSummary> {
        self.get(&["logical-router-ports", port_id, "statistics", "summary"])
            .await
    }
}

#[async_trait]
impl DhcpClient for NsxtClient {
    async fn list_all_dhcp_servers(&self) -> Result<Vec<DhcpServer>> {
        self.list_all(&["dhcp", "servers"]).await
    }

    async fn get_dhcp_server_status(&self, server_id: &str) -> Result<DhcpServerStatus> {
        self.get(&["dhcp", "servers", server_id, "status"]).await
    }
}
