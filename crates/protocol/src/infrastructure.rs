//! Cloud accounts, providers, database, server and cluster configs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudAccount {
    pub id: u64,
    pub name: String,
    pub provider: String,
    #[serde(rename = "providerId", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<u64>,
    #[serde(rename = "secretId", alias = "accessKey")]
    pub secret_id: String,
    #[serde(rename = "secretKey")]
    pub secret_key: String,
    pub region: String,
    pub description: String,
    pub status: i64,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudProvider {
    pub id: u64,
    pub name: String,
    pub code: String,
    pub description: String,
    /// `enabled` or `disabled`
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub id: u64,
    pub name: String,
    /// mysql, postgresql or mongodb
    #[serde(rename = "type")]
    pub kind: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub description: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// The backend never returns `password` or `private_key`; they are write-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub id: u64,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub private_key: String,
    pub description: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Kubernetes cluster registration with the counters the sync task maintains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct K8sConfig {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub kubeconfig: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<u64>,
    pub provider_name: String,
    pub status: i64,
    /// Seconds between two syncs
    pub sync_interval: u64,
    pub version: String,
    pub context: String,
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    pub node_count: i64,
    pub pod_count: i64,
    pub cpu_total: String,
    pub cpu_used: String,
    pub memory_total: String,
    pub memory_used: String,
    pub workload_count: i64,
    pub workload_running: i64,
    pub workload_idle: i64,
    pub pod_total: i64,
    pub pod_running: i64,
    pub pod_error: i64,
    pub node_total: i64,
    pub node_running: i64,
    pub node_error: i64,
    pub last_sync_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// `POST /k8s-configs/test` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubeconfigTest {
    pub config_content: String,
}
