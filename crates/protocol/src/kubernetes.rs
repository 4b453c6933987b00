//! Kubernetes resource views and their list filters
//!
//! Workloads, pods and nodes are snapshots the backend sync task keeps in its
//! own database; history records are the archived copies of deleted ones.
//! The history endpoints answer with bare JSON bodies instead of the usual
//! envelope, which is why their reply types carry their own `data` field.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::paging::{null_as_empty, PageQuery};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct K8sWorkload {
    pub id: u64,
    #[serde(alias = "configId")]
    pub config_id: u64,
    pub name: String,
    pub namespace: String,
    pub kind: String,
    pub replicas: i64,
    #[serde(alias = "readyReplicas")]
    pub ready_replicas: i64,
    pub status: String,
    /// `ready/total` as rendered by the backend
    pub pod_status: String,
    pub cpu_request_limits: String,
    pub memory_request_limits: String,
    #[serde(deserialize_with = "image_list")]
    pub images: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Image references of a workload.
///
/// List replies carry a JSON array; the stored row keeps the same array
/// serialized into a string, which the detail reply passes through as is.
fn image_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Images {
        List(Vec<String>),
        Text(String),
    }

    Ok(match Option::<Images>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Images::List(list)) => list,
        Some(Images::Text(text)) if text.trim().is_empty() => Vec::new(),
        Some(Images::Text(text)) => {
            serde_json::from_str(&text).unwrap_or_else(|_| vec![text])
        }
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct K8sPod {
    pub id: u64,
    pub config_id: u64,
    pub workload_id: Option<u64>,
    pub name: String,
    pub namespace: String,
    pub workload_name: String,
    pub workload_kind: String,
    pub status: String,
    pub phase: String,
    pub node_name: String,
    pub pod_ip: String,
    pub host_ip: String,
    pub instance_ip: String,
    pub cpu_request_limits: String,
    pub memory_request_limits: String,
    pub restart_count: i64,
    pub running_time: String,
    pub start_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct K8sNode {
    pub id: u64,
    pub config_id: u64,
    pub name: String,
    #[serde(rename = "internalIP")]
    pub internal_ip: String,
    #[serde(rename = "externalIP")]
    pub external_ip: String,
    pub hostname: String,
    pub os_image: String,
    pub kernel_version: String,
    pub container_runtime: String,
    pub kubelet_version: String,
    pub cpu_capacity: String,
    pub memory_capacity: String,
    pub pods_capacity: String,
    pub cpu_usage: String,
    pub memory_usage: String,
    pub pods_usage: i64,
    pub status: String,
    pub ready: bool,
    pub schedulable: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Summary row of the per-cluster controller listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSummary {
    pub name: String,
    pub namespace: String,
    pub replicas: i64,
    pub ready_replicas: i64,
    pub desired_number_scheduled: i64,
    pub number_ready: i64,
    pub completions: i64,
    pub succeeded: i64,
    pub schedule: String,
    pub last_schedule: String,
    pub created_at: String,
}

/// Controller families exposed under `/k8s-configs/{id}/...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    Deployments,
    StatefulSets,
    DaemonSets,
    Jobs,
    CronJobs,
}

impl ControllerKind {
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Deployments => "deployments",
            Self::StatefulSets => "statefulsets",
            Self::DaemonSets => "daemonsets",
            Self::Jobs => "jobs",
            Self::CronJobs => "cronjobs",
        }
    }
}

/// Filters of `GET /k8s-workloads`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_type: Option<String>,
}

/// Filters of `GET /k8s-pods`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Filters of `GET /k8s-nodes`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Archived record families under `/api/k8s-history/{configId}/{kind}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Pods,
    Nodes,
    Workloads,
}

impl HistoryKind {
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Pods => "pods",
            Self::Nodes => "nodes",
            Self::Workloads => "workloads",
        }
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Time-bounded page of history records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Archived copy of a pod, node or workload. Fields outside the common set
/// are kept as raw JSON since they differ per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryRecord {
    pub id: u64,
    pub original_id: u64,
    pub config_id: u64,
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub archived_at: String,
    pub archive_reason: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Bare body of the history list endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryPage {
    #[serde(deserialize_with = "null_as_empty")]
    pub data: Vec<HistoryRecord>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryStatistics {
    pub pod_history_count: i64,
    pub node_history_count: i64,
    pub workload_history_count: i64,
    pub total_history_count: i64,
    pub last_archived_at: Option<String>,
}

/// Bare body of the statistics endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryStatisticsReply {
    pub data: HistoryStatistics,
}

/// `POST /api/k8s-history/cleanup` body; the date is `YYYY-MM-DD`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryCleanup {
    pub before_date: String,
}

/// Bare body of the cleanup endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupReply {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_query_flattens_page() {
        let query = WorkloadQuery {
            page: PageQuery::new(1, 3),
            config_id: Some(1),
            ..WorkloadQuery::default()
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "page": 1, "pageSize": 3, "configId": 1 })
        );
    }

    #[test]
    fn test_history_record_keeps_kind_specific_fields() {
        let record: HistoryRecord = serde_json::from_value(serde_json::json!({
            "id": 9,
            "original_id": 4,
            "config_id": 1,
            "name": "web-7d9f",
            "namespace": "default",
            "status": "Terminated",
            "restart_count": 3,
            "archived_at": "2024-05-01 10:00:00",
            "archive_reason": "sync_cleanup"
        }))
        .unwrap();

        assert_eq!(record.original_id, 4);
        assert_eq!(record.extra["restart_count"], 3);
    }

    #[test]
    fn test_workload_images_from_list_and_detail() {
        let listed: K8sWorkload = serde_json::from_value(serde_json::json!({
            "name": "web",
            "images": ["nginx:1.25", "envoy:v1.30"]
        }))
        .unwrap();
        assert_eq!(listed.images, ["nginx:1.25", "envoy:v1.30"]);

        let detail: K8sWorkload =
            serde_json::from_str(r#"{"name":"web","images":"[\"nginx:1.25\"]"}"#).unwrap();
        assert_eq!(detail.images, ["nginx:1.25"]);

        let bare: K8sWorkload = serde_json::from_str(r#"{"images":"redis:7"}"#).unwrap();
        assert_eq!(bare.images, ["redis:7"]);

        let none: K8sWorkload = serde_json::from_str(r#"{"images":null}"#).unwrap();
        assert!(none.images.is_empty());
        let missing: K8sWorkload = serde_json::from_str(r#"{"name":"web"}"#).unwrap();
        assert!(missing.images.is_empty());
    }

    #[test]
    fn test_node_ip_field_names() {
        let node: K8sNode =
            serde_json::from_str(r#"{"name":"n1","internalIP":"10.0.0.4","ready":true}"#).unwrap();
        assert_eq!(node.internal_ip, "10.0.0.4");
        assert!(node.ready);
    }
}
