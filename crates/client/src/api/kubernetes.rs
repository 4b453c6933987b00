//! Kubernetes cluster configs, resource views and archived history

use std::ops::Deref;

use eden_console_protocol::{
    CleanupReply, ControllerKind, ControllerSummary, HistoryCleanup, HistoryKind, HistoryPage,
    HistoryQuery, HistoryStatistics, HistoryStatisticsReply, K8sConfig, K8sNode, K8sPod,
    K8sWorkload, KubeconfigTest, NodeQuery, PageQuery, PageResult, PodQuery, WorkloadQuery,
};

use super::{accept_page, collection, endpoint, Resource};
use crate::error::{RequestError, Result};
use crate::session::SessionController;
use crate::transport::ApiRequest;

/// History endpoints live outside `/api/v1` and answer without an envelope
pub const HISTORY_PREFIX: &str = "/api/k8s-history";

pub struct K8sConfigsApi<'a> {
    resource: Resource<'a, K8sConfig>,
}

impl<'a> K8sConfigsApi<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            resource: Resource::new(session, "k8s-configs"),
        }
    }

    /// Validate kubeconfig content without saving it
    pub async fn test(&self, config_content: &str) -> Result<()> {
        let request = ApiRequest::post(format!("{}/test", self.path())).json(&KubeconfigTest {
            config_content: config_content.to_string(),
        })?;
        self.session().execute(&request).await
    }

    /// Cluster list with workload, pod and node counters filled in
    pub async fn with_workload_count(&self, page: &PageQuery) -> Result<PageResult<K8sConfig>> {
        accept_page(self.session(), page)?;
        let request =
            ApiRequest::get(format!("{}/with-workload-count", self.path())).query(page)?;
        let reply: Option<PageResult<K8sConfig>> =
            self.session().request(&request).await?.into_data();
        Ok(reply.unwrap_or_default())
    }

    pub async fn workloads(&self, id: u64) -> Result<Vec<K8sWorkload>> {
        let path = format!("{}/workloads", self.item_path(id));
        collection(self.session(), &ApiRequest::get(path)).await
    }

    /// Live controller listing of one family
    pub async fn controllers(&self, id: u64, kind: ControllerKind) -> Result<Vec<ControllerSummary>> {
        let path = format!("{}/{}", self.item_path(id), kind.path_segment());
        collection(self.session(), &ApiRequest::get(path)).await
    }

    pub async fn deployments(&self, id: u64) -> Result<Vec<ControllerSummary>> {
        self.controllers(id, ControllerKind::Deployments).await
    }

    pub async fn statefulsets(&self, id: u64) -> Result<Vec<ControllerSummary>> {
        self.controllers(id, ControllerKind::StatefulSets).await
    }

    pub async fn daemonsets(&self, id: u64) -> Result<Vec<ControllerSummary>> {
        self.controllers(id, ControllerKind::DaemonSets).await
    }

    pub async fn jobs(&self, id: u64) -> Result<Vec<ControllerSummary>> {
        self.controllers(id, ControllerKind::Jobs).await
    }

    pub async fn cronjobs(&self, id: u64) -> Result<Vec<ControllerSummary>> {
        self.controllers(id, ControllerKind::CronJobs).await
    }
}

impl<'a> Deref for K8sConfigsApi<'a> {
    type Target = Resource<'a, K8sConfig>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

/// Read-only view of synced workloads
pub struct WorkloadsApi<'a> {
    resource: Resource<'a, K8sWorkload>,
}

impl<'a> WorkloadsApi<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            resource: Resource::new(session, "k8s-workloads"),
        }
    }

    pub async fn list(&self, query: &WorkloadQuery) -> Result<PageResult<K8sWorkload>> {
        accept_page(self.resource.session(), &query.page)?;
        self.resource.list_by(query).await
    }

    pub async fn get(&self, id: u64) -> Result<K8sWorkload> {
        self.resource.get(id).await
    }
}

/// Read-only view of synced pods
pub struct PodsApi<'a> {
    resource: Resource<'a, K8sPod>,
}

impl<'a> PodsApi<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            resource: Resource::new(session, "k8s-pods"),
        }
    }

    pub async fn list(&self, query: &PodQuery) -> Result<PageResult<K8sPod>> {
        accept_page(self.resource.session(), &query.page)?;
        self.resource.list_by(query).await
    }

    pub async fn get(&self, id: u64) -> Result<K8sPod> {
        self.resource.get(id).await
    }
}

/// Synced nodes; removing one only drops the stored snapshot
pub struct NodesApi<'a> {
    resource: Resource<'a, K8sNode>,
}

impl<'a> NodesApi<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            resource: Resource::new(session, "k8s-nodes"),
        }
    }

    pub async fn list(&self, query: &NodeQuery) -> Result<PageResult<K8sNode>> {
        accept_page(self.resource.session(), &query.page)?;
        self.resource.list_by(query).await
    }

    pub async fn get(&self, id: u64) -> Result<K8sNode> {
        self.resource.get(id).await
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.resource.delete(id).await
    }
}

pub struct NamespacesApi<'a> {
    session: &'a SessionController,
}

impl<'a> NamespacesApi<'a> {
    pub const fn new(session: &'a SessionController) -> Self {
        Self { session }
    }

    /// Namespace names seen in one cluster
    pub async fn list(&self, config_id: u64) -> Result<Vec<String>> {
        let request = ApiRequest::get(endpoint("k8s-namespaces")).param("configId", config_id);
        collection(self.session, &request).await
    }
}

pub struct HistoryApi<'a> {
    session: &'a SessionController,
}

impl<'a> HistoryApi<'a> {
    pub const fn new(session: &'a SessionController) -> Self {
        Self { session }
    }

    /// Archived records of one kind within an optional time window
    pub async fn list(
        &self,
        config_id: u64,
        kind: HistoryKind,
        query: &HistoryQuery,
    ) -> Result<HistoryPage> {
        accept_page(self.session, &query.page)?;
        let request = ApiRequest::get(format!("{HISTORY_PREFIX}/{config_id}/{kind}"))
            .query(query)?
            .bare();
        self.session.fetch(&request).await
    }

    pub async fn statistics(&self, config_id: u64) -> Result<HistoryStatistics> {
        let request = ApiRequest::get(format!("{HISTORY_PREFIX}/{config_id}/statistics")).bare();
        let reply: HistoryStatisticsReply = self.session.fetch(&request).await?;
        Ok(reply.data)
    }

    /// Drop archived records older than `before_date` (`YYYY-MM-DD`).
    /// Returns the server's summary message.
    pub async fn cleanup(&self, before_date: &str) -> Result<String> {
        if !is_iso_date(before_date) {
            return Err(self.session.reject(RequestError::Validation(format!(
                "beforeDate must be YYYY-MM-DD, got {before_date:?}"
            ))));
        }
        let request = ApiRequest::post(format!("{HISTORY_PREFIX}/cleanup"))
            .json(&HistoryCleanup {
                before_date: before_date.to_string(),
            })?
            .bare();
        let reply: CleanupReply = self.session.fetch(&request).await?;
        Ok(reply.message)
    }
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
