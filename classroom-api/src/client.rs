use std::sync::Arc;

use anyhow::Result;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tower::{Service, ServiceExt};
use tracing::trace;

use crate::assignment::{Assignment, AssignmentId};
use crate::classroom::{Classroom, ClassroomId};
use crate::creds::CredentialProvider;
use crate::error::{FetchError, RemoteResource};
use crate::pull_request::{PullRequest, PullRequestState};
use crate::services::fetch_service::{self, http_client, ApiRequest, Endpoint, FetchService};
use crate::submission::AcceptedAssignment;
use crate::types::RepoFullName;
use crate::util::{accepted_assignments_path, assignments_path, classroom_path, pulls_path};

/// Builds a client for the GitHub Classroom API rooted at `base_url`.
pub fn client(
    creds: impl CredentialProvider + 'static,
    base_url: &str,
) -> Result<Client<impl FetchService>> {
    let endpoint = Endpoint::github(base_url, Arc::new(creds))?;
    Ok(Client::new(fetch_service::service(http_client()?, endpoint)))
}

/// Typed access to one upstream API. Requests are issued strictly one after another.
pub struct Client<Service> {
    service: Mutex<Service>,
}

impl<S: FetchService> Client<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Mutex::new(service),
        }
    }

    /// Fetches a single resource. The JSON body is returned verbatim; any failure, including a
    /// non-success status, is the error side of the result.
    #[tracing::instrument(level = "debug", skip(self, request), fields(%request))]
    pub async fn fetch(&self, request: ApiRequest) -> RemoteResource {
        let mut service = self.service.lock().await;
        service.ready().await?.call(request).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, FetchError> {
        let value = self.fetch(request).await?;
        trace!(%value, "fetched resource");
        Ok(serde_json::from_value(value)?)
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn get_classrooms(&self) -> Result<Vec<Classroom>, FetchError> {
        self.get_json(ApiRequest::get(["classrooms"])).await
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn get_classroom(&self, classroom: ClassroomId) -> Result<Classroom, FetchError> {
        self.get_json(ApiRequest::get_path(&classroom_path(classroom)))
            .await
    }

    /// Every assignment in the classroom. Only the first page the API returns is read.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_assignments(
        &self,
        classroom: ClassroomId,
    ) -> Result<Vec<Assignment>, FetchError> {
        self.get_json(ApiRequest::get_path(&assignments_path(classroom)))
            .await
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn get_accepted_assignments(
        &self,
        assignment: AssignmentId,
    ) -> Result<Vec<AcceptedAssignment>, FetchError> {
        self.get_json(ApiRequest::get_path(&accepted_assignments_path(assignment)))
            .await
    }

    /// Closed pull requests on `repository`, filtered server side.
    #[tracing::instrument(skip(self, repository), fields(%repository), err)]
    pub async fn get_closed_pull_requests(
        &self,
        repository: &RepoFullName,
    ) -> Result<Vec<PullRequest>, FetchError> {
        let request = ApiRequest::get_path(&pulls_path(repository))
            .with_query("state", PullRequestState::Closed.as_str());
        self.get_json(request).await
    }
}
