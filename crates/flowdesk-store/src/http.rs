use async_trait::async_trait;
use flowdesk_config::{ClientConfig, OpaquePayload};
use flowdesk_lifecycle::{DefinitionStatus, InstanceOperation, InstanceStatus};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::types::{
  DefinitionDraft, InstanceDraft, Page, PageRequest, WorkflowDefinition, WorkflowInstance,
};
use crate::{Error, Store};

const DEFINITIONS: &str = "workflow-definitions";
const INSTANCES: &str = "workflow-instances";

/// Paged endpoints answer with a page envelope; some deployments return the
/// bare array instead.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
  Page(Page<T>),
  List(Vec<T>),
}

impl<T> From<Listing<T>> for Page<T> {
  fn from(listing: Listing<T>) -> Self {
    match listing {
      Listing::Page(page) => page,
      Listing::List(items) => Page::single(items),
    }
  }
}

/// [`Store`] backed by the workflow backend's REST API.
pub struct HttpStore {
  client: Client,
  base_url: Url,
}

impl HttpStore {
  /// Create a store client from configuration.
  pub fn new(config: &ClientConfig) -> Result<Self, Error> {
    let base_url = Url::parse(&config.api_url)
      .map_err(|e| Error::remote("configure store", format!("invalid api url: {}", e)))?;
    if base_url.cannot_be_a_base() {
      return Err(Error::remote(
        "configure store",
        format!("invalid api url: {}", config.api_url),
      ));
    }

    let client = Client::builder()
      .timeout(config.timeout())
      .build()
      .map_err(|e| Error::remote("configure store", e.to_string()))?;

    Ok(Self { client, base_url })
  }

  /// Base URL all request paths are appended to.
  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  async fn send(
    &self,
    operation: &'static str,
    request: RequestBuilder,
  ) -> Result<reqwest::Response, Error> {
    let request = request
      .build()
      .map_err(|e| Error::remote(operation, e.to_string()))?;
    debug!(method = %request.method(), url = %request.url(), operation, "store request");

    let url = request.url().clone();
    let response = self.client.execute(request).await.map_err(|e| {
      warn!(operation, error = %e, "store request failed");
      Error::remote(operation, e.to_string())
    })?;

    let status = response.status();
    debug!(operation, status = status.as_u16(), "store response");

    if status.is_success() {
      return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
      return Err(Error::NotFound(url.path().to_string()));
    }

    let message = response.text().await.unwrap_or_default();
    warn!(operation, status = status.as_u16(), %message, "store rejected request");
    Err(Error::RemoteOperationFailed {
      operation,
      status: Some(status.as_u16()),
      message,
    })
  }

  async fn fetch<T: DeserializeOwned>(
    &self,
    operation: &'static str,
    request: RequestBuilder,
  ) -> Result<T, Error> {
    let response = self.send(operation, request).await?;
    response
      .json()
      .await
      .map_err(|e| Error::remote(operation, format!("invalid response: {}", e)))
  }

  async fn fetch_page<T: DeserializeOwned>(
    &self,
    operation: &'static str,
    request: RequestBuilder,
  ) -> Result<Page<T>, Error> {
    let listing: Listing<T> = self.fetch(operation, request).await?;
    Ok(listing.into())
  }

  async fn fetch_list<T: DeserializeOwned>(
    &self,
    operation: &'static str,
    request: RequestBuilder,
  ) -> Result<Vec<T>, Error> {
    Ok(self.fetch_page(operation, request).await?.content)
  }

  async fn instance_operation(
    &self,
    id: &str,
    operation: InstanceOperation,
  ) -> Result<WorkflowInstance, Error> {
    let name = match operation {
      InstanceOperation::Complete => "complete instance",
      InstanceOperation::Suspend => "suspend instance",
      InstanceOperation::Cancel => "cancel instance",
      InstanceOperation::Resume => "resume instance",
    };
    let request = self
      .client
      .post(self.url(&[INSTANCES, id, operation.as_str()]));
    self.fetch(name, request).await
  }
}

#[async_trait]
impl Store for HttpStore {
  async fn list_definitions(&self, page: PageRequest) -> Result<Page<WorkflowDefinition>, Error> {
    let request = self
      .client
      .get(self.url(&[DEFINITIONS]))
      .query(&[("page", page.page), ("size", page.size)]);
    self.fetch_page("list definitions", request).await
  }

  async fn get_definition(&self, id: &str) -> Result<WorkflowDefinition, Error> {
    let request = self.client.get(self.url(&[DEFINITIONS, id]));
    self.fetch("get definition", request).await
  }

  async fn get_definition_by_name_and_version(
    &self,
    name: &str,
    version: u32,
  ) -> Result<WorkflowDefinition, Error> {
    let version = version.to_string();
    let request = self
      .client
      .get(self.url(&[DEFINITIONS, "name", name, "version", &version]));
    self.fetch("get definition version", request).await
  }

  async fn get_latest_definition(&self, name: &str) -> Result<WorkflowDefinition, Error> {
    let request = self
      .client
      .get(self.url(&[DEFINITIONS, "name", name, "latest"]));
    self.fetch("get latest definition", request).await
  }

  async fn list_definitions_by_name(&self, name: &str) -> Result<Vec<WorkflowDefinition>, Error> {
    let request = self.client.get(self.url(&[DEFINITIONS, "name", name]));
    self.fetch_list("list definitions by name", request).await
  }

  async fn list_definitions_by_status(
    &self,
    status: DefinitionStatus,
  ) -> Result<Vec<WorkflowDefinition>, Error> {
    let request = self
      .client
      .get(self.url(&[DEFINITIONS, "status", status.as_str()]));
    self.fetch_list("list definitions by status", request).await
  }

  #[instrument(skip(self, draft), fields(name = %draft.name))]
  async fn create_definition(&self, draft: &DefinitionDraft) -> Result<WorkflowDefinition, Error> {
    let request = self.client.post(self.url(&[DEFINITIONS])).json(draft);
    self.fetch("create definition", request).await
  }

  #[instrument(skip(self, draft), fields(name = %draft.name))]
  async fn update_definition(
    &self,
    id: &str,
    draft: &DefinitionDraft,
  ) -> Result<WorkflowDefinition, Error> {
    let request = self.client.put(self.url(&[DEFINITIONS, id])).json(draft);
    self.fetch("update definition", request).await
  }

  #[instrument(skip(self))]
  async fn delete_definition(&self, id: &str) -> Result<(), Error> {
    let request = self.client.delete(self.url(&[DEFINITIONS, id]));
    self.send("delete definition", request).await?;
    Ok(())
  }

  #[instrument(skip(self))]
  async fn activate_definition(&self, id: &str) -> Result<WorkflowDefinition, Error> {
    let request = self.client.post(self.url(&[DEFINITIONS, id, "activate"]));
    self.fetch("activate definition", request).await
  }

  #[instrument(skip(self))]
  async fn deactivate_definition(&self, id: &str) -> Result<WorkflowDefinition, Error> {
    let request = self.client.post(self.url(&[DEFINITIONS, id, "deactivate"]));
    self.fetch("deactivate definition", request).await
  }

  async fn list_instances(&self, page: PageRequest) -> Result<Page<WorkflowInstance>, Error> {
    let request = self
      .client
      .get(self.url(&[INSTANCES]))
      .query(&[("page", page.page), ("size", page.size)]);
    self.fetch_page("list instances", request).await
  }

  async fn get_instance(&self, id: &str) -> Result<WorkflowInstance, Error> {
    let request = self.client.get(self.url(&[INSTANCES, id]));
    self.fetch("get instance", request).await
  }

  async fn list_instances_by_definition(
    &self,
    definition_id: &str,
  ) -> Result<Vec<WorkflowInstance>, Error> {
    let request = self
      .client
      .get(self.url(&[INSTANCES, "definition", definition_id]));
    self.fetch_list("list instances by definition", request).await
  }

  async fn list_instances_by_status(
    &self,
    status: InstanceStatus,
  ) -> Result<Vec<WorkflowInstance>, Error> {
    let request = self
      .client
      .get(self.url(&[INSTANCES, "status", status.as_str()]));
    self.fetch_list("list instances by status", request).await
  }

  async fn list_running_instances(&self) -> Result<Vec<WorkflowInstance>, Error> {
    let request = self.client.get(self.url(&[INSTANCES, "running"]));
    self.fetch_list("list running instances", request).await
  }

  #[instrument(skip(self, draft), fields(name = %draft.name))]
  async fn create_instance(&self, draft: &InstanceDraft) -> Result<WorkflowInstance, Error> {
    let request = self.client.post(self.url(&[INSTANCES])).json(draft);
    self.fetch("create instance", request).await
  }

  #[instrument(skip(self, context))]
  async fn start_instance(
    &self,
    definition_id: &str,
    instance_name: &str,
    context: Option<&OpaquePayload>,
  ) -> Result<WorkflowInstance, Error> {
    let mut request = self
      .client
      .post(self.url(&[INSTANCES, "start", definition_id]))
      .query(&[("instanceName", instance_name)]);

    // The context travels as the raw request body, not as a JSON string.
    if let Some(context) = context {
      request = request
        .header(CONTENT_TYPE, "application/json")
        .body(context.as_str().to_string());
    }

    self.fetch("start instance", request).await
  }

  #[instrument(skip(self))]
  async fn update_instance_status(
    &self,
    id: &str,
    status: InstanceStatus,
  ) -> Result<WorkflowInstance, Error> {
    let request = self
      .client
      .put(self.url(&[INSTANCES, id, "status"]))
      .query(&[("status", status.as_str())]);
    self.fetch("update instance status", request).await
  }

  #[instrument(skip(self))]
  async fn complete_instance(&self, id: &str) -> Result<WorkflowInstance, Error> {
    self.instance_operation(id, InstanceOperation::Complete).await
  }

  #[instrument(skip(self))]
  async fn cancel_instance(&self, id: &str) -> Result<WorkflowInstance, Error> {
    self.instance_operation(id, InstanceOperation::Cancel).await
  }

  #[instrument(skip(self))]
  async fn suspend_instance(&self, id: &str) -> Result<WorkflowInstance, Error> {
    self.instance_operation(id, InstanceOperation::Suspend).await
  }

  #[instrument(skip(self))]
  async fn resume_instance(&self, id: &str) -> Result<WorkflowInstance, Error> {
    self.instance_operation(id, InstanceOperation::Resume).await
  }
}
