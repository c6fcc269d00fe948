use flowdesk_config::{ClientConfig, OpaquePayload};
use flowdesk_lifecycle::{DefinitionStatus, InstanceStatus};
use flowdesk_store::{DefinitionDraft, Error, HttpStore, PageRequest, Store};
use serde_json::json;
use wiremock::matchers::{body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, HttpStore) {
  let server = MockServer::start().await;
  let config = ClientConfig {
    api_url: format!("{}/api", server.uri()),
    ..ClientConfig::default()
  };
  let store = HttpStore::new(&config).unwrap();
  (server, store)
}

fn definition_json(id: &str, status: &str) -> serde_json::Value {
  json!({
    "id": id,
    "name": "Expenses",
    "description": "Expense approval",
    "version": 1,
    "status": status,
    "definition": r#"{"nodes":[],"edges":[]}"#,
    "createdAt": "2024-03-01T09:30:00",
    "updatedAt": "2024-03-01T09:30:00"
  })
}

fn instance_json(id: &str, status: &str) -> serde_json::Value {
  json!({
    "id": id,
    "name": "Expense #1",
    "workflowDefinition": { "id": "d-1" },
    "status": status,
    "currentStep": "Start Process",
    "startedAt": "2024-03-01T10:00:00"
  })
}

#[tokio::test]
async fn test_list_definitions_sends_paging() {
  let (server, store) = setup().await;

  Mock::given(method("GET"))
    .and(path("/api/workflow-definitions"))
    .and(query_param("page", "2"))
    .and(query_param("size", "5"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "content": [definition_json("d-1", "ACTIVE")],
      "totalElements": 11,
      "totalPages": 3,
      "number": 2,
      "size": 5
    })))
    .expect(1)
    .mount(&server)
    .await;

  let page = store.list_definitions(PageRequest::new(2, 5)).await.unwrap();
  assert_eq!(page.content.len(), 1);
  assert_eq!(page.total_elements, 11);
  assert_eq!(page.content[0].status, DefinitionStatus::Active);
}

#[tokio::test]
async fn test_bare_array_listing_is_one_page() {
  let (server, store) = setup().await;

  Mock::given(method("GET"))
    .and(path("/api/workflow-instances"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      instance_json("i-1", "RUNNING"),
      instance_json("i-2", "FAILED")
    ])))
    .mount(&server)
    .await;

  let page = store.list_instances(PageRequest::default()).await.unwrap();
  assert_eq!(page.total_elements, 2);
  assert_eq!(page.content[1].status, InstanceStatus::Failed);
}

#[tokio::test]
async fn test_create_definition_posts_draft() {
  let (server, store) = setup().await;

  Mock::given(method("POST"))
    .and(path("/api/workflow-definitions"))
    .respond_with(ResponseTemplate::new(200).set_body_json(definition_json("d-9", "DRAFT")))
    .expect(1)
    .mount(&server)
    .await;

  let draft = DefinitionDraft::from_graph("Expenses", None, &flowdesk_workflow::sample()).unwrap();
  let created = store.create_definition(&draft).await.unwrap();
  assert_eq!(created.id, "d-9");

  let requests = server.received_requests().await.unwrap();
  let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
  assert_eq!(body["name"], "Expenses");
  assert_eq!(body["status"], "DRAFT");
  assert!(body["definition"].is_string());
}

#[tokio::test]
async fn test_activate_posts_to_operation_path() {
  let (server, store) = setup().await;

  Mock::given(method("POST"))
    .and(path("/api/workflow-definitions/d-1/activate"))
    .respond_with(ResponseTemplate::new(200).set_body_json(definition_json("d-1", "ACTIVE")))
    .expect(1)
    .mount(&server)
    .await;

  let activated = store.activate_definition("d-1").await.unwrap();
  assert_eq!(activated.status, DefinitionStatus::Active);
}

#[tokio::test]
async fn test_start_instance_sends_raw_context() {
  let (server, store) = setup().await;

  Mock::given(method("POST"))
    .and(path("/api/workflow-instances/start/d-1"))
    .and(query_param("instanceName", "Expense #1"))
    .and(body_string(r#"{"amount": 120}"#))
    .respond_with(ResponseTemplate::new(200).set_body_json(instance_json("i-1", "RUNNING")))
    .expect(1)
    .mount(&server)
    .await;

  let context = OpaquePayload::new(r#"{"amount": 120}"#);
  let started = store
    .start_instance("d-1", "Expense #1", Some(&context))
    .await
    .unwrap();
  assert_eq!(started.status, InstanceStatus::Running);
  assert_eq!(started.definition_id(), Some("d-1"));
}

#[tokio::test]
async fn test_update_status_uses_query() {
  let (server, store) = setup().await;

  Mock::given(method("PUT"))
    .and(path("/api/workflow-instances/i-1/status"))
    .and(query_param("status", "FAILED"))
    .respond_with(ResponseTemplate::new(200).set_body_json(instance_json("i-1", "FAILED")))
    .expect(1)
    .mount(&server)
    .await;

  let updated = store
    .update_instance_status("i-1", InstanceStatus::Failed)
    .await
    .unwrap();
  assert_eq!(updated.status, InstanceStatus::Failed);
}

#[tokio::test]
async fn test_suspend_posts_to_operation_path() {
  let (server, store) = setup().await;

  Mock::given(method("POST"))
    .and(path("/api/workflow-instances/i-1/suspend"))
    .respond_with(ResponseTemplate::new(200).set_body_json(instance_json("i-1", "SUSPENDED")))
    .expect(1)
    .mount(&server)
    .await;

  let suspended = store.suspend_instance("i-1").await.unwrap();
  assert_eq!(suspended.status, InstanceStatus::Suspended);
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
  let (server, store) = setup().await;

  Mock::given(method("GET"))
    .and(path("/api/workflow-definitions/missing"))
    .respond_with(ResponseTemplate::new(404))
    .mount(&server)
    .await;

  let err = store.get_definition("missing").await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_server_error_is_remote_failure() {
  let (server, store) = setup().await;

  Mock::given(method("POST"))
    .and(path("/api/workflow-instances/start/d-1"))
    .respond_with(
      ResponseTemplate::new(500)
        .set_body_string("Cannot start instance from inactive workflow definition"),
    )
    .mount(&server)
    .await;

  let err = store.start_instance("d-1", "run", None).await.unwrap_err();
  match err {
    Error::RemoteOperationFailed {
      operation,
      status,
      message,
    } => {
      assert_eq!(operation, "start instance");
      assert_eq!(status, Some(500));
      assert!(message.contains("inactive"));
    }
    other => panic!("unexpected error: {other:?}"),
  }
}

#[tokio::test]
async fn test_unreachable_store_is_remote_failure() {
  let config = ClientConfig {
    api_url: "http://127.0.0.1:1/api".to_string(),
    ..ClientConfig::default()
  };
  let store = HttpStore::new(&config).unwrap();

  let err = store.list_running_instances().await.unwrap_err();
  assert!(matches!(
    err,
    Error::RemoteOperationFailed { status: None, .. }
  ));
}

#[tokio::test]
async fn test_delete_definition() {
  let (server, store) = setup().await;

  Mock::given(method("DELETE"))
    .and(path("/api/workflow-definitions/d-1"))
    .respond_with(ResponseTemplate::new(204))
    .expect(1)
    .mount(&server)
    .await;

  store.delete_definition("d-1").await.unwrap();
}
