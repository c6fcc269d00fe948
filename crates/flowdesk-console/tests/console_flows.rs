use std::sync::Arc;

use flowdesk_config::OpaquePayload;
use flowdesk_console::{
  ChannelNotifier, ConsoleError, ConsoleEvent, Dashboard, DefinitionBoard, DesignerSession,
  InstanceBoard,
};
use flowdesk_lifecycle::{DefinitionStatus, InstanceOperation, InstanceStatus, LifecycleError};
use flowdesk_store::{MemoryStore, PageRequest, Store};
use flowdesk_workflow::{NodeKind, Violation};

async fn active_definition(store: &Arc<MemoryStore>) -> String {
  let mut designer = DesignerSession::new(store.clone());
  designer.load_sample();
  designer.save_and_activate().await.unwrap().id
}

#[tokio::test]
async fn test_designer_saves_draft_then_updates_it() {
  let store = Arc::new(MemoryStore::new());
  let mut designer = DesignerSession::new(store.clone());

  designer.set_name("Onboarding");
  let greet = designer
    .graph_mut()
    .add_node(NodeKind::HumanTask, "Greet", OpaquePayload::empty());
  let provision = designer
    .graph_mut()
    .add_node(NodeKind::Automated, "Provision", OpaquePayload::empty());
  designer
    .graph_mut()
    .connect(&greet.id, &provision.id)
    .unwrap();

  let created = designer.save().await.unwrap();
  assert_eq!(created.status, DefinitionStatus::Draft);
  assert_eq!(created.version, 1);
  assert_eq!(created.graph().unwrap(), *designer.graph());

  designer.graph_mut().remove_node(&provision.id);
  let updated = designer.save().await.unwrap();
  assert_eq!(updated.id, created.id);
  assert_eq!(updated.graph().unwrap().nodes().len(), 1);
  assert!(updated.graph().unwrap().edges().is_empty());

  let listed = store.list_definitions(PageRequest::default()).await.unwrap();
  assert_eq!(listed.total_elements, 1);
}

#[tokio::test]
async fn test_designer_requires_name() {
  let store = Arc::new(MemoryStore::new());
  let mut designer = DesignerSession::new(store.clone());

  let err = designer.save().await.unwrap_err();
  assert!(matches!(err, ConsoleError::MissingName));
  assert!(designer.notice().is_some());

  designer.dismiss_notice();
  assert!(designer.notice().is_none());
}

#[tokio::test]
async fn test_designer_rejects_invalid_graph() {
  let store = Arc::new(MemoryStore::new());
  let mut designer = DesignerSession::new(store.clone());
  designer.set_name("Broken");

  let mut graph = flowdesk_workflow::sample();
  let mut edges = graph.edges().to_vec();
  edges[0].target = "ghost".to_string();
  graph = flowdesk_workflow::WorkflowGraph::from_parts(graph.nodes().to_vec(), edges);
  *designer.graph_mut() = graph;

  let err = designer.save().await.unwrap_err();
  assert!(matches!(
    err,
    ConsoleError::InvalidGraph(Violation::DanglingEdge { .. })
  ));
  let listed = store.list_definitions(PageRequest::default()).await.unwrap();
  assert!(listed.content.is_empty());
}

#[tokio::test]
async fn test_open_existing_definition() {
  let store = Arc::new(MemoryStore::new());
  let id = active_definition(&store).await;

  let designer = DesignerSession::open(store.clone(), &id).await.unwrap();
  assert_eq!(designer.name(), flowdesk_workflow::SAMPLE_NAME);
  assert_eq!(*designer.graph(), flowdesk_workflow::sample());
  assert_eq!(designer.saved().map(|d| d.status), Some(DefinitionStatus::Active));
}

#[tokio::test]
async fn test_save_and_activate_keeps_draft_when_activation_fails() {
  let store = Arc::new(MemoryStore::new());
  store.fail("activate definition");

  let mut designer = DesignerSession::new(store.clone());
  designer.load_sample();
  let err = designer.save_and_activate().await.unwrap_err();

  let definition_id = match err {
    ConsoleError::ActivationFailed { definition_id, .. } => definition_id,
    other => panic!("unexpected error: {other:?}"),
  };
  let stored = store.get_definition(&definition_id).await.unwrap();
  assert_eq!(stored.status, DefinitionStatus::Draft);
  assert_eq!(designer.saved().map(|d| d.id.as_str()), Some(definition_id.as_str()));
  assert!(designer.notice().is_some());
}

#[tokio::test]
async fn test_definition_board_lifecycle() {
  let store = Arc::new(MemoryStore::new());
  let (notifier, mut events) = ChannelNotifier::new();
  let mut board = DefinitionBoard::with_notifier(store.clone(), PageRequest::default(), notifier);

  let mut designer = DesignerSession::new(store.clone());
  designer.load_sample();
  let id = designer.save().await.unwrap().id;

  board.reload().await.unwrap();
  assert_eq!(board.definitions().len(), 1);

  // Drafts cannot be deactivated.
  let err = board.deactivate(&id).await.unwrap_err();
  assert!(matches!(
    err,
    ConsoleError::Lifecycle(LifecycleError::InvalidTransition { .. })
  ));
  assert!(board.notice().is_some());
  board.dismiss_notice();

  let transition = board.activate(&id).await.unwrap();
  assert!(!transition.is_noop());
  assert_eq!(board.get(&id).map(|d| d.status), Some(DefinitionStatus::Active));

  // Activating again is a no-op and makes no remote call.
  store.fail("activate definition");
  assert!(board.activate(&id).await.unwrap().is_noop());

  board.deactivate(&id).await.unwrap();
  assert_eq!(board.get(&id).map(|d| d.status), Some(DefinitionStatus::Inactive));

  board.delete(&id).await.unwrap();
  assert!(board.definitions().is_empty());

  let mut seen = Vec::new();
  while let Ok(event) = events.try_recv() {
    seen.push(event);
  }
  assert!(matches!(seen[0], ConsoleEvent::NoticeRaised(_)));
  assert!(seen.contains(&ConsoleEvent::DefinitionTransitioned {
    definition_id: id.clone(),
    from: DefinitionStatus::Active,
    to: DefinitionStatus::Inactive,
  }));
  assert!(seen.contains(&ConsoleEvent::DefinitionDeleted { definition_id: id }));
}

#[tokio::test]
async fn test_failed_reload_keeps_cache() {
  let store = Arc::new(MemoryStore::new());
  active_definition(&store).await;

  let mut board = DefinitionBoard::new(store.clone(), PageRequest::default());
  board.reload().await.unwrap();

  store.fail("list definitions");
  assert!(board.reload().await.is_err());
  assert_eq!(board.definitions().len(), 1);
  let notice = board.notice().unwrap();
  assert_eq!(notice.summary, "Failed to load workflow definitions");
}

#[tokio::test]
async fn test_start_requires_active_definition() {
  let store = Arc::new(MemoryStore::new());
  let mut designer = DesignerSession::new(store.clone());
  designer.load_sample();
  let draft_id = designer.save().await.unwrap().id;

  let mut board = InstanceBoard::new(store.clone(), PageRequest::default());
  board.reload().await.unwrap();

  let err = board.start(&draft_id, "first run", None).await.unwrap_err();
  assert!(matches!(
    err,
    ConsoleError::Lifecycle(LifecycleError::DefinitionNotActive {
      status: DefinitionStatus::Draft,
      ..
    })
  ));
  assert!(board.instances().is_empty());
}

#[tokio::test]
async fn test_start_rejects_malformed_context() {
  let store = Arc::new(MemoryStore::new());
  let id = active_definition(&store).await;

  let mut board = InstanceBoard::new(store.clone(), PageRequest::default());
  let err = board
    .start(&id, "run", Some(OpaquePayload::new("{not json")))
    .await
    .unwrap_err();
  assert!(matches!(err, ConsoleError::Payload(_)));
}

#[tokio::test]
async fn test_instance_operations_follow_table() {
  let store = Arc::new(MemoryStore::new());
  let id = active_definition(&store).await;

  let mut board = InstanceBoard::new(store.clone(), PageRequest::default());
  board.reload().await.unwrap();

  let started = board
    .start(&id, "Expense #1", Some(OpaquePayload::new(r#"{"amount": 40}"#)))
    .await
    .unwrap();
  assert_eq!(board.instances().len(), 1);
  assert_eq!(
    board.available_operations(&started.id),
    &[
      InstanceOperation::Suspend,
      InstanceOperation::Complete,
      InstanceOperation::Cancel
    ]
  );

  let err = board.resume(&started.id).await.unwrap_err();
  assert!(matches!(
    err,
    ConsoleError::Lifecycle(LifecycleError::InvalidTransition { .. })
  ));

  board.suspend(&started.id).await.unwrap();
  assert_eq!(
    board.get(&started.id).map(|i| i.status),
    Some(InstanceStatus::Suspended)
  );

  board.resume(&started.id).await.unwrap();
  let completed = board.complete(&started.id).await.unwrap();
  assert_eq!(completed.status, InstanceStatus::Completed);
  assert!(completed.completed_at.is_some());

  let err = board.cancel(&started.id).await.unwrap_err();
  assert!(matches!(
    err,
    ConsoleError::Lifecycle(LifecycleError::TerminalStateViolation {
      status: InstanceStatus::Completed,
      operation: InstanceOperation::Cancel,
    })
  ));
}

#[tokio::test]
async fn test_reload_shows_executor_failure() {
  let store = Arc::new(MemoryStore::new());
  let id = active_definition(&store).await;

  let mut board = InstanceBoard::new(store.clone(), PageRequest::default());
  let started = board.start(&id, "run", None).await.unwrap();
  assert_eq!(
    board.get(&started.id).map(|i| i.status),
    Some(InstanceStatus::Running)
  );

  store.set_instance_status(&started.id, InstanceStatus::Failed);
  board.reload().await.unwrap();

  assert_eq!(
    board.get(&started.id).map(|i| i.status),
    Some(InstanceStatus::Failed)
  );
  assert!(board.available_operations(&started.id).is_empty());
  assert!(matches!(
    board.suspend(&started.id).await,
    Err(ConsoleError::Lifecycle(LifecycleError::TerminalStateViolation { .. }))
  ));
}

#[tokio::test]
async fn test_remote_refusal_raises_notice() {
  let store = Arc::new(MemoryStore::new());
  let id = active_definition(&store).await;

  let mut board = InstanceBoard::new(store.clone(), PageRequest::default());
  let started = board.start(&id, "run", None).await.unwrap();

  store.fail("suspend instance");
  let err = board.suspend(&started.id).await.unwrap_err();
  assert!(matches!(err, ConsoleError::Store(_)));
  assert_eq!(
    board.notice().map(|n| n.summary.as_str()),
    Some("Failed to suspend instance")
  );
  assert_eq!(
    board.get(&started.id).map(|i| i.status),
    Some(InstanceStatus::Running)
  );
}

#[tokio::test]
async fn test_dashboard_and_analytics() {
  let store = Arc::new(MemoryStore::new());
  let id = active_definition(&store).await;

  let mut board = InstanceBoard::new(store.clone(), PageRequest::default());
  let mut ids = Vec::new();
  for i in 0..4 {
    ids.push(board.start(&id, &format!("run {i}"), None).await.unwrap().id);
  }
  for done in &ids[..3] {
    board.complete(done).await.unwrap();
  }

  let mut dashboard = Dashboard::new(store.clone(), PageRequest::default());
  let summary = dashboard.summary().await.unwrap();
  assert_eq!(summary.total_definitions, 1);
  assert_eq!(summary.total_instances, 4);
  assert_eq!(summary.running, 1);
  assert_eq!(summary.completed, 3);

  let report = dashboard.analytics(7).await.unwrap();
  assert_eq!(report.completion_rates[0].completion_rate, 75);
  assert_eq!(report.performance.completed, 3);
  assert_eq!(report.instance_trend.len(), 7);
  assert_eq!(report.instance_trend[6].instances, 4);

  store.fail("list instances");
  assert!(dashboard.summary().await.is_err());
  assert!(dashboard.notice().is_some());
}

#[tokio::test]
async fn test_operation_checks_current_status_not_cache() {
  let store = Arc::new(MemoryStore::new());
  let id = active_definition(&store).await;

  let mut board = InstanceBoard::new(store.clone(), PageRequest::default());
  let started = board.start(&id, "run", None).await.unwrap();

  // The executor fails the run; the board has not reloaded since.
  store.set_instance_status(&started.id, InstanceStatus::Failed);
  assert_eq!(
    board.get(&started.id).map(|i| i.status),
    Some(InstanceStatus::Running)
  );

  let err = board.complete(&started.id).await.unwrap_err();
  assert!(matches!(
    err,
    ConsoleError::Lifecycle(LifecycleError::TerminalStateViolation {
      status: InstanceStatus::Failed,
      operation: InstanceOperation::Complete,
    })
  ));
  let stored = store.get_instance(&started.id).await.unwrap();
  assert_eq!(stored.status, InstanceStatus::Failed);
}

#[tokio::test]
async fn test_activate_checks_current_status_not_cache() {
  let store = Arc::new(MemoryStore::new());
  let id = active_definition(&store).await;

  let mut board = DefinitionBoard::new(store.clone(), PageRequest::default());
  board.reload().await.unwrap();
  assert_eq!(board.get(&id).map(|d| d.status), Some(DefinitionStatus::Active));

  store.deactivate_definition(&id).await.unwrap();

  let transition = board.activate(&id).await.unwrap();
  assert!(!transition.is_noop());
  let stored = store.get_definition(&id).await.unwrap();
  assert_eq!(stored.status, DefinitionStatus::Active);
}

#[tokio::test]
async fn test_instance_paging_keeps_definitions_loaded() {
  let store = Arc::new(MemoryStore::new());
  let id = active_definition(&store).await;
  for i in 0..3 {
    store
      .start_instance(&id, &format!("run {i}"), None)
      .await
      .unwrap();
  }

  let mut board = InstanceBoard::new(store.clone(), PageRequest::new(0, 2));
  board.set_page(PageRequest::new(1, 2));
  board.reload().await.unwrap();

  assert_eq!(board.instances().len(), 1);
  assert_eq!(board.total(), 3);
  assert_eq!(board.definitions().len(), 1);
}
