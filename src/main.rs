use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use flowdesk_config::{ClientConfig, GraphDef, OpaquePayload};
use flowdesk_console::{Dashboard, DefinitionBoard, DesignerSession, InstanceBoard, TREND_DAYS};
use flowdesk_lifecycle::{DefinitionStatus, InstanceOperation, InstanceStatus};
use flowdesk_store::{HttpStore, PageRequest, Store};
use flowdesk_workflow::codec;

/// Flowdesk - author, launch and monitor workflows on a remote workflow store
#[derive(Parser)]
#[command(name = "flowdesk")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the config file (default: <config dir>/flowdesk/config.toml)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Base URL of the store API
  #[arg(long, global = true, env = "FLOWDESK_API_URL")]
  api_url: Option<String>,

  /// Log at debug level
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Manage workflow definitions
  Definitions {
    #[command(subcommand)]
    command: DefinitionCommand,
  },

  /// Start and drive workflow instances
  Instances {
    #[command(subcommand)]
    command: InstanceCommand,
  },

  /// Show dashboard figures and analytics
  Analytics {
    #[command(subcommand)]
    command: AnalyticsCommand,
  },

  /// Work with graph payload files offline
  Graph {
    #[command(subcommand)]
    command: GraphCommand,
  },
}

#[derive(Args)]
struct PageArgs {
  /// Zero-based page index
  #[arg(long, default_value_t = 0)]
  page: u32,

  /// Page size (default: from config)
  #[arg(long)]
  size: Option<u32>,
}

#[derive(Subcommand)]
enum DefinitionCommand {
  /// List definitions
  List {
    #[command(flatten)]
    page: PageArgs,

    /// Only definitions in this status
    #[arg(long)]
    status: Option<DefinitionStatus>,
  },

  /// Show one definition
  Get {
    id: String,
  },

  /// Show every version of a named definition, or one version of it
  Versions {
    name: String,

    /// Only this version
    #[arg(long, conflicts_with = "latest")]
    version: Option<u32>,

    /// Only the highest version
    #[arg(long)]
    latest: bool,
  },

  /// Create a definition from a graph payload file
  Create {
    /// Path to the graph payload (JSON), or `-` for stdin
    graph_file: PathBuf,

    #[arg(long)]
    name: String,

    #[arg(long)]
    description: Option<String>,

    /// Activate the definition after saving it
    #[arg(long)]
    activate: bool,
  },

  /// Replace a definition's graph with a payload file
  Update {
    id: String,

    /// Path to the graph payload (JSON), or `-` for stdin
    graph_file: PathBuf,

    /// New name
    #[arg(long)]
    name: Option<String>,

    /// New description
    #[arg(long)]
    description: Option<String>,
  },

  /// Activate a definition
  Activate {
    id: String,
  },

  /// Deactivate a definition
  Deactivate {
    id: String,
  },

  /// Delete a definition
  Delete {
    id: String,
  },
}

#[derive(Subcommand)]
enum InstanceCommand {
  /// List instances
  List {
    #[command(flatten)]
    page: PageArgs,

    /// Only instances in this status
    #[arg(long, conflicts_with = "definition")]
    status: Option<InstanceStatus>,

    /// Only instances of this definition
    #[arg(long)]
    definition: Option<String>,
  },

  /// Show one instance
  Get {
    id: String,
  },

  /// Start an instance of an active definition
  Start {
    definition_id: String,

    #[arg(long)]
    name: String,

    /// Context JSON; read from stdin when omitted and stdin is not a terminal
    #[arg(long)]
    context: Option<String>,
  },

  /// Complete a running instance
  Complete {
    id: String,
  },

  /// Cancel a running or suspended instance
  Cancel {
    id: String,
  },

  /// Suspend a running instance
  Suspend {
    id: String,
  },

  /// Resume a suspended instance
  Resume {
    id: String,
  },
}

#[derive(Subcommand)]
enum AnalyticsCommand {
  /// Totals and the most recent instances
  Dashboard,

  /// Completion rates, performance, status distribution and trend
  Report {
    /// Days covered by the instance trend
    #[arg(long, default_value_t = TREND_DAYS)]
    days: u32,
  },
}

#[derive(Subcommand)]
enum GraphCommand {
  /// Check a graph payload file
  Validate {
    /// Path to the graph payload (JSON), or `-` for stdin
    graph_file: PathBuf,
  },

  /// Print the sample approval workflow payload
  Sample,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
    .with(
      tracing_subscriber::fmt::layer()
        .without_time()
        .with_writer(io::stderr),
    )
    .init();

  let mut config = ClientConfig::load(cli.config.as_deref()).context("failed to load config")?;
  if let Some(api_url) = cli.api_url {
    config.api_url = api_url;
  }
  tracing::debug!(api_url = %config.api_url, timeout_secs = config.timeout_secs, "loaded config");

  match cli.command {
    Some(Commands::Graph { command }) => run_graph(command),
    Some(command) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async { run_remote(command, config).await })
    }
    None => {
      println!("flowdesk - use --help to see available commands");
      Ok(())
    }
  }
}

async fn run_remote(command: Commands, config: ClientConfig) -> Result<()> {
  let store: Arc<dyn Store> =
    Arc::new(HttpStore::new(&config).context("failed to create store client")?);
  let page_size = config.page_size;

  match command {
    Commands::Definitions { command } => run_definitions(command, store, page_size).await,
    Commands::Instances { command } => run_instances(command, store, page_size).await,
    Commands::Analytics { command } => run_analytics(command, store, page_size).await,
    Commands::Graph { command } => run_graph(command),
  }
}

async fn run_definitions(
  command: DefinitionCommand,
  store: Arc<dyn Store>,
  page_size: u32,
) -> Result<()> {
  match command {
    DefinitionCommand::List { page, status } => match status {
      Some(status) => {
        let definitions = store
          .list_definitions_by_status(status)
          .await
          .context("failed to list definitions")?;
        print_json(&definitions)
      }
      None => {
        let mut board = DefinitionBoard::new(store, page.request(page_size));
        board.reload().await.context("failed to list definitions")?;
        print_json(&json!({
          "total": board.total(),
          "definitions": board.definitions(),
        }))
      }
    },

    DefinitionCommand::Get { id } => {
      let definition = store
        .get_definition(&id)
        .await
        .with_context(|| format!("failed to get definition {}", id))?;
      print_json(&definition)
    }

    DefinitionCommand::Versions {
      name,
      version,
      latest,
    } => {
      if let Some(version) = version {
        let definition = store
          .get_definition_by_name_and_version(&name, version)
          .await
          .with_context(|| format!("failed to get {} version {}", name, version))?;
        return print_json(&definition);
      }
      if latest {
        let definition = store
          .get_latest_definition(&name)
          .await
          .with_context(|| format!("failed to get latest version of {}", name))?;
        return print_json(&definition);
      }
      let versions = store
        .list_definitions_by_name(&name)
        .await
        .with_context(|| format!("failed to list versions of {}", name))?;
      print_json(&versions)
    }

    DefinitionCommand::Create {
      graph_file,
      name,
      description,
      activate,
    } => {
      let graph = read_graph(&graph_file)?;
      let mut designer = DesignerSession::new(store);
      designer.set_name(name);
      designer.set_description(description);
      *designer.graph_mut() = graph;

      let definition = if activate {
        designer.save_and_activate().await
      } else {
        designer.save().await
      }
      .context("failed to create definition")?;
      print_json(&definition)
    }

    DefinitionCommand::Update {
      id,
      graph_file,
      name,
      description,
    } => {
      let graph = read_graph(&graph_file)?;
      let mut designer = DesignerSession::open(store, &id)
        .await
        .with_context(|| format!("failed to open definition {}", id))?;
      if let Some(name) = name {
        designer.set_name(name);
      }
      if description.is_some() {
        designer.set_description(description);
      }
      *designer.graph_mut() = graph;

      let definition = designer
        .save()
        .await
        .with_context(|| format!("failed to update definition {}", id))?;
      print_json(&definition)
    }

    DefinitionCommand::Activate { id } => {
      let mut board = DefinitionBoard::new(store, PageRequest::new(0, page_size));
      let transition = board
        .activate(&id)
        .await
        .with_context(|| format!("failed to activate definition {}", id))?;
      print_json(&json!({ "id": id, "status": transition.status(), "changed": !transition.is_noop() }))
    }

    DefinitionCommand::Deactivate { id } => {
      let mut board = DefinitionBoard::new(store, PageRequest::new(0, page_size));
      let transition = board
        .deactivate(&id)
        .await
        .with_context(|| format!("failed to deactivate definition {}", id))?;
      print_json(&json!({ "id": id, "status": transition.status(), "changed": !transition.is_noop() }))
    }

    DefinitionCommand::Delete { id } => {
      let mut board = DefinitionBoard::new(store, PageRequest::new(0, page_size));
      board
        .delete(&id)
        .await
        .with_context(|| format!("failed to delete definition {}", id))?;
      eprintln!("Deleted definition {}", id);
      Ok(())
    }
  }
}

async fn run_instances(
  command: InstanceCommand,
  store: Arc<dyn Store>,
  page_size: u32,
) -> Result<()> {
  let operation = match command {
    InstanceCommand::List {
      page,
      status,
      definition,
    } => {
      let mut board = InstanceBoard::new(store, page.request(page_size));
      if let Some(status) = status {
        let instances = board
          .with_status(status)
          .await
          .context("failed to list instances")?;
        return print_json(&instances);
      }
      if let Some(definition) = definition {
        let instances = board
          .for_definition(&definition)
          .await
          .context("failed to list instances")?;
        return print_json(&instances);
      }
      board.reload().await.context("failed to list instances")?;
      return print_json(&json!({
        "total": board.total(),
        "instances": board.instances(),
      }));
    }

    InstanceCommand::Get { id } => {
      let instance = store
        .get_instance(&id)
        .await
        .with_context(|| format!("failed to get instance {}", id))?;
      return print_json(&json!({
        "instance": instance,
        "operations": instance
          .status
          .available_operations()
          .iter()
          .map(|op| op.as_str())
          .collect::<Vec<_>>(),
      }));
    }

    InstanceCommand::Start {
      definition_id,
      name,
      context,
    } => {
      let context = match context {
        Some(raw) => Some(OpaquePayload::new(raw)),
        None => read_stdin_payload()?,
      };
      let mut board = InstanceBoard::new(store, PageRequest::new(0, page_size));
      let instance = board
        .start(&definition_id, &name, context)
        .await
        .with_context(|| format!("failed to start an instance of {}", definition_id))?;
      return print_json(&instance);
    }

    InstanceCommand::Complete { id } => (id, InstanceOperation::Complete),
    InstanceCommand::Cancel { id } => (id, InstanceOperation::Cancel),
    InstanceCommand::Suspend { id } => (id, InstanceOperation::Suspend),
    InstanceCommand::Resume { id } => (id, InstanceOperation::Resume),
  };

  let (id, operation) = operation;
  let mut board = InstanceBoard::new(store, PageRequest::new(0, page_size));
  let instance = board
    .apply(&id, operation)
    .await
    .with_context(|| format!("failed to {} instance {}", operation, id))?;
  print_json(&instance)
}

async fn run_analytics(
  command: AnalyticsCommand,
  store: Arc<dyn Store>,
  page_size: u32,
) -> Result<()> {
  let mut dashboard = Dashboard::new(store, PageRequest::new(0, page_size));
  match command {
    AnalyticsCommand::Dashboard => {
      let summary = dashboard
        .summary()
        .await
        .context("failed to load dashboard")?;
      print_json(&summary)
    }
    AnalyticsCommand::Report { days } => {
      let report = dashboard
        .analytics(days)
        .await
        .context("failed to load analytics")?;
      print_json(&report)
    }
  }
}

fn run_graph(command: GraphCommand) -> Result<()> {
  match command {
    GraphCommand::Validate { graph_file } => {
      let graph = read_graph(&graph_file)?;
      let topology = graph.topology();
      eprintln!(
        "Valid graph: {} nodes, {} edges",
        graph.nodes().len(),
        graph.edges().len()
      );
      print_json(&json!({
        "entryPoints": topology.entry_points(),
        "joinPoints": topology.join_points(),
      }))
    }
    GraphCommand::Sample => print_json(&codec::serialize(&flowdesk_workflow::sample())),
  }
}

impl PageArgs {
  fn request(&self, default_size: u32) -> PageRequest {
    PageRequest::new(self.page, self.size.unwrap_or(default_size))
  }
}

/// Read and validate a graph payload from a file, or stdin for `-`.
fn read_graph(path: &Path) -> Result<flowdesk_workflow::WorkflowGraph> {
  let content = if path == Path::new("-") {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read graph from stdin")?;
    input
  } else {
    std::fs::read_to_string(path)
      .with_context(|| format!("failed to read graph file: {}", path.display()))?
  };

  let payload = GraphDef::from_json(&content)
    .with_context(|| format!("failed to parse graph file: {}", path.display()))?;
  codec::deserialize(payload).with_context(|| format!("invalid graph: {}", path.display()))
}

/// Read an instance context from stdin when something is piped in.
fn read_stdin_payload() -> Result<Option<OpaquePayload>> {
  let stdin = io::stdin();
  if stdin.is_terminal() {
    return Ok(None);
  }

  let mut input = String::new();
  stdin
    .lock()
    .read_to_string(&mut input)
    .context("failed to read context from stdin")?;

  let input = input.trim();
  if input.is_empty() {
    return Ok(None);
  }
  Ok(Some(OpaquePayload::new(input)))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
