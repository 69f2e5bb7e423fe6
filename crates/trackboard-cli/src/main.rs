//! trackboard CLI: serve the dashboard or print a view in the terminal.

mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use trackboard::{views, DashConfig, DashContext, MlflowClient, Selection, View};
use trackboard_server::{serve, ServerConfig};

#[derive(Parser)]
#[command(
    name = "trackboard",
    about = "Read-only dashboard for an MLflow tracking server",
    version,
    author
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalOpts {
    /// Base URL of the tracking server
    #[arg(long, global = true, env = "MLFLOW_TRACKING_URI")]
    tracking_uri: Option<String>,
    /// Timeout for each tracking request, in seconds
    #[arg(long, global = true, default_value_t = DashConfig::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Deepest artifact directory level the walker will list
    #[arg(long, global = true, default_value_t = DashConfig::DEFAULT_MAX_ARTIFACT_DEPTH)]
    max_artifact_depth: usize,
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Compact,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web dashboard server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind to
        #[arg(long, short, default_value_t = 8000)]
        port: u16,
    },
    /// Render one dashboard view in the terminal
    Show {
        view: ShowView,
        /// Experiment name
        #[arg(long, short)]
        experiment: Option<String>,
        /// Run ID
        #[arg(long, short)]
        run: Option<String>,
        /// Metric key
        #[arg(long, short)]
        metric: Option<String>,
        /// Artifact path relative to the run's artifact root
        #[arg(long, short)]
        artifact: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShowView {
    Experiments,
    Runs,
    Models,
    Metrics,
    Artifacts,
}

impl From<ShowView> for View {
    fn from(view: ShowView) -> Self {
        match view {
            ShowView::Experiments => View::Experiments,
            ShowView::Runs => View::Runs,
            ShowView::Models => View::RegisteredModels,
            ShowView::Metrics => View::MetricsOverview,
            ShowView::Artifacts => View::Artifacts,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.log_format);

    let config = dash_config(&cli.global)?;

    match cli.command {
        Commands::Serve { host, port } => cmd_serve(config, host, port)?,
        Commands::Show {
            view,
            experiment,
            run,
            metric,
            artifact,
        } => {
            let selection = Selection {
                experiment,
                run,
                metric,
                artifact,
            };
            cmd_show(config, view.into(), selection)?;
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn dash_config(opts: &GlobalOpts) -> Result<DashConfig> {
    let config = match &opts.tracking_uri {
        Some(uri) => DashConfig::new(uri)?,
        None => DashConfig::from_env()?,
    };
    Ok(config
        .with_request_timeout(Duration::from_secs(opts.timeout_secs))
        .with_max_artifact_depth(opts.max_artifact_depth))
}

// ─── Command implementations ──────────────────────────────────────────────────

fn cmd_serve(config: DashConfig, host: String, port: u16) -> Result<()> {
    println!("Trackboard Dashboard");
    println!("   Tracking: {}", config.tracking_uri);
    println!("   URL:      http://{}:{}", host, port);
    println!();

    let server = ServerConfig {
        host,
        port,
        dashboard: config,
    };
    tokio::runtime::Runtime::new()?.block_on(serve(server))?;
    Ok(())
}

fn cmd_show(config: DashConfig, view: View, selection: Selection) -> Result<()> {
    debug!(view = view.slug(), ?selection, "show");
    let client = MlflowClient::new(&config)?;
    client.probe()?;
    let ctx = DashContext::from_config(Arc::new(client), &config);
    let page = views::render(&ctx, view, &selection);
    print!("{}", render::render_page(&page));
    Ok(())
}
