mod repl;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::auth::AuthSession;
use crate::chat::{ChatOrchestrator, MessageLog, SessionRegistry};
use crate::core::config::{load_config, AppConfig};
use crate::core::model::{default_model, find_model};
use crate::providers::SimulatedProvider;
use crate::storage::{FileKv, KvMessageStore, KvSessionStore, KvStore};

#[derive(Parser, Debug)]
#[command(name = "arceus", version, about = "AI coding assistant chat")]
struct Cli {
    /// Directory for persisted sessions and auth state
    #[arg(long, env = "ARCEUS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Initially selected model (id or display name)
    #[arg(long, short)]
    model: Option<String>,

    /// Verbose logging
    #[arg(long, short)]
    verbose: bool,
}

pub struct App {
    pub config: AppConfig,
    pub auth: AuthSession,
    pub chat: ChatOrchestrator,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "arceus=debug" } else { "arceus=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(None)?;
    if let Some(model) = cli.model {
        config.default_model = model;
    }

    let data_path = cli.data_dir.unwrap_or_else(|| config.data_path());
    let kv: Arc<dyn KvStore> = Arc::new(FileKv::open(data_path)?);

    let mut auth = AuthSession::new(Arc::clone(&kv));
    auth.restore().await;
    if !auth.is_authenticated() {
        repl::sign_in(&mut auth).await?;
    }
    let needs_onboarding = auth.profile().is_some_and(|p| !p.onboarding_completed);
    if needs_onboarding {
        repl::onboarding(&mut auth).await?;
    }
    let user_id = auth
        .user()
        .ok_or(crate::core::error::ArceusError::NotSignedIn)?
        .id
        .clone();

    let registry = SessionRegistry::load(
        Arc::new(KvSessionStore::new(Arc::clone(&kv))),
        user_id,
        config.recent_sessions,
    )
    .await;
    let log = MessageLog::new(Arc::new(KvMessageStore::new(Arc::clone(&kv))));
    let provider = Arc::new(SimulatedProvider::new(Duration::from_millis(
        config.reply_delay_ms,
    )));
    let model = find_model(&config.default_model).unwrap_or_else(default_model);
    let chat = ChatOrchestrator::new(registry, log, provider, model);

    repl::run(App { config, auth, chat }).await
}
