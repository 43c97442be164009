//! Evaluation cycle automation service.
//!
//! Loads configuration, connects the cycle store, runs one automation pass
//! immediately and then keeps running passes on the configured interval
//! until Ctrl-C.

use std::error::Error;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use evaluation_cycles::adapters::{
    CycleAutomationScheduler, InMemoryCycleStore, PostgresCycleStore, SchedulerConfig, SystemClock,
};
use evaluation_cycles::application::{CycleAutomationPass, CycleLifecycleService};
use evaluation_cycles::config::{AppConfig, LogFormat, RuntimeConfig};
use evaluation_cycles::ports::{AllowAllAccess, Clock, CycleStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.runtime)?;

    let store = connect_store(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = CycleLifecycleService::with_end_date_grace_days(
        store.clone(),
        Arc::new(AllowAllAccess),
        clock.clone(),
        config.automation.end_date_grace_days,
    );
    let pass = Arc::new(CycleAutomationPass::new(store, clock.clone()));

    let startup = service.force_check(None).await;
    info!(
        actions = startup.actions.len(),
        failures = startup.failures.len(),
        "Startup automation pass complete"
    );

    if !config.automation.enabled {
        info!("Automation scheduler disabled; exiting after startup pass");
        return Ok(());
    }

    let scheduler = CycleAutomationScheduler::with_config(
        pass,
        clock,
        SchedulerConfig::default().with_poll_interval(config.automation.poll_interval()),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    if shutdown_tx.send(true).is_err() {
        warn!("Scheduler already stopped");
    }
    let passes = handle.await?;
    info!(passes, "Evaluation cycle service stopped");
    Ok(())
}

fn init_tracing(runtime: &RuntimeConfig) -> Result<(), Box<dyn Error>> {
    let filter = runtime.env_filter()?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match runtime.log_format {
        LogFormat::Json => builder.json().try_init().map_err(|e| e as Box<dyn Error>)?,
        LogFormat::Pretty => builder.with_target(false).try_init().map_err(|e| e as Box<dyn Error>)?,
    }
    Ok(())
}

async fn connect_store(config: &AppConfig) -> Result<Arc<dyn CycleStore>, Box<dyn Error>> {
    let Some(database) = &config.database else {
        warn!("No database configured; cycles are kept in memory and lost on exit");
        return Ok(Arc::new(InMemoryCycleStore::new()));
    };

    let pool = database.pool_options().connect(&database.url).await?;
    if database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }
    info!(max_connections = database.max_connections, "Connected to PostgreSQL");
    Ok(Arc::new(PostgresCycleStore::new(pool)))
}
