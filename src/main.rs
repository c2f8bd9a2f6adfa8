use std::{process, sync::Arc, time::Duration};

use catalog::{
    application::{error::AppError, pagination::Paginator},
    cache::{self, CATEGORIES_NAMESPACE, CacheStore, PRODUCTS_NAMESPACE},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, HealthState, RouterState},
        telemetry,
    },
};
use sqlx::PgPool;
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
        config::Command::PurgeCache(args) => run_purge_cache(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_database(&settings).await?;
    migrate(&pool).await?;

    let repositories = Arc::new(PostgresRepositories::new(pool));
    let store = connect_cache(&settings).await?;
    let paginator = Paginator::new(settings.pagination.page_size);

    let state = RouterState {
        health: HealthState {
            database: repositories.clone(),
            cache: store.clone(),
        },
        api: ApiState::new(repositories, store, paginator),
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::bind(settings.server.addr, err)))?;
    info!(addr = %settings.server.addr, "catalog api listening");

    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            wait_for_shutdown_signal().await;
            signal.notify_one();
        },
    );
    let mut server = tokio::spawn(async move { server.await });

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        joined = &mut server => {
            joined
                .map_err(|err| AppError::unexpected(format!("server task failed: {err}")))?
                .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = drain_deadline(&shutdown, grace) => {
            warn!(
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
            server.abort();
        }
    }

    info!("catalog api stopped");
    Ok(())
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_database(&settings).await?;
    migrate(&pool).await?;
    info!("database migrations applied");
    Ok(())
}

async fn run_purge_cache(
    settings: config::Settings,
    args: config::PurgeCacheArgs,
) -> Result<(), AppError> {
    let store = connect_cache(&settings).await?;

    let namespaces = match args.resource {
        Some(resource) => vec![resource.namespace()],
        None => vec![CATEGORIES_NAMESPACE, PRODUCTS_NAMESPACE],
    };

    for namespace in namespaces {
        let removed = cache::invalidate_namespace(store.as_ref(), namespace).await?;
        info!(namespace, removed, "cache namespace purged");
    }

    Ok(())
}

async fn connect_database(settings: &config::Settings) -> Result<PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or(InfraError::DatabaseUrlMissing)?;

    PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::Database(err)))
}

async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    PostgresRepositories::run_migrations(pool)
        .await
        .map_err(|err| AppError::from(InfraError::Migration(err)))
}

async fn connect_cache(settings: &config::Settings) -> Result<Arc<dyn CacheStore>, AppError> {
    Ok(cache::connect(&settings.cache).await?)
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}

async fn drain_deadline(shutdown: &Notify, grace: Duration) {
    shutdown.notified().await;
    tokio::time::sleep(grace).await;
}
