use std::{process, sync::Arc, time::Duration};

use powerworks::{
    application::{
        chrome::ChromeService, error::AppError, portfolio::PortfolioService,
        source::ProjectSource,
    },
    config,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        telemetry,
        upstream::UpstreamProjects,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

mod listing_tool;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let configuration = matches!(error, AppError::Infra(err) if err.is_configuration());
    let cause = std::error::Error::source(error)
        .map(ToString::to_string)
        .unwrap_or_default();
    let log = || {
        error!(
            error = %error,
            cause = %cause,
            configuration,
            "application error"
        );
    };

    if dispatcher::has_been_set() {
        log();
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, log);
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
        config::Command::Projects(args) => run_projects(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let upstream = UpstreamProjects::new(&settings.upstream)?;
    info!(
        target = "powerworks::serve",
        endpoint = %upstream.endpoint(),
        revalidate_secs = settings.upstream.revalidate.as_secs(),
        "Using projects API"
    );

    let source: Arc<dyn ProjectSource> = Arc::new(upstream);
    let state = HttpState {
        portfolio: Arc::new(PortfolioService::new(source)),
        chrome: Arc::new(ChromeService::new(&settings.site)),
    };

    serve_http(&settings.server, state).await
}

async fn run_projects(
    settings: config::Settings,
    args: config::ProjectsArgs,
) -> Result<(), AppError> {
    let upstream = UpstreamProjects::new(&settings.upstream)?;
    let service = PortfolioService::new(Arc::new(upstream));
    listing_tool::print_projects(&service, &args).await
}

async fn serve_http(settings: &config::ServerSettings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.addr)
        .await
        .map_err(|err| InfraError::bind(settings.addr, err))?;
    info!(target = "powerworks::serve", addr = %settings.addr, "Listening");

    let grace = settings.graceful_shutdown;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(grace))
        .await
        .map_err(InfraError::Serve)?;

    Ok(())
}

/// Resolves on ctrl-c, then arms a watchdog that ends the process if
/// in-flight requests outlive `grace`.
async fn shutdown_signal(grace: Duration) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target = "powerworks::serve", error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    info!(
        target = "powerworks::serve",
        grace_secs = grace.as_secs(),
        "Shutting down"
    );
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(
            target = "powerworks::serve",
            "graceful shutdown timed out; exiting"
        );
        process::exit(1);
    });
}
