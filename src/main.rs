use std::{future::IntoFuture, process, sync::Arc};

use content_filter::{
    application::{
        error::AppError,
        filter::{ContentFilterService, ListingLimits},
        request::FilterRequest,
    },
    cache::{CacheConfig, FacetCache},
    config,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        memory::InMemoryContentStore,
        telemetry,
    },
    presentation::views::{RenderedFilters, render_filters},
};
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
        config::Command::Facets(args) => run_facets(settings, args).await,
    }
}

async fn build_service(settings: &config::Settings) -> Result<ContentFilterService, AppError> {
    let store = Arc::new(InMemoryContentStore::load(&settings.content.seed_path).await?);
    let cache = FacetCache::from_config(&CacheConfig::from(&settings.cache));
    let limits = ListingLimits {
        default_page_size: settings.content.default_page_size.get(),
        max_page_size: settings.content.max_page_size.get(),
    };
    Ok(ContentFilterService::new(
        store.clone(),
        store,
        cache,
        limits,
    ))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let filters = build_service(&settings).await?;
    let router = http::build_router(HttpState { filters });

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "content_filter::serve",
        addr = %settings.server.addr,
        cache_enabled = settings.cache.enabled,
        "listening"
    );

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    let grace = settings.server.graceful_shutdown;
    let drain_deadline = async move {
        match signalled_rx.await {
            Ok(()) => tokio::time::sleep(grace).await,
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        () = drain_deadline => {
            warn!(
                target = "content_filter::serve",
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
        }
    }

    info!(target = "content_filter::serve", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn run_facets(settings: config::Settings, args: config::FacetsArgs) -> Result<(), AppError> {
    let service = build_service(&settings).await?;
    let request = FilterRequest::from_query(&args.query);

    let output = if args.listing {
        let listing = service.apply(&args.module, &request).await?;
        serde_json::to_string_pretty(&listing)
    } else {
        match service.widget(&args.module, &request).await? {
            Some(widget) => {
                let rendered = render_filters(widget.payload, widget.filtering_when, None)
                    .map_err(|err| AppError::unexpected(err.to_string()))?;
                match rendered {
                    RenderedFilters::Data(payload) => serde_json::to_string_pretty(&payload),
                    RenderedFilters::Markup(markup) => Ok(markup),
                }
            }
            None => Ok("null".to_string()),
        }
    }
    .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?;

    println!("{output}");
    Ok(())
}
