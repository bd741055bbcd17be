/*
 * Responsibility
 * - load Config -> build services -> assemble Router
 * - apply middleware (route guard, http, security headers, CORS)
 * - serve with axum::serve()
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::{self, guard::RoutePolicy, http::HttpLimits};
use crate::pages;
use crate::services::catalog::{CatalogStore, InMemoryCatalog, PostgrestCatalog};
use crate::services::identity::{GoTrueClient, IdentityProvider};
use crate::services::session::{
    AuditLogObserver, CookieSettings, ResolverSettings, SessionEvents, SessionResolver,
};
use crate::state::{AppState, AuthMode};

// Catalog reads serve whole pages, so they get a longer budget than the
// per-request session check.
const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,storefront=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash loudly. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("invalid configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting storefront in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let policy = RoutePolicy::with_excluded(config.guard_excluded_prefixes.iter().cloned())
        .context("invalid GUARD_EXCLUDED_PREFIXES")?;

    let cookies = CookieSettings {
        secure: config.session_cookie_secure,
        max_age_seconds: config.session_cookie_max_age_seconds,
    };

    let events = Arc::new(SessionEvents::new().with_observer(Arc::new(AuditLogObserver)));

    let Some(provider) = &config.provider else {
        tracing::warn!(
            "SUPABASE_URL / SUPABASE_ANON_KEY missing or placeholders; running in skip-auth mode \
             (route guard disabled, auth endpoints answer 503, catalog empty)"
        );
        return Ok(AppState::new(
            AuthMode::Skip,
            Arc::new(InMemoryCatalog::default()),
            policy,
            events,
            cookies,
            config.public_base_url.clone(),
        ));
    };

    let identity: Arc<dyn IdentityProvider> = Arc::new(
        GoTrueClient::new(&provider.url, &provider.anon_key, config.provider_timeout)
            .context("failed to build identity provider client")?,
    );
    let catalog: Arc<dyn CatalogStore> = Arc::new(
        PostgrestCatalog::new(&provider.url, &provider.anon_key, CATALOG_TIMEOUT)
            .context("failed to build catalog client")?,
    );

    let resolver = SessionResolver::new(
        identity.clone(),
        events.clone(),
        ResolverSettings {
            timeout: config.provider_timeout,
            refresh_margin_seconds: config.session_refresh_margin_seconds,
            cookies,
        },
    );

    tracing::info!(
        provider = %provider.url,
        identity = identity.backend_name(),
        catalog = catalog.backend_name(),
        timeout_ms = config.provider_timeout.as_millis() as u64,
        "authentication enforced"
    );

    Ok(AppState::new(
        AuthMode::enforced(identity, resolver),
        catalog,
        policy,
        events,
        cookies,
        config.public_base_url.clone(),
    ))
}

/// Routes + route guard, without transport layers. Used directly by tests.
pub fn router(state: AppState) -> Router {
    // The fallback is registered before the guard so unknown protected paths
    // (`/dashboard/anything`) are still redirected.
    let site = Router::new()
        .merge(pages::routes())
        .nest("/api/v1", api::v1::routes())
        .fallback(pages::not_found);

    middleware::guard::route_guard::apply(site, state.clone()).with_state(state)
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = router(state);
    let router = middleware::http::apply(router, HttpLimits::default());
    let router = middleware::security_headers::apply(router);
    middleware::cors::apply(router, config)
}
