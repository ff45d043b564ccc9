use std::error::Error;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ldbws_gateway::cache::{CacheConfig, CacheStore, MemoryStore, NullStore, RedisStore};
use ldbws_gateway::config::{CacheBackend, GatewayConfig, LogFormat, UpstreamMode};
use ldbws_gateway::gateway::Gateway;
use ldbws_gateway::ldbws::{
    LdbwsClient, LdbwsConfig, MockLdbws, ProxyClient, ProxyConfig, Upstream, UpstreamError,
};
use ldbws_gateway::stations::StationCodes;
use ldbws_gateway::web::{AppState, create_router};

const DEFAULT_LOG_FILTER: &str = "ldbws_gateway=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let config = GatewayConfig::from_env()?;
    init_tracing(config.log_format);

    let stations = StationCodes::load(&config.station_codes)?;
    info!(
        count = stations.len(),
        path = %config.station_codes.display(),
        "loaded station codes"
    );

    let upstream = build_upstream(&config)?;
    let cache = build_cache(&config).await?;

    let gateway = Gateway::new(stations, cache, upstream).with_ttl(config.cache_ttl);
    let app = create_router(AppState::new(gateway));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "LDBWS gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn build_upstream(config: &GatewayConfig) -> Result<Arc<dyn Upstream>, UpstreamError> {
    let timeout_secs = config.upstream_timeout.as_secs();

    let upstream: Arc<dyn Upstream> = match &config.upstream {
        UpstreamMode::Direct {
            access_token,
            base_url,
        } => {
            let mut ldbws = LdbwsConfig::new(access_token.as_str()).with_timeout(timeout_secs);
            if let Some(url) = base_url {
                ldbws = ldbws.with_base_url(url.as_str());
            }
            info!(base_url = %ldbws.base_url, "querying LDBWS directly");
            Arc::new(LdbwsClient::new(ldbws)?)
        }
        UpstreamMode::Proxy { host } => {
            let proxy = ProxyConfig::for_host(host).with_timeout(timeout_secs);
            info!(base_url = %proxy.base_url, "forwarding to REST proxy");
            Arc::new(ProxyClient::new(proxy)?)
        }
        UpstreamMode::Mock { data_dir } => {
            let mock = MockLdbws::new(data_dir)?;
            warn!(
                dir = %data_dir.display(),
                stations = mock.available_stations().len(),
                "serving mock data"
            );
            Arc::new(mock)
        }
    };
    Ok(upstream)
}

async fn build_cache(config: &GatewayConfig) -> Result<Arc<dyn CacheStore>, Box<dyn Error>> {
    let store: Arc<dyn CacheStore> = match &config.cache {
        CacheBackend::Memory => {
            info!(ttl_secs = config.cache_ttl.as_secs(), "using in-process cache");
            Arc::new(MemoryStore::new(&CacheConfig::default()))
        }
        CacheBackend::Redis { url } => {
            info!(ttl_secs = config.cache_ttl.as_secs(), "using Redis cache");
            Arc::new(RedisStore::connect(url, config.cache_timeout).await?)
        }
        CacheBackend::Disabled => {
            warn!("caching disabled");
            Arc::new(NullStore)
        }
    };
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
