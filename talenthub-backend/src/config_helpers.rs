use std::net::{IpAddr, Ipv6Addr, SocketAddr};

/// Parse host:port into a SocketAddr, with fallback to 0.0.0.0.
pub fn parse_bind_address(host: &str, port: u16) -> SocketAddr {
    host.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, port))
        .or_else(|_| host.parse::<SocketAddr>())
        .or_else(|_| host.parse::<Ipv6Addr>().map(|ip| SocketAddr::new(IpAddr::V6(ip), port)))
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)))
}

/// True when either signing key is set.
pub fn has_signing_keys(cfg: &talenthub_config::SigningConfig) -> bool {
    cfg.current_key.is_some() || cfg.next_key.is_some()
}

/// Log what the dispatch path will and will not do with this configuration.
pub fn log_dispatch_posture(cfg: &talenthub_config::Config) {
    let env = cfg.environment;
    if !has_signing_keys(&cfg.signing) {
        if env.is_development() {
            tracing::warn!("no signing keys configured; dispatch requests are not verified");
        } else {
            tracing::error!("no signing keys configured; every dispatch request will fail");
        }
    }
    if cfg.queue.token.is_none() {
        if env.is_development() {
            tracing::warn!("no queue token configured; enqueue calls are simulated");
        } else {
            tracing::error!("no queue token configured; enqueue calls will fail");
        }
    }
    if cfg.queue.callback_base_url.is_none() && cfg.queue.token.is_some() {
        tracing::error!("queue token set without callback base url; enqueue calls will fail");
    }
    if cfg.api.token.is_none() {
        tracing::info!("no api token configured; POST /api/jobs is disabled");
    }
}
