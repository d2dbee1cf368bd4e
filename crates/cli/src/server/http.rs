use super::tls::build_tls_acceptor;
use anyhow::Context;
use axum::extract::connect_info::ConnectInfo;
use axum::Router;
use ferrous_doh_domain::config::ServerConfig;
use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_rustls::TlsAcceptor;
use tower::ServiceExt;
use tracing::{debug, error, info};

/// Serve `app` on every configured listen address. Returns when the first
/// listener fails.
pub async fn start_doh_servers(config: &ServerConfig, app: Router) -> anyhow::Result<()> {
    let acceptor = if config.tls_enabled() {
        Some(build_tls_acceptor(config)?)
    } else {
        None
    };

    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();

    for listen in &config.listen {
        let bind_addr: SocketAddr = listen
            .parse()
            .with_context(|| format!("invalid listen address {}", listen))?;
        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", bind_addr))?;

        info!(
            bind_address = %bind_addr,
            path = %config.path,
            tls = acceptor.is_some(),
            "DoH listener started"
        );

        let app = app.clone();
        match acceptor.clone() {
            Some(acceptor) => join_set.spawn(serve_tls(listener, acceptor, app)),
            None => join_set.spawn(serve_plain(listener, app)),
        };
    }

    let result = match join_set.join_next().await {
        Some(Ok(result)) => result,
        Some(Err(e)) => Err(e.into()),
        None => Ok(()),
    };
    if let Err(e) = &result {
        error!(error = %e, "DoH listener failed");
    }
    result
}

async fn serve_plain(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

async fn serve_tls(listener: TcpListener, acceptor: TlsAcceptor, app: Router) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let acceptor = acceptor.clone();
        let app = app.clone();

        tokio::spawn(async move {
            let tls_stream = match acceptor.accept(stream).await {
                Ok(s) => s,
                Err(e) => {
                    debug!(peer = %peer, error = %e, "TLS handshake failed");
                    return;
                }
            };

            let service = hyper::service::service_fn(move |mut request: Request<Incoming>| {
                request.extensions_mut().insert(ConnectInfo(peer));
                app.clone().oneshot(request)
            });

            if let Err(e) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(tls_stream), service)
                .await
            {
                debug!(peer = %peer, error = %e, "HTTPS connection closed with error");
            }
        });
    }
}
