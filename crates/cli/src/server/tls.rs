use anyhow::{anyhow, Context};
use ferrous_doh_domain::config::ServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig as TlsServerConfig};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;
use tracing::info;

/// Build the HTTPS acceptor from `cert`/`key`, requiring client
/// certificates signed by `tls_client_auth_ca` when client auth is on.
pub fn build_tls_acceptor(config: &ServerConfig) -> anyhow::Result<TlsAcceptor> {
    let cert_path = config
        .cert
        .as_deref()
        .ok_or_else(|| anyhow!("TLS certificate path not configured"))?;
    let key_path = config
        .key
        .as_deref()
        .ok_or_else(|| anyhow!("TLS key path not configured"))?;

    let certs = load_certs(cert_path)?;
    let key = load_private_key(key_path)?;

    let builder = if config.tls_client_auth {
        let ca_path = config
            .tls_client_auth_ca
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| anyhow!("tls_client_auth requires tls_client_auth_ca"))?;

        let mut roots = RootCertStore::empty();
        for cert in load_certs(ca_path)? {
            roots
                .add(cert)
                .with_context(|| format!("invalid CA certificate in {}", ca_path))?;
        }
        let verifier = WebPkiClientVerifier::builder(roots.into())
            .build()
            .context("failed to build client certificate verifier")?;

        info!(ca = ca_path, "TLS client authentication enabled");
        TlsServerConfig::builder().with_client_cert_verifier(verifier)
    } else {
        TlsServerConfig::builder().with_no_client_auth()
    };

    let mut tls_config = builder
        .with_single_cert(certs, key)
        .context("invalid TLS certificate/key pair")?;
    tls_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(tls_config)))
}

fn load_certs(path: &str) -> anyhow::Result<Vec<CertificateDer<'static>>> {
    let mut reader = BufReader::new(
        File::open(path).with_context(|| format!("failed to open certificate {}", path))?,
    );
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid PEM in {}", path))?;

    if certs.is_empty() {
        return Err(anyhow!("no certificates found in {}", path));
    }
    Ok(certs)
}

fn load_private_key(path: &str) -> anyhow::Result<PrivateKeyDer<'static>> {
    let mut reader =
        BufReader::new(File::open(path).with_context(|| format!("failed to open key {}", path))?);

    rustls_pemfile::private_key(&mut reader)
        .with_context(|| format!("invalid PEM in {}", path))?
        .ok_or_else(|| anyhow!("no private key found in {}", path))
}
