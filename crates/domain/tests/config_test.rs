use ferrous_doh_domain::{CliOverrides, Config, ConfigError, UpstreamTransport};
use std::collections::HashMap;
use std::io::Write;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.server.listen, vec!["0.0.0.0:8053"]);
    assert_eq!(config.server.path, "/dns-query");
    assert!(!config.server.tls_enabled());
    assert_eq!(config.upstream.servers, vec!["udp:8.8.8.8:53"]);
    assert_eq!(config.upstream.timeout, 10);
    assert_eq!(config.upstream.tries, 3);
    assert!(!config.ecs.allow_non_global_ip);
    assert!(!config.ecs.use_precise_ip);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.fresh_ttl, 300);
    assert_eq!(config.cache.stale_ttl, 600);
    assert!(!config.logging.verbose);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_partial_toml_keeps_defaults() {
    let config = Config::from_toml(
        r#"
        [upstream]
        servers = ["tcp-tls:1.1.1.1:853", "udp:9.9.9.9:53"]
        tries = 5

        [ecs]
        use_precise_ip = true
        "#,
    )
    .unwrap();

    assert_eq!(config.upstream.tries, 5);
    assert_eq!(config.upstream.timeout, 10);
    assert!(config.ecs.use_precise_ip);
    assert_eq!(config.server.path, "/dns-query");

    let specs = config.upstream.parse_servers().unwrap();
    assert_eq!(specs[0].transport, UpstreamTransport::TcpTls);
    assert_eq!(specs[1].transport, UpstreamTransport::Udp);
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [server]
        listen = ["127.0.0.1:8053", "[::1]:8053"]
        path = "/resolve"
        "#
    )
    .unwrap();

    let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.server.listen.len(), 2);
    assert_eq!(config.server.path, "/resolve");
}

#[test]
fn test_config_missing_file_is_read_error() {
    let err = Config::load(Some("/nonexistent/ferrous-doh.toml"), CliOverrides::default())
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileRead(_, _)));
}

#[test]
fn test_env_overrides() {
    let mut config = Config::default();
    config
        .apply_env_overrides(env(&[
            ("DOH_SERVER_LISTEN", "9053"),
            ("DOH_HTTP_PREFIX", "/q"),
            ("DOH_UPSTREAM_DNS", "udp:1.1.1.1:53, tcp:8.8.4.4:53"),
            ("DOH_SERVER_TIMEOUT", "4"),
            ("DOH_SERVER_TRIES", "2"),
            ("DOH_SERVER_VERBOSE", "true"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
        ]))
        .unwrap();

    assert_eq!(config.server.listen, vec!["0.0.0.0:9053"]);
    assert_eq!(config.server.path, "/q");
    assert_eq!(
        config.upstream.servers,
        vec!["udp:1.1.1.1:53", "tcp:8.8.4.4:53"]
    );
    assert_eq!(config.upstream.timeout, 4);
    assert_eq!(config.upstream.tries, 2);
    assert!(config.logging.verbose);
    assert_eq!(
        config.cache.external_endpoint(),
        Some("redis://127.0.0.1:6379")
    );
}

#[test]
fn test_env_listen_with_host_kept_verbatim() {
    let mut config = Config::default();
    config
        .apply_env_overrides(env(&[("DOH_SERVER_LISTEN", "127.0.0.1:8080")]))
        .unwrap();
    assert_eq!(config.server.listen, vec!["127.0.0.1:8080"]);
}

#[test]
fn test_env_verbose_other_value_disables() {
    let mut config = Config::default();
    config.logging.verbose = true;
    config
        .apply_env_overrides(env(&[("DOH_SERVER_VERBOSE", "yes")]))
        .unwrap();
    assert!(!config.logging.verbose);
}

#[test]
fn test_env_invalid_number_is_rejected() {
    let mut config = Config::default();
    let err = config
        .apply_env_overrides(env(&[("DOH_SERVER_TRIES", "many")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Environment(_, _)));
}

#[test]
fn test_validate_rejects_unknown_transport() {
    let mut config = Config::default();
    config.upstream.servers = vec!["quic:1.1.1.1:853".to_string()];
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_validate_rejects_zero_tries_and_short_stale_ttl() {
    let mut config = Config::default();
    config.upstream.tries = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.cache.stale_ttl = 100;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_tls_material() {
    let mut config = Config::default();
    config.server.cert = Some("cert.pem".to_string());
    assert!(config.validate().is_err(), "cert without key");

    config.server.key = Some("key.pem".to_string());
    assert!(config.validate().is_ok());

    config.server.tls_client_auth = true;
    assert!(config.validate().is_err(), "client auth without CA");

    config.server.tls_client_auth_ca = Some("ca.pem".to_string());
    assert!(config.validate().is_ok());
}
