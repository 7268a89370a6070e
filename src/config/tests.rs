//! Config Module Tests
//!
//! Defaults, validation rules, JSON parsing and flag merging.

#[cfg(test)]
mod tests {
    use crate::config::BrokerConfig;
    use crate::config::cli::Cli;
    use crate::store::types::StoreConfig;
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn test_defaults_are_valid() {
        let config = BrokerConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(5));
        assert_eq!(config.broker_options().peer_cache_capacity, 100_000);
        assert_eq!(config.broker_options().peer_cache_ttl, None);
    }

    #[test]
    fn test_heartbeat_must_beat_stats_ttl() {
        let config = BrokerConfig {
            heartbeat_interval_secs: 20,
            ..BrokerConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("shorter than the stats TTL"));
    }

    #[test]
    fn test_empty_cluster_is_rejected() {
        let config = BrokerConfig {
            store: StoreConfig::Cluster {
                addrs: vec![],
                username: None,
                password: None,
            },
            ..BrokerConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_cache_capacity_is_rejected() {
        let config = BrokerConfig {
            peer_cache_capacity: 0,
            ..BrokerConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BrokerConfig = serde_json::from_str(
            r#"{"store":{"kind":"single","host":"redis","db":2},"peer_cache_ttl_secs":60}"#,
        )
        .unwrap();

        assert_eq!(config.heartbeat_interval_secs, 5);
        assert_eq!(
            config.broker_options().peer_cache_ttl,
            Some(Duration::from_secs(60))
        );
        match config.store {
            StoreConfig::Single { host, port, db, .. } => {
                assert_eq!(host, "redis");
                assert_eq!(port, 6379);
                assert_eq!(db, 2);
            }
            other => panic!("unexpected topology {:?}", other),
        }
    }

    #[test]
    fn test_cli_single_instance() {
        let cli = Cli::try_parse_from([
            "signal-broker",
            "--redis-host",
            "10.1.2.3",
            "--redis-port",
            "6380",
            "--redis-password",
            "pw",
            "--http",
            "0.0.0.0:9000",
        ])
        .unwrap();

        let config = cli.into_config().unwrap();

        assert_eq!(
            config.store,
            StoreConfig::Single {
                host: "10.1.2.3".to_string(),
                port: 6380,
                username: None,
                password: Some("pw".to_string()),
                db: 0,
            }
        );
        assert_eq!(config.http_addr.port(), 9000);
    }

    #[test]
    fn test_cli_cluster_seeds() {
        let cli = Cli::try_parse_from([
            "signal-broker",
            "--cluster",
            "10.0.0.1:7000,10.0.0.2:7000",
            "--cluster",
            "10.0.0.3:7000",
        ])
        .unwrap();

        match cli.into_config().unwrap().store {
            StoreConfig::Cluster { addrs, .. } => assert_eq!(addrs.len(), 3),
            other => panic!("unexpected topology {:?}", other),
        }
    }

    #[test]
    fn test_cli_memory_conflicts_with_cluster() {
        let result = Cli::try_parse_from(["signal-broker", "--memory", "--cluster", "a:1"]);
        assert!(result.is_err());
    }

    fn write_config(name: &str, json: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.json", name, std::process::id()));
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_cli_tunables_override_defaults() {
        let cli = Cli::try_parse_from([
            "signal-broker",
            "--consumer-timeout-secs",
            "2",
            "--peer-cache-capacity",
            "500",
        ])
        .unwrap();

        let config = cli.into_config().unwrap();

        assert_eq!(config.consumer_timeout(), Duration::from_secs(2));
        assert_eq!(config.broker_options().peer_cache_capacity, 500);
    }

    #[test]
    fn test_cli_credentials_apply_to_configured_store() {
        let path = write_config(
            "signal-broker-single",
            r#"{"store":{"kind":"single","host":"redis.internal","port":6380}}"#,
        );
        let cli = Cli::try_parse_from([
            "signal-broker",
            "--config",
            path.to_str().unwrap(),
            "--redis-username",
            "broker",
            "--redis-password",
            "pw",
            "--redis-db",
            "3",
        ])
        .unwrap();

        let config = cli.into_config().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            config.store,
            StoreConfig::Single {
                host: "redis.internal".to_string(),
                port: 6380,
                username: Some("broker".to_string()),
                password: Some("pw".to_string()),
                db: 3,
            }
        );
    }

    #[test]
    fn test_cli_credentials_apply_to_configured_cluster() {
        let path = write_config(
            "signal-broker-cluster",
            r#"{"store":{"kind":"cluster","addrs":["10.0.0.1:7000"]}}"#,
        );
        let cli = Cli::try_parse_from([
            "signal-broker",
            "--config",
            path.to_str().unwrap(),
            "--redis-password",
            "pw",
        ])
        .unwrap();

        let config = cli.into_config().unwrap();
        std::fs::remove_file(&path).unwrap();

        match config.store {
            StoreConfig::Cluster { password, .. } => assert_eq!(password.as_deref(), Some("pw")),
            other => panic!("unexpected topology {:?}", other),
        }
    }

    #[test]
    fn test_cli_credentials_with_memory_store_are_rejected() {
        let path = write_config("signal-broker-memory", r#"{"store":{"kind":"memory"}}"#);
        let cli = Cli::try_parse_from([
            "signal-broker",
            "--config",
            path.to_str().unwrap(),
            "--redis-password",
            "pw",
        ])
        .unwrap();

        let result = cli.into_config();
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
        assert!(Cli::try_parse_from(["signal-broker", "--memory", "--redis-password", "pw"]).is_err());
    }
}
