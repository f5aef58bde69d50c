//! Offline unit tests for plaza-db pool configuration and row types.
//! These tests do not require a live database connection.

use plaza_core::{AppConfig, Environment};
use plaza_db::{AddressFields, LocationRegionRow, PoolConfig, ServiceRegionRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        store_timeout_ms: 1500,
        default_country: "México".to_string(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn address_fields_without_values_are_empty() {
    assert!(AddressFields::default().is_empty());

    let blank = AddressFields {
        street: Some("   ".to_string()),
        ..AddressFields::default()
    };
    assert!(blank.is_empty());

    // country alone does not justify an address row
    let country_only = AddressFields {
        country: Some("México".to_string()),
        ..AddressFields::default()
    };
    assert!(country_only.is_empty());

    let with_city = AddressFields {
        city: Some("Ciudad de México".to_string()),
        ..AddressFields::default()
    };
    assert!(!with_city.is_empty());
}

#[test]
fn resolver_null_row_maps_to_no_region() {
    let row = LocationRegionRow {
        region: ServiceRegionRow::default(),
        is_valid: Some(false),
    };
    assert!(row.region.into_region().is_none());
}
