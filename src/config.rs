//! Host configuration: the `ring_group_name` / `num_concurrent_gets` /
//! `host_address` inputs [`crate::assembler::HandlerAssembler`] needs before
//! it can talk to the coordinator.

use crate::error::{CoreError, CoreResult};
use crate::ids::HostAddress;
use std::env;

/// Default worker-pool size when `NUM_CONCURRENT_GETS` is unset.
pub const DEFAULT_NUM_CONCURRENT_GETS: u32 = 8;

/// Exposes the handful of options the core itself recognizes.
///
/// Kept as a trait (rather than a concrete struct) so tests can supply fixed
/// values without touching the process environment.
pub trait Configurator: Send + Sync {
    /// The ring-group this host belongs to.
    fn ring_group_name(&self) -> &str;

    /// Fixed worker-pool size; also bounds peak in-flight reads.
    fn num_concurrent_gets(&self) -> u32;

    /// This host's network identity, used to locate its record during assembly.
    fn host_address(&self) -> &HostAddress;
}

/// A [`Configurator`] with fixed, explicitly-provided values.
#[derive(Debug, Clone)]
pub struct StaticConfigurator {
    ring_group_name: String,
    num_concurrent_gets: u32,
    host_address: HostAddress,
}

impl StaticConfigurator {
    /// Build a configurator directly from values, validating them the same
    /// way [`EnvConfigurator::from_env`] would.
    pub fn new(
        ring_group_name: impl Into<String>,
        num_concurrent_gets: u32,
        host_address: HostAddress,
    ) -> CoreResult<Self> {
        let ring_group_name = ring_group_name.into();
        validate(&ring_group_name, num_concurrent_gets, &host_address)?;
        Ok(Self {
            ring_group_name,
            num_concurrent_gets,
            host_address,
        })
    }
}

impl Configurator for StaticConfigurator {
    fn ring_group_name(&self) -> &str {
        &self.ring_group_name
    }

    fn num_concurrent_gets(&self) -> u32 {
        self.num_concurrent_gets
    }

    fn host_address(&self) -> &HostAddress {
        &self.host_address
    }
}

/// A [`Configurator`] reading from the process environment.
///
/// # Environment variables
///
/// - `RING_GROUP_NAME` (required): this host's ring-group.
/// - `HOST_ADDRESS` (required): this host's network identity.
/// - `NUM_CONCURRENT_GETS` (default `8`): worker-pool size.
#[derive(Debug, Clone)]
pub struct EnvConfigurator(StaticConfigurator);

impl EnvConfigurator {
    /// Load and validate configuration from the process environment.
    pub fn from_env() -> CoreResult<Self> {
        let ring_group_name = env::var("RING_GROUP_NAME")
            .map_err(|_| CoreError::config("RING_GROUP_NAME environment variable required"))?;

        let host_address = env::var("HOST_ADDRESS")
            .map_err(|_| CoreError::config("HOST_ADDRESS environment variable required"))?;

        let num_concurrent_gets = match env::var("NUM_CONCURRENT_GETS") {
            Ok(raw) => raw
                .parse::<u32>()
                .map_err(|e| CoreError::config(format!("invalid NUM_CONCURRENT_GETS: {e}")))?,
            Err(_) => DEFAULT_NUM_CONCURRENT_GETS,
        };

        let inner = StaticConfigurator::new(
            ring_group_name,
            num_concurrent_gets,
            HostAddress::new(host_address),
        )?;
        Ok(Self(inner))
    }
}

impl Configurator for EnvConfigurator {
    fn ring_group_name(&self) -> &str {
        self.0.ring_group_name()
    }

    fn num_concurrent_gets(&self) -> u32 {
        self.0.num_concurrent_gets()
    }

    fn host_address(&self) -> &HostAddress {
        self.0.host_address()
    }
}

fn validate(
    ring_group_name: &str,
    num_concurrent_gets: u32,
    host_address: &HostAddress,
) -> CoreResult<()> {
    if ring_group_name.is_empty() {
        return Err(CoreError::config("ring_group_name must not be empty"));
    }
    if host_address.as_str().is_empty() {
        return Err(CoreError::config("host_address must not be empty"));
    }
    if num_concurrent_gets == 0 {
        return Err(CoreError::config("num_concurrent_gets must be > 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_configurator_accepts_valid_values() {
        let config =
            StaticConfigurator::new("ring-a", 4, HostAddress::from("host-1:9090")).unwrap();
        assert_eq!(config.ring_group_name(), "ring-a");
        assert_eq!(config.num_concurrent_gets(), 4);
    }

    #[test]
    fn rejects_zero_concurrency() {
        let result = StaticConfigurator::new("ring-a", 0, HostAddress::from("host-1:9090"));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_ring_group_name() {
        let result = StaticConfigurator::new("", 4, HostAddress::from("host-1:9090"));
        assert!(result.is_err());
    }
}
