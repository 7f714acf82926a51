//! Local IPv6 address discovery.

use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use std::net::Ipv6Addr;

/// Something that lists the addresses bound to this host.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// All addresses as text, in the order the system reports them.
    async fn fetch_addresses(&self) -> Result<Vec<String>>;
}

/// Address source backed by a shell command such as `hostname -I`.
pub struct CommandAddressSource {
    command: String,
}

impl CommandAddressSource {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl AddressSource for CommandAddressSource {
    async fn fetch_addresses(&self) -> Result<Vec<String>> {
        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .output()
            .await
            .map_err(|e| DdnsError::AddressSource(format!("{}: {}", self.command, e)))?;

        if !output.status.success() {
            return Err(DdnsError::AddressSource(format!(
                "{} exited with {}",
                self.command, output.status
            )));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| {
            DdnsError::AddressSource("got gibberish from child process".to_string())
        })?;

        Ok(stdout.split_whitespace().map(str::to_string).collect())
    }
}

/// Address source returning a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticAddressSource {
    addresses: Vec<String>,
}

impl StaticAddressSource {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl AddressSource for StaticAddressSource {
    async fn fetch_addresses(&self) -> Result<Vec<String>> {
        Ok(self.addresses.clone())
    }
}

/// Selects the host's current IPv6 address.
pub struct AddressProbe<S> {
    source: S,
}

impl<S: AddressSource> AddressProbe<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// First candidate that parses as an IPv6 network, in source order.
    ///
    /// No ranking is applied: a link-local address listed before a global
    /// one wins.
    pub async fn current_ipv6(&self) -> Result<String> {
        let addrs = self.source.fetch_addresses().await?;
        tracing::debug!("Local addresses: {:?}", addrs);

        let valid: Vec<&String> = addrs.iter().filter(|a| is_ipv6_network(a)).collect();
        tracing::debug!("IPv6 candidates: {:?}", valid);

        valid
            .first()
            .map(|a| a.to_string())
            .ok_or(DdnsError::NoAddressFound)
    }
}

/// Whether `candidate` is an IPv6 address, optionally with a `%scope` zone
/// and a `/prefix`.
///
/// With a prefix the bits below it must be zero, so `2001:db8::/32`
/// qualifies but `2001:db8::1/64` does not.
pub fn is_ipv6_network(candidate: &str) -> bool {
    let (addr, prefix) = match candidate.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (candidate, None),
    };

    let addr = match addr.split_once('%') {
        Some((addr, scope)) if !scope.is_empty() && !scope.contains('%') => addr,
        Some(_) => return false,
        None => addr,
    };

    let Ok(addr) = addr.parse::<Ipv6Addr>() else {
        return false;
    };

    let Some(prefix) = prefix else {
        return true;
    };

    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    match prefix.parse::<u32>() {
        Ok(len) if len <= 128 => {
            let mask = u128::MAX.checked_shl(128 - len).unwrap_or(0);
            u128::from(addr) & !mask == 0
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_addresses() {
        assert!(is_ipv6_network("2001:db8::abcd"));
        assert!(is_ipv6_network("fe80::1"));
        assert!(is_ipv6_network("::1"));
        assert!(is_ipv6_network("::ffff:10.0.0.5"));
        assert!(!is_ipv6_network("10.0.0.5"));
        assert!(!is_ipv6_network(""));
        assert!(!is_ipv6_network("not-an-address"));
        assert!(!is_ipv6_network("2001:db8::zz"));
    }

    #[test]
    fn test_prefix_suffix() {
        assert!(is_ipv6_network("2001:db8::/32"));
        assert!(is_ipv6_network("2001:db8::1/128"));
        assert!(is_ipv6_network("::/0"));
        assert!(!is_ipv6_network("2001:db8::1/64"));
        assert!(!is_ipv6_network("2001:db8::/129"));
        assert!(!is_ipv6_network("2001:db8::/"));
        assert!(!is_ipv6_network("2001:db8::/+32"));
        assert!(!is_ipv6_network("10.0.0.0/8"));
    }

    #[test]
    fn test_scoped_addresses() {
        assert!(is_ipv6_network("fe80::1%eth0"));
        assert!(is_ipv6_network("fe80::1%2"));
        assert!(is_ipv6_network("fe80::1%eth0/128"));
        assert!(!is_ipv6_network("fe80::1%"));
        assert!(!is_ipv6_network("fe80::1%eth0%1"));
        assert!(!is_ipv6_network("10.0.0.5%eth0"));
    }

    #[tokio::test]
    async fn test_scoped_candidate_kept_verbatim() {
        let probe = AddressProbe::new(StaticAddressSource::new([
            "10.0.0.5",
            "fe80::1%eth0",
            "2001:db8::abcd",
        ]));

        assert_eq!(probe.current_ipv6().await.unwrap(), "fe80::1%eth0");
    }

    #[tokio::test]
    async fn test_first_match_not_best_match() {
        let probe = AddressProbe::new(StaticAddressSource::new([
            "10.0.0.5",
            "fe80::1",
            "2001:db8::abcd",
        ]));

        assert_eq!(probe.current_ipv6().await.unwrap(), "fe80::1");
    }

    #[tokio::test]
    async fn test_no_ipv6_address() {
        let probe = AddressProbe::new(StaticAddressSource::new(["10.0.0.5", "192.168.1.2"]));
        assert!(matches!(
            probe.current_ipv6().await,
            Err(DdnsError::NoAddressFound)
        ));

        let probe = AddressProbe::new(StaticAddressSource::default());
        assert!(matches!(
            probe.current_ipv6().await,
            Err(DdnsError::NoAddressFound)
        ));
    }

    #[tokio::test]
    async fn test_command_source_splits_output() {
        let source = CommandAddressSource::new("echo '10.0.0.5 2001:db8::1  fe80::1 '");
        let addrs = source.fetch_addresses().await.unwrap();
        assert_eq!(addrs, vec!["10.0.0.5", "2001:db8::1", "fe80::1"]);
    }

    #[tokio::test]
    async fn test_command_source_failure() {
        let source = CommandAddressSource::new("exit 3");
        assert!(matches!(
            source.fetch_addresses().await,
            Err(DdnsError::AddressSource(_))
        ));
    }
}
