//! Local endpoint of the reporting service
//!
//! Identifies the service (name plus optional address) attached to every
//! span the exporter reports.

use std::fmt;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use thiserror::Error;

/// Endpoint construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Invalid host address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Unable to resolve host '{host}': {reason}")]
    Unresolvable { host: String, reason: String },
}

/// Service name and address of the reporting service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEndpoint {
    service_name: String,
    address: Option<SocketAddr>,
}

impl LocalEndpoint {
    /// Build an endpoint from a service name and a `host[:port]` string.
    ///
    /// The service name is lower-cased and may be empty. An empty
    /// `host_port` (or `:0`) yields an endpoint without an address, a missing
    /// port means port 0. IPv6 hosts must be bracketed. Hosts that are not IP
    /// literals are resolved with the system resolver.
    ///
    /// # Example
    ///
    /// ```
    /// use zipkin_exporter::exporter::LocalEndpoint;
    ///
    /// let endpoint = LocalEndpoint::new("Svc-A", "10.0.0.5").unwrap();
    /// assert_eq!(endpoint.service_name(), "svc-a");
    /// assert_eq!(endpoint.address().unwrap().to_string(), "10.0.0.5:0");
    /// ```
    pub fn new(service_name: &str, host_port: &str) -> Result<Self, EndpointError> {
        let service_name = service_name.trim().to_lowercase();
        let host_port = host_port.trim();
        if host_port.is_empty() || host_port == ":0" {
            return Ok(Self {
                service_name,
                address: None,
            });
        }

        Ok(Self {
            service_name,
            address: Some(resolve(host_port)?),
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn address(&self) -> Option<SocketAddr> {
        self.address
    }

    /// Whether the endpoint carries neither a name nor an address
    pub fn is_empty(&self) -> bool {
        self.service_name.is_empty() && self.address.is_none()
    }
}

impl fmt::Display for LocalEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            Some(addr) => write!(f, "{}@{}", self.service_name, addr),
            None => f.write_str(&self.service_name),
        }
    }
}

fn resolve(host_port: &str) -> Result<SocketAddr, EndpointError> {
    if let Ok(addr) = host_port.parse::<SocketAddr>() {
        return Ok(addr);
    }

    let (host, port) = split_host_port(host_port)?;
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let unresolvable = |reason: String| EndpointError::Unresolvable {
        host: host.to_string(),
        reason,
    };
    (host, port)
        .to_socket_addrs()
        .map_err(|e| unresolvable(e.to_string()))?
        .next()
        .ok_or_else(|| unresolvable("no addresses returned".to_string()))
}

fn split_host_port(host_port: &str) -> Result<(&str, u16), EndpointError> {
    let invalid = || EndpointError::InvalidAddress(host_port.to_string());

    let (host, port) = if let Some(rest) = host_port.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
        if tail.is_empty() {
            (host, None)
        } else {
            (host, Some(tail.strip_prefix(':').ok_or_else(invalid)?))
        }
    } else {
        match host_port.rsplit_once(':') {
            Some((host, _)) if host.contains(':') => return Err(invalid()),
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        }
    };

    if host.is_empty() {
        return Err(invalid());
    }

    let port = match port {
        Some(port) => port
            .parse::<u16>()
            .map_err(|_| EndpointError::InvalidPort(port.to_string()))?,
        None => 0,
    };

    Ok((host, port))
}
