//! LAN address discovery.
//!
//! Viewers reach the host through an address that is handed to them
//! out-of-band, so the service reports the first non-loopback IPv4 address
//! of this machine, or [`FALLBACK_LOCAL_ADDRESS`] when there is none.
//!
//! Candidate addresses come from an [`AddressProbe`]. The production
//! [`SystemAddressProbe`] first asks the OS which local address it would
//! route outbound traffic from (a connected UDP socket; no packet is sent),
//! then lists the addresses bound to every network interface. The interface
//! list still finds the LAN address on a network with no default gateway.

use common::types::FALLBACK_LOCAL_ADDRESS;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use tracing::debug;

/// Public address used only to select the outbound interface.
const DEFAULT_PROBE_TARGET: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Source of candidate local addresses (enables mocking).
pub trait AddressProbe: Send + Sync {
    fn candidate_addresses(&self) -> Vec<IpAddr>;
}

/// Probe that reads the local address the OS picks for outbound UDP.
pub struct UdpRouteProbe {
    target: SocketAddr,
}

impl UdpRouteProbe {
    pub fn new(target: SocketAddr) -> Self {
        Self { target }
    }
}

impl Default for UdpRouteProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TARGET)
    }
}

impl AddressProbe for UdpRouteProbe {
    fn candidate_addresses(&self) -> Vec<IpAddr> {
        let probe = || -> std::io::Result<IpAddr> {
            let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
            socket.connect(self.target)?;
            Ok(socket.local_addr()?.ip())
        };

        match probe() {
            Ok(ip) => vec![ip],
            Err(e) => {
                debug!(target: "cs.local_address", error = %e, "No routable interface found");
                Vec::new()
            }
        }
    }
}

/// Probe that lists the addresses bound to the machine's interfaces.
#[derive(Debug, Default)]
pub struct InterfaceProbe;

impl AddressProbe for InterfaceProbe {
    fn candidate_addresses(&self) -> Vec<IpAddr> {
        match if_addrs::get_if_addrs() {
            Ok(interfaces) => interfaces
                .into_iter()
                .filter(|interface| !interface.is_loopback())
                .map(|interface| interface.ip())
                .collect(),
            Err(e) => {
                debug!(target: "cs.local_address", error = %e, "Failed to list network interfaces");
                Vec::new()
            }
        }
    }
}

/// Candidates from each probe in turn, earlier probes first.
pub struct SystemAddressProbe {
    probes: Vec<Box<dyn AddressProbe>>,
}

impl SystemAddressProbe {
    pub fn new(probes: Vec<Box<dyn AddressProbe>>) -> Self {
        Self { probes }
    }
}

impl Default for SystemAddressProbe {
    /// Outbound route first, then the interface list.
    fn default() -> Self {
        Self::new(vec![
            Box::new(UdpRouteProbe::default()),
            Box::new(InterfaceProbe),
        ])
    }
}

impl AddressProbe for SystemAddressProbe {
    fn candidate_addresses(&self) -> Vec<IpAddr> {
        self.probes
            .iter()
            .flat_map(|probe| probe.candidate_addresses())
            .collect()
    }
}

/// First IPv4 address that is neither loopback nor unspecified.
pub fn first_lan_ipv4(candidates: impl IntoIterator<Item = IpAddr>) -> Option<Ipv4Addr> {
    candidates.into_iter().find_map(|ip| match ip {
        IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(v4),
        _ => None,
    })
}

/// LAN address to advertise, or the fallback marker.
pub fn resolve_local_address(probe: &dyn AddressProbe) -> String {
    first_lan_ipv4(probe.candidate_addresses())
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| FALLBACK_LOCAL_ADDRESS.to_string())
}
