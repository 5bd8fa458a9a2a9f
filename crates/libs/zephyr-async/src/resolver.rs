use std::net::{IpAddr, Ipv4Addr};

/// Best-effort reverse lookup of a sender address.
///
/// Implementations never fail upward: on any lookup problem they return the
/// dotted-decimal literal. This is enrichment, not correctness.
pub trait HostResolver: Send {
    fn resolve(&self, addr: Ipv4Addr) -> String;
}

impl<F> HostResolver for F
where
    F: Fn(Ipv4Addr) -> String + Send,
{
    fn resolve(&self, addr: Ipv4Addr) -> String {
        self(addr)
    }
}

/// Reverse-DNS resolver used by default.
#[derive(Clone, Copy, Debug, Default)]
pub struct DnsResolver;

impl HostResolver for DnsResolver {
    fn resolve(&self, addr: Ipv4Addr) -> String {
        match dns_lookup::lookup_addr(&IpAddr::V4(addr)) {
            Ok(name) => name,
            Err(err) => {
                log::trace!("port: reverse lookup for {addr} failed: {err}");
                addr.to_string()
            }
        }
    }
}
