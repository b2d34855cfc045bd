use std::net::IpAddr;

use dashmap::DashMap;
use link_proto::DiscoveryRecord;

/// Bounded, deduplicating table of hosts seen on the network.
///
/// Keyed by the peer's IP address rather than its full `SocketAddr` (spec
/// §3): the same host re-advertising from a new ephemeral UDP source port
/// (e.g. after its advertiser socket is rebound) must refresh the existing
/// entry, not occupy a second slot.
///
/// Capped at [`Self::MAX_ENTRIES`] (spec §3) so a noisy LAN segment can't
/// grow this without bound; once full, a host not already in the table is
/// simply dropped rather than evicting an existing entry (styled after
/// `IpRateLimiter::cleanup_stale`'s "good enough" eviction policy — there is
/// no ordering to exploit here since UDP gives no notion of "oldest").
pub struct HostTable {
    hosts: DashMap<IpAddr, DiscoveryRecord>,
}

impl HostTable {
    pub const MAX_ENTRIES: usize = 8;

    pub fn new() -> Self {
        Self { hosts: DashMap::new() }
    }

    /// Record (or refresh) a sighting. Returns `true` if the table now
    /// contains this host, `false` if it was dropped for being full.
    pub fn observe(&self, from: IpAddr, record: DiscoveryRecord) -> bool {
        if !self.hosts.contains_key(&from) && self.hosts.len() >= Self::MAX_ENTRIES {
            return false;
        }
        self.hosts.insert(from, record);
        true
    }

    pub fn snapshot(&self) -> Vec<(IpAddr, DiscoveryRecord)> {
        self.hosts.iter().map(|e| (*e.key(), e.value().clone())).collect()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn clear(&self) {
        self.hosts.clear();
    }
}

impl Default for HostTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn addr(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, last))
    }

    fn rec() -> DiscoveryRecord {
        DiscoveryRecord::new(link_proto::constants::magic::NETPLAY_ADV, 1, 1, "game", "")
    }

    #[test]
    fn caps_at_eight_distinct_hosts() {
        let table = HostTable::new();
        for i in 0..8u8 {
            assert!(table.observe(addr(i), rec()));
        }
        assert!(!table.observe(addr(9), rec()));
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn refreshing_an_existing_host_is_not_rejected_when_full() {
        let table = HostTable::new();
        for i in 0..8u8 {
            table.observe(addr(i), rec());
        }
        assert!(table.observe(addr(0), rec()));
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn same_ip_different_source_port_refreshes_one_slot() {
        let table = HostTable::new();
        assert!(table.observe(addr(1), rec()));
        assert!(table.observe(addr(1), rec()), "same IP, would-be second source port");
        assert_eq!(table.len(), 1);
    }
}
