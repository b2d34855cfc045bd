//! LAN discovery for all three link modes (spec §4.2): broadcast
//! advertisement, passive searching into a bounded host table, and
//! point-to-point queries.

pub mod advertiser;
pub mod error;
pub mod host_table;
pub mod searcher;

pub use advertiser::Advertiser;
pub use error::DiscoveryError;
pub use host_table::HostTable;
pub use searcher::Searcher;
