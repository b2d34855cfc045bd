//! End-to-end discovery flow: one advertiser broadcasting on the netplay
//! discovery port, one searcher picking it up into its host table.

use std::sync::Arc;
use std::time::Duration;

use link_discovery::{Advertiser, HostTable, Searcher};
use link_proto::{DiscoveryRecord, LinkKind};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn searcher_observes_a_broadcasting_host() {
    let table = Arc::new(HostTable::new());
    let searcher = Searcher::bind(LinkKind::Netplay, table.clone())
        .await
        .expect("bind searcher");

    let record = DiscoveryRecord::new(
        link_proto::constants::magic::NETPLAY_ADV,
        0xCAFE_BABE,
        55_435,
        "Pokemon Emerald",
        "",
    );
    let advertiser = Advertiser::bind(LinkKind::Netplay, record.clone())
        .await
        .expect("bind advertiser");

    let cancel = CancellationToken::new();
    let search_cancel = cancel.clone();
    let search_handle = tokio::spawn(async move { searcher.run(search_cancel).await });

    advertiser.advertise_once().await.expect("advertise");

    timeout(Duration::from_secs(2), async {
        loop {
            if !table.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("host table observed a sighting within 2s");

    cancel.cancel();
    let _ = search_handle.await;

    let seen = table.snapshot();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1.game_crc, record.game_crc);
    assert_eq!(seen[0].1.game_name, "Pokemon Emerald");
}

#[tokio::test]
async fn advertise_once_is_rate_limited_to_one_per_500ms() {
    let record = DiscoveryRecord::new(link_proto::constants::magic::GBA_ADV, 1, 1, "g", "mul_poke");
    let advertiser = Advertiser::bind(LinkKind::GbaLink, record)
        .await
        .expect("bind advertiser");

    let table = Arc::new(HostTable::new());
    let searcher = Searcher::bind(LinkKind::GbaLink, table.clone())
        .await
        .expect("bind searcher");
    let cancel = CancellationToken::new();
    let search_cancel = cancel.clone();
    let search_handle = tokio::spawn(async move { searcher.run(search_cancel).await });

    for _ in 0..5 {
        advertiser.advertise_once().await.expect("advertise");
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();
    let _ = search_handle.await;

    assert_eq!(table.len(), 1, "five rapid calls within 500ms collapse to one broadcast");
}
