//! GBA link packet relay end-to-end (spec §8 scenario 5): 256 distinct
//! 128-byte packets sent host-to-client over a real TCP pair, preserved
//! in order and in full at the other end.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use link_gba::{BridgeHandle, CoreCallbacks, GbaBridge};
use link_proto::LinkKind;
use link_session::Role;
use link_transport::Transport;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct RecordingCallbacks {
    received: Mutex<Vec<Vec<u8>>>,
}

impl CoreCallbacks for RecordingCallbacks {
    fn start(&self, _client_id: u16, _handle: BridgeHandle) {}
    fn stop(&self) {}
    fn receive(&self, buf: &[u8], _remote_client_id: u16) {
        self.received.lock().expect("lock").push(buf.to_vec());
    }
    fn connected(&self, _remote_client_id: u16) {}
    fn disconnected(&self) {}
}

async fn connected_pair() -> (Transport, Transport) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    let client = TcpStream::connect(addr).await.expect("connect");
    let (server, _) = listener.accept().await.expect("accept");
    (
        Transport::new(server, LinkKind::GbaLink).expect("tune host"),
        Transport::new(client, LinkKind::GbaLink).expect("tune client"),
    )
}

const PACKET_COUNT: usize = 256;
const PACKET_SIZE: usize = 128;

#[tokio::test]
async fn two_hundred_fifty_six_packets_arrive_in_order() {
    let (host_transport, client_transport) = connected_pair().await;

    let host_callbacks = Arc::new(RecordingCallbacks::default());
    let (mut host_bridge, host_tx) = GbaBridge::new(host_transport, Role::Host, 0, 1, host_callbacks);
    host_bridge.announce_connected(BridgeHandle::new(host_tx.clone()));

    let client_callbacks = Arc::new(RecordingCallbacks::default());
    let (mut client_bridge, client_tx) = GbaBridge::new(client_transport, Role::Client, 1, 0, client_callbacks.clone());
    client_bridge.announce_connected(BridgeHandle::new(client_tx));

    let packets: Vec<Vec<u8>> = (0..PACKET_COUNT)
        .map(|i| vec![(i % 256) as u8; PACKET_SIZE])
        .collect();
    let handle = BridgeHandle::new(host_tx);
    for packet in &packets {
        assert!(handle.send(packet));
    }

    let host_cancel = CancellationToken::new();
    let client_cancel = CancellationToken::new();
    let host_cancel_inner = host_cancel.clone();
    let client_cancel_inner = client_cancel.clone();

    let host_task = tokio::spawn(async move { host_bridge.run(host_cancel_inner).await });
    let client_task = tokio::spawn(async move { client_bridge.run(client_cancel_inner).await });

    timeout(Duration::from_secs(10), async {
        loop {
            if client_callbacks.received.lock().expect("lock").len() == PACKET_COUNT {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("all 256 packets arrived within 10s");

    host_cancel.cancel();
    client_cancel.cancel();
    let _ = host_task.await;
    let _ = client_task.await;

    let received = client_callbacks.received.lock().expect("lock");
    assert_eq!(received.len(), PACKET_COUNT);
    for (i, packet) in received.iter().enumerate() {
        assert_eq!(packet, &packets[i], "packet {i} corrupted or reordered");
    }
}
