use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tokio::net::UdpSocket;
use tokio::sync::watch;

use super::*;
use crate::anchor::ClockAnchor;

// Reference frame payload with its precomputed trailer, as captured
// from a beacon master on the wire.
const REFERENCE_PAYLOAD: [u8; 10] = [0xBE, 0xBA, 0xFE, 0xCA, 0xED, 0xFE, 0xEF, 0xBE, 0xAD, 0xDE];
const REFERENCE_CRC: u16 = 0x435A;

#[test]
fn test_crc_all_zero_payload() {
    assert_eq!(crc16_ccitt(&[0u8; 10]), 0x0000);
}

#[test]
fn test_crc_xmodem_check_value() {
    assert_eq!(crc16_ccitt(b"123456789"), 0x31C3);
}

#[test]
fn test_crc_reference_frame() {
    assert_eq!(crc16_ccitt(&REFERENCE_PAYLOAD), REFERENCE_CRC);
}

#[test]
fn test_crc_empty_input() {
    assert_eq!(crc16_ccitt(&[]), 0x0000);
}

#[test]
fn test_decode_reference_frame() {
    let mut data = [0u8; BeaconFrame::LEN];
    data[..10].copy_from_slice(&REFERENCE_PAYLOAD);
    data[10..].copy_from_slice(&REFERENCE_CRC.to_be_bytes());

    let frame = BeaconFrame::decode(&data).expect("reference frame must decode");
    assert_eq!(frame.sequence, 0xBABE);
    assert_eq!(frame.tick, 0xDEAD_BEEF_FEED_CAFE);
}

#[test]
fn test_decode_all_zero_frame() {
    // Zero payload has a zero CRC, so the all-zero frame is valid.
    let frame = BeaconFrame::decode(&[0u8; 12]).expect("all-zero frame must decode");
    assert_eq!(frame.sequence, 0);
    assert_eq!(frame.tick, 0);
}

#[test]
fn test_decode_wrong_length() {
    assert_eq!(BeaconFrame::decode(&[]), Err(FrameError::Length(0)));
    assert_eq!(BeaconFrame::decode(&[0u8; 11]), Err(FrameError::Length(11)));
    assert_eq!(BeaconFrame::decode(&[0u8; 13]), Err(FrameError::Length(13)));
}

#[test]
fn test_decode_checksum_mismatch() {
    let mut data = [0u8; BeaconFrame::LEN];
    data[..10].copy_from_slice(&REFERENCE_PAYLOAD);
    data[10..].copy_from_slice(&0x0000u16.to_be_bytes());

    assert_eq!(
        BeaconFrame::decode(&data),
        Err(FrameError::Checksum {
            computed: REFERENCE_CRC,
            received: 0x0000,
        })
    );
}

#[test]
fn test_encode_matches_reference_sender() {
    let frame = BeaconFrame {
        sequence: 0xBABE,
        tick: 0xDEAD_BEEF_FEED_CAFE,
    };
    let mut expected = [0u8; 12];
    expected[..10].copy_from_slice(&REFERENCE_PAYLOAD);
    expected[10..].copy_from_slice(&REFERENCE_CRC.to_be_bytes());

    assert_eq!(frame.encode(), expected);
}

proptest! {
    #[test]
    fn prop_encoded_frames_decode_exactly(sequence in any::<u16>(), tick in any::<u64>()) {
        let frame = BeaconFrame { sequence, tick };
        let decoded = BeaconFrame::decode(&frame.encode()).expect("own encoding must decode");
        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn prop_single_bit_flip_rejected(
        sequence in any::<u16>(),
        tick in any::<u64>(),
        byte_index in 0usize..12,
        bit in 0u8..8,
    ) {
        let mut data = BeaconFrame { sequence, tick }.encode();
        data[byte_index] ^= 1 << bit;
        prop_assert!(BeaconFrame::decode(&data).is_err());
    }

    #[test]
    fn prop_non_frame_lengths_rejected(data in proptest::collection::vec(any::<u8>(), 0..=64)) {
        prop_assume!(data.len() != BeaconFrame::LEN);
        prop_assert_eq!(BeaconFrame::decode(&data), Err(FrameError::Length(data.len())));
    }
}

/// Bind a receiver on loopback plus a sender socket aimed at it.
async fn receiver_fixture() -> (BeaconReceiver, Arc<ClockAnchor>, UdpSocket, std::net::SocketAddr)
{
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind receiver socket");
    let anchor = Arc::new(ClockAnchor::new());
    let receiver = BeaconReceiver::with_socket(Arc::new(socket), Arc::clone(&anchor), 64);
    let addr = receiver.local_addr().expect("local addr");
    let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind sender socket");
    (receiver, anchor, sender, addr)
}

/// Poll the anchor until `pred` holds or the deadline passes.
async fn wait_for_anchor(
    anchor: &ClockAnchor,
    pred: impl Fn(&crate::anchor::AnchorSnapshot) -> bool,
) -> crate::anchor::AnchorSnapshot {
    for _ in 0..200 {
        let snap = anchor.read();
        if pred(&snap) {
            return snap;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("anchor never reached expected state: {:?}", anchor.read());
}

#[tokio::test]
async fn test_receiver_adopts_valid_frame() {
    let (receiver, anchor, sender, addr) = receiver_fixture().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(async move { receiver.run(shutdown_rx).await });

    let frame = BeaconFrame {
        sequence: 3,
        tick: 9000,
    };
    sender.send_to(&frame.encode(), addr).await.expect("send");

    let snap = wait_for_anchor(&anchor, |s| s.sequence == 3).await;
    assert_eq!(snap.tick, 9000);

    shutdown_tx.send(true).expect("signal shutdown");
    task.await.expect("join").expect("clean exit");
}

#[tokio::test]
async fn test_receiver_ignores_invalid_datagrams() {
    let (receiver, anchor, sender, addr) = receiver_fixture().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(async move { receiver.run(shutdown_rx).await });

    // Runt, oversized, and corrupted datagrams: none may touch the anchor.
    sender.send_to(&[0xFFu8; 5], addr).await.expect("send runt");
    sender
        .send_to(&[0u8; 32], addr)
        .await
        .expect("send oversized");
    let mut corrupted = BeaconFrame {
        sequence: 9,
        tick: 1,
    }
    .encode();
    corrupted[4] ^= 0x01;
    sender.send_to(&corrupted, addr).await.expect("send corrupted");

    // A valid frame afterwards proves all three went through the loop.
    let valid = BeaconFrame {
        sequence: 1,
        tick: 77,
    };
    sender.send_to(&valid.encode(), addr).await.expect("send valid");

    let snap = wait_for_anchor(&anchor, |s| s.sequence == 1).await;
    assert_eq!(snap.tick, 77);

    shutdown_tx.send(true).expect("signal shutdown");
    task.await.expect("join").expect("clean exit");
}

#[tokio::test]
async fn test_receiver_latest_beacon_wins() {
    let (receiver, anchor, sender, addr) = receiver_fixture().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(async move { receiver.run(shutdown_rx).await });

    let newer = BeaconFrame {
        sequence: 10,
        tick: 5000,
    };
    sender.send_to(&newer.encode(), addr).await.expect("send");
    wait_for_anchor(&anchor, |s| s.sequence == 10).await;

    // A stale sequence number still replaces the anchor.
    let stale = BeaconFrame {
        sequence: 4,
        tick: 2000,
    };
    sender.send_to(&stale.encode(), addr).await.expect("send");
    let snap = wait_for_anchor(&anchor, |s| s.sequence == 4).await;
    assert_eq!(snap.tick, 2000);

    shutdown_tx.send(true).expect("signal shutdown");
    task.await.expect("join").expect("clean exit");
}
