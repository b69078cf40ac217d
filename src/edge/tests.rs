use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};

use super::*;
use crate::error::NodeError;
use crate::testing::SimulatedEdgeSource;

#[tokio::test]
async fn test_monitor_forwards_edges_in_order() {
    let (source, edges) = SimulatedEdgeSource::new(8);
    let (tx, mut rx) = mpsc::channel(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let monitor = EdgeMonitor::new(source, tx);
    let task = tokio::spawn(monitor.run(shutdown_rx));

    let first = Instant::now();
    let second = first + Duration::from_millis(1);
    assert!(edges.trigger_at(first));
    assert!(edges.trigger_at(second));

    assert_eq!(rx.recv().await.expect("first edge").at, first);
    assert_eq!(rx.recv().await.expect("second edge").at, second);

    shutdown_tx.send(true).expect("signal shutdown");
    task.await.expect("join").expect("clean exit");
}

#[tokio::test]
async fn test_monitor_drops_edges_when_queue_full() {
    let (source, edges) = SimulatedEdgeSource::new(8);
    // Capture queue of one, and no consumer: the second and third edges
    // must be dropped, not queued and not fatal.
    let (tx, mut rx) = mpsc::channel(1);

    // Queue all three edges, then hang up so the monitor stops on its
    // own once the source is drained.
    assert!(edges.trigger());
    assert!(edges.trigger());
    assert!(edges.trigger());
    drop(edges);

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = EdgeMonitor::new(source, tx);
    let result = monitor.run(shutdown_rx).await;
    assert!(matches!(result, Err(NodeError::EdgeSourceClosed)));

    // Exactly one edge made it through.
    assert!(rx.recv().await.is_some());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_monitor_fails_when_capture_worker_gone() {
    let (source, edges) = SimulatedEdgeSource::new(1);
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    assert!(edges.trigger());

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = EdgeMonitor::new(source, tx);
    let result = monitor.run(shutdown_rx).await;
    assert!(matches!(result, Err(NodeError::CapturePipelineClosed)));
}

#[tokio::test]
async fn test_monitor_stops_on_shutdown_while_waiting() {
    let (source, _edges) = SimulatedEdgeSource::new(1);
    let (tx, _rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let monitor = EdgeMonitor::new(source, tx);
    let task = tokio::spawn(monitor.run(shutdown_rx));

    shutdown_tx.send(true).expect("signal shutdown");
    task.await.expect("join").expect("clean exit");
}
