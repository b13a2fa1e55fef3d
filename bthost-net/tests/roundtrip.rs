//! End-to-end exercise of the Unix-socket request/response and event
//! fan-out paths between `BtClient` and `IpcServer`.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use bthost_core::sal::MockStack;
use bthost_net::client::BtClient;
use bthost_net::server::{IpcServer, Services};
use bthost_types::addr::BdAddr;
use bthost_types::packet::{ResponseErr, ResponseOk};
use bthost_types::profile::ProfileId;

fn spawn_server(socket_path: std::path::PathBuf) {
    let services = Services::new(BdAddr::new([9; 6]), std::sync::Arc::new(|| Box::new(MockStack::new())));
    let server = IpcServer::new(services);
    thread::spawn(move || {
        server.serve(&socket_path).expect("server loop exited");
    });
    // Give the listener a moment to bind before clients dial in.
    thread::sleep(Duration::from_millis(50));
}

#[test]
fn register_then_connect_a2dp_sink_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("host.sock");
    spawn_server(path.clone());

    let client = BtClient::connect(&path, "round-trip-client").unwrap();
    let result = client.connect_device(ProfileId::A2dpSink, BdAddr::new([1; 6])).unwrap();
    assert!(matches!(result, Ok(ResponseOk::Unit)));
}

#[test]
fn connecting_an_unsupported_profile_returns_not_supported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("host.sock");
    spawn_server(path.clone());

    let client = BtClient::connect(&path, "unsupported-client").unwrap();
    let result = client.connect_device(ProfileId::Gatts, BdAddr::new([2; 6])).unwrap();
    assert_eq!(result, Err(ResponseErr::NotSupported));
}

#[test]
fn subscriber_receives_connect_event_from_another_client() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("host.sock");
    spawn_server(path.clone());

    let subscriber = BtClient::connect(&path, "subscriber").unwrap();
    let sub_result = subscriber.subscribe(ProfileId::A2dpSink).unwrap();
    assert!(sub_result.is_ok());

    let (tx, rx) = mpsc::channel();
    subscriber.on_event(
        ProfileId::A2dpSink,
        std::sync::Arc::new(move |ev| {
            let _ = tx.send(ev.body.clone());
        }),
    );

    let actor = BtClient::connect(&path, "actor").unwrap();
    let addr = BdAddr::new([3; 6]);
    actor.connect_device(ProfileId::A2dpSink, addr).unwrap().unwrap();

    let body = rx.recv_timeout(Duration::from_secs(2)).expect("expected a fanned-out event");
    match body {
        bthost_types::packet::EventBody::Connected { addr: got } => assert_eq!(got, addr),
        other => panic!("expected Connected, got {other:?}"),
    }
}

#[test]
fn two_clients_get_independent_instance_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("host.sock");
    spawn_server(path.clone());

    let a = BtClient::connect(&path, "client-a").unwrap();
    let b = BtClient::connect(&path, "client-b").unwrap();
    assert_ne!(a.instance(), b.instance());
}
