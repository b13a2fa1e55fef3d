//! IPC client: `send_recv` writes a request and blocks for the matching
//! reply; a background reader thread demultiplexes everything else the
//! server pushes — correlated responses go to the waiting caller, event
//! packets go to whichever per-profile callbacks are registered.

use std::collections::HashMap;
use std::io::{BufReader, BufWriter};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use log::warn;

use bthost_types::packet::{InstanceId, Request, RequestOp, Response, ResponseErr, ResponseOk, ServerMessage};
use bthost_types::profile::ProfileId;

use crate::framing::{read_message, write_message};

pub type EventCallback = Arc<dyn Fn(&bthost_types::packet::Event) + Send + Sync>;

type PendingMap = Arc<Mutex<HashMap<u32, Sender<Response>>>>;
type EventTable = Arc<Mutex<HashMap<ProfileId, Vec<EventCallback>>>>;

fn reader_thread(stream: UnixStream, pending: PendingMap, events: EventTable) {
    let mut reader = BufReader::new(stream);
    loop {
        let msg: ServerMessage = match read_message(&mut reader) {
            Ok(m) => m,
            Err(_) => break,
        };
        match msg {
            ServerMessage::Response(resp) => {
                if let Some(tx) = pending.lock().unwrap().remove(&resp.seq) {
                    let _ = tx.send(resp);
                }
            }
            ServerMessage::Event(ev) => {
                let callbacks = events.lock().unwrap().get(&ev.profile).cloned().unwrap_or_default();
                for cb in &callbacks {
                    cb(&ev);
                }
            }
        }
    }
}

/// A connected client instance, holding the id the server minted on
/// `Register`.
pub struct BtClient {
    writer: Mutex<BufWriter<UnixStream>>,
    pending: PendingMap,
    events: EventTable,
    next_seq: AtomicU32,
    instance: InstanceId,
}

impl BtClient {
    pub fn connect(socket_path: &Path, name: &str) -> std::io::Result<Self> {
        let stream = UnixStream::connect(socket_path)?;
        let reader_stream = stream.try_clone()?;
        let writer = Mutex::new(BufWriter::new(stream));

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let events: EventTable = Arc::new(Mutex::new(HashMap::new()));

        let reader_pending = pending.clone();
        let reader_events = events.clone();
        thread::spawn(move || reader_thread(reader_stream, reader_pending, reader_events));

        let mut client = Self { writer, pending, events, next_seq: AtomicU32::new(1), instance: InstanceId(0) };
        let reg = client.send_recv(None, ProfileId::A2dpSink, RequestOp::Register { name: name.to_string() })?;
        match reg {
            Ok(ResponseOk::Registered { instance }) => client.instance = instance,
            Ok(_) => return Err(bad_reply("expected Registered")),
            Err(e) => return Err(bad_reply(&format!("register rejected: {e:?}"))),
        }
        Ok(client)
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Register a callback invoked on this thread-pool's reader thread for
    /// every event the server fans out for `profile`. Does not itself send a
    /// `Subscribe` request — call `subscribe` for that.
    pub fn on_event(&self, profile: ProfileId, callback: EventCallback) {
        self.events.lock().unwrap().entry(profile).or_default().push(callback);
    }

    pub fn subscribe(&self, profile: ProfileId) -> std::io::Result<Result<ResponseOk, ResponseErr>> {
        self.send_recv(Some(self.instance), profile, RequestOp::Subscribe)
    }

    pub fn unsubscribe(&self, profile: ProfileId) -> std::io::Result<Result<ResponseOk, ResponseErr>> {
        self.send_recv(Some(self.instance), profile, RequestOp::Unsubscribe)
    }

    pub fn connect_device(&self, profile: ProfileId, addr: bthost_types::addr::BdAddr) -> std::io::Result<Result<ResponseOk, ResponseErr>> {
        self.send_recv(Some(self.instance), profile, RequestOp::Connect { addr })
    }

    pub fn disconnect_device(&self, profile: ProfileId, addr: bthost_types::addr::BdAddr) -> std::io::Result<Result<ResponseOk, ResponseErr>> {
        self.send_recv(Some(self.instance), profile, RequestOp::Disconnect { addr })
    }

    /// Write `op` and block until the server's correlated response arrives.
    pub fn send_recv(
        &self,
        instance: Option<InstanceId>,
        profile: ProfileId,
        op: RequestOp,
    ) -> std::io::Result<Result<ResponseOk, ResponseErr>> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel();
        self.pending.lock().unwrap().insert(seq, tx);

        let req = Request { instance, seq, profile, op };
        {
            let mut w = self.writer.lock().unwrap();
            if let Err(e) = write_message(&mut *w, &req) {
                self.pending.lock().unwrap().remove(&seq);
                return Err(e);
            }
        }

        match rx.recv() {
            Ok(resp) => Ok(resp.result),
            Err(_) => {
                warn!("connection closed while awaiting response to seq {seq}");
                Err(bad_reply("connection closed before reply"))
            }
        }
    }
}

fn bad_reply(msg: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg.to_string())
}
