//! The IPC wire protocol: a length-delimited, tagged-union packet exchanged
//! between a client library and the host service over the domain socket.
//! Opcodes are namespaced per profile by `ProfileId::domain_byte` so
//! `bthost-net`'s dispatcher can route on that byte alone before ever
//! looking at the payload.

use serde::{Deserialize, Serialize};

use crate::addr::BdAddr;
use crate::audio::AudioConfig;
use crate::profile::ProfileId;

/// Per-client instance handle, minted by the manager on `Register` and
/// echoed back on every subsequent packet so the server can find the
/// instance record without a lookup by process id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

/// An application-scoped id the manager hands out within an instance, e.g.
/// one per registered GATT server or advertising set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppId(pub u32);

/// A request travelling client → server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub instance: Option<InstanceId>,
    pub seq: u32,
    pub profile: ProfileId,
    pub op: RequestOp,
}

/// A response travelling server → client, correlated to a `Request` by
/// `seq`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub seq: u32,
    pub result: Result<ResponseOk, ResponseErr>,
}

/// An unsolicited event travelling server → client, fanned out to every
/// client subscribed to `profile` rather than correlated to a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub instance: InstanceId,
    pub profile: ProfileId,
    pub body: EventBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RequestOp {
    Register { name: String },
    Unregister,

    Connect { addr: BdAddr },
    Disconnect { addr: BdAddr },
    StreamStart { addr: BdAddr },
    StreamSuspend { addr: BdAddr },

    StartDiscovery,
    StopDiscovery,

    Subscribe,
    Unsubscribe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseOk {
    Registered { instance: InstanceId },
    Unit,
    AppId(AppId),
}

/// Mirrors `bthost_core::error::BtError`'s taxonomy without pulling
/// `bthost-core` into the wire-type crate; `bthost-net` converts between the
/// two at the dispatcher boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseErr {
    Parameter(String),
    NotFound,
    NotEnabled,
    Busy,
    Timeout,
    Ipc(String),
    Stack(String),
    NotSupported,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventBody {
    Connected { addr: BdAddr },
    Disconnected { addr: BdAddr },
    StreamStarted { addr: BdAddr },
    StreamSuspended { addr: BdAddr },
    CodecConfig { addr: BdAddr, config: AudioConfig },
    DeviceFound { addr: BdAddr, rssi: i8, name: Option<String> },
}

/// Envelope for everything travelling server → client: a `Response`
/// correlates to one outstanding `Request` by `seq`, an `Event` does not
/// and instead gets fanned out to every subscriber of its profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    Response(Response),
    Event(Event),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_roundtrips_through_json() {
        let req = Request {
            instance: Some(InstanceId(1)),
            seq: 7,
            profile: ProfileId::A2dpSink,
            op: RequestOp::Connect { addr: BdAddr::new([1, 2, 3, 4, 5, 6]) },
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seq, 7);
    }

    #[test]
    fn response_err_roundtrips() {
        let resp = Response { seq: 1, result: Err(ResponseErr::Busy) };
        let json = serde_json::to_string(&resp).unwrap();
        let back: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(back.result, Err(ResponseErr::Busy));
    }

    #[test]
    fn server_message_distinguishes_response_from_event() {
        let msg = ServerMessage::Event(Event {
            instance: InstanceId(1),
            profile: ProfileId::A2dpSink,
            body: EventBody::Connected { addr: BdAddr::new([1; 6]) },
        });
        let json = serde_json::to_string(&msg).unwrap();
        let back: ServerMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, ServerMessage::Event(_)));
    }
}
