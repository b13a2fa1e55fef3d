//! Per-profile event sets that drive each profile's state machine.

use serde::{Deserialize, Serialize};

use crate::hci::HciVscCommand;
use crate::hfp::{CallHeldIndicator, CallIndicator, CallSetupIndicator};

/// A2DP state-machine event set: local requests, stack events and timers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum A2dpEvent {
    ConnectReq,
    DisconnectReq,
    StreamStartReq,
    StreamSuspendReq,
    DelayStreamStartReq,
    OffloadStartReq(HciVscCommand),
    OffloadStopReq,

    Connected,
    Disconnected,
    StreamStarted,
    StreamSuspended,
    StreamClosed,
    CodecConfig,
    DeviceCodecStateChange,
    DataInd,
    OffloadStartEvt,
    OffloadStopEvt,

    ConnectTimeout,
    StartTimeout,
    SuspendTimeout,
    DelayStartTimeout,
    OffloadTimeout,
    AvrcpTargetStartTimeout,
    PeerPartialReconn,
}

/// HFP-AG/HF shared event set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HfpEvent {
    ConnectReq,
    DisconnectReq,
    AudioConnectReq,
    AudioDisconnectReq,
    StartVirtualCallReq,

    Connected,
    Disconnected,
    AudioConnected,
    AudioDisconnected,
    CallIndicatorChanged(CallIndicator),
    CallSetupChanged(CallSetupIndicator),
    CallHeldChanged(CallHeldIndicator),
    AtCommand { prefix: String, value: String },
    VolumeChangedByPeer(u8),
    VolumeChangedByEngine(u8),

    ConnectTimeout,
    RetryTimeout,
    /// The peer is requesting SCO be brought up.
    StackAudioReq,
}
