//! Audio transport wire types: the control-channel protocol and the codec
//! configuration it carries.

use serde::{Deserialize, Serialize};

/// One of the two duplex channel pairs a transport instance owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelDirection {
    /// Host service → media engine (encoded/PCM audio out to the peer).
    Sink,
    /// Media engine → host service (audio captured from the peer).
    Source,
}

/// Negotiated codec configuration, carried in `UpdateConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub valid: bool,
    pub codec_type: u32,
    pub sample_rate: u32,
    pub bits_per_sample: u32,
    pub channel_mode: u32,
    pub bit_rate: u32,
    pub frame_size: u32,
    pub packet_size: u32,
}

impl AudioConfig {
    pub const INVALID: AudioConfig = AudioConfig {
        valid: false,
        codec_type: 0,
        sample_rate: 0,
        bits_per_sample: 0,
        channel_mode: 0,
        bit_rate: 0,
        frame_size: 0,
        packet_size: 0,
    };
}

/// Commands the media engine sends over the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CtrlCommand {
    Start,
    Stop,
    ConfigDone,
}

/// Events the host service sends back over the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CtrlEvent {
    Started,
    StartFail,
    Stopped,
    UpdateConfig(AudioConfig),
}

impl CtrlCommand {
    /// Single-byte opcode used on the wire; `UpdateConfig` follows its byte
    /// with a fixed parameter block instead of carrying no payload.
    pub fn opcode(self) -> u8 {
        match self {
            CtrlCommand::Start => 0x01,
            CtrlCommand::Stop => 0x02,
            CtrlCommand::ConfigDone => 0x03,
        }
    }

    pub fn from_opcode(op: u8) -> Option<Self> {
        match op {
            0x01 => Some(CtrlCommand::Start),
            0x02 => Some(CtrlCommand::Stop),
            0x03 => Some(CtrlCommand::ConfigDone),
            _ => None,
        }
    }
}

impl CtrlEvent {
    pub fn opcode(&self) -> u8 {
        match self {
            CtrlEvent::Started => 0x81,
            CtrlEvent::StartFail => 0x82,
            CtrlEvent::Stopped => 0x83,
            CtrlEvent::UpdateConfig(_) => 0x84,
        }
    }
}

/// Queue depth at which the sink starts its 10ms media timer.
pub const SINK_QUEUE_START_THRESHOLD: usize = 5;
/// Hard cap on enqueued-but-undelivered sink packets; overflow drops the head.
pub const SINK_QUEUE_MAX: usize = 14;
/// Cap on packets allowed in flight (submitted-but-not-acked writes).
pub const SINK_INFLIGHT_MAX: usize = 14;
/// Sink media tick interval once the queue has primed.
pub const SINK_TICK_MS: u64 = 10;
/// How often a full write-queue reports "blocking" to the owning profile.
pub const SINK_BLOCK_REPORT_MS: u64 = 20;
/// Gap since the last delivered packet after which an empty queue counts
/// as an underrun.
pub const SINK_UNDERFLOW_GAP_MS: u64 = 20;
/// Source ring buffer capacity.
pub const SOURCE_RING_BYTES: usize = 4096;
/// Default source pull tick when the codec doesn't specify a frame duration.
pub const SOURCE_DEFAULT_TICK_MS: u64 = 10;
