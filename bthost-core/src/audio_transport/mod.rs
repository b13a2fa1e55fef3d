//! The bidirectional pipe IPC a profile uses to move PCM/ISO audio to and
//! from its media engine, split into a control channel (commands and
//! events, see [`channel`]) and a data channel (raw frames, fed through
//! [`sink`] or [`source`] depending on direction).

pub mod channel;
pub mod sink;
pub mod source;

use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use bthost_types::audio::ChannelDirection;

use crate::error::BtResult;

pub use sink::{SinkStatus, SinkTransport};
pub use source::SourceTransport;

/// One live audio transport instance: a control socket paired with a data
/// socket, both rooted under the service's `audio_transport_dir`, one pipe
/// pair per active stream.
pub struct AudioTransport {
    pub direction: ChannelDirection,
    pub control: UnixStream,
    pub data: UnixStream,
    sink: Option<SinkTransport>,
    source: Option<SourceTransport>,
}

impl AudioTransport {
    /// Listen for and accept the media engine's connection on the pair of
    /// well-known socket paths for this stream. The media engine dials in
    /// after being told the paths via its own launch arguments — this side
    /// always listens, since the long-lived host process owns the accept
    /// side of the pair.
    pub fn accept(dir: &Path, stream_id: u64, direction: ChannelDirection) -> BtResult<Self> {
        let control_path = control_socket_path(dir, stream_id);
        let data_path = data_socket_path(dir, stream_id);

        let _ = std::fs::remove_file(&control_path);
        let _ = std::fs::remove_file(&data_path);
        let control_listener = UnixListener::bind(&control_path)?;
        let data_listener = UnixListener::bind(&data_path)?;

        let (control, _) = control_listener.accept()?;
        let (data, _) = data_listener.accept()?;
        control.set_nonblocking(true)?;
        data.set_nonblocking(true)?;

        let (sink, source) = match direction {
            ChannelDirection::Sink => (Some(SinkTransport::new()), None),
            ChannelDirection::Source => (None, Some(SourceTransport::new())),
        };

        Ok(Self { direction, control, data, sink, source })
    }

    pub fn sink_mut(&mut self) -> Option<&mut SinkTransport> {
        self.sink.as_mut()
    }

    pub fn source_mut(&mut self) -> Option<&mut SourceTransport> {
        self.source.as_mut()
    }
}

pub fn control_socket_path(dir: &Path, stream_id: u64) -> PathBuf {
    dir.join(format!("stream-{}.ctrl", stream_id))
}

pub fn data_socket_path(dir: &Path, stream_id: u64) -> PathBuf {
    dir.join(format!("stream-{}.data", stream_id))
}
