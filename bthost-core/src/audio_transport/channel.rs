//! The wire encoding for the audio control channel: a one-byte opcode,
//! optionally followed by a fixed parameter block. Kept independent of
//! `bthost-net`'s length-delimited JSON framing since the media engine on
//! the other end of this pipe is not a protocol client — it is the audio
//! HAL/player speaking a tiny fixed-layout codec.

use std::io::{Read, Write};

use bthost_types::audio::{AudioConfig, CtrlCommand, CtrlEvent};

use crate::error::{BtError, BtResult};

const CONFIG_BLOCK_LEN: usize = 1 + 4 * 7; // valid:u8 + 7 u32 fields

fn encode_config(cfg: &AudioConfig) -> [u8; CONFIG_BLOCK_LEN] {
    let mut buf = [0u8; CONFIG_BLOCK_LEN];
    buf[0] = cfg.valid as u8;
    let fields = [
        cfg.codec_type,
        cfg.sample_rate,
        cfg.bits_per_sample,
        cfg.channel_mode,
        cfg.bit_rate,
        cfg.frame_size,
        cfg.packet_size,
    ];
    for (i, f) in fields.iter().enumerate() {
        let off = 1 + i * 4;
        buf[off..off + 4].copy_from_slice(&f.to_le_bytes());
    }
    buf
}

fn decode_config(buf: &[u8; CONFIG_BLOCK_LEN]) -> AudioConfig {
    let field = |i: usize| {
        let off = 1 + i * 4;
        u32::from_le_bytes(buf[off..off + 4].try_into().unwrap())
    };
    AudioConfig {
        valid: buf[0] != 0,
        codec_type: field(0),
        sample_rate: field(1),
        bits_per_sample: field(2),
        channel_mode: field(3),
        bit_rate: field(4),
        frame_size: field(5),
        packet_size: field(6),
    }
}

/// Send one control command to the media engine.
pub fn write_command(w: &mut impl Write, cmd: CtrlCommand) -> BtResult<()> {
    w.write_all(&[cmd.opcode()])?;
    Ok(())
}

/// Send one control event to the media engine.
pub fn write_event(w: &mut impl Write, event: &CtrlEvent) -> BtResult<()> {
    w.write_all(&[event.opcode()])?;
    if let CtrlEvent::UpdateConfig(cfg) = event {
        w.write_all(&encode_config(cfg))?;
    }
    Ok(())
}

/// Blocking read of exactly one command from the media engine.
pub fn read_command(r: &mut impl Read) -> BtResult<CtrlCommand> {
    let mut op = [0u8; 1];
    r.read_exact(&mut op)?;
    CtrlCommand::from_opcode(op[0]).ok_or_else(|| BtError::Parameter(format!("unknown ctrl opcode {}", op[0])))
}

/// Blocking read of exactly one event, including its parameter block if any.
pub fn read_event(r: &mut impl Read) -> BtResult<CtrlEvent> {
    let mut op = [0u8; 1];
    r.read_exact(&mut op)?;
    match op[0] {
        0x81 => Ok(CtrlEvent::Started),
        0x82 => Ok(CtrlEvent::StartFail),
        0x83 => Ok(CtrlEvent::Stopped),
        0x84 => {
            let mut buf = [0u8; CONFIG_BLOCK_LEN];
            r.read_exact(&mut buf)?;
            Ok(CtrlEvent::UpdateConfig(decode_config(&buf)))
        }
        other => Err(BtError::Parameter(format!("unknown ctrl event opcode {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn command_roundtrips() {
        let mut buf = Vec::new();
        write_command(&mut buf, CtrlCommand::Start).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_command(&mut cursor).unwrap(), CtrlCommand::Start);
    }

    #[test]
    fn update_config_event_roundtrips_with_param_block() {
        let cfg = AudioConfig {
            valid: true,
            codec_type: 1,
            sample_rate: 48000,
            bits_per_sample: 16,
            channel_mode: 2,
            bit_rate: 320_000,
            frame_size: 128,
            packet_size: 256,
        };
        let mut buf = Vec::new();
        write_event(&mut buf, &CtrlEvent::UpdateConfig(cfg)).unwrap();
        let mut cursor = Cursor::new(buf);
        match read_event(&mut cursor).unwrap() {
            CtrlEvent::UpdateConfig(got) => assert_eq!(got, cfg),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
