//! Serialized console snapshots.
//!
//! A snapshot is a magic tag, a format version byte, and a postcard
//! payload of [`ConsoleState`]. ROM contents are not captured; a snapshot
//! only restores into a console holding the same cartridge.

use serde::{Deserialize, Serialize};

use crate::{
    apu::Apu, cartridge::mapper::MapperSnapshot, controller::Controller, error::StateError,
    ppu::sprite::ScanlineSprite,
};

pub(crate) const STATE_MAGIC: [u8; 4] = *b"FAMS";
pub(crate) const STATE_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CpuState {
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) s: u8,
    pub(crate) pc: u16,
    pub(crate) p: u8,
    pub(crate) nmi_pending: bool,
    pub(crate) prev_nmi_line: bool,
    pub(crate) irq_line: bool,
    pub(crate) halted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PpuState {
    pub(crate) control: u8,
    pub(crate) mask: u8,
    pub(crate) status: u8,
    pub(crate) oam_addr: u8,
    pub(crate) oam: Vec<u8>,
    pub(crate) ciram: Vec<u8>,
    pub(crate) palette: Vec<u8>,
    pub(crate) v: u16,
    pub(crate) t: u16,
    pub(crate) fine_x: u8,
    pub(crate) write_latch: bool,
    pub(crate) data_buffer: u8,
    pub(crate) open_bus: u8,
    pub(crate) scanline: u16,
    pub(crate) dot: u16,
    pub(crate) frame: u64,
    pub(crate) odd_frame: bool,
    pub(crate) next_tile_id: u8,
    pub(crate) next_attribute: u8,
    pub(crate) next_pattern_low: u8,
    pub(crate) next_pattern_high: u8,
    pub(crate) shifter_pattern_low: u16,
    pub(crate) shifter_pattern_high: u16,
    pub(crate) shifter_attribute_low: u16,
    pub(crate) shifter_attribute_high: u16,
    pub(crate) pending_sprites: Vec<(u8, u8)>,
    pub(crate) scanline_sprites: Vec<ScanlineSprite>,
    pub(crate) framebuffer: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CartridgeState {
    pub(crate) mapper_id: u16,
    pub(crate) mapper: MapperSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ConsoleState {
    pub(crate) ram: Vec<u8>,
    pub(crate) cpu: CpuState,
    pub(crate) ppu: PpuState,
    pub(crate) apu: Apu,
    pub(crate) controllers: [Controller; 2],
    pub(crate) open_bus: u8,
    pub(crate) oam_dma_request: Option<u8>,
    pub(crate) cycles: u64,
    pub(crate) cartridge: Option<CartridgeState>,
}

/// Frames a console state with the magic and version prefix.
pub(crate) fn encode(state: &ConsoleState) -> Result<Vec<u8>, StateError> {
    let mut bytes = Vec::with_capacity(16 * 1024);
    bytes.extend_from_slice(&STATE_MAGIC);
    bytes.push(STATE_VERSION);
    let payload = postcard::to_allocvec(state)?;
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Validates the prefix and decodes the payload. Performs no console
/// mutation; callers apply the returned state only after all checks pass.
pub(crate) fn decode(bytes: &[u8]) -> Result<ConsoleState, StateError> {
    if bytes.len() < STATE_MAGIC.len() + 1 || bytes[..STATE_MAGIC.len()] != STATE_MAGIC {
        return Err(StateError::BadMagic);
    }
    let version = bytes[STATE_MAGIC.len()];
    if version != STATE_VERSION {
        return Err(StateError::UnsupportedVersion { version });
    }
    let state = postcard::from_bytes(&bytes[STATE_MAGIC.len() + 1..])?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_foreign_blobs() {
        assert!(matches!(decode(b"NOPE\x01\x00"), Err(StateError::BadMagic)));
        assert!(matches!(decode(b"FA"), Err(StateError::BadMagic)));
    }

    #[test]
    fn rejects_future_versions() {
        let bytes = [b'F', b'A', b'M', b'S', 9];
        assert!(matches!(
            decode(&bytes),
            Err(StateError::UnsupportedVersion { version: 9 })
        ));
    }

    #[test]
    fn truncated_payload_is_corrupt() {
        let bytes = [b'F', b'A', b'M', b'S', STATE_VERSION];
        assert!(matches!(decode(&bytes), Err(StateError::Corrupt(_))));
    }
}
