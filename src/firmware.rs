use anyhow::{ensure, Context, Result};
use log::{info, warn};
use std::path::Path;

use deku::DekuContainerRead;

use crate::structures::descriptor_map::{DescriptorMap, FLASH_DESCRIPTOR_MAP_SIZE, FLMAP_SIZE};

/// Flash descriptor signature, as read little-endian.
pub const FLASH_SIGNATURE: u32 = 0x0ff0_a55a;
pub const FLASH_SIGNATURE_OFFSET: usize = 0x10;
/// FLMAP0 directly follows the signature.
pub const DESCRIPTOR_MAP_OFFSET: usize = FLASH_SIGNATURE_OFFSET + 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firmware(pub Vec<u8>);

impl std::ops::Deref for Firmware {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Firmware {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self(data)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self(std::fs::read(path)?))
    }

    pub fn slice(&self, offset: usize, size: usize) -> Result<FirmwareStructure<&[u8]>> {
        ensure!(
            offset.checked_add(size).is_some_and(|end| end <= self.len()),
            "Firmware structure out of bounds: {offset:#x}+{size:#x} exceeds image size {:#x}",
            self.len()
        );
        Ok(FirmwareStructure(offset, &self[offset..][..size]))
    }

    pub fn has_signature(&self) -> bool {
        self.slice(FLASH_SIGNATURE_OFFSET, 4)
            .ok()
            .and_then(|sig| sig.1.try_into().ok())
            .map(u32::from_le_bytes)
            == Some(FLASH_SIGNATURE)
    }

    /// Where FLMAP0 lives: right after the signature in a full image, or at
    /// the very start of a bare descriptor map dump.
    pub fn descriptor_map_offset(&self) -> usize {
        if self.has_signature() {
            info!("Flash descriptor signature found at {FLASH_SIGNATURE_OFFSET:#x}");
            DESCRIPTOR_MAP_OFFSET
        } else {
            warn!("No flash descriptor signature, decoding descriptor map at offset 0");
            0
        }
    }

    pub fn read_descriptor_map(&self, offset: usize) -> Result<FirmwareStructure<DescriptorMap>> {
        ensure!(
            offset <= self.len(),
            "Descriptor map offset {offset:#x} is past the end of the image ({:#x} bytes)",
            self.len()
        );
        if offset == DESCRIPTOR_MAP_OFFSET && self.has_signature() {
            // the 4 KiB region starts at the image base, not at FLMAP0
            self.slice(0, FLASH_DESCRIPTOR_MAP_SIZE)
                .context("Flash descriptor region truncated")?;
            let (_, map) = DescriptorMap::from_bytes((&self[offset..][..FLMAP_SIZE], 0))?;
            return Ok(FirmwareStructure(offset, map));
        }
        FirmwareStructure(offset, &self[offset..]).decode()
    }
}

/// A value read from the firmware image, tagged with its image offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareStructure<T>(pub usize, pub T);

impl<T> std::ops::Deref for FirmwareStructure<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.1
    }
}

impl<T> FirmwareStructure<T> {
    pub fn offset(&self) -> usize {
        self.0
    }
}

impl FirmwareStructure<&[u8]> {
    pub fn decode(&self) -> Result<FirmwareStructure<DescriptorMap>> {
        let map = DescriptorMap::decode(self.1).with_context(|| {
            format!(
                "No {FLASH_DESCRIPTOR_MAP_SIZE:#x} byte flash descriptor region at {:#x}",
                self.0
            )
        })?;
        Ok(FirmwareStructure(self.0, map))
    }
}
