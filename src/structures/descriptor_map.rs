use deku::prelude::*;
use log::debug;

use crate::error::{BaseField, ConsistencyError, DecodeError};

/// Size of the flash descriptor region.
pub const FLASH_DESCRIPTOR_MAP_SIZE: usize = 0x1000;
/// Highest base offset any descriptor section may start at.
pub const FLASH_DESCRIPTOR_MAP_MAX_BASE: u8 = 0xe0;
/// FLMAP0..FLMAP3, four 32-bit words.
pub const FLMAP_SIZE: usize = 16;

/// The Intel flash descriptor map (FLMAP0..FLMAP3).
///
/// Every field is a single byte, so the little-endian words only fix the
/// order: the lowest-addressed byte of each FLMAP word comes first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct DescriptorMap {
    // FLMAP0
    pub component_base: u8,
    pub number_of_flash_chips: u8,
    pub region_base: u8,
    pub number_of_regions: u8,

    // FLMAP1
    pub master_base: u8,
    pub number_of_masters: u8,
    pub pch_straps_base: u8,
    pub number_of_pch_straps: u8,

    // FLMAP2
    pub proc_straps_base: u8,
    pub number_of_proc_straps: u8,
    pub icc_table_base: u8,
    pub number_of_icc_table_entries: u8,

    // FLMAP3
    pub dmi_table_base: u8,
    pub number_of_dmi_table_entries: u8,
    pub reserved0: u8,
    pub reserved1: u8,
}

impl DescriptorMap {
    /// Decodes the map from the start of a descriptor region.
    ///
    /// `buf` must cover the whole 4 KiB region even though only the first
    /// [`FLMAP_SIZE`] bytes are read.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < FLASH_DESCRIPTOR_MAP_SIZE {
            return Err(DecodeError::Size {
                expected: FLASH_DESCRIPTOR_MAP_SIZE,
                actual: buf.len(),
            });
        }

        let (_, map) = Self::from_bytes((&buf[..FLMAP_SIZE], 0))?;
        debug!("Decoded {map}");
        Ok(map)
    }

    /// The displayed fields in FLMAP order. Reserved bytes are left out.
    pub fn fields(&self) -> [(&'static str, u8); 14] {
        [
            ("ComponentBase", self.component_base),
            ("NumberOfFlashChips", self.number_of_flash_chips),
            ("RegionBase", self.region_base),
            ("NumberOfRegions", self.number_of_regions),
            ("MasterBase", self.master_base),
            ("NumberOfMasters", self.number_of_masters),
            ("PchStrapsBase", self.pch_straps_base),
            ("NumberOfPchStraps", self.number_of_pch_straps),
            ("ProcStrapsBase", self.proc_straps_base),
            ("NumberOfProcStraps", self.number_of_proc_straps),
            ("IccTableBase", self.icc_table_base),
            ("NumberOfIccTableEntries", self.number_of_icc_table_entries),
            ("DmiTableBase", self.dmi_table_base),
            ("NumberOfDmiTableEntries", self.number_of_dmi_table_entries),
        ]
    }

    /// Multi-line description of every field, as decimal and hex.
    pub fn summary(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::from("FlashDescriptorMap{\n");
        for (name, value) in self.fields() {
            let _ = writeln!(out, "    {name}={value} ({value:#04x})");
        }
        out.push('}');
        out
    }

    /// Runs every consistency check and returns all violations found.
    pub fn validate(&self) -> Vec<ConsistencyError> {
        let mut errors = vec![];

        let bases = [
            (BaseField::MasterBase, self.master_base),
            (BaseField::RegionBase, self.region_base),
            (BaseField::ComponentBase, self.component_base),
        ];
        for (field, actual) in bases {
            if actual > FLASH_DESCRIPTOR_MAP_MAX_BASE {
                errors.push(ConsistencyError::BaseTooLarge {
                    field,
                    limit: FLASH_DESCRIPTOR_MAP_MAX_BASE,
                    actual,
                });
            }
        }

        let pairs = [
            (BaseField::MasterBase, self.master_base, BaseField::RegionBase, self.region_base),
            (BaseField::MasterBase, self.master_base, BaseField::ComponentBase, self.component_base),
            (BaseField::RegionBase, self.region_base, BaseField::ComponentBase, self.component_base),
        ];
        for (first, a, second, b) in pairs {
            if a == b {
                errors.push(ConsistencyError::Overlap {
                    first,
                    second,
                    shared: a,
                });
            }
        }

        errors
    }
}

impl std::fmt::Display for DescriptorMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FlashDescriptorMap{{NumberOfRegions={}, NumberOfFlashChips={}, NumberOfMasters={}, \
             NumberOfPchStraps={}, NumberOfProcStraps={}, NumberOfIccTableEntries={}, \
             NumberOfDmiTableEntries={}}}",
            self.number_of_regions,
            self.number_of_flash_chips,
            self.number_of_masters,
            self.number_of_pch_straps,
            self.number_of_proc_straps,
            self.number_of_icc_table_entries,
            self.number_of_dmi_table_entries,
        )
    }
}
