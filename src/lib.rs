//! Decoder and consistency checks for the Intel flash descriptor map
//! (FLMAP0..FLMAP3) at the start of the flash descriptor region.

pub mod error;
pub mod firmware;
pub mod logger;
pub mod structures;
