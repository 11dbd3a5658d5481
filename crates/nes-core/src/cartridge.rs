//! Cartridge loading
//!
//! This module parses iNES images and hands the PRG/CHR data to the mapper chip selected by the
//! header. The mapper owns all cartridge memory afterwards.

use crate::mapper::{self, Mapper, Storage};

/// iNES header size
pub const HEADER_SIZE: usize = 16;
/// Trainer block size
pub const TRAINER_SIZE: usize = 512;
/// PRG ROM bank size
pub const PRG_BANK_SIZE: usize = 16 * 1024;
/// CHR ROM bank size
pub const CHR_BANK_SIZE: usize = 8 * 1024;

/// iNES header structure
#[derive(Debug, Clone)]
pub struct InesHeader {
    /// PRG ROM size in 16KB units
    pub prg_rom_size: u8,
    /// CHR ROM size in 8KB units
    pub chr_rom_size: u8,
    /// Flags 6
    pub flags_6: u8,
    /// Flags 7
    pub flags_7: u8,
}

impl InesHeader {
    /// Parse an iNES header from bytes
    pub fn parse(bytes: &[u8]) -> Result<Self, CartridgeError> {
        if bytes.len() < HEADER_SIZE {
            return Err(CartridgeError::InvalidHeader("Too short"));
        }

        if bytes[0..4] != [b'N', b'E', b'S', 0x1A] {
            return Err(CartridgeError::InvalidHeader("Invalid magic"));
        }

        // NES 2.0 marks itself with 0b10 in bits 2-3
        if bytes[7] & 0x0C == 0x08 {
            return Err(CartridgeError::UnsupportedFormat);
        }

        Ok(Self {
            prg_rom_size: bytes[4],
            chr_rom_size: bytes[5],
            flags_6: bytes[6],
            flags_7: bytes[7],
        })
    }

    /// Get the mapper number from flags
    pub fn mapper_number(&self) -> u8 {
        (self.flags_7 & 0xF0) | (self.flags_6 >> 4)
    }

    /// Check if trainer is present
    pub fn has_trainer(&self) -> bool {
        (self.flags_6 & 0x04) != 0
    }

    /// Check if battery-backed SRAM is present
    pub fn has_battery(&self) -> bool {
        (self.flags_6 & 0x02) != 0
    }

    /// Nametable layout requested by the header
    pub fn mirroring(&self) -> Mirroring {
        if self.flags_6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if self.flags_6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }
}

/// Nametable mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
    SingleScreenLower,
    SingleScreenUpper,
}

impl Mirroring {
    /// Map a nametable address (0x2000-0x2FFF) onto the nametable RAM
    pub fn nametable_address(self, address: u16) -> u16 {
        match self {
            Mirroring::Horizontal => {
                (address & 0x23FF) | if address & 0x0800 != 0 { 0x0400 } else { 0 }
            }
            Mirroring::Vertical => address & 0x27FF,
            Mirroring::FourScreen => address,
            Mirroring::SingleScreenLower => address & 0x23FF,
            Mirroring::SingleScreenUpper => (address & 0x23FF) + 0x0400,
        }
    }
}

/// Load-time description of a cartridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartridgeInfo {
    /// PRG ROM size in 16KB units
    pub prg_banks: u8,
    /// CHR ROM size in 8KB units
    pub chr_banks: u8,
    pub mapper: u8,
    /// Mirroring requested by the header; mappers may switch it at runtime
    pub mirroring: Mirroring,
    pub has_battery: bool,
    pub has_trainer: bool,
}

/// Cartridge structure
pub struct Cartridge {
    info: CartridgeInfo,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Create a new cartridge from iNES ROM data
    pub fn from_rom(rom_data: &[u8]) -> Result<Self, CartridgeError> {
        let header = InesHeader::parse(rom_data)?;

        let mut offset = HEADER_SIZE;
        if header.has_trainer() {
            offset += TRAINER_SIZE;
        }

        let prg_size = usize::from(header.prg_rom_size) * PRG_BANK_SIZE;
        let prg = rom_data
            .get(offset..offset + prg_size)
            .ok_or(CartridgeError::InvalidData("PRG ROM truncated"))?
            .to_vec();
        offset += prg_size;

        let chr_size = usize::from(header.chr_rom_size) * CHR_BANK_SIZE;
        let chr = rom_data
            .get(offset..offset + chr_size)
            .ok_or(CartridgeError::InvalidData("CHR ROM truncated"))?
            .to_vec();

        if prg.is_empty() {
            return Err(CartridgeError::InvalidData("No PRG ROM"));
        }

        let info = CartridgeInfo {
            prg_banks: header.prg_rom_size,
            chr_banks: header.chr_rom_size,
            mapper: header.mapper_number(),
            mirroring: header.mirroring(),
            has_battery: header.has_battery(),
            has_trainer: header.has_trainer(),
        };

        let storage = Storage::new(prg, chr);
        let mapper = mapper::create(info.mapper, storage, info.mirroring)
            .ok_or(CartridgeError::UnsupportedMapper(info.mapper))?;

        log::info!(
            "Loaded cartridge: mapper {}, {} PRG bank(s), {} CHR bank(s), {:?} mirroring, battery: {}, trainer: {}",
            info.mapper,
            info.prg_banks,
            info.chr_banks,
            info.mirroring,
            info.has_battery,
            info.has_trainer
        );

        Ok(Self { info, mapper })
    }

    /// Get the load-time cartridge description
    pub fn info(&self) -> &CartridgeInfo {
        &self.info
    }

    /// Current mirroring, including mapper changes
    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    pub fn mapper_mut(&mut self) -> &mut dyn Mapper {
        self.mapper.as_mut()
    }

    /// Battery RAM contents
    pub fn sram(&self) -> &[u8] {
        self.mapper.sram()
    }

    /// Preload battery RAM; short input is zero-padded, long input truncated
    pub fn load_sram(&mut self, data: &[u8]) {
        let sram = self.mapper.sram_mut();
        if data.len() != sram.len() {
            log::warn!(
                "Save RAM is {} bytes, expected {}; adjusting",
                data.len(),
                sram.len()
            );
        }
        let len = data.len().min(sram.len());
        sram.fill(0);
        sram[..len].copy_from_slice(&data[..len]);
    }
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("info", &self.info)
            .field("mirroring", &self.mirroring())
            .finish()
    }
}

/// Cartridge error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartridgeError {
    InvalidHeader(&'static str),
    /// NES 2.0 images
    UnsupportedFormat,
    UnsupportedMapper(u8),
    InvalidData(&'static str),
}

impl std::fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartridgeError::InvalidHeader(msg) => write!(f, "Invalid iNES header: {}", msg),
            CartridgeError::UnsupportedFormat => write!(f, "NES 2.0 format is not supported"),
            CartridgeError::UnsupportedMapper(n) => write!(f, "Unsupported mapper: {}", n),
            CartridgeError::InvalidData(msg) => write!(f, "Invalid cartridge data: {}", msg),
        }
    }
}

impl std::error::Error for CartridgeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom(prg_banks: u8, chr_banks: u8, flags_6: u8, flags_7: u8) -> Vec<u8> {
        let mut rom = Vec::new();
        rom.extend_from_slice(b"NES\x1A");
        rom.push(prg_banks);
        rom.push(chr_banks);
        rom.push(flags_6);
        rom.push(flags_7);
        rom.extend_from_slice(&[0u8; 8]);
        if flags_6 & 0x04 != 0 {
            rom.extend_from_slice(&[0xEEu8; TRAINER_SIZE]);
        }
        rom.extend_from_slice(&vec![0xFFu8; usize::from(prg_banks) * PRG_BANK_SIZE]);
        rom.extend_from_slice(&vec![0x00u8; usize::from(chr_banks) * CHR_BANK_SIZE]);
        rom
    }

    #[test]
    fn test_header_parsing() {
        let header = InesHeader::parse(&rom(2, 1, 0x13, 0x40)).unwrap();
        assert_eq!(header.prg_rom_size, 2);
        assert_eq!(header.chr_rom_size, 1);
        assert_eq!(header.mapper_number(), 0x41);
        assert!(header.has_battery());
        assert!(!header.has_trainer());
        assert_eq!(header.mirroring(), Mirroring::Vertical);
    }

    #[test]
    fn test_four_screen_overrides_vertical() {
        let header = InesHeader::parse(&rom(1, 1, 0x09, 0)).unwrap();
        assert_eq!(header.mirroring(), Mirroring::FourScreen);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = rom(1, 1, 0, 0);
        data[3] = 0x1B;
        assert_eq!(
            Cartridge::from_rom(&data).err(),
            Some(CartridgeError::InvalidHeader("Invalid magic"))
        );
    }

    #[test]
    fn test_rejects_nes2_header() {
        assert_eq!(
            Cartridge::from_rom(&rom(1, 1, 0, 0x08)).err(),
            Some(CartridgeError::UnsupportedFormat)
        );
    }

    #[test]
    fn test_rejects_unknown_mapper() {
        assert_eq!(
            Cartridge::from_rom(&rom(1, 1, 0x50, 0)).err(),
            Some(CartridgeError::UnsupportedMapper(5))
        );
    }

    #[test]
    fn test_rejects_truncated_image() {
        let mut data = rom(2, 1, 0, 0);
        data.truncate(HEADER_SIZE + PRG_BANK_SIZE);
        assert_eq!(
            Cartridge::from_rom(&data).err(),
            Some(CartridgeError::InvalidData("PRG ROM truncated"))
        );
    }

    #[test]
    fn test_trainer_is_skipped() {
        let mut cart = Cartridge::from_rom(&rom(1, 1, 0x04, 0)).unwrap();
        assert!(cart.info().has_trainer);
        assert_eq!(cart.mapper_mut().read(0x8000), 0xFF);
    }

    #[test]
    fn test_load_sram_pads_and_truncates() {
        let mut cart = Cartridge::from_rom(&rom(1, 1, 0x02, 0)).unwrap();
        cart.load_sram(&[1, 2, 3]);
        assert_eq!(&cart.sram()[..4], &[1, 2, 3, 0]);

        cart.load_sram(&vec![7u8; 0x3000]);
        assert_eq!(cart.sram().len(), 0x2000);
        assert!(cart.sram().iter().all(|&b| b == 7));
    }

    #[test]
    fn test_mirroring_layouts() {
        assert_eq!(Mirroring::Horizontal.nametable_address(0x2400), 0x2000);
        assert_eq!(Mirroring::Horizontal.nametable_address(0x2800), 0x2400);
        assert_eq!(Mirroring::Vertical.nametable_address(0x2800), 0x2000);
        assert_eq!(Mirroring::Vertical.nametable_address(0x2C10), 0x2410);
        assert_eq!(Mirroring::FourScreen.nametable_address(0x2C10), 0x2C10);
        assert_eq!(Mirroring::SingleScreenLower.nametable_address(0x2C10), 0x2010);
        assert_eq!(Mirroring::SingleScreenUpper.nametable_address(0x2810), 0x2410);
    }
}
