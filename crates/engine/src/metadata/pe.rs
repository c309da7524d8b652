// crates/engine/src/metadata/pe.rs
//! Just enough of the PE/COFF layout to find the CLI header.

use super::reader::ByteReader;
use crate::error::MetadataError;

type Result<T> = std::result::Result<T, MetadataError>;

pub(crate) const DOS_MAGIC: &[u8; 2] = b"MZ";
const PE_SIGNATURE: &[u8; 4] = b"PE\0\0";
const LFANEW_OFFSET: usize = 0x3C;
const COFF_HEADER_LEN: usize = 20;
const SECTION_HEADER_LEN: usize = 40;

const PE32_MAGIC: u16 = 0x10B;
const PE32_PLUS_MAGIC: u16 = 0x20B;

/// Index of the CLI (COM descriptor) entry in the data directory.
const CLI_DIRECTORY: u32 = 14;

#[derive(Debug, Clone, Copy)]
struct Section {
    virtual_address: u32,
    virtual_size: u32,
    raw_size: u32,
    raw_pointer: u32,
}

impl Section {
    fn contains(&self, rva: u32) -> bool {
        let span = self.virtual_size.max(self.raw_size);
        rva >= self.virtual_address
            && u64::from(rva) < u64::from(self.virtual_address) + u64::from(span)
    }
}

/// Parsed PE image with its section map.
#[derive(Debug)]
pub struct PeImage<'a> {
    data: &'a [u8],
    sections: Vec<Section>,
    cli_rva: u32,
    cli_size: u32,
}

impl<'a> PeImage<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut dos = ByteReader::new(data);
        if dos.bytes(2)? != DOS_MAGIC {
            return Err(MetadataError::NotPortableExecutable);
        }

        let mut r = ByteReader::at(data, LFANEW_OFFSET)?;
        let pe_offset = r.u32()? as usize;

        let mut r = ByteReader::at(data, pe_offset)?;
        if r.bytes(4)? != PE_SIGNATURE {
            return Err(MetadataError::BadPeSignature(pe_offset));
        }

        // COFF file header
        r.skip(2)?; // Machine
        let section_count = r.u16()?;
        r.skip(12)?; // TimeDateStamp, PointerToSymbolTable, NumberOfSymbols
        let optional_len = usize::from(r.u16()?);
        r.skip(2)?; // Characteristics

        let optional_start = pe_offset + PE_SIGNATURE.len() + COFF_HEADER_LEN;
        let mut opt = ByteReader::at(data, optional_start)?;
        let magic = opt.u16()?;
        // NumberOfRvaAndSizes sits right before the data directory array.
        let count_offset = match magic {
            PE32_MAGIC => 92,
            PE32_PLUS_MAGIC => 108,
            other => return Err(MetadataError::UnsupportedOptionalHeader(other)),
        };

        let mut opt = ByteReader::at(data, optional_start + count_offset)?;
        let directory_count = opt.u32()?;
        if directory_count <= CLI_DIRECTORY {
            return Err(MetadataError::NoCliHeader);
        }
        opt.skip(CLI_DIRECTORY as usize * 8)?;
        let cli_rva = opt.u32()?;
        let cli_size = opt.u32()?;
        if cli_rva == 0 || cli_size == 0 {
            return Err(MetadataError::NoCliHeader);
        }

        let mut r = ByteReader::at(data, optional_start + optional_len)?;
        let mut sections = Vec::with_capacity(usize::from(section_count));
        for _ in 0..section_count {
            let header = ByteReader::new(r.bytes(SECTION_HEADER_LEN)?);
            sections.push(read_section(header)?);
        }

        Ok(Self {
            data,
            sections,
            cli_rva,
            cli_size,
        })
    }

    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    pub const fn cli_header(&self) -> (u32, u32) {
        (self.cli_rva, self.cli_size)
    }

    /// Maps a relative virtual address to a file offset.
    pub fn rva_to_offset(&self, rva: u32) -> Result<usize> {
        let section = self
            .sections
            .iter()
            .find(|s| s.contains(rva))
            .ok_or(MetadataError::UnmappedRva(rva))?;
        let offset = (rva - section.virtual_address) as usize + section.raw_pointer as usize;
        if offset >= self.data.len() {
            return Err(MetadataError::UnmappedRva(rva));
        }
        Ok(offset)
    }
}

fn read_section(mut r: ByteReader<'_>) -> Result<Section> {
    r.skip(8)?; // Name
    let virtual_size = r.u32()?;
    let virtual_address = r.u32()?;
    let raw_size = r.u32()?;
    let raw_pointer = r.u32()?;
    Ok(Section {
        virtual_address,
        virtual_size,
        raw_size,
        raw_pointer,
    })
}
