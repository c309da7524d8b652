// crates/engine/src/metadata/mod.rs
//! Assembly identity extraction.
//!
//! Reads name, version and strong-name token straight from the metadata of a
//! PE image (ECMA-335 Partition II, §24), without loading or executing it.

pub mod pe;
pub mod reader;
pub mod tables;

use crate::error::MetadataError;
use crate::paths::relative_display;
use crate::record::{AssemblyIdentity, AssemblyVersion, FileMetadataRecord, PublicKeyToken};
use memmap2::Mmap;
use pe::{DOS_MAGIC, PeImage};
use reader::{ByteReader, compressed_u32};
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tables::{TableLayout, id};

type Result<T> = std::result::Result<T, MetadataError>;

/// "BSJB"
const METADATA_SIGNATURE: u32 = 0x424A_5342;
/// Offset of the metadata directory inside the CLI header.
const CLI_METADATA_OFFSET: usize = 8;

/// Reads an assembly identity from a file.
///
/// Implementations must not have side effects beyond reading the file.
pub trait IdentityReader {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not an assembly.
    fn read_identity(&self, path: &Path) -> Result<AssemblyIdentity>;
}

/// Reader for ECMA-335 assemblies in PE32/PE32+ images.
///
/// Files are memory-mapped, and only after their first two bytes have been
/// checked, so large files that are not images never get paged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClrReader;

impl IdentityReader for ClrReader {
    fn read_identity(&self, path: &Path) -> Result<AssemblyIdentity> {
        let mut file = File::open(path)?;
        let mut magic = [0u8; 2];
        match file.read_exact(&mut magic) {
            Ok(()) if &magic == DOS_MAGIC => {}
            Ok(()) => return Err(MetadataError::NotPortableExecutable),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(MetadataError::NotPortableExecutable);
            }
            Err(e) => return Err(e.into()),
        }

        // SAFETY: the map is read-only and lives only for this call.
        let map = unsafe { Mmap::map(&file)? };
        parse_identity(&map)
    }
}

/// Runs `reader` on one scanned file, turning any failure into an error record.
pub fn extract<R: IdentityReader + ?Sized>(
    reader: &R,
    path: &Path,
    root: &Path,
) -> FileMetadataRecord {
    let relative = relative_display(path, root);
    match reader.read_identity(path) {
        Ok(identity) => FileMetadataRecord::from_identity(identity, relative),
        Err(e) => {
            log::debug!("skipping {}: {e}", path.display());
            FileMetadataRecord::failed(relative)
        }
    }
}

/// Parses the identity out of an in-memory image.
///
/// # Errors
///
/// Returns an error if the image is not a well-formed assembly.
pub fn parse_identity(data: &[u8]) -> Result<AssemblyIdentity> {
    let image = PeImage::parse(data)?;
    let metadata = Metadata::locate(&image)?;
    metadata.assembly_identity()
}

/// Views over the streams of one metadata root.
struct Metadata<'a> {
    tables: &'a [u8],
    strings: &'a [u8],
    blobs: &'a [u8],
}

impl<'a> Metadata<'a> {
    fn locate(image: &PeImage<'a>) -> Result<Self> {
        let data = image.data();
        let (cli_rva, cli_size) = image.cli_header();
        if (cli_size as usize) < CLI_METADATA_OFFSET + 8 {
            return Err(MetadataError::NoCliHeader);
        }

        let mut cli = ByteReader::at(data, image.rva_to_offset(cli_rva)?)?;
        cli.skip(CLI_METADATA_OFFSET)?;
        let metadata_rva = cli.u32()?;
        let metadata_size = cli.u32()? as usize;

        let root_offset = image.rva_to_offset(metadata_rva)?;
        let root = data
            .get(root_offset..)
            .map(|rest| &rest[..metadata_size.min(rest.len())])
            .ok_or(MetadataError::UnmappedRva(metadata_rva))?;

        let mut r = ByteReader::new(root);
        let signature = r.u32()?;
        if signature != METADATA_SIGNATURE {
            return Err(MetadataError::BadMetadataSignature(signature));
        }
        r.skip(8)?; // MajorVersion, MinorVersion, Reserved
        let version_len = r.u32()? as usize;
        r.skip(version_len)?;
        r.skip(2)?; // Flags
        let stream_count = r.u16()?;

        let mut tables = None;
        let mut strings = None;
        let mut blobs = None;
        for _ in 0..stream_count {
            let offset = r.u32()? as usize;
            let size = r.u32()? as usize;
            let name_start = r.position();
            let name = r.c_str()?;
            r.align4(name_start)?;

            let body = ByteReader::at(root, offset)?.bytes(size)?;
            match name {
                b"#~" | b"#-" => tables = Some(body),
                b"#Strings" => strings = Some(body),
                b"#Blob" => blobs = Some(body),
                _ => {}
            }
        }

        Ok(Self {
            tables: tables.ok_or(MetadataError::MissingStream("#~"))?,
            strings: strings.ok_or(MetadataError::MissingStream("#Strings"))?,
            blobs: blobs.unwrap_or_default(),
        })
    }

    fn assembly_identity(&self) -> Result<AssemblyIdentity> {
        let (layout, rows_start) = TableLayout::parse(self.tables)?;
        if layout.rows(id::ASSEMBLY) == 0 {
            return Err(MetadataError::NotAnAssembly);
        }

        let mut row = ByteReader::at(self.tables, rows_start + layout.table_offset(id::ASSEMBLY))?;
        row.skip(4)?; // HashAlgId
        let version = AssemblyVersion::new(row.u16()?, row.u16()?, row.u16()?, row.u16()?);
        row.skip(4)?; // Flags
        let public_key = self.blob(row.index(layout.wide_blobs())?)?;
        let name = self.string(row.index(layout.wide_strings())?)?;
        let culture = self.string(row.index(layout.wide_strings())?)?;

        Ok(AssemblyIdentity {
            name,
            version,
            public_key_token: public_key_token(public_key),
            culture,
        })
    }

    fn string(&self, index: u32) -> Result<String> {
        let mut r = ByteReader::at(self.strings, index as usize).map_err(|_| {
            MetadataError::HeapIndex {
                heap: "#Strings",
                index,
            }
        })?;
        let bytes = r.c_str()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| MetadataError::InvalidString)
    }

    fn blob(&self, index: u32) -> Result<&'a [u8]> {
        if index == 0 {
            return Ok(&[]);
        }
        let out_of_range = || MetadataError::HeapIndex {
            heap: "#Blob",
            index,
        };
        let rest = self.blobs.get(index as usize..).ok_or_else(out_of_range)?;
        let (len, header) = compressed_u32(rest).ok_or_else(out_of_range)?;
        rest.get(header..header + len as usize).ok_or_else(out_of_range)
    }
}

/// Strong-name token: the last eight bytes of SHA-1(public key), reversed.
#[must_use]
pub fn public_key_token(public_key: &[u8]) -> PublicKeyToken {
    if public_key.is_empty() {
        return PublicKeyToken::EMPTY;
    }
    let digest = Sha1::digest(public_key);
    let mut token = [0u8; 8];
    token.copy_from_slice(&digest[digest.len() - 8..]);
    token.reverse();
    PublicKeyToken::new(token)
}
