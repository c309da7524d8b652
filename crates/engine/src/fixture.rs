// crates/engine/src/fixture.rs
//! Synthesizes minimal PE images carrying ECMA-335 metadata for tests.
//!
//! The images contain a single `.text` section holding the CLI header and a
//! metadata root with `#~`, `#Strings` and `#Blob` streams. They have no code
//! and cannot be loaded by a runtime.

use crate::metadata::tables::id;
use std::path::Path;

const PE_OFFSET: usize = 0x80;
const FILE_ALIGNMENT: usize = 0x200;
const SECTION_RVA: u32 = 0x2000;
const CLI_HEADER_LEN: usize = 72;
const RUNTIME_VERSION: &[u8] = b"v4.0.30319\0\0";

/// Builder for a synthetic assembly image.
#[derive(Debug, Clone)]
pub struct AssemblyImage {
    name: String,
    version: [u16; 4],
    public_key: Vec<u8>,
    culture: String,
    pe32_plus: bool,
    assembly_row: bool,
    type_refs: u16,
}

impl AssemblyImage {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            version: [0; 4],
            public_key: Vec::new(),
            culture: String::new(),
            pe32_plus: false,
            assembly_row: true,
            type_refs: 0,
        }
    }

    #[must_use]
    pub fn version(mut self, major: u16, minor: u16, build: u16, revision: u16) -> Self {
        self.version = [major, minor, build, revision];
        self
    }

    #[must_use]
    pub fn public_key(mut self, key: &[u8]) -> Self {
        self.public_key = key.to_vec();
        self
    }

    #[must_use]
    pub fn culture(mut self, culture: &str) -> Self {
        self.culture = culture.to_owned();
        self
    }

    /// Emit a PE32+ optional header instead of PE32.
    #[must_use]
    pub fn pe32_plus(mut self) -> Self {
        self.pe32_plus = true;
        self
    }

    /// Leave the Assembly table empty, as in a netmodule.
    #[must_use]
    pub fn without_assembly_row(mut self) -> Self {
        self.assembly_row = false;
        self
    }

    /// Add `count` TypeRef rows ahead of the Assembly table.
    #[must_use]
    pub fn type_refs(mut self, count: u16) -> Self {
        self.type_refs = count;
        self
    }

    /// Writes the image to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.build())
    }

    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let metadata = self.metadata_root();

        let mut section = Vec::with_capacity(CLI_HEADER_LEN + metadata.len());
        put_u32(&mut section, CLI_HEADER_LEN as u32);
        put_u16(&mut section, 2);
        put_u16(&mut section, 5);
        put_u32(&mut section, SECTION_RVA + CLI_HEADER_LEN as u32);
        put_u32(&mut section, metadata.len() as u32);
        put_u32(&mut section, 1); // COMIMAGE_FLAGS_ILONLY
        put_u32(&mut section, 0); // EntryPointToken
        section.resize(CLI_HEADER_LEN, 0);
        section.extend_from_slice(&metadata);

        let virtual_size = section.len();
        let raw_size = align(virtual_size, FILE_ALIGNMENT);
        section.resize(raw_size, 0);

        let mut image = self.headers(virtual_size as u32, raw_size as u32);
        image.extend_from_slice(&section);
        image
    }

    fn headers(&self, virtual_size: u32, raw_size: u32) -> Vec<u8> {
        let mut out = vec![0u8; PE_OFFSET];
        out[..2].copy_from_slice(b"MZ");
        out[0x3C..0x40].copy_from_slice(&(PE_OFFSET as u32).to_le_bytes());

        let (machine, optional_len, count_offset): (u16, usize, usize) = if self.pe32_plus {
            (0x8664, 240, 108)
        } else {
            (0x014C, 224, 92)
        };

        out.extend_from_slice(b"PE\0\0");
        put_u16(&mut out, machine);
        put_u16(&mut out, 1); // NumberOfSections
        put_u32(&mut out, 0); // TimeDateStamp
        put_u32(&mut out, 0); // PointerToSymbolTable
        put_u32(&mut out, 0); // NumberOfSymbols
        put_u16(&mut out, optional_len as u16);
        put_u16(&mut out, 0x2022); // DLL | EXECUTABLE_IMAGE | LARGE_ADDRESS_AWARE

        let mut optional = vec![0u8; optional_len];
        let magic: u16 = if self.pe32_plus { 0x20B } else { 0x10B };
        optional[..2].copy_from_slice(&magic.to_le_bytes());
        optional[count_offset..count_offset + 4].copy_from_slice(&16u32.to_le_bytes());
        let cli_entry = count_offset + 4 + 14 * 8;
        optional[cli_entry..cli_entry + 4].copy_from_slice(&SECTION_RVA.to_le_bytes());
        optional[cli_entry + 4..cli_entry + 8]
            .copy_from_slice(&(CLI_HEADER_LEN as u32).to_le_bytes());
        out.extend_from_slice(&optional);

        out.extend_from_slice(b".text\0\0\0");
        put_u32(&mut out, virtual_size);
        put_u32(&mut out, SECTION_RVA);
        put_u32(&mut out, raw_size);
        put_u32(&mut out, FILE_ALIGNMENT as u32);
        out.extend_from_slice(&[0u8; 12]); // relocations, line numbers and their counts
        put_u32(&mut out, 0x6000_0020); // CODE | EXECUTE | READ

        out.resize(FILE_ALIGNMENT, 0);
        out
    }

    fn metadata_root(&self) -> Vec<u8> {
        let mut strings = vec![0u8];
        let module_name = push_str(&mut strings, &format!("{}.dll", self.name));
        let assembly_name = push_str(&mut strings, &self.name);
        let culture = if self.culture.is_empty() {
            0
        } else {
            push_str(&mut strings, &self.culture)
        };
        pad4(&mut strings);

        let mut blobs = vec![0u8];
        let public_key = if self.public_key.is_empty() {
            0
        } else {
            let index = blobs.len() as u16;
            push_compressed(&mut blobs, self.public_key.len());
            blobs.extend_from_slice(&self.public_key);
            index
        };
        pad4(&mut blobs);

        let tables = self.table_stream(module_name, assembly_name, culture, public_key);

        let streams: [(&[u8], &[u8]); 3] = [
            (b"#~".as_slice(), tables.as_slice()),
            (b"#Strings".as_slice(), strings.as_slice()),
            (b"#Blob".as_slice(), blobs.as_slice()),
        ];
        let headers_len = 32 + streams
            .iter()
            .map(|(name, _)| 8 + align(name.len() + 1, 4))
            .sum::<usize>();

        let mut root = Vec::new();
        put_u32(&mut root, 0x424A_5342);
        put_u16(&mut root, 1);
        put_u16(&mut root, 1);
        put_u32(&mut root, 0);
        put_u32(&mut root, RUNTIME_VERSION.len() as u32);
        root.extend_from_slice(RUNTIME_VERSION);
        put_u16(&mut root, 0);
        put_u16(&mut root, streams.len() as u16);

        let mut offset = headers_len;
        for (name, body) in &streams {
            put_u32(&mut root, offset as u32);
            put_u32(&mut root, body.len() as u32);
            root.extend_from_slice(name);
            root.push(0);
            pad4(&mut root);
            offset += body.len();
        }
        debug_assert_eq!(root.len(), headers_len);

        for (_, body) in &streams {
            root.extend_from_slice(body);
        }
        root
    }

    fn table_stream(
        &self,
        module_name: u16,
        assembly_name: u16,
        culture: u16,
        public_key: u16,
    ) -> Vec<u8> {
        let mut valid: u64 = 1 << id::MODULE;
        if self.type_refs > 0 {
            valid |= 1 << id::TYPE_REF;
        }
        if self.assembly_row {
            valid |= 1 << id::ASSEMBLY;
        }

        let mut out = Vec::new();
        put_u32(&mut out, 0);
        out.extend_from_slice(&[2, 0, 0, 1]); // MajorVersion, MinorVersion, HeapSizes, Reserved
        out.extend_from_slice(&valid.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes());

        put_u32(&mut out, 1);
        if self.type_refs > 0 {
            put_u32(&mut out, u32::from(self.type_refs));
        }
        if self.assembly_row {
            put_u32(&mut out, 1);
        }

        // Module: Generation, Name, Mvid, EncId, EncBaseId
        for value in [0, module_name, 0, 0, 0] {
            put_u16(&mut out, value);
        }
        // TypeRef: ResolutionScope, TypeName, TypeNamespace
        for _ in 0..self.type_refs {
            for value in [0, module_name, 0] {
                put_u16(&mut out, value);
            }
        }
        if self.assembly_row {
            let [major, minor, build, revision] = self.version;
            put_u32(&mut out, 0x8004); // SHA1
            for value in [major, minor, build, revision] {
                put_u16(&mut out, value);
            }
            put_u32(&mut out, u32::from(public_key != 0)); // PublicKey flag
            for value in [public_key, assembly_name, culture] {
                put_u16(&mut out, value);
            }
        }
        pad4(&mut out);
        out
    }
}

const fn align(value: usize, to: usize) -> usize {
    value.div_ceil(to) * to
}

fn pad4(buf: &mut Vec<u8>) {
    buf.resize(align(buf.len(), 4), 0);
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_str(heap: &mut Vec<u8>, value: &str) -> u16 {
    let index = heap.len() as u16;
    heap.extend_from_slice(value.as_bytes());
    heap.push(0);
    index
}

fn push_compressed(heap: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        heap.push(len as u8);
    } else {
        heap.push(0x80 | (len >> 8) as u8);
        heap.push(len as u8);
    }
}
