// crates/engine/src/metadata/tables.rs
//! Row layouts of the ECMA-335 (Partition II, §22) metadata tables.
//!
//! Only the sizes are modelled: the reader needs to skip every table that
//! precedes `Assembly` to reach its first row.

use super::reader::ByteReader;
use crate::error::MetadataError;

type Result<T> = std::result::Result<T, MetadataError>;

pub const TABLE_COUNT: usize = 64;

pub mod id {
    pub const MODULE: usize = 0x00;
    pub const TYPE_REF: usize = 0x01;
    pub const TYPE_DEF: usize = 0x02;
    pub const FIELD_PTR: usize = 0x03;
    pub const FIELD: usize = 0x04;
    pub const METHOD_PTR: usize = 0x05;
    pub const METHOD_DEF: usize = 0x06;
    pub const PARAM_PTR: usize = 0x07;
    pub const PARAM: usize = 0x08;
    pub const INTERFACE_IMPL: usize = 0x09;
    pub const MEMBER_REF: usize = 0x0A;
    pub const CONSTANT: usize = 0x0B;
    pub const CUSTOM_ATTRIBUTE: usize = 0x0C;
    pub const FIELD_MARSHAL: usize = 0x0D;
    pub const DECL_SECURITY: usize = 0x0E;
    pub const CLASS_LAYOUT: usize = 0x0F;
    pub const FIELD_LAYOUT: usize = 0x10;
    pub const STAND_ALONE_SIG: usize = 0x11;
    pub const EVENT_MAP: usize = 0x12;
    pub const EVENT_PTR: usize = 0x13;
    pub const EVENT: usize = 0x14;
    pub const PROPERTY_MAP: usize = 0x15;
    pub const PROPERTY_PTR: usize = 0x16;
    pub const PROPERTY: usize = 0x17;
    pub const METHOD_SEMANTICS: usize = 0x18;
    pub const METHOD_IMPL: usize = 0x19;
    pub const MODULE_REF: usize = 0x1A;
    pub const TYPE_SPEC: usize = 0x1B;
    pub const IMPL_MAP: usize = 0x1C;
    pub const FIELD_RVA: usize = 0x1D;
    pub const ENC_LOG: usize = 0x1E;
    pub const ENC_MAP: usize = 0x1F;
    pub const ASSEMBLY: usize = 0x20;
    pub const ASSEMBLY_REF: usize = 0x23;
    pub const FILE: usize = 0x26;
    pub const EXPORTED_TYPE: usize = 0x27;
    pub const MANIFEST_RESOURCE: usize = 0x28;
    pub const GENERIC_PARAM: usize = 0x2A;
    pub const METHOD_SPEC: usize = 0x2B;
    pub const GENERIC_PARAM_CONSTRAINT: usize = 0x2C;
}

/// `HeapSizes` bits of the `#~` header.
const WIDE_STRINGS: u8 = 0x01;
const WIDE_GUIDS: u8 = 0x02;
const WIDE_BLOBS: u8 = 0x04;
/// Set in some `#-` streams: an extra dword follows the row counts.
const EXTRA_DATA: u8 = 0x40;

/// A coded index: a tag selecting one of `tables`, packed with a row number.
struct CodedIndex {
    tag_bits: u32,
    tables: &'static [usize],
}

const TYPE_DEF_OR_REF: CodedIndex = CodedIndex {
    tag_bits: 2,
    tables: &[id::TYPE_DEF, id::TYPE_REF, id::TYPE_SPEC],
};

const HAS_CONSTANT: CodedIndex = CodedIndex {
    tag_bits: 2,
    tables: &[id::FIELD, id::PARAM, id::PROPERTY],
};

const HAS_CUSTOM_ATTRIBUTE: CodedIndex = CodedIndex {
    tag_bits: 5,
    tables: &[
        id::METHOD_DEF,
        id::FIELD,
        id::TYPE_REF,
        id::TYPE_DEF,
        id::PARAM,
        id::INTERFACE_IMPL,
        id::MEMBER_REF,
        id::MODULE,
        id::DECL_SECURITY,
        id::PROPERTY,
        id::EVENT,
        id::STAND_ALONE_SIG,
        id::MODULE_REF,
        id::TYPE_SPEC,
        id::ASSEMBLY,
        id::ASSEMBLY_REF,
        id::FILE,
        id::EXPORTED_TYPE,
        id::MANIFEST_RESOURCE,
        id::GENERIC_PARAM,
        id::GENERIC_PARAM_CONSTRAINT,
        id::METHOD_SPEC,
    ],
};

const HAS_FIELD_MARSHAL: CodedIndex = CodedIndex {
    tag_bits: 1,
    tables: &[id::FIELD, id::PARAM],
};

const HAS_DECL_SECURITY: CodedIndex = CodedIndex {
    tag_bits: 2,
    tables: &[id::TYPE_DEF, id::METHOD_DEF, id::ASSEMBLY],
};

const MEMBER_REF_PARENT: CodedIndex = CodedIndex {
    tag_bits: 3,
    tables: &[
        id::TYPE_DEF,
        id::TYPE_REF,
        id::MODULE_REF,
        id::METHOD_DEF,
        id::TYPE_SPEC,
    ],
};

const HAS_SEMANTICS: CodedIndex = CodedIndex {
    tag_bits: 1,
    tables: &[id::EVENT, id::PROPERTY],
};

const METHOD_DEF_OR_REF: CodedIndex = CodedIndex {
    tag_bits: 1,
    tables: &[id::METHOD_DEF, id::MEMBER_REF],
};

const MEMBER_FORWARDED: CodedIndex = CodedIndex {
    tag_bits: 1,
    tables: &[id::FIELD, id::METHOD_DEF],
};

// Tags 0, 1 and 4 are unused; only MethodDef and MemberRef can be targets.
const CUSTOM_ATTRIBUTE_TYPE: CodedIndex = CodedIndex {
    tag_bits: 3,
    tables: &[id::METHOD_DEF, id::MEMBER_REF],
};

const RESOLUTION_SCOPE: CodedIndex = CodedIndex {
    tag_bits: 2,
    tables: &[id::MODULE, id::MODULE_REF, id::ASSEMBLY_REF, id::TYPE_REF],
};

/// One column of a table row.
#[derive(Clone, Copy)]
enum Column {
    Fixed(usize),
    String,
    Guid,
    Blob,
    Table(usize),
    Coded(&'static CodedIndex),
}

use Column::{Blob, Coded, Fixed, Guid, String as Str, Table};

fn columns(table: usize) -> &'static [Column] {
    match table {
        id::MODULE => &[Fixed(2), Str, Guid, Guid, Guid],
        id::TYPE_REF => &[Coded(&RESOLUTION_SCOPE), Str, Str],
        id::TYPE_DEF => &[
            Fixed(4),
            Str,
            Str,
            Coded(&TYPE_DEF_OR_REF),
            Table(id::FIELD),
            Table(id::METHOD_DEF),
        ],
        id::FIELD_PTR => &[Table(id::FIELD)],
        id::FIELD => &[Fixed(2), Str, Blob],
        id::METHOD_PTR => &[Table(id::METHOD_DEF)],
        id::METHOD_DEF => &[Fixed(4), Fixed(2), Fixed(2), Str, Blob, Table(id::PARAM)],
        id::PARAM_PTR => &[Table(id::PARAM)],
        id::PARAM => &[Fixed(2), Fixed(2), Str],
        id::INTERFACE_IMPL => &[Table(id::TYPE_DEF), Coded(&TYPE_DEF_OR_REF)],
        id::MEMBER_REF => &[Coded(&MEMBER_REF_PARENT), Str, Blob],
        id::CONSTANT => &[Fixed(2), Coded(&HAS_CONSTANT), Blob],
        id::CUSTOM_ATTRIBUTE => &[
            Coded(&HAS_CUSTOM_ATTRIBUTE),
            Coded(&CUSTOM_ATTRIBUTE_TYPE),
            Blob,
        ],
        id::FIELD_MARSHAL => &[Coded(&HAS_FIELD_MARSHAL), Blob],
        id::DECL_SECURITY => &[Fixed(2), Coded(&HAS_DECL_SECURITY), Blob],
        id::CLASS_LAYOUT => &[Fixed(2), Fixed(4), Table(id::TYPE_DEF)],
        id::FIELD_LAYOUT => &[Fixed(4), Table(id::FIELD)],
        id::STAND_ALONE_SIG => &[Blob],
        id::EVENT_MAP => &[Table(id::TYPE_DEF), Table(id::EVENT)],
        id::EVENT_PTR => &[Table(id::EVENT)],
        id::EVENT => &[Fixed(2), Str, Coded(&TYPE_DEF_OR_REF)],
        id::PROPERTY_MAP => &[Table(id::TYPE_DEF), Table(id::PROPERTY)],
        id::PROPERTY_PTR => &[Table(id::PROPERTY)],
        id::PROPERTY => &[Fixed(2), Str, Blob],
        id::METHOD_SEMANTICS => &[Fixed(2), Table(id::METHOD_DEF), Coded(&HAS_SEMANTICS)],
        id::METHOD_IMPL => &[
            Table(id::TYPE_DEF),
            Coded(&METHOD_DEF_OR_REF),
            Coded(&METHOD_DEF_OR_REF),
        ],
        id::MODULE_REF => &[Str],
        id::TYPE_SPEC => &[Blob],
        id::IMPL_MAP => &[
            Fixed(2),
            Coded(&MEMBER_FORWARDED),
            Str,
            Table(id::MODULE_REF),
        ],
        id::FIELD_RVA => &[Fixed(4), Table(id::FIELD)],
        id::ENC_LOG => &[Fixed(4), Fixed(4)],
        id::ENC_MAP => &[Fixed(4)],
        id::ASSEMBLY => &[Fixed(4), Fixed(2), Fixed(2), Fixed(2), Fixed(2), Fixed(4), Blob, Str, Str],
        _ => &[],
    }
}

/// Decoded `#~` header: heap index widths and per-table row counts.
#[derive(Debug, Clone)]
pub struct TableLayout {
    heap_sizes: u8,
    rows: [u32; TABLE_COUNT],
}

impl TableLayout {
    #[cfg(test)]
    pub(crate) fn from_parts(heap_sizes: u8, rows: [u32; TABLE_COUNT]) -> Self {
        Self { heap_sizes, rows }
    }

    /// Parses the stream header; returns the layout and the offset of the
    /// first table row within `stream`.
    pub fn parse(stream: &[u8]) -> Result<(Self, usize)> {
        let mut r = ByteReader::new(stream);
        r.skip(4)?; // Reserved
        r.skip(2)?; // MajorVersion, MinorVersion
        let heap_sizes = r.u8()?;
        r.skip(1)?; // Reserved
        let valid = r.u64()?;
        r.skip(8)?; // Sorted

        let mut rows = [0u32; TABLE_COUNT];
        for (table, count) in rows.iter_mut().enumerate() {
            if valid & (1u64 << table) != 0 {
                *count = r.u32()?;
            }
        }
        if heap_sizes & EXTRA_DATA != 0 {
            r.skip(4)?;
        }

        Ok((Self { heap_sizes, rows }, r.position()))
    }

    pub const fn rows(&self, table: usize) -> u32 {
        self.rows[table]
    }

    pub const fn wide_strings(&self) -> bool {
        self.heap_sizes & WIDE_STRINGS != 0
    }

    pub const fn wide_blobs(&self) -> bool {
        self.heap_sizes & WIDE_BLOBS != 0
    }

    const fn wide_guids(&self) -> bool {
        self.heap_sizes & WIDE_GUIDS != 0
    }

    fn simple_index_size(&self, table: usize) -> usize {
        if self.rows[table] < (1 << 16) { 2 } else { 4 }
    }

    fn coded_index_size(&self, coded: &CodedIndex) -> usize {
        let max_rows = coded
            .tables
            .iter()
            .map(|&t| self.rows[t])
            .max()
            .unwrap_or(0);
        if max_rows < (1u32 << (16 - coded.tag_bits)) { 2 } else { 4 }
    }

    fn column_size(&self, column: Column) -> usize {
        let heap = |wide: bool| if wide { 4 } else { 2 };
        match column {
            Fixed(n) => n,
            Str => heap(self.wide_strings()),
            Guid => heap(self.wide_guids()),
            Blob => heap(self.wide_blobs()),
            Table(t) => self.simple_index_size(t),
            Coded(coded) => self.coded_index_size(coded),
        }
    }

    pub fn row_size(&self, table: usize) -> usize {
        columns(table).iter().map(|&c| self.column_size(c)).sum()
    }

    /// Byte offset of `table`'s first row, relative to the first table row.
    pub fn table_offset(&self, table: usize) -> usize {
        (0..table)
            .map(|t| self.rows[t] as usize * self.row_size(t))
            .sum()
    }
}
