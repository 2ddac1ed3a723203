//! Value kinds and the compact type-tag vocabulary

/// Semantic kind of a column, resolved once from its type tag.
///
/// The discriminants are the codes written to binary key files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ValueKind {
    #[default]
    RawString = 0,
    Bool = 1,
    Int8 = 2,
    Uint8 = 3,
    Int16 = 4,
    Uint16 = 5,
    Int32 = 6,
    Uint32 = 7,
    Int64 = 8,
    Uint64 = 9,
    Float32 = 10,
    Float64 = 11,
    StringArray = 12,
    BoolArray = 13,
    Int8Array = 14,
    Uint8Array = 15,
    Int16Array = 16,
    Uint16Array = 17,
    Int32Array = 18,
    Uint32Array = 19,
    Int64Array = 20,
    Uint64Array = 21,
    Float32Array = 22,
    Float64Array = 23,
    StringArrayArray = 24,
    BoolArrayArray = 25,
    /// Shared by every integer width.
    IntArrayArray = 26,
    Float32ArrayArray = 27,
    Float64ArrayArray = 28,
}

impl ValueKind {
    /// Resolve a type tag. Unknown tags fall back to `RawString`.
    ///
    /// `ab` and `aab` resolve to integer arrays, not bool arrays.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "s" => ValueKind::RawString,
            "b" => ValueKind::Bool,
            "i8" => ValueKind::Int8,
            "u8" => ValueKind::Uint8,
            "i16" => ValueKind::Int16,
            "u16" => ValueKind::Uint16,
            "i32" => ValueKind::Int32,
            "u32" => ValueKind::Uint32,
            "i64" => ValueKind::Int64,
            "u64" => ValueKind::Uint64,
            "f" => ValueKind::Float32,
            "d" => ValueKind::Float64,
            "as" => ValueKind::StringArray,
            "ab" | "ai8" => ValueKind::Int8Array,
            "au8" => ValueKind::Uint8Array,
            "ai16" => ValueKind::Int16Array,
            "au16" => ValueKind::Uint16Array,
            "ai32" => ValueKind::Int32Array,
            "au32" => ValueKind::Uint32Array,
            "ai64" => ValueKind::Int64Array,
            "au64" => ValueKind::Uint64Array,
            "af" => ValueKind::Float32Array,
            "ad" => ValueKind::Float64Array,
            "aas" => ValueKind::StringArrayArray,
            "aab" | "aai8" | "aau8" | "aai16" | "aau16" | "aai32" | "aau32" | "aai64"
            | "aau64" => ValueKind::IntArrayArray,
            "aaf" => ValueKind::Float32ArrayArray,
            "aad" => ValueKind::Float64ArrayArray,
            _ => ValueKind::RawString,
        }
    }

    /// Code stored in binary key files
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Scalar kind of the elements for array and array-array kinds
    pub fn element_kind(self) -> Option<ValueKind> {
        let element = match self {
            ValueKind::StringArray | ValueKind::StringArrayArray => ValueKind::RawString,
            ValueKind::BoolArray | ValueKind::BoolArrayArray => ValueKind::Bool,
            ValueKind::Int8Array => ValueKind::Int8,
            ValueKind::Uint8Array => ValueKind::Uint8,
            ValueKind::Int16Array => ValueKind::Int16,
            ValueKind::Uint16Array => ValueKind::Uint16,
            ValueKind::Int32Array => ValueKind::Int32,
            ValueKind::Uint32Array => ValueKind::Uint32,
            ValueKind::Int64Array | ValueKind::IntArrayArray => ValueKind::Int64,
            ValueKind::Uint64Array => ValueKind::Uint64,
            ValueKind::Float32Array | ValueKind::Float32ArrayArray => ValueKind::Float32,
            ValueKind::Float64Array | ValueKind::Float64ArrayArray => ValueKind::Float64,
            _ => return None,
        };
        Some(element)
    }

    /// Single-level array kind
    pub fn is_array(self) -> bool {
        self.element_kind().is_some() && !self.is_array_array()
    }

    /// Two-level array kind
    pub fn is_array_array(self) -> bool {
        matches!(
            self,
            ValueKind::StringArrayArray
                | ValueKind::BoolArrayArray
                | ValueKind::IntArrayArray
                | ValueKind::Float32ArrayArray
                | ValueKind::Float64ArrayArray
        )
    }

    pub fn is_scalar(self) -> bool {
        self.element_kind().is_none()
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::RawString => "raw_string",
            ValueKind::Bool => "bool",
            ValueKind::Int8 => "int8",
            ValueKind::Uint8 => "uint8",
            ValueKind::Int16 => "int16",
            ValueKind::Uint16 => "uint16",
            ValueKind::Int32 => "int32",
            ValueKind::Uint32 => "uint32",
            ValueKind::Int64 => "int64",
            ValueKind::Uint64 => "uint64",
            ValueKind::Float32 => "float32",
            ValueKind::Float64 => "float64",
            ValueKind::StringArray => "string_array",
            ValueKind::BoolArray => "bool_array",
            ValueKind::Int8Array => "int8_array",
            ValueKind::Uint8Array => "uint8_array",
            ValueKind::Int16Array => "int16_array",
            ValueKind::Uint16Array => "uint16_array",
            ValueKind::Int32Array => "int32_array",
            ValueKind::Uint32Array => "uint32_array",
            ValueKind::Int64Array => "int64_array",
            ValueKind::Uint64Array => "uint64_array",
            ValueKind::Float32Array => "float32_array",
            ValueKind::Float64Array => "float64_array",
            ValueKind::StringArrayArray => "string_array_array",
            ValueKind::BoolArrayArray => "bool_array_array",
            ValueKind::IntArrayArray => "int_array_array",
            ValueKind::Float32ArrayArray => "float32_array_array",
            ValueKind::Float64ArrayArray => "float64_array_array",
        };
        f.write_str(name)
    }
}
