//! OLAP type tags and the dispatcher that maps them onto native categories.
//!
//! [`OlapType`] is a closed set. Code that needs per-type behaviour implements
//! [`TypeHelper`], which has one required method per tag and no defaults, and
//! calls [`dispatch`]. Adding a tag therefore adds a required method, and every
//! helper stops compiling until it handles the new tag.

use std::fmt;

use crate::error::{XmlaError, XmlaResult};

/// Type of an MDX expression or statement parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OlapType {
    Boolean,
    Cube,
    Decimal,
    Dimension,
    Hierarchy,
    Level,
    Member,
    Null,
    Numeric,
    Set,
    String,
    Symbol,
    Tuple,
}

impl OlapType {
    pub const ALL: [OlapType; 13] = [
        OlapType::Boolean,
        OlapType::Cube,
        OlapType::Decimal,
        OlapType::Dimension,
        OlapType::Hierarchy,
        OlapType::Level,
        OlapType::Member,
        OlapType::Null,
        OlapType::Numeric,
        OlapType::Set,
        OlapType::String,
        OlapType::Symbol,
        OlapType::Tuple,
    ];

    /// Upper-case type name, as shown in parameter metadata.
    pub fn name(&self) -> &'static str {
        match self {
            OlapType::Boolean => "BOOLEAN",
            OlapType::Cube => "CUBE",
            OlapType::Decimal => "DECIMAL",
            OlapType::Dimension => "DIMENSION",
            OlapType::Hierarchy => "HIERARCHY",
            OlapType::Level => "LEVEL",
            OlapType::Member => "MEMBER",
            OlapType::Null => "NULL",
            OlapType::Numeric => "NUMERIC",
            OlapType::Set => "SET",
            OlapType::String => "STRING",
            OlapType::Symbol => "SYMBOL",
            OlapType::Tuple => "TUPLE",
        }
    }
}

impl fmt::Display for OlapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Native representation category of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    Boolean,
    Numeric,
    String,
    Null,
    /// An opaque handle to a metadata object or set.
    Reference(ReferenceKind),
}

/// Kinds of opaque reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Set,
    Tuple,
    Member,
    Level,
    Hierarchy,
    Dimension,
    Cube,
}

/// SQL type reported for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Numeric,
    Varchar,
    Null,
    Other,
}

/// Per-tag behaviour. Every method is required.
pub trait TypeHelper {
    type Output;

    fn boolean(&self) -> XmlaResult<Self::Output>;
    fn cube(&self) -> XmlaResult<Self::Output>;
    fn decimal(&self) -> XmlaResult<Self::Output>;
    fn dimension(&self) -> XmlaResult<Self::Output>;
    fn hierarchy(&self) -> XmlaResult<Self::Output>;
    fn level(&self) -> XmlaResult<Self::Output>;
    fn member(&self) -> XmlaResult<Self::Output>;
    fn null(&self) -> XmlaResult<Self::Output>;
    fn numeric(&self) -> XmlaResult<Self::Output>;
    fn set(&self) -> XmlaResult<Self::Output>;
    fn string(&self) -> XmlaResult<Self::Output>;
    fn symbol(&self) -> XmlaResult<Self::Output>;
    fn tuple(&self) -> XmlaResult<Self::Output>;
}

/// Route `ty` to the matching method of `helper`.
pub fn dispatch<H: TypeHelper>(ty: OlapType, helper: &H) -> XmlaResult<H::Output> {
    match ty {
        OlapType::Boolean => helper.boolean(),
        OlapType::Cube => helper.cube(),
        OlapType::Decimal => helper.decimal(),
        OlapType::Dimension => helper.dimension(),
        OlapType::Hierarchy => helper.hierarchy(),
        OlapType::Level => helper.level(),
        OlapType::Member => helper.member(),
        OlapType::Null => helper.null(),
        OlapType::Numeric => helper.numeric(),
        OlapType::Set => helper.set(),
        OlapType::String => helper.string(),
        OlapType::Symbol => helper.symbol(),
        OlapType::Tuple => helper.tuple(),
    }
}

fn symbol_not_bindable() -> XmlaError {
    XmlaError::Unsupported("SYMBOL cannot be used as a parameter type".to_string())
}

/// Maps a type to its [`Representation`].
pub struct RepresentationHelper;

impl TypeHelper for RepresentationHelper {
    type Output = Representation;

    fn boolean(&self) -> XmlaResult<Representation> {
        Ok(Representation::Boolean)
    }
    fn cube(&self) -> XmlaResult<Representation> {
        Ok(Representation::Reference(ReferenceKind::Cube))
    }
    fn decimal(&self) -> XmlaResult<Representation> {
        Ok(Representation::Numeric)
    }
    fn dimension(&self) -> XmlaResult<Representation> {
        Ok(Representation::Reference(ReferenceKind::Dimension))
    }
    fn hierarchy(&self) -> XmlaResult<Representation> {
        Ok(Representation::Reference(ReferenceKind::Hierarchy))
    }
    fn level(&self) -> XmlaResult<Representation> {
        Ok(Representation::Reference(ReferenceKind::Level))
    }
    fn member(&self) -> XmlaResult<Representation> {
        Ok(Representation::Reference(ReferenceKind::Member))
    }
    fn null(&self) -> XmlaResult<Representation> {
        Ok(Representation::Null)
    }
    fn numeric(&self) -> XmlaResult<Representation> {
        Ok(Representation::Numeric)
    }
    fn set(&self) -> XmlaResult<Representation> {
        Ok(Representation::Reference(ReferenceKind::Set))
    }
    fn string(&self) -> XmlaResult<Representation> {
        Ok(Representation::String)
    }
    fn symbol(&self) -> XmlaResult<Representation> {
        Err(symbol_not_bindable())
    }
    fn tuple(&self) -> XmlaResult<Representation> {
        Ok(Representation::Reference(ReferenceKind::Tuple))
    }
}

/// Maps a type to the name of the value class bound for it.
pub struct ClassNameHelper;

impl TypeHelper for ClassNameHelper {
    type Output = &'static str;

    fn boolean(&self) -> XmlaResult<&'static str> {
        Ok("Boolean")
    }
    fn cube(&self) -> XmlaResult<&'static str> {
        Ok("Cube")
    }
    fn decimal(&self) -> XmlaResult<&'static str> {
        Ok("Number")
    }
    fn dimension(&self) -> XmlaResult<&'static str> {
        Ok("Dimension")
    }
    fn hierarchy(&self) -> XmlaResult<&'static str> {
        Ok("Hierarchy")
    }
    fn level(&self) -> XmlaResult<&'static str> {
        Ok("Level")
    }
    fn member(&self) -> XmlaResult<&'static str> {
        Ok("Member")
    }
    fn null(&self) -> XmlaResult<&'static str> {
        Ok("Void")
    }
    fn numeric(&self) -> XmlaResult<&'static str> {
        Ok("Number")
    }
    fn set(&self) -> XmlaResult<&'static str> {
        Ok("Iterable")
    }
    fn string(&self) -> XmlaResult<&'static str> {
        Ok("String")
    }
    fn symbol(&self) -> XmlaResult<&'static str> {
        Err(symbol_not_bindable())
    }
    fn tuple(&self) -> XmlaResult<&'static str> {
        Ok("Member[]")
    }
}

/// Maps a type to its [`SqlType`].
pub struct SqlTypeHelper;

impl TypeHelper for SqlTypeHelper {
    type Output = SqlType;

    fn boolean(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Other)
    }
    fn cube(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Other)
    }
    fn decimal(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Numeric)
    }
    fn dimension(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Other)
    }
    fn hierarchy(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Other)
    }
    fn level(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Other)
    }
    fn member(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Other)
    }
    fn null(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Null)
    }
    fn numeric(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Numeric)
    }
    fn set(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Other)
    }
    fn string(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Varchar)
    }
    fn symbol(&self) -> XmlaResult<SqlType> {
        Err(symbol_not_bindable())
    }
    fn tuple(&self) -> XmlaResult<SqlType> {
        Ok(SqlType::Other)
    }
}

/// Whether values of a type carry a sign: only the numeric kinds do.
pub struct SignedHelper;

impl TypeHelper for SignedHelper {
    type Output = bool;

    fn boolean(&self) -> XmlaResult<bool> {
        Ok(false)
    }
    fn cube(&self) -> XmlaResult<bool> {
        Ok(false)
    }
    fn decimal(&self) -> XmlaResult<bool> {
        Ok(true)
    }
    fn dimension(&self) -> XmlaResult<bool> {
        Ok(false)
    }
    fn hierarchy(&self) -> XmlaResult<bool> {
        Ok(false)
    }
    fn level(&self) -> XmlaResult<bool> {
        Ok(false)
    }
    fn member(&self) -> XmlaResult<bool> {
        Ok(false)
    }
    fn null(&self) -> XmlaResult<bool> {
        Ok(false)
    }
    fn numeric(&self) -> XmlaResult<bool> {
        Ok(true)
    }
    fn set(&self) -> XmlaResult<bool> {
        Ok(false)
    }
    fn string(&self) -> XmlaResult<bool> {
        Ok(false)
    }
    fn symbol(&self) -> XmlaResult<bool> {
        Err(symbol_not_bindable())
    }
    fn tuple(&self) -> XmlaResult<bool> {
        Ok(false)
    }
}

/// Column precision: strings are unbounded, everything else reports 0.
pub struct PrecisionHelper;

impl TypeHelper for PrecisionHelper {
    type Output = i32;

    fn boolean(&self) -> XmlaResult<i32> {
        Ok(0)
    }
    fn cube(&self) -> XmlaResult<i32> {
        Ok(0)
    }
    fn decimal(&self) -> XmlaResult<i32> {
        Ok(0)
    }
    fn dimension(&self) -> XmlaResult<i32> {
        Ok(0)
    }
    fn hierarchy(&self) -> XmlaResult<i32> {
        Ok(0)
    }
    fn level(&self) -> XmlaResult<i32> {
        Ok(0)
    }
    fn member(&self) -> XmlaResult<i32> {
        Ok(0)
    }
    fn null(&self) -> XmlaResult<i32> {
        Ok(0)
    }
    fn numeric(&self) -> XmlaResult<i32> {
        Ok(0)
    }
    fn set(&self) -> XmlaResult<i32> {
        Ok(0)
    }
    fn string(&self) -> XmlaResult<i32> {
        Ok(i32::MAX)
    }
    fn symbol(&self) -> XmlaResult<i32> {
        Err(symbol_not_bindable())
    }
    fn tuple(&self) -> XmlaResult<i32> {
        Ok(0)
    }
}
