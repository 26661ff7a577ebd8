use core::fmt::Display;

/// A runtime type descriptor.
///
/// Descriptors are allocated in a [`bumpalo::Bump`] arena and handed
/// around as `&'a Type<'a>`. Interned descriptors (see
/// [`crate::TypeManager`]) additionally compare by pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type<'a> {
    /// A primitive, identified by its wire name
    /// (`"bool"`, `"char"`, `"byte"`, `"short"`, `"int"`, `"long"`,
    /// `"float"`, `"double"`).
    Prim(&'a str),

    /// A type-level natural number. Only meaningful as the length node
    /// of a [`Type::FixedArr`]; it describes no storage of its own.
    Size(usize),

    /// A fixed-length array. `len` is normally a [`Type::Size`] node;
    /// descriptor trees arriving from elsewhere may put something else
    /// there, which consumers must reject rather than reinterpret.
    FixedArr {
        len: &'a Type<'a>,
        elem: &'a Type<'a>,
    },

    /// A record with named fields at fixed byte offsets, in source
    /// declaration order.
    Struct(&'a [Field<'a>]),

    /// A tagged union: a 4-byte tag followed by one of several payload
    /// layouts. Constructors are in source declaration order.
    Variant(&'a [Ctor<'a>]),
}

/// One field of a [`Type::Struct`] descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field<'a> {
    pub name: &'a str,
    /// Byte offset of this field within the record's storage.
    pub offset: usize,
    pub ty: &'a Type<'a>,
}

/// One constructor of a [`Type::Variant`] descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ctor<'a> {
    pub name: &'a str,
    /// The runtime tag value stored in the leading 4 bytes of a value
    /// of this variant type.
    pub tag: u32,
    pub payload: &'a Type<'a>,
}

impl<'a> Type<'a> {
    /// Short noun for this descriptor's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Prim(_) => "primitive",
            Type::Size(_) => "size",
            Type::FixedArr { .. } => "fixed-size array",
            Type::Struct(_) => "record",
            Type::Variant(_) => "variant",
        }
    }
}

impl Display for Type<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Type::Prim(name) => write!(f, "{}", name),
            Type::Size(n) => write!(f, "{}", n),
            Type::FixedArr { len, elem } => write!(f, "[{}; {}]", elem, len),
            Type::Struct(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                write!(f, "}}")
            }
            Type::Variant(ctors) => {
                write!(f, "|")?;
                for (i, ctor) in ctors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", ctor.name, ctor.payload)?;
                }
                write!(f, "|")
            }
        }
    }
}
