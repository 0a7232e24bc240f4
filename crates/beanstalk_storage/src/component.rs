//! Component values and the type-erasure boundary.
//!
//! Typed components implement [`Component`]; the storage engine only ever sees
//! them as a [`ComponentValue`], i.e. a runtime type id plus a [`Payload`].

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A row (entity) in the table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RowId(pub(crate) u32);

impl RowId {
    /// Creates a row id from a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row({})", self.0)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A column in the table; one per component type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnId(pub(crate) u32);

impl ColumnId {
    /// Creates a column id from a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column({})", self.0)
    }
}

/// Storage shape of a column, fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColumnKind {
    /// Dense vector indexed by row; for components nearly every row has.
    Slice,
    /// Hash map from row to payload; for sparse components with data.
    Map,
    /// Membership only; for zero-payload tags.
    Bit,
}

/// The closed set of payloads a column can hold.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Payload {
    /// Zero-payload marker.
    Tag,
    /// Integer payload.
    Int(i64),
    /// Float payload.
    Float(f64),
    /// String payload.
    Str(Arc<str>),
    /// Reference to another row.
    Row(RowId),
    /// Opaque bytes (compiled rule tapes).
    Bytes(Arc<[u8]>),
}

impl Payload {
    /// Returns the payload kind name.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Row(_) => "row",
            Self::Bytes(_) => "bytes",
        }
    }

    /// Returns the integer payload, if any.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float payload, if any.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the row reference, if any.
    #[must_use]
    pub fn as_row(&self) -> Option<RowId> {
        match self {
            Self::Row(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns the byte payload, if any.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Arc<[u8]>> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// A typed component that can be stored in a column.
pub trait Component: Sized + 'static {
    /// Name used in diagnostics.
    const NAME: &'static str;

    /// Shape used when the column is created without an explicit kind.
    const KIND: ColumnKind = ColumnKind::Map;

    /// Converts the component into its stored payload.
    fn into_payload(self) -> Payload;

    /// Rebuilds the component from a stored payload.
    fn from_payload(payload: &Payload) -> Option<Self>;
}

/// A component with its concrete type erased.
#[derive(Clone, Debug)]
pub struct ComponentValue {
    pub(crate) type_id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) payload: Payload,
}

impl ComponentValue {
    /// Erases a typed component.
    pub fn of<C: Component>(component: C) -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: C::NAME,
            payload: component.into_payload(),
        }
    }

    /// The component's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The stored payload.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl<C: Component> From<C> for ComponentValue {
    fn from(component: C) -> Self {
        Self::of(component)
    }
}

/// Declares zero-payload tag components stored in bit columns.
///
/// ```
/// beanstalk_storage::tag_component! {
///     /// Marks a bottle.
///     IsBottle
/// }
/// ```
#[macro_export]
macro_rules! tag_component {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
            pub struct $name;

            impl $crate::Component for $name {
                const NAME: &'static str = stringify!($name);
                const KIND: $crate::ColumnKind = $crate::ColumnKind::Bit;

                fn into_payload(self) -> $crate::Payload {
                    $crate::Payload::Tag
                }

                fn from_payload(_: &$crate::Payload) -> Option<Self> {
                    Some(Self)
                }
            }
        )+
    };
}

/// Built-in tag present on every inserted row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Entry;

impl Component for Entry {
    const NAME: &'static str = "Entry";
    const KIND: ColumnKind = ColumnKind::Bit;

    fn into_payload(self) -> Payload {
        Payload::Tag
    }

    fn from_payload(_: &Payload) -> Option<Self> {
        Some(Self)
    }
}
