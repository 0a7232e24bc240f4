//! Components stored on world rows.
//!
//! Locations, tokens, checks, events, and edges all live in one
//! [`Engine`](beanstalk_storage::Engine); tags say which is which.

use std::sync::Arc;

use beanstalk_language::{SourceKind, SymbolId};
use beanstalk_storage::{ColumnKind, Component, Payload, RowId, tag_component};

/// Display name. Unique across rows.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name(pub String);

impl Component for Name {
    const NAME: &'static str = "Name";

    fn into_payload(self) -> Payload {
        Payload::Str(self.0.into())
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_str().map(|s| Name(s.to_string()))
    }
}

/// The symbol a row was compiled as. Unique across rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Symbol(pub SymbolId);

impl Component for Symbol {
    const NAME: &'static str = "Symbol";

    fn into_payload(self) -> Payload {
        Payload::Int(i64::from(self.0.index()))
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        let index = u32::try_from(payload.as_int()?).ok()?;
        Some(Symbol(SymbolId::new(index)))
    }
}

/// How many of a token the player holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Collected(pub u32);

impl Component for Collected {
    const NAME: &'static str = "Collected";
    const KIND: ColumnKind = ColumnKind::Slice;

    fn into_payload(self) -> Payload {
        Payload::Int(i64::from(self.0))
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        u32::try_from(payload.as_int()?).ok().map(Collected)
    }
}

/// Quarter hearts granted per copy: 1 for a piece, 4 for a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceOfHeart(pub u32);

impl Component for PieceOfHeart {
    const NAME: &'static str = "PieceOfHeart";

    fn into_payload(self) -> Payload {
        Payload::Int(i64::from(self.0))
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        u32::try_from(payload.as_int()?).ok().map(PieceOfHeart)
    }
}

/// Ocarina button tokens a song needs when notes are shuffled, comma separated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notes(pub String);

impl Component for Notes {
    const NAME: &'static str = "Notes";

    fn into_payload(self) -> Payload {
        Payload::Str(self.0.into())
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_str().map(|s| Notes(s.to_string()))
    }
}

/// Row an edge leaves from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Origin(pub RowId);

impl Component for Origin {
    const NAME: &'static str = "Origin";

    fn into_payload(self) -> Payload {
        Payload::Row(self.0)
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_row().map(Origin)
    }
}

/// Row an edge reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Destination(pub RowId);

impl Component for Destination {
    const NAME: &'static str = "Destination";

    fn into_payload(self) -> Payload {
        Payload::Row(self.0)
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_row().map(Destination)
    }
}

/// Token row of the item placed at a check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placed(pub RowId);

impl Component for Placed {
    const NAME: &'static str = "Placed";

    fn into_payload(self) -> Payload {
        Payload::Row(self.0)
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_row().map(Placed)
    }
}

/// Compiled guard of an edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule(pub Arc<[u8]>);

impl Component for Rule {
    const NAME: &'static str = "Rule";

    fn into_payload(self) -> Payload {
        Payload::Bytes(self.0)
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_bytes().cloned().map(Rule)
    }
}

/// Edge kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeKind(pub SourceKind);

impl Component for EdgeKind {
    const NAME: &'static str = "EdgeKind";
    const KIND: ColumnKind = ColumnKind::Map;

    fn into_payload(self) -> Payload {
        Payload::Int(match self.0 {
            SourceKind::Check => 0,
            SourceKind::Event => 1,
            SourceKind::Transit => 2,
        })
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        let kind = match payload.as_int()? {
            0 => SourceKind::Check,
            1 => SourceKind::Event,
            2 => SourceKind::Transit,
            _ => return None,
        };
        Some(EdgeKind(kind))
    }
}

tag_component! {
    /// A region of the world graph.
    IsLocation,
    /// A collectible item.
    IsToken,
    /// An event flag.
    IsEvent,
    /// An item check.
    IsCheck,
    /// A rule-guarded edge.
    IsEdge,
    /// A bottle of any content.
    IsBottle,
    /// A medallion.
    Medallion,
    /// A spiritual stone.
    SpiritualStone,
    /// A medallion or stone.
    DungeonReward,
    /// An ocarina song.
    Song,
}
