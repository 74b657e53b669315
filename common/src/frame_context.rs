//! The enumerated operating mode the host has placed a hosted frame into.
//!
//! The host assigns exactly one frame context during the handshake. The
//! context gates which operations are callable: every call wrapper declares
//! the set of contexts it is allowed in, and the bridge rejects calls made
//! outside that set.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FormatResult};

/// Operating mode assigned by the host during the handshake.
///
/// Immutable once set; only a teardown followed by a fresh handshake can
/// change it. Serialized as the camelCase tag the host sends on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameContext {
    Content,
    Settings,
    Authentication,
    Remove,
    Task,
    SidePanel,
    Stage,
    MeetingStage,
}

impl FrameContext {
    /// Parse the wire tag from a handshake acknowledgment.
    ///
    /// Returns `None` for tags this library does not know; the caller decides
    /// whether that is fatal.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "content" => Some(Self::Content),
            "settings" => Some(Self::Settings),
            "authentication" => Some(Self::Authentication),
            "remove" => Some(Self::Remove),
            "task" => Some(Self::Task),
            "sidePanel" => Some(Self::SidePanel),
            "stage" => Some(Self::Stage),
            "meetingStage" => Some(Self::MeetingStage),
            _ => None,
        }
    }

    /// The wire tag for this context.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Settings => "settings",
            Self::Authentication => "authentication",
            Self::Remove => "remove",
            Self::Task => "task",
            Self::SidePanel => "sidePanel",
            Self::Stage => "stage",
            Self::MeetingStage => "meetingStage",
        }
    }
}

impl Display for FrameContext {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.tag())
    }
}
