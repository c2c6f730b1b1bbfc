//! Event vocabulary

use std::fmt;
use std::str::FromStr;

use vessel_core::{Target, VesselError};

/// Write action a write event stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteAction {
    /// Create a new record
    Add,
    /// Replace an existing record
    Update,
    /// Remove a record
    Delete,
}

impl WriteAction {
    /// The pre-write event for this action
    pub fn set_event(self) -> EventName {
        match self {
            WriteAction::Add => EventName::SetAdd,
            WriteAction::Update => EventName::SetUpdate,
            WriteAction::Delete => EventName::SetDelete,
        }
    }

    /// The post-write notification for this action
    pub fn saved_event(self) -> EventName {
        match self {
            WriteAction::Add => EventName::SavedAdd,
            WriteAction::Update => EventName::SavedUpdate,
            WriteAction::Delete => EventName::SavedDelete,
        }
    }
}

/// Named interception point raised by the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    /// `Repository.New`
    New,
    /// `Repository.Get.Items`
    GetItems,
    /// `Repository.Get.Items.Ids`
    GetItemsIds,
    /// `Repository.Get.Summaries`
    GetSummaries,
    /// `Repository.Get.Summaries.Ids`
    GetSummariesIds,
    /// `Repository.Get.Count`
    GetCount,
    /// `Repository.Set.Add`
    SetAdd,
    /// `Repository.Set.Update`
    SetUpdate,
    /// `Repository.Set.Delete`
    SetDelete,
    /// `Repository.Saved.Add`
    SavedAdd,
    /// `Repository.Saved.Update`
    SavedUpdate,
    /// `Repository.Saved.Delete`
    SavedDelete,
}

impl EventName {
    /// Every event name, in vocabulary order
    pub const ALL: [EventName; 12] = [
        EventName::New,
        EventName::GetItems,
        EventName::GetItemsIds,
        EventName::GetSummaries,
        EventName::GetSummariesIds,
        EventName::GetCount,
        EventName::SetAdd,
        EventName::SetUpdate,
        EventName::SetDelete,
        EventName::SavedAdd,
        EventName::SavedUpdate,
        EventName::SavedDelete,
    ];

    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::New => "Repository.New",
            EventName::GetItems => "Repository.Get.Items",
            EventName::GetItemsIds => "Repository.Get.Items.Ids",
            EventName::GetSummaries => "Repository.Get.Summaries",
            EventName::GetSummariesIds => "Repository.Get.Summaries.Ids",
            EventName::GetCount => "Repository.Get.Count",
            EventName::SetAdd => "Repository.Set.Add",
            EventName::SetUpdate => "Repository.Set.Update",
            EventName::SetDelete => "Repository.Set.Delete",
            EventName::SavedAdd => "Repository.Saved.Add",
            EventName::SavedUpdate => "Repository.Saved.Update",
            EventName::SavedDelete => "Repository.Saved.Delete",
        }
    }

    /// Read event raised by a query for `target`
    pub fn for_query(target: Target) -> EventName {
        match target {
            Target::Items => EventName::GetItems,
            Target::Summaries => EventName::GetSummaries,
        }
    }

    /// Read event raised by an id lookup for `target`
    pub fn for_ids(target: Target) -> EventName {
        match target {
            Target::Items => EventName::GetItemsIds,
            Target::Summaries => EventName::GetSummariesIds,
        }
    }

    /// Write action of a `Set.*` or `Saved.*` event
    pub fn write_action(&self) -> Option<WriteAction> {
        match self {
            EventName::SetAdd | EventName::SavedAdd => Some(WriteAction::Add),
            EventName::SetUpdate | EventName::SavedUpdate => Some(WriteAction::Update),
            EventName::SetDelete | EventName::SavedDelete => Some(WriteAction::Delete),
            _ => None,
        }
    }

    /// `Saved.*` mirror of a `Set.*` event
    pub fn saved(&self) -> Option<EventName> {
        match self {
            EventName::SetAdd | EventName::SetUpdate | EventName::SetDelete => {
                self.write_action().map(WriteAction::saved_event)
            }
            _ => None,
        }
    }

    /// Whether this is a pre-write (`Set.*`) event
    pub fn is_set(&self) -> bool {
        self.saved().is_some()
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = VesselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| VesselError::invalid_argument(format!("unknown event name '{}'", s)))
    }
}
