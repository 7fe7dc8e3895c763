//! Event kinds

use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Every event name a table can publish.
///
/// Serialized names are the camelCase strings consumers and worker
/// trigger configurations use, e.g. `cellChange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    TableRender,
    DataChange,
    CellChange,
    CellBlur,
    RowAdded,
    RowDeleted,
    RowSheetOpened,
    RowSheetClosed,
    RowFieldAutoSaved,
    SelectionChanged,
    RowSelected,
    SingleRowSelected,
    RowChecked,
    TabChanged,
    CollectionNameChange,
    WorkerSaved,
    WorkerToggled,
    WorkerDeleted,
    TaskAdded,
    TaskStatusChanged,
}

/// The text of an unrecognized event name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event kind: {0}")]
pub struct UnknownEventKind(pub String);

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 20] = [
        EventKind::TableRender,
        EventKind::DataChange,
        EventKind::CellChange,
        EventKind::CellBlur,
        EventKind::RowAdded,
        EventKind::RowDeleted,
        EventKind::RowSheetOpened,
        EventKind::RowSheetClosed,
        EventKind::RowFieldAutoSaved,
        EventKind::SelectionChanged,
        EventKind::RowSelected,
        EventKind::SingleRowSelected,
        EventKind::RowChecked,
        EventKind::TabChanged,
        EventKind::CollectionNameChange,
        EventKind::WorkerSaved,
        EventKind::WorkerToggled,
        EventKind::WorkerDeleted,
        EventKind::TaskAdded,
        EventKind::TaskStatusChanged,
    ];

    /// The published camelCase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TableRender => "tableRender",
            EventKind::DataChange => "dataChange",
            EventKind::CellChange => "cellChange",
            EventKind::CellBlur => "cellBlur",
            EventKind::RowAdded => "rowAdded",
            EventKind::RowDeleted => "rowDeleted",
            EventKind::RowSheetOpened => "rowSheetOpened",
            EventKind::RowSheetClosed => "rowSheetClosed",
            EventKind::RowFieldAutoSaved => "rowFieldAutoSaved",
            EventKind::SelectionChanged => "selectionChanged",
            EventKind::RowSelected => "rowSelected",
            EventKind::SingleRowSelected => "singleRowSelected",
            EventKind::RowChecked => "rowChecked",
            EventKind::TabChanged => "tabChanged",
            EventKind::CollectionNameChange => "collectionNameChange",
            EventKind::WorkerSaved => "workerSaved",
            EventKind::WorkerToggled => "workerToggled",
            EventKind::WorkerDeleted => "workerDeleted",
            EventKind::TaskAdded => "taskAdded",
            EventKind::TaskStatusChanged => "taskStatusChanged",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_every_name() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_serde_matches_published_names() {
        let json = serde_json::to_string(&EventKind::RowFieldAutoSaved).unwrap();
        assert_eq!(json, "\"rowFieldAutoSaved\"");
        let parsed: EventKind = serde_json::from_str("\"cellBlur\"").unwrap();
        assert_eq!(parsed, EventKind::CellBlur);
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!("cellchange".parse::<EventKind>().is_err());
    }
}
