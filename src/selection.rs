//! The user's current query parameters.

use crate::catalog::{self, RACE_LENGTHS, WEATHER_CONDITIONS};
use crate::QueryKind;

/// Full set of user-chosen parameters at one point in time.
///
/// Edits never mutate a `Selection` in place; [`Selection::apply`] returns a
/// replacement value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub query_kind: QueryKind,
    pub track_id: String,
    pub weather: String,
    pub race_length: String,
    pub free_text: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            query_kind: QueryKind::default(),
            track_id: catalog::tracks()
                .first()
                .map(|track| track.id.clone())
                .unwrap_or_default(),
            weather: WEATHER_CONDITIONS[0].id.to_string(),
            race_length: RACE_LENGTHS[0].id.to_string(),
            free_text: String::new(),
        }
    }
}

/// One user edit to a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEdit {
    QueryKind(QueryKind),
    Track(String),
    Weather(String),
    RaceLength(String),
    FreeText(String),
}

impl SelectionEdit {
    /// Track and query kind changes make any shown primary result wrong
    /// for the new selection.
    pub fn invalidates_primary(&self) -> bool {
        matches!(self, SelectionEdit::QueryKind(_) | SelectionEdit::Track(_))
    }
}

impl Selection {
    /// New selection with `edit` applied, or `None` when nothing changes.
    pub fn apply(&self, edit: &SelectionEdit) -> Option<Selection> {
        let mut next = self.clone();
        match edit {
            SelectionEdit::QueryKind(kind) => next.query_kind = *kind,
            SelectionEdit::Track(id) => next.track_id = id.clone(),
            SelectionEdit::Weather(id) => next.weather = id.clone(),
            SelectionEdit::RaceLength(id) => next.race_length = id.clone(),
            SelectionEdit::FreeText(text) => next.free_text = text.clone(),
        }
        (next != *self).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_the_catalog() {
        let selection = Selection::default();
        assert_eq!(selection.query_kind, QueryKind::Setup);
        assert_eq!(selection.track_id, "Bahrain International Circuit");
        assert_eq!(selection.weather, "Dry");
        assert_eq!(selection.race_length, "5 Laps");
        assert!(selection.free_text.is_empty());
    }

    #[test]
    fn apply_returns_a_new_value() {
        let selection = Selection::default();
        let next = selection
            .apply(&SelectionEdit::Track("Circuit de Monaco".into()))
            .unwrap();
        assert_eq!(next.track_id, "Circuit de Monaco");
        assert_eq!(selection.track_id, "Bahrain International Circuit");
    }

    #[test]
    fn unchanged_edit_is_none() {
        let selection = Selection::default();
        assert_eq!(selection.apply(&SelectionEdit::Weather("Dry".into())), None);
        assert_eq!(selection.apply(&SelectionEdit::QueryKind(QueryKind::Setup)), None);
    }

    #[test]
    fn only_track_and_kind_invalidate_primary() {
        assert!(SelectionEdit::Track("x".into()).invalidates_primary());
        assert!(SelectionEdit::QueryKind(QueryKind::Strategy).invalidates_primary());
        assert!(!SelectionEdit::Weather("Dry".into()).invalidates_primary());
        assert!(!SelectionEdit::FreeText("tyre saving".into()).invalidates_primary());
    }
}
