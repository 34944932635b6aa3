/// Row selection keyed by stable row id

use std::collections::HashSet;

use uuid::Uuid;

use super::TableRow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<Uuid>,
}

impl Selection {
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// True when every row on the page is selected (and the page is not empty)
    pub fn all_selected<R: TableRow>(&self, rows: &[R]) -> bool {
        !rows.is_empty() && rows.iter().all(|r| self.ids.contains(&r.row_id()))
    }

    /// Header checkbox: selects every visible row, or clears them if all were selected
    pub fn toggle_all<R: TableRow>(&mut self, rows: &[R]) {
        if self.all_selected(rows) {
            for row in rows {
                self.ids.remove(&row.row_id());
            }
        } else {
            self.ids.extend(rows.iter().map(TableRow::row_id));
        }
    }

    /// Selected ids in the order the rows appear on the page
    pub fn ids_in_order<R: TableRow>(&self, rows: &[R]) -> Vec<Uuid> {
        rows.iter()
            .map(TableRow::row_id)
            .filter(|id| self.ids.contains(id))
            .collect()
    }
}
