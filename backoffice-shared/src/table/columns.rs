/// Column definitions and visibility

use serde::{Deserialize, Serialize};

/// Id of the row-selection checkbox column
pub const SELECT_COLUMN: &str = "select";

/// Id of the per-row actions column
pub const ACTIONS_COLUMN: &str = "actions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column id; for data columns this is the sort identifier sent to the server
    pub id: String,
    pub header: String,
    pub sortable: bool,
    pub toggleable: bool,
    pub visible: bool,
}

impl Column {
    /// Plain data column: visible, not sortable, not toggleable
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            sortable: false,
            toggleable: false,
            visible: true,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn toggleable(mut self) -> Self {
        self.toggleable = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn select() -> Self {
        Self::new(SELECT_COLUMN, "")
    }

    pub fn actions() -> Self {
        Self::new(ACTIONS_COLUMN, "Actions")
    }

    fn is_fixed(&self) -> bool {
        self.id == SELECT_COLUMN || self.id == ACTIONS_COLUMN
    }
}

/// Ordered columns of a table, always starting with the select column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    pub fn new(columns: Vec<Column>) -> Self {
        let mut all = Vec::with_capacity(columns.len() + 1);
        if !columns.iter().any(|c| c.id == SELECT_COLUMN) {
            all.push(Column::select());
        }
        all.extend(columns);

        // Fixed columns can be neither hidden nor sorted
        for column in all.iter_mut().filter(|c| c.is_fixed()) {
            column.visible = true;
            column.toggleable = false;
            column.sortable = false;
        }

        Self { columns: all }
    }

    pub fn get(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn all(&self) -> &[Column] {
        &self.columns
    }

    pub fn visible(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.visible)
    }

    /// Columns offered in the "Toggle Columns" menu
    pub fn toggleable(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.toggleable)
    }

    /// Flips visibility of a toggleable column
    ///
    /// # Returns
    ///
    /// The new visibility, or None when the column is missing or fixed
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let column = self.columns.iter_mut().find(|c| c.id == id && c.toggleable)?;
        column.visible = !column.visible;
        Some(column.visible)
    }
}
