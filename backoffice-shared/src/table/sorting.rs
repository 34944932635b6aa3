/// Header-click sort cycle
///
/// Each column moves through asc, desc, none. A plain click replaces the sort
/// list with that one column; a multi-sort click edits the column in place
/// within the existing list, appending it when absent.

use crate::listing::{SortDirection, SortSpec};

/// Next state in the asc, desc, none cycle
pub fn next_direction(current: Option<SortDirection>) -> Option<SortDirection> {
    match current {
        None => Some(SortDirection::Asc),
        Some(SortDirection::Asc) => Some(SortDirection::Desc),
        Some(SortDirection::Desc) => None,
    }
}

/// Ordered multi-column sort state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    specs: Vec<SortSpec>,
}

impl SortState {
    pub fn new(specs: Vec<SortSpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[SortSpec] {
        &self.specs
    }

    pub fn direction_of(&self, column: &str) -> Option<SortDirection> {
        self.specs
            .iter()
            .find(|s| s.id == column)
            .map(SortSpec::direction)
    }

    /// Applies a header click and returns the new ordered list
    pub fn click(&mut self, column: &str, multi: bool) -> Vec<SortSpec> {
        let next = next_direction(self.direction_of(column));

        if multi {
            match (self.specs.iter().position(|s| s.id == column), next) {
                (Some(pos), Some(direction)) => {
                    self.specs[pos].desc = direction == SortDirection::Desc;
                }
                (Some(pos), None) => {
                    self.specs.remove(pos);
                }
                (None, Some(direction)) => self.specs.push(SortSpec {
                    id: column.to_string(),
                    desc: direction == SortDirection::Desc,
                }),
                (None, None) => {}
            }
        } else {
            self.specs = next
                .map(|direction| {
                    vec![SortSpec {
                        id: column.to_string(),
                        desc: direction == SortDirection::Desc,
                    }]
                })
                .unwrap_or_default();
        }

        self.specs.clone()
    }
}
