//! View models for the four server-backed lists.
//!
//! A list is rebuilt from scratch on every response; nothing about a previous
//! render (including which rows were expanded) carries over.

use serde_json::Value;

use crate::protocol::{BatchSummary, FilterDescriptor, ListItem, ScriptSummary, StatsMap};

pub const COLLAPSED_GLYPH: &str = "+";
pub const EXPANDED_GLYPH: &str = "-";
pub const TOGGLE_TITLE: &str = "Click for details";
pub const DETAIL_COLSPAN: u32 = 5;
pub const FILTER_HEADER_LABELS: [&str; 2] = ["Target size", "Output batch name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListTarget {
    Scripts,
    Batches,
    Filters,
    Stats,
}

impl ListTarget {
    pub const ALL: [ListTarget; 4] = [Self::Scripts, Self::Batches, Self::Filters, Self::Stats];

    /// Id of the page element the list is rendered into.
    #[must_use]
    pub fn container_id(self) -> &'static str {
        match self {
            Self::Scripts => "scripts",
            Self::Batches => "batches",
            Self::Filters => "filters",
            Self::Stats => "db_stats",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleState {
    pub glyph: &'static str,
    pub detail_visible: bool,
}

/// Next state of a toggle cell currently showing `current`.
#[must_use]
pub fn toggle_glyph(current: &str) -> ToggleState {
    if current == COLLAPSED_GLYPH {
        ToggleState {
            glyph: EXPANDED_GLYPH,
            detail_visible: true,
        }
    } else {
        ToggleState {
            glyph: COLLAPSED_GLYPH,
            detail_visible: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRow {
    /// Summary row with a toggle cell, followed by a detail row holding the
    /// whole item.
    Expandable {
        cells: Vec<String>,
        detail: String,
        expanded: bool,
    },
    /// Label with an editable input next to it.
    Field { label: String },
    Pair { key: String, value: String },
}

impl ViewRow {
    fn expandable(cells: Vec<String>, detail: String) -> Self {
        Self::Expandable {
            cells,
            detail,
            expanded: false,
        }
    }

    #[must_use]
    pub fn glyph(&self) -> Option<&'static str> {
        match self {
            Self::Expandable { expanded: true, .. } => Some(EXPANDED_GLYPH),
            Self::Expandable { expanded: false, .. } => Some(COLLAPSED_GLYPH),
            _ => None,
        }
    }

    /// Flips an expandable row. Returns whether the detail is now visible;
    /// other rows are left alone and report `false`.
    pub fn toggle(&mut self) -> bool {
        let Some(current) = self.glyph() else {
            return false;
        };
        let next = toggle_glyph(current);
        if let Self::Expandable { expanded, .. } = self {
            *expanded = next.detail_visible;
        }
        next.detail_visible
    }

    #[must_use]
    pub fn dom_rows(&self) -> usize {
        match self {
            Self::Expandable { .. } => 2,
            Self::Field { .. } | Self::Pair { .. } => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub target: ListTarget,
    pub rows: Vec<ViewRow>,
}

impl ListView {
    #[must_use]
    pub fn scripts(items: &[ListItem<ScriptSummary>]) -> Self {
        let rows = items
            .iter()
            .map(|item| {
                ViewRow::expandable(
                    vec![
                        item.summary.options.script_name.clone(),
                        item.summary.output_size.to_string(),
                        item.summary.timestamp.clone(),
                    ],
                    item.raw.clone(),
                )
            })
            .collect();
        Self {
            target: ListTarget::Scripts,
            rows,
        }
    }

    #[must_use]
    pub fn batches(items: &[ListItem<BatchSummary>]) -> Self {
        let rows = items
            .iter()
            .map(|item| {
                ViewRow::expandable(
                    vec![
                        item.summary.batch_name.clone(),
                        item.summary.output_size.to_string(),
                        item.summary.timestamp.clone(),
                    ],
                    item.raw.clone(),
                )
            })
            .collect();
        Self {
            target: ListTarget::Batches,
            rows,
        }
    }

    #[must_use]
    pub fn filters(filters: &[FilterDescriptor]) -> Self {
        let rows = FILTER_HEADER_LABELS
            .iter()
            .map(|label| (*label).to_string())
            .chain(filters.iter().map(|filter| filter.label().to_string()))
            .map(|label| ViewRow::Field { label })
            .collect();
        Self {
            target: ListTarget::Filters,
            rows,
        }
    }

    #[must_use]
    pub fn stats(stats: &StatsMap) -> Self {
        let rows = stats
            .iter()
            .map(|(key, value)| ViewRow::Pair {
                key: key.clone(),
                value: display_value(value),
            })
            .collect();
        Self {
            target: ListTarget::Stats,
            rows,
        }
    }

    #[must_use]
    pub fn dom_row_count(&self) -> usize {
        self.rows.iter().map(ViewRow::dom_rows).sum()
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ScriptOptions, decode_stats};

    fn script(name: &str) -> ListItem<ScriptSummary> {
        ListItem {
            summary: ScriptSummary {
                options: ScriptOptions {
                    script_name: name.to_string(),
                },
                output_size: 3,
                timestamp: "2020-01-01".to_string(),
            },
            raw: format!(r#"{{"options":{{"script_name":"{name}"}}}}"#),
        }
    }

    #[test]
    fn toggle_glyph_alternates() {
        let opened = toggle_glyph(COLLAPSED_GLYPH);
        assert_eq!(opened.glyph, EXPANDED_GLYPH);
        assert!(opened.detail_visible);
        let closed = toggle_glyph(opened.glyph);
        assert_eq!(closed.glyph, COLLAPSED_GLYPH);
        assert!(!closed.detail_visible);
    }

    #[test]
    fn rebuilt_lists_start_collapsed() {
        let mut view = ListView::scripts(&[script("a"), script("b")]);
        assert!(view.rows[0].toggle());
        let rebuilt = ListView::scripts(&[script("a"), script("b")]);
        assert!(
            rebuilt
                .rows
                .iter()
                .all(|row| row.glyph() == Some(COLLAPSED_GLYPH))
        );
        assert_eq!(view.rows[0].glyph(), Some(EXPANDED_GLYPH));
    }

    #[test]
    fn toggle_ignores_non_expandable_rows() {
        let mut row = ViewRow::Field {
            label: "Target size".to_string(),
        };
        assert!(!row.toggle());
        assert_eq!(row.glyph(), None);
    }

    #[test]
    fn stats_view_renders_nested_values_as_json() {
        let stats = decode_stats(r#"{"chunks":12,"label":"main","batches":{"b1":3}}"#)
            .expect("stats");
        let view = ListView::stats(&stats);
        assert_eq!(view.target, ListTarget::Stats);
        assert_eq!(view.dom_row_count(), 3);
        assert!(view.rows.contains(&ViewRow::Pair {
            key: "label".to_string(),
            value: "main".to_string(),
        }));
        assert!(view.rows.contains(&ViewRow::Pair {
            key: "batches".to_string(),
            value: r#"{"b1":3}"#.to_string(),
        }));
    }

    #[test]
    fn empty_filter_list_still_has_header_rows() {
        let view = ListView::filters(&[]);
        assert_eq!(view.dom_row_count(), 2);
    }

    #[test]
    fn container_ids_are_distinct() {
        let mut ids: Vec<&str> = ListTarget::ALL.iter().map(|t| t.container_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), ListTarget::ALL.len());
    }
}
