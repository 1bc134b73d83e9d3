//! Table observer for leaderboards and request statistics.
//!
//! This module provides [`TableObserver`], which renders ranked view lists
//! and [`MethodStats`] as formatted tables using the `tabled` crate.
//!
//! # Feature Flag
//!
//! This module requires the `table` feature:
//!
//! ```toml
//! [dependencies]
//! classifica = { version = "0.1", features = ["table"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use classifica::observers::table::{TableObserver, TableStyle};
//! use classifica::RankedCounterStore;
//!
//! let store = RankedCounterStore::new();
//! for id in ["a", "b", "b"] {
//!     store.increment(id)?;
//! }
//!
//! let observer = TableObserver::new().with_style(TableStyle::Rounded);
//! println!("{}", observer.render_views(&store.get_top(10)?));
//! // ╭──────┬────┬───────╮
//! // │ Rank │ Id │ Views │
//! // ├──────┼────┼───────┤
//! // │ 1    │ b  │ 2     │
//! // │ 2    │ a  │ 1     │
//! // ╰──────┴────┴───────╯
//! # Ok::<(), classifica::ViewError>(())
//! ```

use tabled::settings::{object::Rows, Remove, Style};
use tabled::{Table, Tabled};

use crate::service::MethodStats;
use crate::store::ViewCount;

/// Available table styles for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// ASCII table with simple characters: +, -, |
    Ascii,
    /// Rounded corners (default)
    #[default]
    Rounded,
    /// Sharp corners with box-drawing characters
    Sharp,
    /// Clean box-drawing lines between every row
    Modern,
    /// GitHub-flavored Markdown table
    Markdown,
    /// No borders, just spacing
    Blank,
}

/// Configuration for the table observer.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// The style to use for rendering.
    pub style: TableStyle,
    /// Whether to show the header row.
    pub show_header: bool,
    /// Line printed above the table (optional).
    pub title: Option<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            style: TableStyle::default(),
            show_header: true,
            title: None,
        }
    }
}

#[derive(Tabled)]
struct ViewRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Views")]
    views: u64,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Method")]
    method: &'static str,
    #[tabled(rename = "Requests")]
    requests: u64,
    #[tabled(rename = "Failures")]
    failures: u64,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Max")]
    max: String,
}

/// An observer that renders view lists and statistics as tables.
#[derive(Debug, Clone, Default)]
pub struct TableObserver {
    config: TableConfig,
}

impl TableObserver {
    /// Creates a new table observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new table observer with the specified configuration.
    pub fn with_config(config: TableConfig) -> Self {
        Self { config }
    }

    /// Sets the table style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.config.style = style;
        self
    }

    /// Sets whether to show the header row.
    pub fn with_header(mut self, show: bool) -> Self {
        self.config.show_header = show;
        self
    }

    /// Sets a title printed above the table.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    /// Renders `views` in the given order, numbering rows from 1.
    pub fn render_views(&self, views: &[ViewCount]) -> String {
        let rows: Vec<ViewRow> = views
            .iter()
            .enumerate()
            .map(|(i, v)| ViewRow {
                rank: i + 1,
                id: v.id.clone(),
                views: v.views,
            })
            .collect();
        self.finish(Table::new(&rows))
    }

    /// Renders one row per method.
    pub fn render_stats(&self, stats: &[MethodStats]) -> String {
        let rows: Vec<StatsRow> = stats
            .iter()
            .map(|s| StatsRow {
                method: s.method.as_str(),
                requests: s.requests,
                failures: s.failures,
                mean: format!("{:?}", s.mean_latency()),
                max: format!("{:?}", s.max_latency),
            })
            .collect();
        self.finish(Table::new(&rows))
    }

    fn apply_style(&self, table: &mut Table) {
        match self.config.style {
            TableStyle::Ascii => {
                table.with(Style::ascii());
            }
            TableStyle::Rounded => {
                table.with(Style::rounded());
            }
            TableStyle::Sharp => {
                table.with(Style::sharp());
            }
            TableStyle::Modern => {
                table.with(Style::modern());
            }
            TableStyle::Markdown => {
                table.with(Style::markdown());
            }
            TableStyle::Blank => {
                table.with(Style::blank());
            }
        }
    }

    fn finish(&self, mut table: Table) -> String {
        self.apply_style(&mut table);

        if !self.config.show_header {
            table.with(Remove::row(Rows::first()));
        }

        match self.config.title {
            Some(ref title) => format!("{}\n{}", title, table),
            None => table.to_string(),
        }
    }
}
