//! Structured search events and their textual rendering.
//!
//! The engines emit [`Event`]s to a [`Reporter`]; what gets printed is
//! entirely up to the reporter. Reporting never touches the random source, so
//! the verbosity level cannot change a decision.

use crate::connect4::{Column, WIDTH};
use crate::search::ColumnValue;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// How much of the search is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    None,
    Brief,
    Verbose,
}

#[derive(Debug, Error)]
#[error("unknown verbosity `{0}`, expected Verbose, Brief or None")]
pub struct UnknownVerbosity(String);

impl FromStr for Verbosity {
    type Err = UnknownVerbosity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Verbose" => Ok(Self::Verbose),
            "Brief" => Ok(Self::Brief),
            "None" => Ok(Self::None),
            other => Err(UnknownVerbosity(other.to_owned())),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Verbose => "Verbose",
            Self::Brief => "Brief",
            Self::None => "None",
        })
    }
}

/// Something that happened during a search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event<'a> {
    /// An in-tree node was passed on the way down.
    Visit { wi: i64, ni: u32 },
    /// UCB values of a node's children, indexed by column. `None` marks a
    /// column without a child and `f64::INFINITY` an unvisited child.
    Ucb { values: &'a [Option<f64>; WIDTH] },
    /// A move was chosen, in the tree or during a rollout.
    MoveSelected { column: Column },
    NodeAdded { column: Column },
    /// The simulation reached the end of the game.
    Terminal { value: i32 },
    /// A node's statistics after backpropagation.
    Updated { wi: i64, ni: u32 },
    /// Per-column summary once the search is done.
    ColumnValues { values: &'a [ColumnValue; WIDTH] },
    Final { column: Column },
}

impl Event<'_> {
    /// The lowest verbosity at which this event is rendered.
    pub fn level(&self) -> Verbosity {
        match self {
            Self::ColumnValues { .. } | Self::Final { .. } => Verbosity::Brief,
            _ => Verbosity::Verbose,
        }
    }
}

/// Receives search events.
pub trait Reporter {
    fn verbosity(&self) -> Verbosity;

    fn report(&mut self, event: &Event<'_>);

    /// Whether events at `level` are wanted. Engines check this before
    /// building costly events.
    fn enabled(&self, level: Verbosity) -> bool {
        level != Verbosity::None && self.verbosity() >= level
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn verbosity(&self) -> Verbosity {
        Verbosity::None
    }

    fn report(&mut self, _event: &Event<'_>) {}
}

/// Renders events as plain text lines. Columns are shown 1-indexed.
pub struct TextReporter<W: Write> {
    verbosity: Verbosity,
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(verbosity: Verbosity, out: W) -> Self {
        Self { verbosity, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, event: &Event<'_>) -> io::Result<()> {
        let out = &mut self.out;
        match *event {
            Event::Visit { wi, ni } => {
                writeln!(out, "wi: {}", wi)?;
                writeln!(out, "ni: {}", ni)
            }
            Event::Ucb { values } => {
                for (col, value) in values.iter().enumerate() {
                    match value {
                        Some(v) if v.is_finite() => writeln!(out, "V{}: {:.3}", col + 1, v)?,
                        Some(_) => writeln!(out, "V{}: INF", col + 1)?,
                        None => {}
                    }
                }
                Ok(())
            }
            Event::MoveSelected { column } => writeln!(out, "Move selected: {}", column + 1),
            Event::NodeAdded { .. } => writeln!(out, "NODE ADDED"),
            Event::Terminal { value } => writeln!(out, "TERMINAL NODE VALUE: {}", value),
            Event::Updated { wi, ni } => {
                writeln!(out, "Updated values:")?;
                writeln!(out, "wi: {}", wi)?;
                writeln!(out, "ni: {}", ni)
            }
            Event::ColumnValues { values } => {
                for (col, value) in values.iter().enumerate() {
                    writeln!(out, "Column {}: {}", col + 1, value)?;
                }
                Ok(())
            }
            Event::Final { column } => writeln!(out, "FINAL Move selected: {}", column + 1),
        }
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn report(&mut self, event: &Event<'_>) {
        if !self.enabled(event.level()) {
            return;
        }
        if let Err(err) = self.render(event) {
            warn!(%err, "failed to write search trace");
        }
    }
}
