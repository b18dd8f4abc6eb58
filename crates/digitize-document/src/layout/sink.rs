// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page sinks: write-only targets for placement commands.

use digitize_core::error::Result;

use super::command::PlacementCommand;

/// Accumulates pages from a stream of placement commands.
pub trait PageSink {
    /// Start a new page. Called once before the first command and again for
    /// every page break.
    fn new_page(&mut self) -> Result<()>;

    /// Apply a drawing, positioning, font, or link command to the current page.
    fn emit(&mut self, command: &PlacementCommand) -> Result<()>;
}

/// What a [`RecordingSink`] saw, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    NewPage,
    Command(PlacementCommand),
}

/// In-memory sink that records every call.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SinkEvent::NewPage))
            .count()
    }

    /// Commands in order, with page starts dropped.
    pub fn commands(&self) -> impl Iterator<Item = &PlacementCommand> {
        self.events.iter().filter_map(|e| match e {
            SinkEvent::Command(c) => Some(c),
            SinkEvent::NewPage => None,
        })
    }

    /// Texts drawn, in order.
    pub fn drawn_texts(&self) -> Vec<&str> {
        self.commands()
            .filter_map(|c| match c {
                PlacementCommand::DrawText(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl PageSink for RecordingSink {
    fn new_page(&mut self) -> Result<()> {
        self.events.push(SinkEvent::NewPage);
        Ok(())
    }

    fn emit(&mut self, command: &PlacementCommand) -> Result<()> {
        self.events.push(SinkEvent::Command(command.clone()));
        Ok(())
    }
}
