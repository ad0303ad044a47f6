// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{Dimension, Record};

/// Which of a record's chips was activated. Variable chips index into the
/// record's display dimensions (the non-time axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipRole {
    Variable(usize),
    Municipality,
    TimeAxis,
}

/// Identity carried by a chip: enough to resolve the specific dimension it
/// represents against the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipRef {
    pub record_id: String,
    pub role: ChipRole,
}

impl ChipRef {
    pub fn new(record_id: impl Into<String>, role: ChipRole) -> Self {
        Self {
            record_id: record_id.into(),
            role,
        }
    }
}

/// Screen position of the activating chip, captured at activation time.
/// The panel anchors immediately below this box and is not re-anchored on
/// scroll or resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    pub x: u16,
    pub y: u16,
    pub width: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopoverState {
    Closed,
    Open { chip: ChipRef, anchor: Anchor },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopoverEvent {
    Opened,
    Replaced,
    Closed,
}

/// Owner of the single popover slot. Because all popover storage is this
/// one state field, at most one panel can exist at any instant and a
/// replace is close-then-open by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopoverController {
    state: PopoverState,
}

impl Default for PopoverController {
    fn default() -> Self {
        Self {
            state: PopoverState::Closed,
        }
    }
}

impl PopoverController {
    pub fn state(&self) -> &PopoverState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PopoverState::Open { .. })
    }

    pub fn open_chip(&self) -> Option<&ChipRef> {
        match &self.state {
            PopoverState::Open { chip, .. } => Some(chip),
            PopoverState::Closed => None,
        }
    }

    pub fn anchor(&self) -> Option<Anchor> {
        match &self.state {
            PopoverState::Open { anchor, .. } => Some(*anchor),
            PopoverState::Closed => None,
        }
    }

    /// Chip activation: opens when closed, closes on the same chip, and
    /// atomically replaces the panel on a different chip.
    pub fn activate(&mut self, chip: ChipRef, anchor: Anchor) -> PopoverEvent {
        match &self.state {
            PopoverState::Open { chip: current, .. } if *current == chip => {
                self.state = PopoverState::Closed;
                PopoverEvent::Closed
            }
            PopoverState::Open { .. } => {
                self.state = PopoverState::Open { chip, anchor };
                PopoverEvent::Replaced
            }
            PopoverState::Closed => {
                self.state = PopoverState::Open { chip, anchor };
                PopoverEvent::Opened
            }
        }
    }

    /// Pointer activation outside the panel and outside every chip.
    pub fn dismiss(&mut self) -> Option<PopoverEvent> {
        if self.is_open() {
            self.state = PopoverState::Closed;
            Some(PopoverEvent::Closed)
        } else {
            None
        }
    }
}

/// Resolves a chip back to the dimension it represents.
pub fn resolve_chip<'a>(records: &'a [Record], chip: &ChipRef) -> Option<&'a Dimension> {
    let record = records.iter().find(|record| record.id == chip.record_id)?;
    match chip.role {
        ChipRole::Variable(index) => record.display_dimensions().get(index).copied(),
        ChipRole::Municipality => record.muni_dim.as_ref(),
        ChipRole::TimeAxis => record.time_dim.as_ref(),
    }
}

/// Panel header: the dimension label with each word's first letter
/// capitalized.
pub fn panel_title(dimension: &Dimension) -> String {
    dimension
        .text
        .split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<String>>()
        .join(" ")
}

/// Panel body: every value as a 1-based `index. text` line, in source
/// order, duplicates included.
pub fn panel_lines(dimension: &Dimension) -> Vec<String> {
    dimension
        .values
        .iter()
        .enumerate()
        .map(|(index, value)| format!("{}. {}", index + 1, value.text))
        .collect()
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
