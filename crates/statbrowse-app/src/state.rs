// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{FacetChoice, FilterSelection, SortKey};
use crate::pipeline::{FacetDomains, choice_at};

/// The one mutable piece of derived view state: the current sort key and
/// facet cursors, plus the status line. Facet domains are installed once
/// after load and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub sort_cursor: usize,
    pub unit_cursor: usize,
    pub grain_cursor: usize,
    pub domains: FacetDomains,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            sort_cursor: 0,
            unit_cursor: 0,
            grain_cursor: 0,
            domains: FacetDomains::default(),
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextSort,
    PrevSort,
    NextUnitFilter,
    PrevUnitFilter,
    NextGrainFilter,
    PrevGrainFilter,
    ResetFilters,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    SortChanged(SortKey),
    UnitFilterChanged(FacetChoice),
    GrainFilterChanged(FacetChoice),
    FiltersReset,
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    /// Installs the compute-once facet domains and resets both facet
    /// cursors to All.
    pub fn install_domains(&mut self, domains: FacetDomains) {
        self.domains = domains;
        self.unit_cursor = 0;
        self.grain_cursor = 0;
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey::ALL
            .get(self.sort_cursor)
            .copied()
            .unwrap_or(SortKey::SourceOrder)
    }

    pub fn unit_choice(&self) -> FacetChoice {
        choice_at(&self.domains.units, self.unit_cursor)
    }

    pub fn grain_choice(&self) -> FacetChoice {
        choice_at(&self.domains.time_grains, self.grain_cursor)
    }

    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            unit: self.unit_choice(),
            time_grain: self.grain_choice(),
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextSort => self.rotate_sort(1),
            AppCommand::PrevSort => self.rotate_sort(-1),
            AppCommand::NextUnitFilter => self.rotate_unit(1),
            AppCommand::PrevUnitFilter => self.rotate_unit(-1),
            AppCommand::NextGrainFilter => self.rotate_grain(1),
            AppCommand::PrevGrainFilter => self.rotate_grain(-1),
            AppCommand::ResetFilters => {
                self.unit_cursor = 0;
                self.grain_cursor = 0;
                vec![AppEvent::FiltersReset, self.set_status("filters cleared")]
            }
            AppCommand::SetStatus(message) => {
                vec![self.set_status(&message)]
            }
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_sort(&mut self, delta: isize) -> Vec<AppEvent> {
        self.sort_cursor = rotate_cursor(self.sort_cursor, SortKey::ALL.len(), delta);
        let key = self.sort_key();
        vec![
            AppEvent::SortChanged(key),
            self.set_status(&format!("sort: {}", key.label())),
        ]
    }

    fn rotate_unit(&mut self, delta: isize) -> Vec<AppEvent> {
        self.unit_cursor = rotate_cursor(self.unit_cursor, self.domains.units.len() + 1, delta);
        let choice = self.unit_choice();
        let status = self.set_status(&format!("unit: {}", choice.label()));
        vec![AppEvent::UnitFilterChanged(choice), status]
    }

    fn rotate_grain(&mut self, delta: isize) -> Vec<AppEvent> {
        self.grain_cursor =
            rotate_cursor(self.grain_cursor, self.domains.time_grains.len() + 1, delta);
        let choice = self.grain_choice();
        let status = self.set_status(&format!("period: {}", choice.label()));
        vec![AppEvent::GrainFilterChanged(choice), status]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

fn rotate_cursor(current: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + delta).rem_euclid(len as isize) as usize
}
