//! Autocomplete binding
//!
//! Binds a remote search to a single-select input for the duration of one
//! edit session.
//!
//! Searches may overlap. Every keystroke bumps a generation counter and a
//! response is applied only if it carries the latest generation of the
//! session that issued it, so a slow early response can never overwrite a
//! later one.

use crate::session::SessionId;
use pw_model::{AutocompleteConfig, RefValue};
use pw_remote::{AutocompleteSource, SearchError};
use tracing::{debug, trace};

/// Handle for one dispatched search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    session: SessionId,
    generation: u64,
    query: String,
}

impl SearchTicket {
    /// Session that issued the search
    #[inline]
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Keystroke generation the search belongs to
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Query to send
    #[inline]
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// What happened to a search response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Candidates replaced with this many results
    Applied(usize),
    /// Search failed; candidates emptied
    Failed(SearchError),
    /// A newer keystroke or a teardown superseded the search; response dropped
    Stale,
    /// Query too short; no request was made and candidates were emptied
    Skipped,
}

#[derive(Debug, Default)]
struct SelectWidget {
    query: String,
    generation: u64,
    candidates: Vec<RefValue>,
    selected: Option<RefValue>,
}

/// Remote autocomplete attached to a reference field's input
#[derive(Debug)]
pub struct AutocompleteBinding {
    session: SessionId,
    field: String,
    config: AutocompleteConfig,
    min_query_len: usize,
    widget: Option<SelectWidget>,
}

impl AutocompleteBinding {
    /// Create an inactive binding
    #[must_use]
    pub fn new(
        session: SessionId,
        field: impl Into<String>,
        config: AutocompleteConfig,
        min_query_len: usize,
    ) -> Self {
        Self {
            session,
            field: field.into(),
            config,
            min_query_len,
            widget: None,
        }
    }

    /// Create the select widget, pre-selecting `preset`
    ///
    /// No-op if already active.
    ///
    /// # Returns
    /// `true` if a widget was created
    pub fn activate(&mut self, preset: Option<RefValue>) -> bool {
        if self.widget.is_some() {
            debug!(field = %self.field, "autocomplete already active");
            return false;
        }
        debug!(field = %self.field, preset = ?preset.as_ref().map(|r| r.id), "autocomplete activated");
        self.widget = Some(SelectWidget {
            selected: preset,
            ..SelectWidget::default()
        });
        true
    }

    /// Destroy the select widget; safe to call when never activated
    pub fn teardown(&mut self) {
        if self.widget.take().is_some() {
            debug!(field = %self.field, "autocomplete torn down");
        }
    }

    /// Check if the select widget exists
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.widget.is_some()
    }

    /// Autocomplete configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AutocompleteConfig {
        &self.config
    }

    /// Current query text
    #[must_use]
    pub fn query(&self) -> &str {
        self.widget.as_ref().map_or("", |w| w.query.as_str())
    }

    /// Candidates currently offered
    #[must_use]
    pub fn candidates(&self) -> &[RefValue] {
        self.widget
            .as_ref()
            .map(|w| w.candidates.as_slice())
            .unwrap_or(&[])
    }

    /// Selected option
    #[must_use]
    pub fn selected(&self) -> Option<&RefValue> {
        self.widget.as_ref().and_then(|w| w.selected.as_ref())
    }

    /// Register a keystroke
    ///
    /// Short queries clear the candidates and return `None`; longer ones
    /// return the ticket of the one search to issue for this keystroke.
    pub fn begin_query(&mut self, query: &str) -> Option<SearchTicket> {
        let min_len = self.min_query_len;
        let widget = self.widget.as_mut()?;
        widget.query = query.to_string();
        widget.generation += 1;

        if query.chars().count() < min_len {
            widget.candidates.clear();
            trace!(field = %self.field, query, "query below minimum length");
            return None;
        }

        Some(SearchTicket {
            session: self.session,
            generation: widget.generation,
            query: query.to_string(),
        })
    }

    /// Apply a search response if it is still current
    pub fn apply_results(
        &mut self,
        ticket: &SearchTicket,
        result: Result<Vec<RefValue>, SearchError>,
    ) -> ApplyOutcome {
        let Some(widget) = self.widget.as_mut() else {
            return ApplyOutcome::Stale;
        };
        if ticket.session != self.session || ticket.generation != widget.generation {
            debug!(
                field = %self.field,
                query = %ticket.query,
                generation = ticket.generation,
                latest = widget.generation,
                "dropping stale autocomplete response"
            );
            return ApplyOutcome::Stale;
        }
        match result {
            Ok(candidates) => {
                let count = candidates.len();
                widget.candidates = candidates;
                ApplyOutcome::Applied(count)
            }
            Err(err) => {
                widget.candidates.clear();
                ApplyOutcome::Failed(err)
            }
        }
    }

    /// Run one keystroke end to end against a source
    pub async fn search(&mut self, query: &str, source: &AutocompleteSource) -> ApplyOutcome {
        let Some(ticket) = self.begin_query(query) else {
            return ApplyOutcome::Skipped;
        };
        let result = source.search(&self.config, ticket.query()).await;
        self.apply_results(&ticket, result)
    }

    /// Select a candidate
    ///
    /// # Returns
    /// `true` if the selection changed
    pub fn select(&mut self, candidate: RefValue) -> bool {
        let Some(widget) = self.widget.as_mut() else {
            return false;
        };
        if widget.selected.as_ref().is_some_and(|s| s.id == candidate.id) {
            return false;
        }
        widget.selected = Some(candidate);
        true
    }

    /// Select by identifier, reusing the offered candidate when present
    ///
    /// # Returns
    /// `true` if the selection changed
    pub fn select_id(&mut self, id: i64) -> bool {
        let candidate = self
            .candidates()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap_or_else(|| RefValue::bare(id));
        self.select(candidate)
    }

    /// Clear the selection
    ///
    /// # Returns
    /// `true` if something was selected
    pub fn clear(&mut self) -> bool {
        self.widget
            .as_mut()
            .is_some_and(|w| w.selected.take().is_some())
    }
}
