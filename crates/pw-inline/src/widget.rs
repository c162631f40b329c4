//! Field widget state machine
//!
//! ```text
//!            begin_edit            begin_confirm
//!  Display ─────────────▶ Editing ─────────────▶ Saving
//!     ▲                    │  ▲                    │
//!     │      cancel        │  │ begin_edit/input   │ complete_confirm
//!     ├────────────────────┘  │                    │
//!     │                     Error ◀────────────────┤ (rejected)
//!     │      cancel          │                     │
//!     ├──────────────────────┘                     │
//!     └────────────────────────────────────────────┘ (saved)
//! ```
//!
//! Saving is split into [`FieldWidget::begin_confirm`] and
//! [`FieldWidget::complete_confirm`] so the state transition happens in the
//! continuation of the patch request. An outstanding patch cannot be
//! cancelled; `cancel` is rejected while `Saving`.

use crate::binding::{ApplyOutcome, AutocompleteBinding, SearchTicket};
use crate::error::{FieldAction, FieldError};
use crate::session::{EditSession, SessionId};
use pw_model::{DisplayValue, FieldDescriptor, Record, RefValue, RequestContext};
use pw_remote::{AutocompleteSource, PatchError, RecordPatcher, SearchError};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Lifecycle state of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Showing the server-confirmed value
    Display,
    /// Editor open
    Editing,
    /// Patch in flight
    Saving,
    /// Last patch failed; editor still open for correction
    Error,
}

impl FieldState {
    /// Check if the edit representation is shown
    #[inline]
    #[must_use]
    pub fn shows_editor(self) -> bool {
        !matches!(self, Self::Display)
    }
}

/// Patch issued by [`FieldWidget::begin_confirm`]
#[derive(Debug, Clone, PartialEq)]
pub struct PatchTicket {
    session: SessionId,
    field: String,
    value: Value,
}

impl PatchTicket {
    /// Session the patch belongs to
    #[inline]
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Attribute to update
    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// New value (`null` clears the attribute)
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Result of a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Server accepted; field shows the authoritative value
    Saved,
    /// Server or transport rejected; field left open in `Error`
    Rejected(PatchError),
}

impl ConfirmOutcome {
    /// Check if saved
    #[inline]
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

/// Edit representation of a field
#[derive(Debug, Clone, PartialEq)]
pub struct EditorView<'a> {
    /// Current state (`Editing`, `Saving` or `Error`)
    pub state: FieldState,
    /// Selected reference of a reference field
    pub selection: Option<&'a RefValue>,
    /// Rendered label of the selection
    pub selection_label: Option<String>,
    /// Pending text of a free-form field
    pub text: Option<&'a str>,
    /// Candidates offered by autocomplete
    pub candidates: &'a [RefValue],
    /// Whether the save affordance is enabled
    pub can_save: bool,
    /// Error of the last failed save
    pub error: Option<&'a PatchError>,
}

/// What a field shows right now
#[derive(Debug, Clone, PartialEq)]
pub enum FieldView<'a> {
    /// Display representation
    Display(DisplayValue),
    /// Edit representation
    Editor(EditorView<'a>),
}

/// One editable field
#[derive(Debug)]
pub struct FieldWidget {
    descriptor: FieldDescriptor,
    state: FieldState,
    session: Option<EditSession>,
    last_error: Option<PatchError>,
    min_query_len: usize,
}

impl FieldWidget {
    /// Create widget in `Display`
    #[must_use]
    pub fn new(descriptor: FieldDescriptor, min_query_len: usize) -> Self {
        Self {
            descriptor,
            state: FieldState::Display,
            session: None,
            last_error: None,
            min_query_len,
        }
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Current descriptor
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// Lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> FieldState {
        self.state
    }

    /// Open edit session
    #[inline]
    #[must_use]
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Autocomplete binding of the open session
    #[inline]
    #[must_use]
    pub fn binding(&self) -> Option<&AutocompleteBinding> {
        self.session.as_ref().and_then(EditSession::binding)
    }

    /// Error of the last failed save, kept until the next save or cancel
    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&PatchError> {
        self.last_error.as_ref()
    }

    fn invalid(&self, action: FieldAction) -> FieldError {
        FieldError::InvalidTransition {
            field: self.name().to_string(),
            state: self.state,
            action,
        }
    }

    fn session_for_input(&mut self) -> Result<&mut EditSession, FieldError> {
        if !matches!(self.state, FieldState::Editing | FieldState::Error) {
            return Err(self.invalid(FieldAction::Input));
        }
        let name = self.descriptor.name();
        self.session.as_mut().ok_or_else(|| FieldError::InvalidTransition {
            field: name.to_string(),
            state: FieldState::Display,
            action: FieldAction::Input,
        })
    }

    fn binding_for_input(&mut self) -> Result<&mut AutocompleteBinding, FieldError> {
        if !self.descriptor.is_reference() {
            return Err(FieldError::NotReferenceField(self.name().to_string()));
        }
        let name = self.name().to_string();
        self.session_for_input()?
            .binding_mut()
            .ok_or(FieldError::NotReferenceField(name))
    }

    /// User made a change: mark dirty and leave `Error`
    fn after_change(&mut self, changed: bool) {
        if !changed {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.mark_dirty();
        }
        if self.state == FieldState::Error {
            debug!(field = %self.name(), "editing resumed after failed save");
            self.state = FieldState::Editing;
        }
    }

    /// Open the editor
    ///
    /// From `Display`, opens a session seeded with the current value and, for
    /// reference fields, activates autocomplete with the current value
    /// pre-selected. Repeated calls while the editor is open keep the existing
    /// session and binding; from `Error` this resumes `Editing`.
    ///
    /// # Errors
    /// - `FieldError::InvalidTransition` while `Saving`
    pub fn begin_edit(&mut self) -> Result<(), FieldError> {
        match self.state {
            FieldState::Display => {
                let session = EditSession::open(&self.descriptor, self.min_query_len);
                debug!(field = %self.name(), session = %session.id(), "edit session opened");
                self.session = Some(session);
                self.state = FieldState::Editing;
                Ok(())
            }
            FieldState::Editing => {
                debug!(field = %self.name(), "editor already open");
                Ok(())
            }
            FieldState::Error => {
                debug!(field = %self.name(), "editing resumed after failed save");
                self.state = FieldState::Editing;
                Ok(())
            }
            FieldState::Saving => Err(self.invalid(FieldAction::BeginEdit)),
        }
    }

    /// Register an autocomplete keystroke
    ///
    /// # Returns
    /// The ticket of the search to issue, or `None` for short queries
    ///
    /// # Errors
    /// - `FieldError::NotReferenceField` for free-form fields
    /// - `FieldError::InvalidTransition` when the editor is not accepting input
    pub fn begin_query(&mut self, query: &str) -> Result<Option<SearchTicket>, FieldError> {
        Ok(self.binding_for_input()?.begin_query(query))
    }

    /// Apply a search response
    ///
    /// Responses for a closed or replaced session are stale, not errors.
    ///
    /// # Errors
    /// - `FieldError::NotReferenceField` for free-form fields
    pub fn complete_query(
        &mut self,
        ticket: &SearchTicket,
        result: Result<Vec<RefValue>, SearchError>,
    ) -> Result<ApplyOutcome, FieldError> {
        if !self.descriptor.is_reference() {
            return Err(FieldError::NotReferenceField(self.name().to_string()));
        }
        let binding = self
            .session
            .as_mut()
            .filter(|s| s.id() == ticket.session())
            .and_then(EditSession::binding_mut);
        Ok(match binding {
            Some(binding) => binding.apply_results(ticket, result),
            None => ApplyOutcome::Stale,
        })
    }

    /// Run one keystroke end to end against a source
    ///
    /// # Errors
    /// Same as [`FieldWidget::begin_query`]
    pub async fn search(
        &mut self,
        query: &str,
        source: &AutocompleteSource,
    ) -> Result<ApplyOutcome, FieldError> {
        Ok(self.binding_for_input()?.search(query, source).await)
    }

    /// Select a candidate
    ///
    /// # Errors
    /// - `FieldError::NotReferenceField` for free-form fields
    /// - `FieldError::InvalidTransition` when the editor is not accepting input
    pub fn select(&mut self, candidate: RefValue) -> Result<bool, FieldError> {
        let changed = self.binding_for_input()?.select(candidate);
        self.after_change(changed);
        Ok(changed)
    }

    /// Clear the selection ("no value")
    ///
    /// # Errors
    /// Same as [`FieldWidget::select`]
    pub fn clear_selection(&mut self) -> Result<bool, FieldError> {
        let changed = self.binding_for_input()?.clear();
        self.after_change(changed);
        Ok(changed)
    }

    /// Apply a raw input value to a reference field (parse-or-null)
    ///
    /// # Errors
    /// Same as [`FieldWidget::select`]
    pub fn select_raw(&mut self, raw: &str) -> Result<bool, FieldError> {
        if !self.descriptor.is_reference() {
            return Err(FieldError::NotReferenceField(self.name().to_string()));
        }
        let changed = self.session_for_input()?.set_raw_reference(raw);
        self.after_change(changed);
        Ok(changed)
    }

    /// Replace the pending text of a free-form field
    ///
    /// On a reference field the text is applied as raw input, like
    /// [`FieldWidget::select_raw`].
    ///
    /// # Errors
    /// - `FieldError::InvalidTransition` when the editor is not accepting input
    pub fn set_text(&mut self, text: &str) -> Result<bool, FieldError> {
        if self.descriptor.is_reference() {
            return self.select_raw(text);
        }
        let changed = self.session_for_input()?.set_text(text);
        self.after_change(changed);
        Ok(changed)
    }

    /// Move to `Saving` and return the patch to send
    ///
    /// The pending value is normalized: a reference field sends the selected
    /// identifier or `null`. Whether anything changed is not checked here.
    ///
    /// # Errors
    /// - `FieldError::InvalidTransition` unless `Editing`
    pub fn begin_confirm(&mut self) -> Result<PatchTicket, FieldError> {
        if self.state != FieldState::Editing {
            return Err(self.invalid(FieldAction::Confirm));
        }
        let Some(session) = self.session.as_ref() else {
            return Err(self.invalid(FieldAction::Confirm));
        };
        let ticket = PatchTicket {
            session: session.id(),
            field: self.descriptor.name().to_string(),
            value: session.candidate(),
        };
        debug!(field = %ticket.field, session = %ticket.session, value = %ticket.value, "saving field");
        self.state = FieldState::Saving;
        Ok(ticket)
    }

    /// Settle an outstanding patch
    ///
    /// On success the descriptor is replaced from the returned record, the
    /// session and binding are destroyed and the field returns to `Display`.
    /// On failure the session and binding stay intact and the field moves to
    /// `Error`.
    ///
    /// # Errors
    /// - `FieldError::InvalidTransition` unless `Saving`
    /// - `FieldError::StaleCompletion` if the ticket belongs to another session
    pub fn complete_confirm(
        &mut self,
        ticket: &PatchTicket,
        result: Result<Record, PatchError>,
    ) -> Result<ConfirmOutcome, FieldError> {
        if self.state != FieldState::Saving {
            return Err(self.invalid(FieldAction::CompleteConfirm));
        }
        if self.session.as_ref().map(EditSession::id) != Some(ticket.session) {
            return Err(FieldError::StaleCompletion(self.name().to_string()));
        }

        match result {
            Ok(record) => {
                self.descriptor = self.descriptor.refreshed_from(&record);
                if let Some(mut session) = self.session.take() {
                    session.close();
                }
                self.last_error = None;
                self.state = FieldState::Display;
                info!(field = %self.name(), "field saved");
                Ok(ConfirmOutcome::Saved)
            }
            Err(err) => {
                warn!(field = %self.name(), error = %err, "field save failed; editor left open");
                self.last_error = Some(err.clone());
                self.state = FieldState::Error;
                Ok(ConfirmOutcome::Rejected(err))
            }
        }
    }

    /// Save the pending value through a patcher
    ///
    /// # Errors
    /// Same as [`FieldWidget::begin_confirm`]
    pub async fn confirm(
        &mut self,
        patcher: &RecordPatcher,
        context: &RequestContext,
    ) -> Result<ConfirmOutcome, FieldError> {
        let ticket = self.begin_confirm()?;
        let result = patcher
            .patch(
                context.record_id(),
                ticket.field(),
                ticket.value().clone(),
                context.token(),
            )
            .await;
        self.complete_confirm(&ticket, result)
    }

    /// Close the editor without contacting the server
    ///
    /// # Errors
    /// - `FieldError::InvalidTransition` unless `Editing` or `Error`
    pub fn cancel(&mut self) -> Result<(), FieldError> {
        if !matches!(self.state, FieldState::Editing | FieldState::Error) {
            return Err(self.invalid(FieldAction::Cancel));
        }
        if let Some(mut session) = self.session.take() {
            debug!(field = %self.name(), session = %session.id(), "edit cancelled");
            session.close();
        }
        self.last_error = None;
        self.state = FieldState::Display;
        Ok(())
    }

    /// Replace the descriptor from an authoritative record
    ///
    /// Only applies in `Display`; descriptors are fixed while a session is open.
    ///
    /// # Returns
    /// `true` if the descriptor was replaced
    pub fn refresh(&mut self, record: &Record) -> bool {
        if self.state != FieldState::Display {
            debug!(field = %self.name(), state = ?self.state, "refresh skipped during edit");
            return false;
        }
        self.descriptor = self.descriptor.refreshed_from(record);
        true
    }

    /// Display representation of the confirmed value
    #[inline]
    #[must_use]
    pub fn display_value(&self) -> DisplayValue {
        self.descriptor.render()
    }

    /// What the field shows right now
    ///
    /// Never mixes the confirmed value with the pending one.
    #[must_use]
    pub fn view(&self) -> FieldView<'_> {
        let Some(session) = self.session.as_ref().filter(|_| self.state.shows_editor()) else {
            return FieldView::Display(self.display_value());
        };
        let binding = session.binding();
        let selection = binding.and_then(AutocompleteBinding::selected);
        FieldView::Editor(EditorView {
            state: self.state,
            selection,
            selection_label: selection
                .zip(binding)
                .map(|(r, b)| b.config().render(r)),
            text: binding.is_none().then(|| session.text()),
            candidates: binding.map(AutocompleteBinding::candidates).unwrap_or(&[]),
            can_save: self.state == FieldState::Editing && session.is_dirty(),
            error: self.last_error.as_ref(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_model::{AutocompleteConfig, FieldValue};
    use pw_remote::TransportError;
    use serde_json::json;

    fn reviewer(current: Option<RefValue>) -> FieldWidget {
        let mut descriptor =
            FieldDescriptor::reference("reviewer", AutocompleteConfig::new("/complete_user", "name"));
        if let Some(r) = current {
            descriptor = descriptor.with_value(FieldValue::Reference(r));
        }
        FieldWidget::new(descriptor, 3)
    }

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn begin_edit_then_cancel_restores_display() {
        let mut field = reviewer(Some(RefValue::new(7, "Alice")));
        field.begin_edit().unwrap();
        assert_eq!(field.state(), FieldState::Editing);
        assert!(field.binding().unwrap().is_active());

        field.cancel().unwrap();
        assert_eq!(field.state(), FieldState::Display);
        assert!(field.session().is_none());
        assert_eq!(field.descriptor().current(), Some(&FieldValue::Reference(RefValue::new(7, "Alice"))));
        assert_eq!(field.view(), FieldView::Display(DisplayValue::Text("Alice".into())));
    }

    #[test]
    fn repeated_begin_edit_keeps_one_binding() {
        let mut field = reviewer(None);
        field.begin_edit().unwrap();
        let first = field.session().unwrap().id();
        field.select(RefValue::new(7, "Alice")).unwrap();

        field.begin_edit().unwrap();
        assert_eq!(field.session().unwrap().id(), first);
        assert_eq!(field.binding().unwrap().selected().map(|r| r.id), Some(7));
    }

    #[test]
    fn save_affordance_requires_a_change() {
        let mut field = reviewer(None);
        field.begin_edit().unwrap();
        let FieldView::Editor(view) = field.view() else { panic!("expected editor") };
        assert!(!view.can_save);

        field.select(RefValue::new(7, "Alice")).unwrap();
        let FieldView::Editor(view) = field.view() else { panic!("expected editor") };
        assert!(view.can_save);
        assert_eq!(view.selection_label.as_deref(), Some("Alice"));
    }

    #[test]
    fn confirm_unmodified_field_is_still_allowed() {
        let mut field = reviewer(Some(RefValue::new(7, "Alice")));
        field.begin_edit().unwrap();
        let ticket = field.begin_confirm().unwrap();
        assert_eq!(ticket.value(), &json!(7));
        assert_eq!(field.state(), FieldState::Saving);
    }

    #[test]
    fn success_uses_server_value_not_candidate() {
        let mut field = reviewer(None);
        field.begin_edit().unwrap();
        field.select(RefValue::new(7, "Alice")).unwrap();
        let ticket = field.begin_confirm().unwrap();

        // server normalized the label
        let outcome = field
            .complete_confirm(&ticket, Ok(record(json!({"reviewer": {"pk": 7, "name": "Alice Smith"}}))))
            .unwrap();

        assert_eq!(outcome, ConfirmOutcome::Saved);
        assert_eq!(field.state(), FieldState::Display);
        assert!(field.session().is_none());
        assert_eq!(field.view(), FieldView::Display(DisplayValue::Text("Alice Smith".into())));
    }

    #[test]
    fn failure_keeps_editor_and_selection() {
        let mut field = reviewer(None);
        field.begin_edit().unwrap();
        field.select(RefValue::new(7, "Alice")).unwrap();
        let ticket = field.begin_confirm().unwrap();

        let err = PatchError::Status { status: 403, body: "forbidden".into() };
        let outcome = field.complete_confirm(&ticket, Err(err.clone())).unwrap();

        assert_eq!(outcome, ConfirmOutcome::Rejected(err.clone()));
        assert_eq!(field.state(), FieldState::Error);
        assert_eq!(field.last_error(), Some(&err));
        assert!(field.binding().unwrap().is_active());
        assert_eq!(field.binding().unwrap().selected().map(|r| r.id), Some(7));
        assert!(field.descriptor().current().is_none());

        let FieldView::Editor(view) = field.view() else { panic!("expected editor") };
        assert_eq!(view.state, FieldState::Error);
        assert_eq!(view.error, Some(&err));
        assert!(!view.can_save);
    }

    #[test]
    fn error_requires_reentry_before_resubmit() {
        let mut field = reviewer(None);
        field.begin_edit().unwrap();
        field.select(RefValue::new(7, "Alice")).unwrap();
        let ticket = field.begin_confirm().unwrap();
        field
            .complete_confirm(&ticket, Err(PatchError::Transport(TransportError::Timeout)))
            .unwrap();

        assert!(field.begin_confirm().unwrap_err().is_invalid_transition());

        field.begin_edit().unwrap();
        assert_eq!(field.state(), FieldState::Editing);
        let retry = field.begin_confirm().unwrap();
        assert_eq!(retry.value(), &json!(7));
        assert_eq!(retry.session(), ticket.session());
    }

    #[test]
    fn changing_selection_leaves_error() {
        let mut field = reviewer(None);
        field.begin_edit().unwrap();
        field.select(RefValue::new(7, "Alice")).unwrap();
        let ticket = field.begin_confirm().unwrap();
        field
            .complete_confirm(&ticket, Err(PatchError::Transport(TransportError::Timeout)))
            .unwrap();

        assert!(field.select(RefValue::new(8, "Alicia")).unwrap());
        assert_eq!(field.state(), FieldState::Editing);
    }

    #[test]
    fn cancel_rejected_while_saving() {
        let mut field = reviewer(None);
        field.begin_edit().unwrap();
        field.begin_confirm().unwrap();

        let err = field.cancel().unwrap_err();
        assert!(matches!(
            err,
            FieldError::InvalidTransition { state: FieldState::Saving, action: FieldAction::Cancel, .. }
        ));
        assert!(field.begin_edit().is_err());
        assert!(field.select(RefValue::bare(1)).is_err());
    }

    #[test]
    fn cancel_rejected_in_display() {
        let mut field = reviewer(None);
        assert!(field.cancel().unwrap_err().is_invalid_transition());
    }

    #[test]
    fn cancel_from_error_discards_session() {
        let mut field = reviewer(None);
        field.begin_edit().unwrap();
        let ticket = field.begin_confirm().unwrap();
        field
            .complete_confirm(&ticket, Err(PatchError::Transport(TransportError::Timeout)))
            .unwrap();

        field.cancel().unwrap();
        assert_eq!(field.state(), FieldState::Display);
        assert!(field.last_error().is_none());
        assert!(field.binding().is_none());
    }

    #[test]
    fn completion_from_old_session_is_rejected() {
        let mut field = reviewer(None);
        field.begin_edit().unwrap();
        let stale = field.begin_confirm().unwrap();
        field
            .complete_confirm(&stale, Err(PatchError::Transport(TransportError::Timeout)))
            .unwrap();
        field.cancel().unwrap();

        field.begin_edit().unwrap();
        field.begin_confirm().unwrap();
        assert_eq!(
            field.complete_confirm(&stale, Ok(record(json!({"reviewer": null})))),
            Err(FieldError::StaleCompletion("reviewer".into()))
        );
        assert_eq!(field.state(), FieldState::Saving);
    }

    #[test]
    fn search_response_after_cancel_is_stale() {
        let mut field = reviewer(None);
        field.begin_edit().unwrap();
        let ticket = field.begin_query("alice").unwrap().unwrap();
        field.cancel().unwrap();

        let outcome = field
            .complete_query(&ticket, Ok(vec![RefValue::new(7, "Alice")]))
            .unwrap();
        assert_eq!(outcome, ApplyOutcome::Stale);
    }

    #[test]
    fn text_field_rejects_autocomplete_operations() {
        let mut field = FieldWidget::new(FieldDescriptor::text("name"), 3);
        field.begin_edit().unwrap();
        assert_eq!(
            field.begin_query("abc"),
            Err(FieldError::NotReferenceField("name".into()))
        );
        assert!(field.binding().is_none());

        assert!(field.set_text("new name").unwrap());
        let ticket = field.begin_confirm().unwrap();
        assert_eq!(ticket.value(), &json!("new name"));
    }

    #[test]
    fn text_input_on_reference_field_is_raw_selection() {
        let mut field = reviewer(Some(RefValue::new(7, "Alice")));
        field.begin_edit().unwrap();

        assert!(!field.set_text("7").unwrap());
        let FieldView::Editor(view) = field.view() else { panic!("expected editor") };
        assert!(!view.can_save);
        assert_eq!(view.selection.map(|r| r.id), Some(7));

        assert!(field.set_text("8").unwrap());
        assert_eq!(field.begin_confirm().unwrap().value(), &json!(8));
    }

    #[test]
    fn refresh_skipped_while_editing() {
        let mut field = reviewer(None);
        field.begin_edit().unwrap();
        assert!(!field.refresh(&record(json!({"reviewer": 7}))));
        assert!(field.descriptor().current().is_none());

        field.cancel().unwrap();
        assert!(field.refresh(&record(json!({"reviewer": 7}))));
        assert_eq!(field.display_value(), DisplayValue::Text("7".into()));
    }
}
