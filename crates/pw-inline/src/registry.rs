//! Editable field registry
//!
//! Owns every [`FieldWidget`] of one record view together with the shared
//! request context, patcher and autocomplete source. Fields are addressed by
//! attribute name and kept in registration order.

use crate::binding::{ApplyOutcome, SearchTicket};
use crate::config::EditorConfig;
use crate::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::error::{FieldAction, FieldError};
use crate::widget::{ConfirmOutcome, FieldState, FieldView, FieldWidget, PatchTicket};
use indexmap::IndexMap;
use pw_model::{FieldDescriptor, Record, RefValue, RequestContext};
use pw_remote::{
    AutocompleteSource, ConfigError, RecordPatcher, ReqwestTransport, SearchError, Transport,
};
use std::sync::Arc;
use tracing::{debug, info};

/// User-facing control of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    /// Open the editor
    Edit,
    /// Save the pending value
    Save,
    /// Close the editor without saving
    Cancel,
}

/// Registry of editable fields for one record
#[derive(Debug)]
pub struct EditableFieldRegistry {
    config: Arc<EditorConfig>,
    context: Arc<RequestContext>,
    patcher: RecordPatcher,
    source: AutocompleteSource,
    widgets: IndexMap<String, FieldWidget>,
    diagnostics: DiagnosticLog,
}

impl EditableFieldRegistry {
    /// Create registry over an explicit transport
    #[must_use]
    pub fn new(
        config: EditorConfig,
        context: RequestContext,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let remote = Arc::new(config.remote.clone());
        Self {
            patcher: RecordPatcher::new(Arc::clone(&transport), Arc::clone(&remote)),
            source: AutocompleteSource::new(transport, remote),
            config: Arc::new(config),
            context: Arc::new(context),
            widgets: IndexMap::new(),
            diagnostics: DiagnosticLog::new(),
        }
    }

    /// Create registry talking HTTP
    ///
    /// # Errors
    /// - `ConfigError` if the configuration is invalid or the client cannot be built
    pub fn connect(config: EditorConfig, context: RequestContext) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.remote)?;
        Ok(Self::new(config, context, Arc::new(transport)))
    }

    /// With a custom diagnostics journal
    #[inline]
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticLog) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Register fields, all or none
    ///
    /// A descriptor whose name is already registered replaces that field.
    /// A field with a patch in flight cannot be replaced until it settles.
    ///
    /// # Errors
    /// - `FieldError::Model` if any descriptor is invalid
    /// - `FieldError::InvalidTransition` if a replaced field is `Saving`
    pub fn register<I>(&mut self, descriptors: I) -> Result<usize, FieldError>
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        let descriptors: Vec<_> = descriptors.into_iter().collect();
        for descriptor in &descriptors {
            descriptor.validate()?;
            if let Some(existing) = self.widgets.get(descriptor.name()) {
                if existing.state() == FieldState::Saving {
                    return Err(FieldError::InvalidTransition {
                        field: existing.name().to_string(),
                        state: FieldState::Saving,
                        action: FieldAction::Register,
                    });
                }
            }
        }
        let count = descriptors.len();
        for descriptor in descriptors {
            let name = descriptor.name().to_string();
            debug!(field = %name, reference = descriptor.is_reference(), "field registered");
            self.widgets
                .insert(name, FieldWidget::new(descriptor, self.config.min_query_len));
        }
        Ok(count)
    }

    /// Look up a field
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldWidget> {
        self.widgets.get(name)
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut FieldWidget, FieldError> {
        self.widgets
            .get_mut(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))
    }

    /// Field names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.widgets.keys().map(String::as_str)
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Check if no field is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Editor configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Record identity and credentials
    #[inline]
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Shared autocomplete source
    #[inline]
    #[must_use]
    pub fn source(&self) -> &AutocompleteSource {
        &self.source
    }

    /// Journal of failed searches and saves
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// See [`FieldWidget::begin_edit`]
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub fn begin_edit(&mut self, name: &str) -> Result<(), FieldError> {
        self.field_mut(name)?.begin_edit()
    }

    /// See [`FieldWidget::cancel`]
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub fn cancel(&mut self, name: &str) -> Result<(), FieldError> {
        self.field_mut(name)?.cancel()
    }

    /// See [`FieldWidget::select`]
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub fn select(&mut self, name: &str, candidate: RefValue) -> Result<bool, FieldError> {
        self.field_mut(name)?.select(candidate)
    }

    /// See [`FieldWidget::select_raw`]
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub fn select_raw(&mut self, name: &str, raw: &str) -> Result<bool, FieldError> {
        self.field_mut(name)?.select_raw(raw)
    }

    /// See [`FieldWidget::clear_selection`]
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub fn clear_selection(&mut self, name: &str) -> Result<bool, FieldError> {
        self.field_mut(name)?.clear_selection()
    }

    /// See [`FieldWidget::set_text`]
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub fn set_text(&mut self, name: &str, text: &str) -> Result<bool, FieldError> {
        self.field_mut(name)?.set_text(text)
    }

    /// See [`FieldWidget::begin_query`]
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub fn begin_query(&mut self, name: &str, query: &str) -> Result<Option<SearchTicket>, FieldError> {
        self.field_mut(name)?.begin_query(query)
    }

    /// Apply a search response, journaling failures
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub fn complete_query(
        &mut self,
        name: &str,
        ticket: &SearchTicket,
        result: Result<Vec<RefValue>, SearchError>,
    ) -> Result<ApplyOutcome, FieldError> {
        let outcome = self.field_mut(name)?.complete_query(ticket, result)?;
        self.journal_search(name, &outcome);
        Ok(outcome)
    }

    /// Run one autocomplete keystroke end to end
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub async fn search(&mut self, name: &str, query: &str) -> Result<ApplyOutcome, FieldError> {
        let widget = self
            .widgets
            .get_mut(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;
        let outcome = widget.search(query, &self.source).await?;
        self.journal_search(name, &outcome);
        Ok(outcome)
    }

    fn journal_search(&self, name: &str, outcome: &ApplyOutcome) {
        if let ApplyOutcome::Failed(err) = outcome {
            self.diagnostics
                .record(DiagnosticKind::SearchFailure, name, err.to_string());
        }
    }

    /// See [`FieldWidget::begin_confirm`]
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub fn begin_confirm(&mut self, name: &str) -> Result<PatchTicket, FieldError> {
        self.field_mut(name)?.begin_confirm()
    }

    /// Settle an outstanding patch
    ///
    /// A saved record is authoritative for every attribute it carries, so
    /// the other fields showing their display representation are refreshed
    /// from it as well. Failures are journaled.
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub fn complete_confirm(
        &mut self,
        ticket: &PatchTicket,
        result: Result<Record, pw_remote::PatchError>,
    ) -> Result<ConfirmOutcome, FieldError> {
        let name = ticket.field().to_string();
        let record = result.as_ref().ok().cloned();
        let outcome = self.field_mut(&name)?.complete_confirm(ticket, result)?;

        match (&outcome, record) {
            (ConfirmOutcome::Saved, Some(record)) => {
                let refreshed = self.refresh_except(&record, Some(&name));
                info!(field = %name, refreshed, "record updated");
            }
            (ConfirmOutcome::Rejected(err), _) => {
                self.diagnostics
                    .record(DiagnosticKind::PatchFailure, &name, err.to_string());
            }
            (ConfirmOutcome::Saved, None) => {}
        }
        Ok(outcome)
    }

    /// Save a field's pending value
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub async fn confirm(&mut self, name: &str) -> Result<ConfirmOutcome, FieldError> {
        let ticket = self.begin_confirm(name)?;
        let result = self
            .patcher
            .patch(
                self.context.record_id(),
                ticket.field(),
                ticket.value().clone(),
                self.context.token(),
            )
            .await;
        self.complete_confirm(&ticket, result)
    }

    /// Activate a field control
    ///
    /// Save on a field left in `Error` resubmits the pending value.
    ///
    /// # Returns
    /// The save outcome for [`Affordance::Save`], `None` otherwise
    ///
    /// # Errors
    /// - `FieldError::UnknownField`, or as the widget operation
    pub async fn trigger(
        &mut self,
        name: &str,
        affordance: Affordance,
    ) -> Result<Option<ConfirmOutcome>, FieldError> {
        match affordance {
            Affordance::Edit => self.begin_edit(name).map(|()| None),
            Affordance::Cancel => self.cancel(name).map(|()| None),
            Affordance::Save => {
                if self.field_mut(name)?.state() == FieldState::Error {
                    self.begin_edit(name)?;
                }
                self.confirm(name).await.map(Some)
            }
        }
    }

    /// Refresh every field in `Display` from an authoritative record
    ///
    /// Fields with an open session keep their descriptor.
    ///
    /// # Returns
    /// Number of refreshed fields
    pub fn refresh(&mut self, record: &Record) -> usize {
        self.refresh_except(record, None)
    }

    fn refresh_except(&mut self, record: &Record, skip: Option<&str>) -> usize {
        self.widgets
            .iter_mut()
            .filter(|(name, _)| Some(name.as_str()) != skip)
            .filter(|(name, _)| record.get(name).is_some())
            .map(|(_, widget)| widget.refresh(record))
            .filter(|refreshed| *refreshed)
            .count()
    }

    /// What a field shows right now
    #[must_use]
    pub fn view(&self, name: &str) -> Option<FieldView<'_>> {
        self.widgets.get(name).map(FieldWidget::view)
    }

    /// Display text of a field, using the configured placeholder
    #[must_use]
    pub fn display_text(&self, name: &str) -> Option<String> {
        self.widgets
            .get(name)
            .map(|w| w.display_value().text_or(&self.config.placeholder).to_string())
    }
}
