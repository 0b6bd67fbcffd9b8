use std::sync::Arc;

use tracing::{debug, info, warn};

use super::codec::{ParseError, PositionCodec};
use super::domain::{ImportRow, Position, PositionFilter, PositionId};
use super::import::{ImportOutcome, ImportValidator, ValidationReport};
use super::masking::{ApplicantMasker, PrivacyMasker};
use super::store::{PositionStore, StoreError, UnitOfWork};

/// Codec and masking settings shared by every registry operation.
#[derive(Debug, Clone, Default)]
pub struct RegistrySettings {
    pub codec: PositionCodec,
    pub masker: PrivacyMasker,
}

/// Service composing the codec, import validator and masker over an injected store.
pub struct RegistryService<S> {
    store: Arc<S>,
    codec: PositionCodec,
    validator: ImportValidator,
    masker: Arc<dyn ApplicantMasker>,
}

impl<S> RegistryService<S>
where
    S: PositionStore + 'static,
{
    pub fn new(store: Arc<S>, settings: RegistrySettings) -> Self {
        let validator = ImportValidator::new(settings.codec.clone());
        Self {
            store,
            codec: settings.codec,
            validator,
            masker: Arc::new(settings.masker),
        }
    }

    /// Replace the applicant masker used on the listing path.
    pub fn with_masker(mut self, masker: Arc<dyn ApplicantMasker>) -> Self {
        self.masker = masker;
        self
    }

    pub fn codec(&self) -> &PositionCodec {
        &self.codec
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// List positions whose name contains `term`, with applicant names masked.
    ///
    /// A blank term lists everything. Masking is applied per record; a record
    /// that fails to mask keeps its name and the listing continues.
    pub fn search(&self, term: Option<&str>) -> Result<Vec<Position>, RegistryError> {
        let filter = match term {
            Some(term) if !term.trim().is_empty() => PositionFilter::name_contains(term),
            _ => PositionFilter::default(),
        };

        let mut positions = self.store.get_all(&filter)?;
        for position in &mut positions {
            match self.masker.mask(position.applicant_name.as_deref()) {
                Ok(masked) => position.applicant_name = masked,
                Err(error) => {
                    warn!(position_id = %position.id, %error, "leaving applicant name unmasked");
                }
            }
        }

        debug!(
            filter = ?filter.name_contains,
            results = positions.len(),
            "position search"
        );
        Ok(positions)
    }

    pub fn delete(&self, id: PositionId) -> Result<(), RegistryError> {
        let target = self.store.get(id)?.ok_or(RegistryError::NotFound(id))?;

        let mut uow = UnitOfWork::new(self.store.as_ref());
        uow.remove(target.id);
        uow.save()?;

        info!(position_id = %id, code = %target.position_code, "position deleted");
        Ok(())
    }

    /// Delete the listed positions; ids that do not exist are skipped.
    pub fn delete_many(&self, ids: &[PositionId]) -> Result<usize, RegistryError> {
        let mut uow = UnitOfWork::new(self.store.as_ref());
        for id in ids {
            if let Some(existing) = self.store.get(*id)? {
                uow.remove(existing.id);
            }
        }
        let removed = uow.save()?;

        info!(requested = ids.len(), removed, "positions deleted");
        Ok(removed)
    }

    pub fn delete_all(&self) -> Result<usize, RegistryError> {
        let mut uow = UnitOfWork::new(self.store.as_ref());
        for existing in self.store.get_all(&PositionFilter::default())? {
            uow.remove(existing.id);
        }
        let removed = uow.save()?;

        info!(removed, "registry cleared");
        Ok(removed)
    }

    /// Validate the whole batch and insert it in one commit, or insert nothing.
    pub fn import(&self, rows: Vec<ImportRow>) -> Result<usize, RegistryError> {
        let submitted = rows.len();
        let accepted = match self.validator.validate(rows, self.store.as_ref())? {
            ImportOutcome::Accepted(accepted) => accepted,
            ImportOutcome::Rejected(report) => {
                warn!(
                    submitted,
                    failed_rows = report.rows().count(),
                    violations = report.len(),
                    "import batch rejected"
                );
                return Err(RegistryError::Validation(report));
            }
        };

        let mut uow = UnitOfWork::new(self.store.as_ref());
        uow.add_range(accepted);
        let inserted = uow.save().inspect_err(|error| {
            warn!(submitted, %error, "import batch failed to commit");
        })?;

        info!(inserted, "import batch committed");
        Ok(inserted)
    }

    /// Move `target` to the position described by `display_text`.
    pub fn reassign(
        &self,
        display_text: &str,
        target: PositionId,
    ) -> Result<Position, RegistryError> {
        let coordinates = self.codec.parse(display_text)?;

        if let Some(holder) = self.store.get_by_code(display_text)? {
            if holder.id != target {
                warn!(
                    code = display_text,
                    holder = %holder.id,
                    target = %target,
                    "position code already taken"
                );
                return Err(RegistryError::Conflict {
                    code: display_text.to_string(),
                });
            }
        }

        let mut position = self
            .store
            .get(target)?
            .ok_or(RegistryError::NotFound(target))?;
        let previous = std::mem::take(&mut position.position_code);
        position.relocate(display_text, coordinates);

        let mut uow = UnitOfWork::new(self.store.as_ref());
        uow.update(position.clone());
        uow.save()?;

        info!(
            position_id = %target,
            from = %previous,
            to = %position.position_code,
            "position reassigned"
        );
        Ok(position)
    }
}

/// Error raised by the registry service.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Format(#[from] ParseError),
    #[error("import rejected: {0}")]
    Validation(ValidationReport),
    #[error("position code [{code}] is already in use")]
    Conflict { code: String },
    #[error("position {0} does not exist")]
    NotFound(PositionId),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegistryError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict { code } => Self::Conflict { code },
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}
