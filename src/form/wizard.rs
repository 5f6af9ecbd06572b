//! Multi-step controller of the business form
use failure::Error as FailureError;
use validator::Validate;

use super::draft::BusinessDraft;
use super::fields::{render, validate_attributes, AttributeField};
use super::images::{ingest, ImageFile, ImageLimits, ImageRejection};
use super::steps::FormStep;
use super::store::AttributeStore;
use super::submission::{normalize, BusinessDispatcher};
use super::FormError;
use errors::{error_chain_message, field_errors_of};
use models::{AttributeId, AttributeValue, Business, BusinessId, BusinessPayload, CategorySchema, FieldErrors, SubcategoryId};
use services::types::ServiceFuture;

/// Shown when a submission fails for a reason the owner cannot fix in the form
pub const SUBMISSION_FAILED_NOTICE: &str = "Something went wrong while saving the business, please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardPhase {
    Editing(FormStep),
    Submitting,
    Submitted,
}

/// Result of a submit attempt
pub enum SubmitOutcome {
    /// A submission is already in flight, nothing was dispatched
    Busy,
    AlreadySubmitted,
    NotOnLastStep,
    Invalid(FieldErrors),
    /// Payload was handed to the dispatcher, feed the result to `complete_submission`
    Dispatched(ServiceFuture<Business>),
}

impl SubmitOutcome {
    pub fn into_future(self) -> Option<ServiceFuture<Business>> {
        match self {
            SubmitOutcome::Dispatched(future) => Some(future),
            _ => None,
        }
    }

    pub fn is_dispatched(&self) -> bool {
        match *self {
            SubmitOutcome::Dispatched(_) => true,
            _ => false,
        }
    }
}

/// Business form state: the step, the draft, the attribute store of the
/// selected category and the errors of the last validation
#[derive(Default)]
pub struct Wizard {
    step: FormStep,
    draft: BusinessDraft,
    schema: Option<CategorySchema>,
    schema_error: Option<String>,
    attributes: AttributeStore,
    errors: FieldErrors,
    notice: Option<String>,
    editing: Option<BusinessId>,
    busy: bool,
    submitted: Option<Business>,
}

impl Wizard {
    pub fn new() -> Self {
        Wizard::default()
    }

    /// Form pre-populated with an existing business, submit dispatches an update
    pub fn for_edit(business: &Business, schema: CategorySchema) -> Self {
        let mut wizard = Wizard::new();
        wizard.draft = BusinessDraft::from(business);
        wizard.editing = Some(business.id);
        wizard.bind_schema(schema);
        wizard
            .attributes
            .load(business.attributes.iter().map(|attribute| (attribute.attribute_id, &attribute.value)));
        wizard
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn phase(&self) -> WizardPhase {
        if self.busy {
            WizardPhase::Submitting
        } else if self.submitted.is_some() {
            WizardPhase::Submitted
        } else {
            WizardPhase::Editing(self.step)
        }
    }

    pub fn draft(&self) -> &BusinessDraft {
        &self.draft
    }

    /// Plain business fields, category and attributes are changed through the wizard
    pub fn draft_mut(&mut self) -> Result<&mut BusinessDraft, FormError> {
        self.ensure_editable()?;
        Ok(&mut self.draft)
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn schema(&self) -> Option<&CategorySchema> {
        self.schema.as_ref()
    }

    pub fn schema_error(&self) -> Option<&str> {
        self.schema_error.as_ref().map(|message| message.as_str())
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|message| message.as_str())
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The form is frozen while a submission is in flight and after it succeeded
    fn ensure_editable(&self) -> Result<(), FormError> {
        if self.busy {
            Err(FormError::Busy)
        } else if self.submitted.is_some() {
            Err(FormError::Submitted)
        } else {
            Ok(())
        }
    }

    pub fn editing(&self) -> Option<BusinessId> {
        self.editing
    }

    pub fn submitted(&self) -> Option<&Business> {
        self.submitted.as_ref()
    }

    /// Attribute fields of the selected category, empty until a schema is loaded
    pub fn fields(&self) -> Vec<AttributeField> {
        match self.schema {
            Some(ref schema) => render(schema, &self.attributes),
            None => vec![],
        }
    }

    /// Binds the form to a freshly loaded category schema. The attribute store is
    /// rebuilt, a subcategory of another category is cleared, other fields stay.
    pub fn select_category(&mut self, schema: CategorySchema) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.bind_schema(schema);
        Ok(())
    }

    fn bind_schema(&mut self, schema: CategorySchema) {
        let mut attributes = AttributeStore::from(&schema);
        let same_category = self
            .schema
            .as_ref()
            .map(|current| current.category_id() == schema.category_id())
            .unwrap_or(false);
        if same_category {
            for (definition, value) in self.attributes.values() {
                if let Err(e) = attributes.set(definition.id, value) {
                    debug!("Value of attribute {} dropped on schema reload: {}", definition.id, e);
                }
            }
        }
        if let Some(subcategory_id) = self.draft.subcategory_id {
            if !schema.has_subcategory(subcategory_id) {
                self.draft.subcategory_id = None;
            }
        }
        self.draft.category_id = Some(schema.category_id());
        self.attributes = attributes;
        self.schema = Some(schema);
        self.schema_error = None;
    }

    /// Records a failed schema fetch, the category step stays blocked until a schema loads
    pub fn schema_failed<S: Into<String>>(&mut self, message: S) -> Result<(), FormError> {
        self.ensure_editable()?;
        let message = message.into();
        warn!("Category schema is not available: {}", message);
        self.draft.category_id = None;
        self.draft.subcategory_id = None;
        self.attributes = AttributeStore::default();
        self.schema = None;
        self.schema_error = Some(message);
        Ok(())
    }

    /// Applies the result of `CategorySchemaProvider::category_schema`
    pub fn apply_schema(&mut self, result: Result<CategorySchema, FailureError>) -> Result<(), FormError> {
        match result {
            Ok(schema) => self.select_category(schema),
            Err(e) => self.schema_failed(error_chain_message(&e)),
        }
    }

    pub fn select_subcategory(&mut self, subcategory_id: Option<SubcategoryId>) -> Result<(), FormError> {
        self.ensure_editable()?;
        if let Some(subcategory_id) = subcategory_id {
            let known = self
                .schema
                .as_ref()
                .map(|schema| schema.has_subcategory(subcategory_id))
                .unwrap_or(false);
            if !known {
                return Err(FormError::UnknownSubcategory);
            }
        }
        self.draft.subcategory_id = subcategory_id;
        Ok(())
    }

    pub fn set_attribute(&mut self, attribute_id: AttributeId, value: AttributeValue) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.attributes.set(attribute_id, value)
    }

    pub fn set_attribute_input(&mut self, attribute_id: AttributeId, raw: &str) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.attributes.set_input(attribute_id, raw)
    }

    pub fn toggle_attribute_option(&mut self, attribute_id: AttributeId, option: &str) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.attributes.toggle_option(attribute_id, option)
    }

    /// Appends accepted images to the draft and returns notices of rejected files
    pub fn add_images(&mut self, files: Vec<ImageFile>) -> Result<Vec<ImageRejection>, FormError> {
        self.ensure_editable()?;
        let report = ingest(files, self.draft.images.len(), &ImageLimits::default());
        self.draft.images.extend(report.accepted);
        Ok(report.rejected)
    }

    pub fn remove_image(&mut self, index: usize) -> Result<Option<String>, FormError> {
        self.ensure_editable()?;
        if index < self.draft.images.len() {
            Ok(Some(self.draft.images.remove(index)))
        } else {
            Ok(None)
        }
    }

    /// Normalized payload of the current state
    pub fn payload(&self) -> BusinessPayload {
        normalize(&self.draft, &self.attributes)
    }

    fn validate_category(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(ref message) = self.schema_error {
            errors.add("category_id", "schema", message.as_str());
            return errors;
        }
        let category_id = match self.draft.category_id {
            Some(category_id) => category_id,
            None => {
                errors.add("category_id", "required", "Please select a category");
                return errors;
            }
        };
        let schema = match self.schema {
            Some(ref schema) if schema.category_id() == category_id => schema,
            _ => {
                errors.add("category_id", "schema", "Category details are not loaded yet");
                return errors;
            }
        };
        if let Some(subcategory_id) = self.draft.subcategory_id {
            if !schema.has_subcategory(subcategory_id) {
                errors.add("subcategory_id", "invalid", "Subcategory does not belong to the selected category");
            }
        }
        errors.merge(validate_attributes(schema, &self.attributes));
        errors
    }

    fn validate_fields(&self) -> FieldErrors {
        self.payload().validate().err().map(FieldErrors::from).unwrap_or_default()
    }

    /// Errors of the fields edited on `step`
    pub fn validate_step(&self, step: FormStep) -> FieldErrors {
        let mut errors = self.validate_fields();
        errors.retain_fields(step.fields());
        if step.has_attributes() {
            errors.merge(self.validate_category());
        }
        errors
    }

    /// Errors of the whole form
    pub fn validate(&self) -> FieldErrors {
        let mut errors = self.validate_fields();
        errors.merge(self.validate_category());
        errors
    }

    /// Moves forward when the active step is valid, errors of the step are
    /// kept in `errors`. On the last step the form has to be submitted instead.
    pub fn next(&mut self) -> Result<FormStep, FormError> {
        self.ensure_editable()?;
        let errors = self.validate_step(self.step);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(FormError::Invalid(errors));
        }
        self.errors = FieldErrors::new();
        let step = self.step.next().ok_or(FormError::LastStep)?;
        self.step = step;
        Ok(step)
    }

    pub fn back(&mut self) -> Result<FormStep, FormError> {
        self.ensure_editable()?;
        let step = self.step.previous().ok_or(FormError::NoPreviousStep)?;
        self.step = step;
        self.errors = FieldErrors::new();
        Ok(step)
    }

    /// Validates the whole form and dispatches it, creating a business or
    /// updating the one being edited
    pub fn submit<D: BusinessDispatcher + ?Sized>(&mut self, dispatcher: &D) -> SubmitOutcome {
        if self.busy {
            return SubmitOutcome::Busy;
        }
        if self.submitted.is_some() {
            return SubmitOutcome::AlreadySubmitted;
        }
        if !self.step.is_last() {
            return SubmitOutcome::NotOnLastStep;
        }
        let errors = self.validate();
        if !errors.is_empty() {
            debug!("Business form is invalid: {}", errors);
            self.errors = errors.clone();
            return SubmitOutcome::Invalid(errors);
        }
        self.errors = FieldErrors::new();
        self.notice = None;
        let payload = self.payload();
        self.busy = true;
        let future = match self.editing {
            Some(business_id) => dispatcher.update_business(business_id, payload),
            None => dispatcher.create_business(payload),
        };
        SubmitOutcome::Dispatched(future)
    }

    /// Takes the result of a dispatched submission. Validation failures are
    /// shown on the fields, anything else as a notice, the form stays editable.
    pub fn complete_submission(&mut self, result: Result<Business, FailureError>) -> WizardPhase {
        if !self.busy {
            warn!("Submission result received while no submission is in flight");
            return self.phase();
        }
        self.busy = false;
        match result {
            Ok(business) => {
                self.editing = Some(business.id);
                self.submitted = Some(business);
            }
            Err(e) => match field_errors_of(&e) {
                Some(errors) => self.errors = errors,
                None => {
                    error!("Business submission failed: {}", error_chain_message(&e));
                    self.notice = Some(SUBMISSION_FAILED_NOTICE.to_string());
                }
            },
        }
        self.phase()
    }
}
