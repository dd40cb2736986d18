use fundflow_core::action::ProposalDraft;
use fundflow_core::error::ValidationError;
use fundflow_core::project::Project;
use fundflow_core::types::{Amount, MediaRef, PaymentMethodRef, ProjectId};

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn stage_fields_valid(name: &str, description: &str, funding_amount: Amount) -> bool {
    !blank(name) && !blank(description) && funding_amount > 0
}

/// Validate a project before it is saved.
///
/// Checks (in order):
/// 1. `title` and `overview` are non-empty → else `missing-field`
/// 2. at least one stage, and every stage has a name, a description and a
///    positive funding amount → else `invalid-stage`
///
/// Returns the project unchanged on success. No ordering rule is imposed on
/// stage amounts.
pub fn validate_project(project: Project) -> Result<Project, ValidationError> {
    if blank(&project.title) || blank(&project.overview) {
        return Err(ValidationError::MissingField);
    }
    if project.stages.is_empty()
        || project
            .stages
            .iter()
            .any(|s| !stage_fields_valid(&s.name, &s.description, s.funding_amount))
    {
        return Err(ValidationError::InvalidStage);
    }
    Ok(project)
}

/// Same contract as [`validate_project`] for the "propose a project" form.
pub fn validate_proposal(draft: &ProposalDraft) -> Result<(), ValidationError> {
    if blank(&draft.title) || blank(&draft.overview) {
        return Err(ValidationError::MissingField);
    }
    if draft.stages.is_empty()
        || draft
            .stages
            .iter()
            .any(|s| !stage_fields_valid(&s.name, &s.description, s.funding_amount))
    {
        return Err(ValidationError::InvalidStage);
    }
    Ok(())
}

pub fn validate_contribution(amount: Amount, payment_method: &PaymentMethodRef) -> Result<(), ValidationError> {
    if amount == 0 {
        return Err(ValidationError::InvalidAmount);
    }
    if blank(payment_method.as_str()) {
        return Err(ValidationError::MissingPaymentMethod);
    }
    Ok(())
}

pub fn validate_project_note(text: &str) -> Result<(), ValidationError> {
    if blank(text) {
        return Err(ValidationError::MissingContent);
    }
    Ok(())
}

/// Checked in form order: project, then content, then media.
pub fn validate_status_post(
    project: &ProjectId,
    content: &str,
    media: &[MediaRef],
) -> Result<(), ValidationError> {
    if blank(project.as_str()) {
        return Err(ValidationError::MissingProject);
    }
    if blank(content) {
        return Err(ValidationError::MissingContent);
    }
    if media.is_empty() {
        return Err(ValidationError::MissingMedia);
    }
    Ok(())
}
