use serde::{Deserialize, Serialize};

use sim_schema::{string_ids, CompanyId, ExpenditureType, Pos3, StringId};

use crate::outcome::Failed;

/// Per-dispatch side channel written by handlers and read back by the
/// presentation bridge after the call returns.
///
/// A fresh context is created for every dispatch; it is never ambient state
/// and never survives the call that produced it.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    company: CompanyId,
    expenditure: ExpenditureType,
    position: Option<Pos3>,
    error_title: StringId,
    error_text: StringId,
    error_company: Option<CompanyId>,
}

impl ExecutionContext {
    pub fn new(company: CompanyId) -> Self {
        Self {
            company,
            expenditure: ExpenditureType::Miscellaneous,
            position: None,
            error_title: string_ids::CANNOT_PERFORM_ACTION,
            error_text: string_ids::EMPTY,
            error_company: None,
        }
    }

    /// The company on whose behalf the current command runs.
    pub fn company(&self) -> CompanyId {
        self.company
    }

    pub fn expenditure(&self) -> ExpenditureType {
        self.expenditure
    }

    pub fn set_expenditure(&mut self, category: ExpenditureType) {
        self.expenditure = category;
    }

    pub fn set_position(&mut self, pos: Pos3) {
        self.position = Some(pos);
    }

    pub fn set_error_title(&mut self, title: StringId) {
        self.error_title = title;
    }

    /// Record the failure reason and hand back the sentinel for `return`.
    pub fn failure(&mut self, text: StringId) -> Failed {
        self.error_text = text;
        Failed
    }

    /// Ownership gate: a company may act on its own property and on neutral
    /// property; anything else fails with a competitor-aware error record.
    pub fn check_authority(&mut self, owner: CompanyId) -> Result<(), Failed> {
        if owner.is_neutral() || self.company.is_neutral() || self.company == owner {
            return Ok(());
        }
        self.error_company = Some(owner);
        Err(self.failure(string_ids::BELONGS_TO_ANOTHER_COMPANY))
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            expenditure: self.expenditure,
            position: self.position,
            error_title: self.error_title,
            error_text: self.error_text,
            error_company: self.error_company,
        }
    }
}

/// The observable result of one dispatch's context, handed to the caller
/// alongside the outcome. After a successful dispatch the error fields are
/// unspecified and must not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub expenditure: ExpenditureType,
    /// Where the command took effect, for viewport invalidation.
    pub position: Option<Pos3>,
    pub error_title: StringId,
    pub error_text: StringId,
    /// Competitor that owns the obstacle, when the failure was an ownership
    /// clash.
    pub error_company: Option<CompanyId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_has_default_title_and_category() {
        let ctx = ExecutionContext::new(CompanyId(2));
        let snap = ctx.snapshot();
        assert_eq!(snap.expenditure, ExpenditureType::Miscellaneous);
        assert_eq!(snap.error_title, string_ids::CANNOT_PERFORM_ACTION);
        assert_eq!(snap.error_text, string_ids::EMPTY);
        assert_eq!(snap.position, None);
    }

    #[test]
    fn authority_allows_self_and_neutral() {
        let mut ctx = ExecutionContext::new(CompanyId(1));
        assert!(ctx.check_authority(CompanyId(1)).is_ok());
        assert!(ctx.check_authority(CompanyId::NEUTRAL).is_ok());
    }

    #[test]
    fn authority_records_the_competitor() {
        let mut ctx = ExecutionContext::new(CompanyId(1));
        assert!(ctx.check_authority(CompanyId(4)).is_err());
        let snap = ctx.snapshot();
        assert_eq!(snap.error_text, string_ids::BELONGS_TO_ANOTHER_COMPANY);
        assert_eq!(snap.error_company, Some(CompanyId(4)));
    }
}
