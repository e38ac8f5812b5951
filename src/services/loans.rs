//! Loan availability and renewal service

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::{
    config::RenewalConfig,
    error::AppResult,
    forms::{self, FieldErrors, FormOutcome},
    models::{
        book_instance::{BookInstanceDetail, LoanFilter, RenewBookForm, RenewalPage},
        pagination::{ListPage, PageObj},
    },
    repository::Repository,
};

pub const LOANS_PER_PAGE: i64 = 10;

pub const RENEWAL_IN_PAST: &str = "Invalid date - renewal in past";

/// Window of acceptable renewal dates, relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPolicy {
    pub proposed_weeks: i64,
    pub max_weeks_ahead: i64,
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        RenewalConfig::default().into()
    }
}

impl From<RenewalConfig> for RenewalPolicy {
    fn from(config: RenewalConfig) -> Self {
        Self {
            proposed_weeks: config.proposed_weeks,
            max_weeks_ahead: config.max_weeks_ahead,
        }
    }
}

impl RenewalPolicy {
    /// Date suggested on a blank renewal form
    pub fn proposed_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::weeks(self.proposed_weeks)
    }

    /// Latest date a renewal may run to (inclusive)
    pub fn latest_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::weeks(self.max_weeks_ahead)
    }

    pub fn help_text(&self) -> String {
        format!(
            "Enter a date between now and {} weeks (default {}).",
            self.max_weeks_ahead, self.proposed_weeks
        )
    }

    pub fn check(&self, date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, String> {
        if date < today {
            return Err(RENEWAL_IN_PAST.to_string());
        }
        if date > self.latest_date(today) {
            return Err(format!(
                "Invalid date - renewal more than {} weeks ahead",
                self.max_weeks_ahead
            ));
        }
        Ok(date)
    }

    /// Parse and check the submitted renewal date
    pub fn clean(&self, form: &RenewBookForm, today: NaiveDate) -> Result<NaiveDate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let date = forms::clean_required_date("renewal_date", &form.renewal_date, &mut errors);
        match date.map(|d| self.check(d, today)) {
            Some(Ok(date)) => Ok(date),
            Some(Err(message)) => {
                errors.add("renewal_date", message);
                Err(errors)
            }
            None => Err(errors),
        }
    }
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    policy: RenewalPolicy,
}

impl LoansService {
    pub fn new(repository: Repository, policy: RenewalPolicy) -> Self {
        Self { repository, policy }
    }

    /// Copies on loan to one borrower
    pub async fn my_books(
        &self,
        borrower_id: i32,
        page: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<ListPage<BookInstanceDetail>> {
        self.on_loan(LoanFilter::on_loan_to(borrower_id), page, today)
            .await
    }

    /// Every copy currently on loan
    pub async fn all_borrowed(
        &self,
        page: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<ListPage<BookInstanceDetail>> {
        self.on_loan(LoanFilter::on_loan(), page, today).await
    }

    async fn on_loan(
        &self,
        filter: LoanFilter,
        page: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<ListPage<BookInstanceDetail>> {
        let count = self.repository.book_instances.count_filtered(&filter).await?;
        let page_obj = PageObj::resolve(page, LOANS_PER_PAGE, count)?;
        let instances = self
            .repository
            .book_instances
            .list_filtered(&filter, page_obj.limit(), page_obj.offset())
            .await?
            .into_iter()
            .map(|i| i.with_overdue(today))
            .collect();
        Ok(ListPage::new(instances, page_obj))
    }

    /// Blank renewal form proposing the default date
    pub async fn renewal_form(&self, id: Uuid, today: NaiveDate) -> AppResult<RenewalPage> {
        let bookinst = self.repository.book_instances.get_by_id(id).await?;
        Ok(self.renewal_page(
            RenewBookForm::with_date(self.policy.proposed_date(today)),
            FieldErrors::new(),
            bookinst.with_overdue(today),
        ))
    }

    /// Validate the submitted date and move the copy's due date
    pub async fn renew(
        &self,
        id: Uuid,
        form: RenewBookForm,
        today: NaiveDate,
    ) -> AppResult<FormOutcome<NaiveDate, RenewalPage>> {
        let bookinst = self.repository.book_instances.get_by_id(id).await?;

        match self.policy.clean(&form, today) {
            Ok(due_back) => {
                self.repository.book_instances.set_due_back(id, due_back).await?;
                tracing::info!("Renewed copy {} until {}", id, due_back);
                Ok(FormOutcome::Saved(due_back))
            }
            Err(errors) => Ok(FormOutcome::Invalid(self.renewal_page(
                form,
                errors,
                bookinst.with_overdue(today),
            ))),
        }
    }

    fn renewal_page(
        &self,
        form: RenewBookForm,
        errors: FieldErrors,
        bookinst: BookInstanceDetail,
    ) -> RenewalPage {
        RenewalPage {
            form,
            errors,
            help_text: self.policy.help_text(),
            bookinst,
        }
    }
}
