//! Debt workflow controller - The use-case operations of the ledger.
//!
//! Each public operation runs as one database transaction: the payment status change, the
//! schedule mutations and the debt's reconciled balance either all commit or none do.
//! Mutating operations also take an in-process write gate and read the debt row with an
//! exclusive lock, so two payments against the same debt can never both validate against
//! the same stale remaining balance.

use super::{
    money::sum,
    payment::{self, PaymentRecord},
    reconcile::{self, NoOrigin, OriginResolver},
    redistribute, schedule,
};
use crate::{
    config::LedgerConfig,
    entities::{
        Debt, DebtPayment, DebtSchedule, Money, debt,
        debt::{DebtParties, DebtStatus},
        debt_payment,
        debt_payment::{PaymentMethod, PaymentStatus},
        debt_schedule,
        debt_schedule::ScheduleStatus,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    Condition, DatabaseTransaction, QuerySelect, Set, TransactionTrait, prelude::*,
    sea_query::{Expr, Query},
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Input for [`DebtWorkflow::create_debt`].
#[derive(Debug, Clone)]
pub struct NewDebt {
    /// Who owes whom
    pub parties: DebtParties,
    /// Total owed
    pub amount_due: Decimal,
    /// Interest rate in percent (stored, not accrued)
    pub interest_rate: Decimal,
    /// Day the obligation starts
    pub start_date: NaiveDate,
    /// Final due date, if any
    pub due_date: Option<NaiveDate>,
    /// Originating external transaction whose prior payments count toward this debt
    pub origin_reference: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Schedule length; the configured default when `None`
    pub period_count: Option<u32>,
}

/// Input for [`DebtWorkflow::submit_payment`].
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Payment amount
    pub amount: Decimal,
    /// How the money moves; instant methods are confirmed on submission
    pub method: PaymentMethod,
    /// Period the payment is earmarked for
    pub schedule_id: Option<i64>,
    /// Caller reference; generated when absent
    pub reference_number: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Who recorded the payment
    pub created_by: Option<String>,
}

impl NewPayment {
    /// A payment with no earmark, reference, notes or creator.
    #[must_use]
    pub const fn new(amount: Decimal, method: PaymentMethod) -> Self {
        Self {
            amount,
            method,
            schedule_id: None,
            reference_number: None,
            notes: None,
            created_by: None,
        }
    }

    /// Earmarks the payment for one schedule period.
    #[must_use]
    pub fn for_schedule(mut self, schedule_id: i64) -> Self {
        self.schedule_id = Some(schedule_id);
        self
    }
}

/// Input for [`DebtWorkflow::pay_schedule`].
#[derive(Debug, Clone)]
pub struct DirectPayment {
    /// Amount applied straight to the period
    pub amount: Decimal,
    /// How the money moved
    pub method: PaymentMethod,
    /// Free-text notes
    pub notes: Option<String>,
    /// Who recorded the payment; also recorded as confirmer
    pub created_by: Option<String>,
}

/// A reconciled debt together with its schedule and payment log.
#[derive(Debug, Clone, Serialize)]
pub struct DebtDetails {
    /// The reconciled debt row
    pub debt: debt::Model,
    /// Periods ordered by period number
    pub schedules: Vec<debt_schedule::Model>,
    /// Payments, newest first
    pub payments: Vec<debt_payment::Model>,
}

/// Result of a maintenance sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Non-cancelled debts reconciled
    pub debts_checked: usize,
    /// Debts that ended the sweep `OVERDUE`
    pub overdue_debts: usize,
    /// Debts that ended the sweep `PAID`
    pub paid_debts: usize,
    /// Periods newly marked `OVERDUE`
    pub overdue_periods: u64,
}

/// Orchestrates debt creation and the payment lifecycle over one ledger store.
pub struct DebtWorkflow<R = NoOrigin> {
    db: DatabaseConnection,
    config: LedgerConfig,
    resolver: R,
    write_gate: Mutex<()>,
}

impl DebtWorkflow<NoOrigin> {
    /// A workflow whose debts never have an initial external contribution.
    #[must_use]
    pub fn without_origins(db: DatabaseConnection, config: LedgerConfig) -> Self {
        Self::new(db, config, NoOrigin)
    }
}

impl<R> DebtWorkflow<R>
where
    R: OriginResolver,
{
    /// Creates a workflow over `db` that resolves origin references with `resolver`.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: LedgerConfig, resolver: R) -> Self {
        Self {
            db,
            config,
            resolver,
            write_gate: Mutex::new(()),
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Underlying connection.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.db
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    async fn lock_debt(txn: &DatabaseTransaction, debt_id: i64) -> Result<debt::Model> {
        Debt::find_by_id(debt_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(Error::DebtNotFound { id: debt_id })
    }

    async fn reconcile(
        &self,
        txn: &DatabaseTransaction,
        debt_id: i64,
        today: NaiveDate,
    ) -> Result<debt::Model> {
        reconcile::reconcile_debt(txn, &self.resolver, &self.config, debt_id, today).await
    }

    async fn find_payment_of(
        txn: &DatabaseTransaction,
        debt_id: i64,
        payment_id: i64,
    ) -> Result<debt_payment::Model> {
        let payment = payment::get_payment_by_id(txn, payment_id)
            .await?
            .ok_or(Error::PaymentNotFound { id: payment_id })?;
        if payment.debt_id != debt_id {
            return Err(Error::invalid_state(format!(
                "payment {payment_id} belongs to debt {}, not {debt_id}",
                payment.debt_id
            )));
        }
        Ok(payment)
    }

    fn ensure_open(debt: &debt::Model) -> Result<()> {
        if debt.status.accepts_payments() {
            Ok(())
        } else {
            Err(Error::invalid_state(format!(
                "debt {} is {:?} and accepts no payments",
                debt.id, debt.status
            )))
        }
    }

    /// Applies `amount` to the schedule starting at `start`, carries any excess forward,
    /// re-levels the open periods and persists them. Unplaceable money is added to the
    /// debt's unapplied credit.
    async fn place_on_schedule(
        txn: &DatabaseTransaction,
        debt_id: i64,
        periods: &mut [debt_schedule::Model],
        start: usize,
        amount: Decimal,
        now: DateTimeUtc,
    ) -> Result<()> {
        let allocation = redistribute::apply_payment(periods, start, amount, now);

        if allocation.unapplied > Decimal::ZERO {
            warn!(
                debt_id,
                unapplied = %allocation.unapplied,
                "Reconciliation anomaly: overpayment exceeds every open period, holding it as unapplied credit"
            );
            let debt = Self::lock_debt(txn, debt_id).await?;
            let unapplied_credit = debt.unapplied_credit + allocation.unapplied;
            let mut active: debt::ActiveModel = debt.into();
            active.unapplied_credit = Set(unapplied_credit.into());
            active.update(txn).await?;
        }

        schedule::relevel_schedule(periods, now);
        schedule::save_periods(txn, periods).await
    }

    /// Generates the schedule for a debt that has none and places any money already
    /// confirmed on the payment log onto it.
    async fn install_schedule(
        &self,
        txn: &DatabaseTransaction,
        debt: &debt::Model,
        period_count: u32,
        now: DateTimeUtc,
    ) -> Result<Vec<debt_schedule::Model>> {
        if debt.remaining() <= Decimal::ZERO {
            return Err(Error::NothingToSchedule {
                remaining: debt.remaining(),
            });
        }

        let initial = reconcile::initial_contribution(&self.resolver, debt).await?;
        let to_schedule = debt.amount_due - initial;
        let mut periods = schedule::generate_schedule(txn, debt, to_schedule, period_count).await?;

        let confirmed = DebtPayment::find()
            .filter(debt_payment::Column::DebtId.eq(debt.id))
            .filter(debt_payment::Column::Status.eq(PaymentStatus::Confirmed))
            .all(txn)
            .await?;
        let confirmed_total = sum(confirmed.iter().map(|p| p.amount));
        if confirmed_total > Decimal::ZERO {
            Self::place_on_schedule(txn, debt.id, &mut periods, 0, confirmed_total, now).await?;
        }

        Ok(periods)
    }

    /// Moves a pending payment to `CONFIRMED` and applies it to the debt.
    async fn apply_confirmation(
        &self,
        txn: &DatabaseTransaction,
        debt_id: i64,
        pending: debt_payment::Model,
        confirmed_by: String,
        now: DateTimeUtc,
    ) -> Result<debt_payment::Model> {
        let confirmed = payment::mark_confirmed(txn, pending, confirmed_by, now).await?;

        let mut periods = schedule::get_schedule_for_debt(txn, debt_id).await?;
        if !periods.is_empty() {
            let start = match confirmed.schedule_id {
                Some(schedule_id) => periods
                    .iter()
                    .position(|p| p.id == schedule_id)
                    .ok_or(Error::ScheduleNotFound { id: schedule_id })?,
                None => redistribute::first_open_period(&periods).unwrap_or(periods.len()),
            };
            let amount = confirmed.amount.decimal();
            Self::place_on_schedule(txn, debt_id, &mut periods, start, amount, now).await?;
        }

        self.reconcile(txn, debt_id, Self::today()).await?;
        Ok(confirmed)
    }

    /// Creates a debt, generates its schedule when something remains to be paid, and
    /// reconciles it.
    #[instrument(skip(self, new_debt), fields(amount_due = %new_debt.amount_due))]
    pub async fn create_debt(&self, new_debt: NewDebt) -> Result<DebtDetails> {
        if new_debt.amount_due <= Decimal::ZERO {
            return Err(Error::InvalidAmount {
                amount: new_debt.amount_due,
            });
        }
        let period_count = new_debt
            .period_count
            .unwrap_or(self.config.default_period_count);
        if period_count == 0 {
            return Err(Error::InvalidPeriodCount {
                count: period_count,
            });
        }

        let _guard = self.write_gate.lock().await;
        let txn = self.db.begin().await?;
        let now = Utc::now();
        let (kind, debtor_id, creditor_id) = new_debt.parties.into_columns();

        let inserted = debt::ActiveModel {
            kind: Set(kind),
            debtor_id: Set(debtor_id),
            creditor_id: Set(creditor_id),
            amount_due: Set(new_debt.amount_due.into()),
            amount_paid: Set(Money::ZERO),
            interest_rate: Set(new_debt.interest_rate.into()),
            start_date: Set(new_debt.start_date),
            due_date: Set(new_debt.due_date),
            status: Set(DebtStatus::Active),
            origin_reference: Set(new_debt.origin_reference),
            notes: Set(new_debt.notes),
            unapplied_credit: Set(Money::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let debt = self.reconcile(&txn, inserted.id, Self::today()).await?;
        let schedules = if debt.remaining() > Decimal::ZERO {
            self.install_schedule(&txn, &debt, period_count, now).await?
        } else {
            Vec::new()
        };
        let debt = self.reconcile(&txn, debt.id, Self::today()).await?;

        txn.commit().await?;
        info!(
            debt_id = debt.id,
            kind = ?debt.kind,
            periods = schedules.len(),
            amount_paid = %debt.amount_paid,
            "Created debt"
        );

        Ok(DebtDetails {
            debt,
            schedules,
            payments: Vec::new(),
        })
    }

    /// Generates a schedule for an existing debt that has none.
    #[instrument(skip(self))]
    pub async fn generate_schedule(
        &self,
        debt_id: i64,
        period_count: u32,
    ) -> Result<Vec<debt_schedule::Model>> {
        let _guard = self.write_gate.lock().await;
        let txn = self.db.begin().await?;
        Self::lock_debt(&txn, debt_id).await?;

        let existing = schedule::get_schedule_for_debt(&txn, debt_id).await?;
        if !existing.is_empty() {
            return Err(Error::invalid_state(format!("debt {debt_id} already has a schedule")));
        }

        let debt = self.reconcile(&txn, debt_id, Self::today()).await?;
        Self::ensure_open(&debt)?;
        let periods = self
            .install_schedule(&txn, &debt, period_count, Utc::now())
            .await?;
        self.reconcile(&txn, debt_id, Self::today()).await?;

        txn.commit().await?;
        info!(debt_id, periods = periods.len(), "Generated schedule");
        Ok(periods)
    }

    /// Records a payment attempt against a debt.
    ///
    /// The amount may exceed the remaining balance by at most the payment tolerance.
    /// Payments made with an instant method are confirmed straight away.
    #[instrument(skip(self, new_payment), fields(amount = %new_payment.amount, method = ?new_payment.method))]
    pub async fn submit_payment(
        &self,
        debt_id: i64,
        new_payment: NewPayment,
    ) -> Result<debt_payment::Model> {
        if new_payment.amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount {
                amount: new_payment.amount,
            });
        }

        let _guard = self.write_gate.lock().await;
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let debt = Self::lock_debt(&txn, debt_id).await?;
        Self::ensure_open(&debt)?;
        let debt = self.reconcile(&txn, debt_id, Self::today()).await?;
        payment::validate_amount(
            new_payment.amount,
            debt.remaining(),
            self.config.payment_tolerance,
        )?;

        if let Some(schedule_id) = new_payment.schedule_id {
            let period = DebtSchedule::find_by_id(schedule_id)
                .one(&txn)
                .await?
                .ok_or(Error::ScheduleNotFound { id: schedule_id })?;
            if period.debt_id != debt_id {
                return Err(Error::invalid_state(format!(
                    "schedule {schedule_id} belongs to debt {}, not {debt_id}",
                    period.debt_id
                )));
            }
        }

        let instant = self.config.is_instant(new_payment.method);
        let confirmer = new_payment
            .created_by
            .clone()
            .unwrap_or_else(|| self.config.system_actor.clone());
        let record = PaymentRecord {
            debt_id,
            schedule_id: new_payment.schedule_id,
            amount: new_payment.amount,
            method: new_payment.method,
            reference_number: new_payment.reference_number,
            notes: new_payment.notes,
            created_by: new_payment.created_by,
        };
        let pending =
            payment::append_payment(&txn, record, PaymentStatus::Pending, None, now).await?;

        let result = if instant {
            self.apply_confirmation(&txn, debt_id, pending, confirmer, now)
                .await?
        } else {
            pending
        };

        txn.commit().await?;
        info!(
            debt_id,
            payment_id = result.id,
            status = ?result.status,
            reference = %result.reference_number,
            "Submitted payment"
        );
        Ok(result)
    }

    /// Confirms a pending payment and applies it to the debt's schedule and balance.
    #[instrument(skip(self, confirmed_by))]
    pub async fn confirm_payment(
        &self,
        debt_id: i64,
        payment_id: i64,
        confirmed_by: impl Into<String>,
    ) -> Result<debt_payment::Model> {
        let confirmed_by = confirmed_by.into();
        let _guard = self.write_gate.lock().await;
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let debt = Self::lock_debt(&txn, debt_id).await?;
        let pending = Self::find_payment_of(&txn, debt_id, payment_id).await?;
        payment::ensure_pending(&pending)?;
        Self::ensure_open(&debt)?;

        // Other payments may have been confirmed since this one was submitted
        let debt = self.reconcile(&txn, debt_id, Self::today()).await?;
        payment::validate_amount(
            pending.amount.decimal(),
            debt.remaining(),
            self.config.payment_tolerance,
        )?;

        let confirmed = self
            .apply_confirmation(&txn, debt_id, pending, confirmed_by, now)
            .await?;

        txn.commit().await?;
        info!(debt_id, payment_id, amount = %confirmed.amount, "Confirmed payment");
        Ok(confirmed)
    }

    /// Rejects a pending payment. Balances and schedule paid amounts are untouched;
    /// the debt is reconciled anyway so any drift heals.
    #[instrument(skip(self, rejected_by, reason))]
    pub async fn reject_payment(
        &self,
        debt_id: i64,
        payment_id: i64,
        rejected_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<debt_payment::Model> {
        let (rejected_by, reason) = (rejected_by.into(), reason.into());
        let _guard = self.write_gate.lock().await;
        let txn = self.db.begin().await?;

        Self::lock_debt(&txn, debt_id).await?;
        let pending = Self::find_payment_of(&txn, debt_id, payment_id).await?;
        let rejected =
            payment::mark_rejected(&txn, pending, rejected_by, reason, Utc::now()).await?;
        self.reconcile(&txn, debt_id, Self::today()).await?;

        txn.commit().await?;
        info!(
            debt_id,
            payment_id,
            reason = rejected.rejection_reason.as_deref().unwrap_or_default(),
            "Rejected payment"
        );
        Ok(rejected)
    }

    /// Applies money straight to a schedule period, bypassing the confirm handshake.
    ///
    /// An already-confirmed payment is appended to the log for audit.
    #[instrument(skip(self, direct), fields(amount = %direct.amount))]
    pub async fn pay_schedule(
        &self,
        schedule_id: i64,
        direct: DirectPayment,
    ) -> Result<debt_payment::Model> {
        if direct.amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount {
                amount: direct.amount,
            });
        }

        let _guard = self.write_gate.lock().await;
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let period = DebtSchedule::find_by_id(schedule_id)
            .one(&txn)
            .await?
            .ok_or(Error::ScheduleNotFound { id: schedule_id })?;
        let debt_id = period.debt_id;
        let debt = Self::lock_debt(&txn, debt_id).await?;
        Self::ensure_open(&debt)?;
        let debt = self.reconcile(&txn, debt_id, Self::today()).await?;
        payment::validate_amount(
            direct.amount,
            debt.remaining(),
            self.config.payment_tolerance,
        )?;

        let mut periods = schedule::get_schedule_for_debt(&txn, debt_id).await?;
        let start = periods
            .iter()
            .position(|p| p.id == schedule_id)
            .ok_or(Error::ScheduleNotFound { id: schedule_id })?;
        Self::place_on_schedule(&txn, debt_id, &mut periods, start, direct.amount, now).await?;

        let confirmer = direct
            .created_by
            .clone()
            .unwrap_or_else(|| self.config.system_actor.clone());
        let record = PaymentRecord {
            debt_id,
            schedule_id: Some(schedule_id),
            amount: direct.amount,
            method: direct.method,
            reference_number: None,
            notes: direct.notes,
            created_by: direct.created_by,
        };
        let audit = payment::append_payment(
            &txn,
            record,
            PaymentStatus::Confirmed,
            Some(confirmer),
            now,
        )
        .await?;
        self.reconcile(&txn, debt_id, Self::today()).await?;

        txn.commit().await?;
        info!(
            debt_id,
            schedule_id,
            payment_id = audit.id,
            "Paid schedule period directly"
        );
        Ok(audit)
    }

    /// Cancels an `ACTIVE` or `OVERDUE` debt.
    #[instrument(skip(self))]
    pub async fn cancel_debt(&self, debt_id: i64) -> Result<debt::Model> {
        let _guard = self.write_gate.lock().await;
        let txn = self.db.begin().await?;

        Self::lock_debt(&txn, debt_id).await?;
        let debt = self.reconcile(&txn, debt_id, Self::today()).await?;
        if matches!(debt.status, DebtStatus::Paid | DebtStatus::Cancelled) {
            return Err(Error::invalid_state(format!(
                "debt {debt_id} is already {:?}",
                debt.status
            )));
        }

        let mut active: debt::ActiveModel = debt.into();
        active.status = Set(DebtStatus::Cancelled);
        active.updated_at = Set(Utc::now());
        let cancelled = active.update(&txn).await?;

        txn.commit().await?;
        info!(debt_id, "Cancelled debt");
        Ok(cancelled)
    }

    /// Removes a debt together with its schedule and payment log.
    #[instrument(skip(self))]
    pub async fn delete_debt(&self, debt_id: i64) -> Result<()> {
        let _guard = self.write_gate.lock().await;
        let txn = self.db.begin().await?;

        let debt = Self::lock_debt(&txn, debt_id).await?;
        let payments = DebtPayment::delete_many()
            .filter(debt_payment::Column::DebtId.eq(debt_id))
            .exec(&txn)
            .await?;
        DebtSchedule::delete_many()
            .filter(debt_schedule::Column::DebtId.eq(debt_id))
            .exec(&txn)
            .await?;
        debt.delete(&txn).await?;

        txn.commit().await?;
        info!(
            debt_id,
            payments_removed = payments.rows_affected,
            "Deleted debt"
        );
        Ok(())
    }

    /// Returns the reconciled debt with its schedule and payments.
    #[instrument(skip(self))]
    pub async fn get_debt(&self, debt_id: i64) -> Result<DebtDetails> {
        let _guard = self.write_gate.lock().await;
        let txn = self.db.begin().await?;

        let debt = self.reconcile(&txn, debt_id, Self::today()).await?;
        let schedules = schedule::get_schedule_for_debt(&txn, debt_id).await?;
        let payments = payment::get_payments_for_debt(&txn, debt_id).await?;

        txn.commit().await?;
        Ok(DebtDetails {
            debt,
            schedules,
            payments,
        })
    }

    async fn reconciled_where(&self, condition: Condition) -> Result<Vec<debt::Model>> {
        let _guard = self.write_gate.lock().await;
        let txn = self.db.begin().await?;
        let today = Self::today();

        let ids: Vec<i64> = Debt::find()
            .filter(condition)
            .all(&txn)
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect();
        let mut debts = Vec::with_capacity(ids.len());
        for id in ids {
            debts.push(self.reconcile(&txn, id, today).await?);
        }

        txn.commit().await?;
        Ok(debts)
    }

    /// Debts in which `party_id` is either the debtor or the creditor.
    pub async fn list_by_party(&self, party_id: i64) -> Result<Vec<debt::Model>> {
        self.reconciled_where(
            Condition::any()
                .add(debt::Column::DebtorId.eq(party_id))
                .add(debt::Column::CreditorId.eq(party_id)),
        )
        .await
    }

    /// Debts whose reconciled status is `status`.
    pub async fn list_by_status(&self, status: DebtStatus) -> Result<Vec<debt::Model>> {
        let debts = self.reconciled_where(Condition::all()).await?;
        Ok(debts.into_iter().filter(|d| d.status == status).collect())
    }

    /// Debts past their due date and not yet settled.
    pub async fn list_overdue(&self) -> Result<Vec<debt::Model>> {
        self.list_by_status(DebtStatus::Overdue).await
    }

    /// Marks past-due open periods of `ACTIVE`/`OVERDUE` debts `OVERDUE` and reconciles every
    /// non-cancelled debt as of `today`.
    ///
    /// Periods of cancelled or settled debts keep their status.
    #[instrument(skip(self))]
    pub async fn refresh_overdue(&self, today: NaiveDate) -> Result<SweepSummary> {
        let _guard = self.write_gate.lock().await;
        let txn = self.db.begin().await?;

        let open_debts = Query::select()
            .column(debt::Column::Id)
            .from(Debt)
            .and_where(debt::Column::Status.is_in([DebtStatus::Active, DebtStatus::Overdue]))
            .to_owned();
        let marked = DebtSchedule::update_many()
            .col_expr(
                debt_schedule::Column::Status,
                Expr::value(ScheduleStatus::Overdue),
            )
            .filter(debt_schedule::Column::DueDate.lt(today))
            .filter(
                debt_schedule::Column::Status
                    .is_in([ScheduleStatus::Pending, ScheduleStatus::Partial]),
            )
            .filter(debt_schedule::Column::DebtId.in_subquery(open_debts))
            .exec(&txn)
            .await?;

        let ids: Vec<i64> = Debt::find()
            .filter(debt::Column::Status.ne(DebtStatus::Cancelled))
            .all(&txn)
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect();

        let mut summary = SweepSummary {
            overdue_periods: marked.rows_affected,
            ..SweepSummary::default()
        };
        for id in ids {
            let debt = self.reconcile(&txn, id, today).await?;
            summary.debts_checked += 1;
            match debt.status {
                DebtStatus::Overdue => summary.overdue_debts += 1,
                DebtStatus::Paid => summary.paid_debts += 1,
                DebtStatus::Active | DebtStatus::Cancelled => {}
            }
        }

        txn.commit().await?;
        info!(
            debts = summary.debts_checked,
            overdue = summary.overdue_debts,
            overdue_periods = summary.overdue_periods,
            "Overdue sweep finished"
        );
        Ok(summary)
    }
}
