//! Talent transaction service - the single owner of balance and ledger writes.
//!
//! Every balance change flows through `apply_transaction`, which mutates the
//! student's balance and appends the matching ledger entry as one indivisible
//! database transaction. Give, take, and group grants are thin wrappers that
//! validate input and pick the transaction kind. Queries for history and
//! current balances live here too, so views never touch the tables directly.

use crate::{
    entities::{Transaction, TransactionKind, User, transaction, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Snapshot of a student's balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    /// Spendable balance
    pub current_talent: i64,
    /// Lifetime high-water mark, never debited
    pub max_talent: i64,
}

/// Result of one applied transaction: the ledger entry, the student's display
/// name for the status line, and the balances after the change.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOutcome {
    /// The ledger entry that was written
    pub entry: transaction::Model,
    /// Display name of the affected student
    pub student_name: String,
    /// Balances after the change
    pub balances: Balances,
}

/// One member's result within a group grant.
#[derive(Debug)]
pub struct MemberOutcome {
    /// The member's user ID
    pub student_id: i64,
    /// The member's display name
    pub student_name: String,
    /// The member's individual grant result
    pub outcome: Result<TransactionOutcome>,
}

/// Aggregate report of a group grant.
///
/// Group grants are not atomic across members: each member's transaction
/// independently succeeds or fails, in the order the member list was supplied.
#[derive(Debug)]
pub struct GroupGiveReport {
    /// Amount each member received (or would have received)
    pub per_person: i64,
    /// Per-member results, in supplied order
    pub outcomes: Vec<MemberOutcome>,
}

impl GroupGiveReport {
    /// Number of members whose grant was written.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|m| m.outcome.is_ok()).count()
    }

    /// Number of members whose grant failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|m| m.outcome.is_err()).count()
    }

    /// Total talents actually written across successful members.
    #[must_use]
    pub fn distributed(&self) -> i64 {
        // Cast safety: group sizes are tiny.
        #[allow(clippy::cast_possible_wrap)]
        let succeeded = self.succeeded() as i64;
        self.per_person * succeeded
    }

    /// True when the grant landed for some members but not all. Callers
    /// re-fetch affected balances on any mix of success and failure.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.succeeded() > 0 && self.failed() > 0
    }
}

/// Applies one signed balance change plus its ledger entry as a single
/// indivisible unit.
///
/// Inside one database transaction this (a) loads the student, (b) applies the
/// delta with a conditional relative update that refuses to drive the balance
/// negative, (c) raises `max_talent` when the new balance exceeds it, and
/// (d) appends the ledger entry. Any failure before commit rolls the whole
/// unit back, so balances and ledger never disagree.
///
/// The conditional update re-evaluates the live balance at write time
/// (`current_talent = current_talent + ?` guarded by `current_talent + ? >= 0`),
/// so two concurrent calls for the same student cannot clobber each other with
/// stale reads; zero rows affected means the guard rejected the change.
///
/// # Arguments
/// * `db` - Database connection
/// * `student_id` - The student whose balance changes
/// * `actor_id` - The teacher performing the operation
/// * `amount` - Signed delta: positive grants, negative deducts
/// * `reason` - Free-text reason recorded on the ledger entry
/// * `kind` - What kind of operation produced this entry
pub async fn apply_transaction(
    db: &DatabaseConnection,
    student_id: i64,
    actor_id: i64,
    amount: i64,
    reason: &str,
    kind: TransactionKind,
) -> Result<TransactionOutcome> {
    use sea_orm::sea_query::{Expr, ExprTrait};

    let txn = db.begin().await?;

    let student = User::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::StudentNotFound {
            name: student_id.to_string(),
        })?;

    // Relative update guarded against a negative result; the guard uses the
    // live stored value, not the row loaded above.
    let update = User::update_many()
        .col_expr(
            user::Column::CurrentTalent,
            Expr::col(user::Column::CurrentTalent).add(amount),
        )
        .filter(user::Column::Id.eq(student_id))
        .filter(Expr::col(user::Column::CurrentTalent).add(amount).gte(0))
        .exec(&txn)
        .await?;

    if update.rows_affected == 0 {
        txn.rollback().await?;
        return Err(Error::InsufficientTalent {
            student: student.display_name,
            current: student.current_talent,
            requested: amount.abs(),
        });
    }

    let updated = User::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::StudentNotFound {
            name: student_id.to_string(),
        })?;

    let mut balances = Balances {
        current_talent: updated.current_talent,
        max_talent: updated.max_talent,
    };

    // max_talent is monotone: raised when exceeded, never lowered.
    if balances.current_talent > balances.max_talent {
        balances.max_talent = balances.current_talent;
        let mut high_water: user::ActiveModel = updated.into();
        high_water.max_talent = Set(balances.current_talent);
        high_water.update(&txn).await?;
    }

    let entry = transaction::ActiveModel {
        student_id: Set(student_id),
        teacher_id: Set(actor_id),
        amount: Set(amount),
        reason: Set(reason.to_string()),
        kind: Set(kind),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let entry = entry.insert(&txn).await?;

    txn.commit().await?;

    info!(
        "Applied {:+} talents to {} (balance now {})",
        amount, student.display_name, balances.current_talent
    );

    Ok(TransactionOutcome {
        entry,
        student_name: student.display_name,
        balances,
    })
}

/// Grants talents to one student.
///
/// # Arguments
/// * `amount` - Must be positive
/// * `reason` - Must be non-empty
#[instrument(skip(db))]
pub async fn give(
    db: &DatabaseConnection,
    student_id: i64,
    actor_id: i64,
    amount: i64,
    reason: &str,
) -> Result<TransactionOutcome> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    if reason.trim().is_empty() {
        return Err(Error::EmptyReason);
    }

    apply_transaction(
        db,
        student_id,
        actor_id,
        amount,
        reason,
        TransactionKind::IndividualGive,
    )
    .await
}

/// Deducts talents from one student; internally a negative-amount grant.
///
/// Fails whole (nothing written) when the student's balance cannot cover the
/// deduction. Never lowers `max_talent`.
///
/// # Arguments
/// * `amount` - The deduction, as a positive number
/// * `reason` - Must be non-empty
#[instrument(skip(db))]
pub async fn take(
    db: &DatabaseConnection,
    student_id: i64,
    actor_id: i64,
    amount: i64,
    reason: &str,
) -> Result<TransactionOutcome> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    if reason.trim().is_empty() {
        return Err(Error::EmptyReason);
    }

    apply_transaction(
        db,
        student_id,
        actor_id,
        -amount,
        reason,
        TransactionKind::IndividualTake,
    )
    .await
}

/// Splits a lump sum evenly across a group's members.
///
/// `per_person` is the integer quotient of `total` over the member count; a
/// quotient of zero (or less) rejects the whole call before touching storage,
/// so a split too small to give everyone at least one talent writes nothing.
/// Otherwise each member gets one independent `apply_transaction` in supplied
/// order - not atomic across members - and the report carries every outcome.
#[instrument(skip(db, members))]
pub async fn group_give(
    db: &DatabaseConnection,
    members: &[user::Model],
    actor_id: i64,
    total: i64,
    reason: &str,
    group_label: &str,
) -> Result<GroupGiveReport> {
    if reason.trim().is_empty() {
        return Err(Error::EmptyReason);
    }

    // Cast safety: group sizes are tiny.
    #[allow(clippy::cast_possible_wrap)]
    let member_count = members.len() as i64;
    let per_person = if member_count == 0 {
        0
    } else {
        total / member_count
    };
    if per_person <= 0 {
        return Err(Error::EmptySplit {
            total,
            members: members.len(),
        });
    }

    let annotated = format!("{reason} (group: {group_label})");

    let mut outcomes = Vec::with_capacity(members.len());
    for member in members {
        let outcome = apply_transaction(
            db,
            member.id,
            actor_id,
            per_person,
            &annotated,
            TransactionKind::GroupGive,
        )
        .await;
        outcomes.push(MemberOutcome {
            student_id: member.id,
            student_name: member.display_name.clone(),
            outcome,
        });
    }

    let report = GroupGiveReport {
        per_person,
        outcomes,
    };
    info!(
        "Group grant to '{}': {} of {} members received {} each",
        group_label,
        report.succeeded(),
        members.len(),
        per_person
    );
    Ok(report)
}

/// Returns the actor's ledger entries, newest first, bounded by `limit`.
///
/// Each entry is paired with the student's record when it still resolves; an
/// entry whose student was removed out-of-band yields `None` instead of being
/// dropped, so the view can render a placeholder.
pub async fn history(
    db: &DatabaseConnection,
    actor_id: i64,
    limit: u64,
) -> Result<Vec<(transaction::Model, Option<user::Model>)>> {
    Transaction::find()
        .find_also_related(User)
        .filter(transaction::Column::TeacherId.eq(actor_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Reads a student's balances; the view-layer refresh after every mutation.
pub async fn current_balances(db: &DatabaseConnection, student_id: i64) -> Result<Balances> {
    let student = User::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::StudentNotFound {
            name: student_id.to_string(),
        })?;

    Ok(Balances {
        current_talent: student.current_talent,
        max_talent: student.max_talent,
    })
}
