//! Integration tests for the request repository.
//!
//! These run against a live Postgres given by `DATABASE_URL` (migrations
//! are applied on first connect) and are skipped when the variable is
//! unset, so unit-test runs stay database-free.

use std::env;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use bursar_core::authz::ActorFacts;
use bursar_core::workflow::{Action, Category, Cursor, RequestKind, WorkflowError};
use bursar_db::migration::Migrator;
use bursar_db::repositories::budget::{BudgetRepository, CreateBudgetInput};
use bursar_db::repositories::request::{
    PostActionInput, RequestRepository, SubmitRequestInput, request_facts,
};
use bursar_shared::types::{Currency, Department, Tier};

async fn test_db() -> Option<DatabaseConnection> {
    let Ok(url) = env::var("DATABASE_URL") else {
        eprintln!("skipping: DATABASE_URL not set");
        return None;
    };
    let db = bursar_db::connect(&url).await.expect("connect to database");
    Migrator::up(&db, None).await.expect("run migrations");
    Some(db)
}

fn actor(tier: Tier, department: Department) -> ActorFacts {
    ActorFacts {
        id: Uuid::new_v4(),
        approval_tier: tier,
        application_tier: tier,
        department,
        is_treasurer: false,
        is_representative: false,
        is_admin: false,
    }
}

fn expense_input(department: Department, budget_id: Option<Uuid>) -> SubmitRequestInput {
    SubmitRequestInput {
        kind: RequestKind::Expense,
        department,
        category: Some(Category::Reimbursement),
        budget_id,
        currency: Currency::Gbp,
        amount: 5000,
        reason: "poster printing".to_string(),
        payment: None,
        note: None,
        attachments: vec![],
    }
}

fn plain(action: Action) -> PostActionInput {
    PostActionInput {
        action,
        note: None,
        attachments: vec![],
        amount: None,
    }
}

#[tokio::test]
async fn test_submit_creates_request_audit_entry_and_ledger_delta() {
    let Some(db) = test_db().await else { return };
    let requests = RequestRepository::new(db.clone());
    let budgets = BudgetRepository::new(db);

    let budget = budgets
        .create(CreateBudgetInput {
            department: Department::Arts,
            reason: "spring festival".to_string(),
            amount: 100_000,
        })
        .await
        .expect("create budget");

    let member = actor(Tier::Member, Department::Arts);
    let record = requests
        .submit(&member, expense_input(Department::Arts, Some(budget.id)), Some(5000))
        .await
        .expect("submission succeeds");

    // Member submission enters the chain awaiting committee approval.
    assert_eq!(record.request.cursor, Cursor::AwaitCommittee.level());
    assert_eq!(record.entry.action, "create");
    assert_eq!(record.event.resulting_cursor, Cursor::AwaitCommittee);

    // The create ledger delta fires at submission time.
    let budget = budgets.get(budget.id).await.unwrap().unwrap();
    assert_eq!(budget.spent, 5000);
    assert_eq!(budget.spent_gbp, 5000);
    assert_eq!(budget.spent_cny, 0);
}

#[tokio::test]
async fn test_full_approval_chain_leaves_ledger_untouched() {
    let Some(db) = test_db().await else { return };
    let requests = RequestRepository::new(db.clone());
    let budgets = BudgetRepository::new(db);

    let budget = budgets
        .create(CreateBudgetInput {
            department: Department::Media,
            reason: "camera hire".to_string(),
            amount: 200_000,
        })
        .await
        .expect("create budget");

    let member = actor(Tier::Member, Department::Media);
    let record = requests
        .submit(&member, expense_input(Department::Media, Some(budget.id)), Some(5000))
        .await
        .expect("submission succeeds");
    let id = record.request.id;

    let committee = actor(Tier::Committee, Department::Media);
    let president = actor(Tier::President, Department::President);
    let auditor = actor(Tier::Audit, Department::Treasurer);

    let record = requests
        .post_action(&committee, id, plain(Action::Approve), None)
        .await
        .expect("committee approves");
    assert_eq!(record.request.cursor, Cursor::AwaitPresident.level());

    let record = requests
        .post_action(&president, id, plain(Action::Approve), None)
        .await
        .expect("president approves");
    assert_eq!(record.request.cursor, Cursor::AwaitAudit.level());

    let record = requests
        .post_action(&auditor, id, plain(Action::Approve), None)
        .await
        .expect("audit approves");
    assert_eq!(record.request.cursor, Cursor::Accepted.level());

    let record = requests
        .post_action(&auditor, id, plain(Action::Complete), None)
        .await
        .expect("audit completes");
    assert_eq!(record.request.cursor, Cursor::Completed.level());

    // Approvals and completion never touch the budget.
    let budget = budgets.get(budget.id).await.unwrap().unwrap();
    assert_eq!(budget.spent, 5000);

    // Trail holds one entry per action, in order.
    let trail = requests.trail(id).await.expect("trail");
    let actions: Vec<_> = trail.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, ["create", "approve", "approve", "approve", "complete"]);
}

#[tokio::test]
async fn test_owner_cancel_reverses_ledger_delta() {
    let Some(db) = test_db().await else { return };
    let requests = RequestRepository::new(db.clone());
    let budgets = BudgetRepository::new(db);

    let budget = budgets
        .create(CreateBudgetInput {
            department: Department::Sports,
            reason: "match day".to_string(),
            amount: 50_000,
        })
        .await
        .expect("create budget");

    let member = actor(Tier::Member, Department::Sports);
    let record = requests
        .submit(&member, expense_input(Department::Sports, Some(budget.id)), Some(5000))
        .await
        .expect("submission succeeds");

    let record = requests
        .post_action(&member, record.request.id, plain(Action::Cancel), Some(5000))
        .await
        .expect("owner cancels");
    assert_eq!(record.request.cursor, Cursor::Declined.level());

    let budget = budgets.get(budget.id).await.unwrap().unwrap();
    assert_eq!(budget.spent, 0);
    assert_eq!(budget.spent_gbp, 0);
}

#[tokio::test]
async fn test_concurrent_approvals_exactly_one_wins() {
    let Some(db) = test_db().await else { return };
    let requests = RequestRepository::new(db);

    let member = actor(Tier::Member, Department::Culture);
    let record = requests
        .submit(&member, expense_input(Department::Culture, None), None)
        .await
        .expect("submission succeeds");
    let id = record.request.id;

    let a = actor(Tier::Committee, Department::Culture);
    let b = actor(Tier::Committee, Department::Culture);
    let (first, second) = futures::join!(
        requests.post_action(&a, id, plain(Action::Approve), None),
        requests.post_action(&b, id, plain(Action::Approve), None),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one approval must win the swap");

    let request = requests.get(id).await.unwrap().unwrap();
    assert_eq!(request.cursor, Cursor::AwaitPresident.level());
}

#[tokio::test]
async fn test_recalculate_reproduces_incremental_totals() {
    let Some(db) = test_db().await else { return };
    let requests = RequestRepository::new(db.clone());
    let budgets = BudgetRepository::new(db);

    let budget = budgets
        .create(CreateBudgetInput {
            department: Department::Careers,
            reason: "careers fair".to_string(),
            amount: 300_000,
        })
        .await
        .expect("create budget");

    let member = actor(Tier::Member, Department::Careers);
    requests
        .submit(&member, expense_input(Department::Careers, Some(budget.id)), Some(5000))
        .await
        .expect("first submission");
    let record = requests
        .submit(&member, expense_input(Department::Careers, Some(budget.id)), Some(5000))
        .await
        .expect("second submission");
    requests
        .post_action(&member, record.request.id, plain(Action::Cancel), Some(5000))
        .await
        .expect("cancel second");

    let before = budgets.get(budget.id).await.unwrap().unwrap();
    assert_eq!(before.spent, 5000);

    // Replaying the trail with the same rates the increments used must
    // land on the same totals. (0.11 is the close every CNY conversion
    // in these tests was computed with.)
    let count = budgets
        .recalculate(|currency, _date| match currency {
            Currency::Gbp => Some(rust_decimal::Decimal::ONE),
            Currency::Cny => Some(rust_decimal_macros::dec!(0.11)),
        })
        .await
        .expect("recalculate");
    assert!(count >= 1);

    let after = budgets.get(budget.id).await.unwrap().unwrap();
    assert_eq!(after.spent, before.spent);
    assert_eq!(after.spent_gbp, before.spent_gbp);
    assert_eq!(after.received, before.received);
}

#[tokio::test]
async fn test_post_action_unknown_request() {
    let Some(db) = test_db().await else { return };
    let requests = RequestRepository::new(db);

    let auditor = actor(Tier::Audit, Department::Treasurer);
    let missing = Uuid::new_v4();
    let result = requests
        .post_action(&auditor, missing, plain(Action::Approve), None)
        .await;
    assert!(matches!(
        result,
        Err(WorkflowError::RequestNotFound(id)) if id == missing
    ));
}

#[tokio::test]
async fn test_unauthorized_transition_writes_nothing() {
    let Some(db) = test_db().await else { return };
    let requests = RequestRepository::new(db);

    let member = actor(Tier::Member, Department::Arts);
    let record = requests
        .submit(&member, expense_input(Department::Arts, None), None)
        .await
        .expect("submission succeeds");
    let id = record.request.id;

    // Wrong department committee member: denied, and no audit entry.
    let outsider = actor(Tier::Committee, Department::Media);
    let result = requests
        .post_action(&outsider, id, plain(Action::Approve), None)
        .await;
    assert!(matches!(result, Err(WorkflowError::NotAuthorized { .. })));

    let trail = requests.trail(id).await.expect("trail");
    assert_eq!(trail.len(), 1, "only the create entry exists");

    let request = requests.get(id).await.unwrap().unwrap();
    let facts = request_facts(&request).unwrap();
    assert_eq!(facts.cursor, Cursor::AwaitCommittee);
}

#[tokio::test]
async fn test_income_receipt_accumulates_and_blocks_cancel() {
    let Some(db) = test_db().await else { return };
    let requests = RequestRepository::new(db.clone());
    let budgets = BudgetRepository::new(db);

    let budget = budgets
        .create(CreateBudgetInput {
            department: Department::Sponsorship,
            reason: "sponsorship drive".to_string(),
            amount: 500_000,
        })
        .await
        .expect("create budget");

    let mut rep = actor(Tier::Member, Department::Sponsorship);
    rep.is_representative = true;

    let record = requests
        .submit(
            &rep,
            SubmitRequestInput {
                kind: RequestKind::Income,
                department: Department::Sponsorship,
                category: None,
                budget_id: Some(budget.id),
                currency: Currency::Cny,
                amount: 80_000,
                reason: "sponsor instalments".to_string(),
                payment: None,
                note: None,
                attachments: vec![],
            },
            None,
        )
        .await
        .expect("income submission succeeds");
    let id = record.request.id;
    assert_eq!(record.request.cursor, Cursor::Accepted.level());

    // Income submission itself moves no money.
    let untouched = budgets.get(budget.id).await.unwrap().unwrap();
    assert_eq!(untouched.received, 0);

    let mut auditor = actor(Tier::Audit, Department::Treasurer);
    auditor.is_representative = true;
    let record = requests
        .post_action(
            &auditor,
            id,
            PostActionInput {
                action: Action::Comment,
                note: Some("first instalment".to_string()),
                attachments: vec![],
                amount: Some(2000),
            },
            // 2000 fen at 0.11 close = 220 pence.
            Some(220),
        )
        .await
        .expect("receipt recorded");
    assert_eq!(record.request.received_cny, 2000);
    assert_eq!(record.request.cursor, Cursor::Accepted.level());
    assert_eq!(record.entry.amount, Some(2000));

    let after = budgets.get(budget.id).await.unwrap().unwrap();
    assert_eq!(after.received, 220);
    assert_eq!(after.received_cny, 2000);
    assert_eq!(after.received_gbp, 0);
    assert_eq!(after.spent, 0);

    // With money already received the owner can no longer cancel.
    let result = requests.post_action(&rep, id, plain(Action::Cancel), None).await;
    assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
}
