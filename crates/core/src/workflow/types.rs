//! Workflow domain types for the request approval chain.

use serde::{Deserialize, Serialize};
use std::fmt;

use bursar_shared::types::Tier;

/// Whether a request spends money or brings it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Expense application: reimbursement, payment, or advance.
    Expense,
    /// Income contract: money owed to the organization.
    Income,
}

impl RequestKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "expense" => Some(Self::Expense),
            "income" => Some(Self::Income),
            _ => None,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spending category of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Pay back money a member already spent.
    Reimbursement,
    /// Pay a supplier directly.
    Payment,
    /// Advance funds before spending.
    Advance,
}

impl Category {
    /// Returns the string representation of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reimbursement => "reimbursement",
            Self::Payment => "payment",
            Self::Advance => "advance",
        }
    }

    /// Parses a category from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reimbursement" => Some(Self::Reimbursement),
            "payment" => Some(Self::Payment),
            "advance" => Some(Self::Advance),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The approval-state of a request: which tier must act next, or how the
/// request was resolved.
///
/// The chain descends one tier per approval:
/// `AwaitMember` → `AwaitCommittee` → `AwaitPresident` → `AwaitAudit` →
/// `Accepted` → `Completed`, with `Declined` absorbing rejections and
/// cancellations. `Completed` and `Declined` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cursor {
    /// Rejected or cancelled (terminal).
    Declined,
    /// Money has moved (terminal).
    Completed,
    /// Fully approved; awaiting payment or final receipt by the audit tier.
    Accepted,
    /// Awaiting approval by the audit tier.
    AwaitAudit,
    /// Awaiting approval by the president tier.
    AwaitPresident,
    /// Awaiting approval by a department committee member.
    AwaitCommittee,
    /// Awaiting approval by an ordinary member.
    AwaitMember,
}

impl Cursor {
    /// All cursor states, most resolved first.
    pub const ALL: [Self; 7] = [
        Self::Declined,
        Self::Completed,
        Self::Accepted,
        Self::AwaitAudit,
        Self::AwaitPresident,
        Self::AwaitCommittee,
        Self::AwaitMember,
    ];

    /// Numeric level stored in the database; lower is more resolved.
    #[must_use]
    pub const fn level(self) -> i16 {
        match self {
            Self::Declined => -1,
            Self::Completed => 0,
            Self::Accepted => 1,
            Self::AwaitAudit => 2,
            Self::AwaitPresident => 3,
            Self::AwaitCommittee => 4,
            Self::AwaitMember => 5,
        }
    }

    /// Builds a cursor from its stored numeric level.
    #[must_use]
    pub const fn from_level(level: i16) -> Option<Self> {
        match level {
            -1 => Some(Self::Declined),
            0 => Some(Self::Completed),
            1 => Some(Self::Accepted),
            2 => Some(Self::AwaitAudit),
            3 => Some(Self::AwaitPresident),
            4 => Some(Self::AwaitCommittee),
            5 => Some(Self::AwaitMember),
            _ => None,
        }
    }

    /// The state a request lands in after an actor of `tier` approves it,
    /// which is also the initial state for a submitter of that
    /// application tier.
    ///
    /// An audit-tier approval resolves the chain to `Accepted`; a
    /// visitor-tier submission starts at the bottom of the chain.
    #[must_use]
    pub const fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Audit => Self::Accepted,
            Tier::President => Self::AwaitAudit,
            Tier::Committee => Self::AwaitPresident,
            Tier::Member => Self::AwaitCommittee,
            Tier::Visitor => Self::AwaitMember,
        }
    }

    /// The tier whose approval (or rejection) this state is waiting for,
    /// if any. Exactly one tier senior to the state's numeric level.
    #[must_use]
    pub const fn approver_tier(self) -> Option<Tier> {
        match self {
            Self::AwaitAudit => Some(Tier::Audit),
            Self::AwaitPresident => Some(Tier::President),
            Self::AwaitCommittee => Some(Tier::Committee),
            Self::AwaitMember => Some(Tier::Member),
            Self::Declined | Self::Completed | Self::Accepted => None,
        }
    }

    /// Returns true if no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Declined | Self::Completed)
    }

    /// Returns the string representation of the cursor.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Declined => "declined",
            Self::Completed => "completed",
            Self::Accepted => "accepted",
            Self::AwaitAudit => "await_audit",
            Self::AwaitPresident => "await_president",
            Self::AwaitCommittee => "await_committee",
            Self::AwaitMember => "await_member",
        }
    }

    /// Parses a cursor from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "declined" => Some(Self::Declined),
            "completed" => Some(Self::Completed),
            "accepted" => Some(Self::Accepted),
            "await_audit" => Some(Self::AwaitAudit),
            "await_president" => Some(Self::AwaitPresident),
            "await_committee" => Some(Self::AwaitCommittee),
            "await_member" => Some(Self::AwaitMember),
            _ => None,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action posted against a request.
///
/// `Comment` never moves the cursor and doubles as the carrier for income
/// partial-receipt amounts. `Create` appears only in the audit trail of a
/// submission; it is not accepted through the transition endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Discussion entry; optionally a receipt amount on income requests.
    Comment,
    /// Advance the chain one tier.
    Approve,
    /// Decline the request.
    Reject,
    /// Submission of the request itself.
    Create,
    /// Owner withdraws the request.
    Cancel,
    /// Audit tier confirms the money has moved.
    Complete,
}

impl Action {
    /// Returns true if this action can move the cursor.
    #[must_use]
    pub const fn changes_cursor(self) -> bool {
        matches!(self, Self::Approve | Self::Reject | Self::Cancel | Self::Complete)
    }

    /// Returns the string representation of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Create => "create",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
        }
    }

    /// Parses an action from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "comment" => Some(Self::Comment),
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            "create" => Some(Self::Create),
            "cancel" => Some(Self::Cancel),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
