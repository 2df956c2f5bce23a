//! Organization hierarchy types: privilege tiers and departments.

use serde::{Deserialize, Serialize};

/// A rank in the organizational privilege hierarchy.
///
/// Tiers are ordered by seniority with LOWER rank numbers being MORE
/// senior: Audit(1) > President(2) > Committee(3) > Member(4) > Visitor(5).
/// The approval chain descends one tier per approval, so each approval must
/// come from the immediately next-senior tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Audits and issues the actual payment/receipt (most senior).
    Audit,
    /// Presidency; approves after committee, any department.
    President,
    /// Department committee member.
    Committee,
    /// Ordinary member.
    Member,
    /// Guest account with no standing in the approval chain.
    Visitor,
}

impl Tier {
    /// All tiers, most senior first.
    pub const ALL: [Self; 5] = [
        Self::Audit,
        Self::President,
        Self::Committee,
        Self::Member,
        Self::Visitor,
    ];

    /// Numeric rank; lower is more senior.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Audit => 1,
            Self::President => 2,
            Self::Committee => 3,
            Self::Member => 4,
            Self::Visitor => 5,
        }
    }

    /// Builds a tier from its numeric rank.
    #[must_use]
    pub const fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Self::Audit),
            2 => Some(Self::President),
            3 => Some(Self::Committee),
            4 => Some(Self::Member),
            5 => Some(Self::Visitor),
            _ => None,
        }
    }

    /// Returns true if `self` is at least as senior as `other`.
    #[must_use]
    pub const fn is_senior_or_equal(self, other: Self) -> bool {
        self.rank() <= other.rank()
    }

    /// Returns the string representation of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Audit => "audit",
            Self::President => "president",
            Self::Committee => "committee",
            Self::Member => "member",
            Self::Visitor => "visitor",
        }
    }

    /// Parses a tier from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "audit" => Some(Self::Audit),
            "president" => Some(Self::President),
            "committee" => Some(Self::Committee),
            "member" => Some(Self::Member),
            "visitor" => Some(Self::Visitor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Departments of the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    /// Presidency.
    President,
    /// Secretariat.
    Secretary,
    /// Treasury.
    Treasurer,
    /// Careers.
    Careers,
    /// Media.
    Media,
    /// Sponsorship.
    Sponsorship,
    /// Arts.
    Arts,
    /// Culture.
    Culture,
    /// External relations and entertainment.
    Entertainment,
    /// Sports.
    Sports,
    /// Unassigned.
    General,
}

impl Department {
    /// Returns the string representation of the department.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::President => "president",
            Self::Secretary => "secretary",
            Self::Treasurer => "treasurer",
            Self::Careers => "careers",
            Self::Media => "media",
            Self::Sponsorship => "sponsorship",
            Self::Arts => "arts",
            Self::Culture => "culture",
            Self::Entertainment => "entertainment",
            Self::Sports => "sports",
            Self::General => "general",
        }
    }

    /// Parses a department from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "president" => Some(Self::President),
            "secretary" => Some(Self::Secretary),
            "treasurer" => Some(Self::Treasurer),
            "careers" => Some(Self::Careers),
            "media" => Some(Self::Media),
            "sponsorship" => Some(Self::Sponsorship),
            "arts" => Some(Self::Arts),
            "culture" => Some(Self::Culture),
            "entertainment" => Some(Self::Entertainment),
            "sports" => Some(Self::Sports),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
