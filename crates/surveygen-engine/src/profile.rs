//! Choices offered by the profiling form. Signals are never checked against
//! these lists.

pub const INDUSTRIES: &[&str] = &[
    "Technology",
    "Healthcare",
    "Education",
    "Retail",
    "Finance",
    "Manufacturing",
    "Other",
];

pub const USE_CASES: &[&str] = &[
    "Employee Engagement",
    "Customer Satisfaction",
    "Market Research",
    "Event Feedback",
    "Product Feedback",
];

pub const ROLES: &[&str] = &[
    "HR Manager",
    "Marketing Manager",
    "Product Manager",
    "Executive",
    "Operations",
    "Researcher",
    "Other",
];

pub const TEAM_TYPES: &[&str] = &["Solo", "Team"];
