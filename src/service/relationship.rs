use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical relationship-to-head categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipCategory {
    Head,
    Spouse,
    Child,
    StepChild,
    Grandchild,
    Parent,
    Sibling,
    InLaw,
    /// Niece, nephew, cousin, aunt, uncle, grandparent, unspecified relative.
    Extended,
    Boarder,
    Lodger,
    Visitor,
    Servant,
    Inmate,
    /// Generic household member (tally-era censuses). Wildcard.
    Member,
    /// Nothing written.
    Unspecified,
    /// Written but not recognised.
    Other,
}

use RelationshipCategory::*;

/// Pairs of categories two sources may use for the same real relationship.
/// Membership is explicit; compatibility is not inferred across groups.
const COMPATIBILITY_GROUPS: &[&[RelationshipCategory]] = &[
    &[Child, StepChild],
    &[Child, Grandchild],
    &[Grandchild, Extended],
    &[Parent, InLaw],
    &[Sibling, InLaw],
    &[InLaw, Extended],
    &[Boarder, Lodger, Visitor],
];

/// Categories compatible with every other category, `Other` included.
const WILDCARDS: &[RelationshipCategory] = &[Member];

const ALIASES: &[(&str, RelationshipCategory)] = &[
    ("head", Head),
    ("head of household", Head),
    ("hd", Head),
    ("h", Head),
    ("self", Head),
    ("wife", Spouse),
    ("husband", Spouse),
    ("spouse", Spouse),
    ("partner", Spouse),
    ("w", Spouse),
    ("wf", Spouse),
    ("son", Child),
    ("daughter", Child),
    ("dau", Child),
    ("dtr", Child),
    ("child", Child),
    ("s", Child),
    ("d", Child),
    ("adopted son", Child),
    ("adopted daughter", Child),
    ("adopted child", Child),
    ("stepson", StepChild),
    ("step son", StepChild),
    ("stepdaughter", StepChild),
    ("step daughter", StepChild),
    ("stepchild", StepChild),
    ("step child", StepChild),
    ("grandson", Grandchild),
    ("granddaughter", Grandchild),
    ("grandchild", Grandchild),
    ("gs", Grandchild),
    ("gd", Grandchild),
    ("father", Parent),
    ("mother", Parent),
    ("parent", Parent),
    ("brother", Sibling),
    ("sister", Sibling),
    ("sibling", Sibling),
    ("bro", Sibling),
    ("sis", Sibling),
    ("niece", Extended),
    ("nephew", Extended),
    ("cousin", Extended),
    ("aunt", Extended),
    ("uncle", Extended),
    ("grandmother", Extended),
    ("grandfather", Extended),
    ("grandparent", Extended),
    ("relative", Extended),
    ("boarder", Boarder),
    ("bd", Boarder),
    ("bdr", Boarder),
    ("lodger", Lodger),
    ("roomer", Lodger),
    ("ldg", Lodger),
    ("visitor", Visitor),
    ("guest", Visitor),
    ("servant", Servant),
    ("svt", Servant),
    ("serv", Servant),
    ("domestic", Servant),
    ("housekeeper", Servant),
    ("hired man", Servant),
    ("hired girl", Servant),
    ("farm hand", Servant),
    ("laborer", Servant),
    ("apprentice", Servant),
    ("employee", Servant),
    ("inmate", Inmate),
    ("patient", Inmate),
    ("prisoner", Inmate),
    ("pupil", Inmate),
    ("member", Member),
    ("family", Member),
    ("household member", Member),
];

impl RelationshipCategory {
    /// Anything written and understood.
    pub fn is_recognized(self) -> bool {
        !matches!(self, Other | Unspecified)
    }

    pub fn is_kin(self) -> bool {
        matches!(
            self,
            Head | Spouse | Child | StepChild | Grandchild | Parent | Sibling | InLaw | Extended
        )
    }
}

impl fmt::Display for RelationshipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Head => "head",
            Spouse => "spouse",
            Child => "child",
            StepChild => "stepchild",
            Grandchild => "grandchild",
            Parent => "parent",
            Sibling => "sibling",
            InLaw => "in-law",
            Extended => "extended",
            Boarder => "boarder",
            Lodger => "lodger",
            Visitor => "visitor",
            Servant => "servant",
            Inmate => "inmate",
            Member => "member",
            Unspecified => "unspecified",
            Other => "other",
        };
        f.write_str(label)
    }
}

/// Lowercase, turn punctuation into spaces, collapse whitespace.
fn clean(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map a free-text census relationship onto its canonical category.
pub fn normalize(raw: &str) -> RelationshipCategory {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return Unspecified;
    }
    if let Some((_, category)) = ALIASES.iter().find(|(alias, _)| *alias == cleaned) {
        return *category;
    }
    // "Mother in law", "Son-in-law", "Bro in law"
    if cleaned.ends_with(" in law") {
        return InLaw;
    }
    Other
}

/// Reflexive and symmetric; not transitive.
pub fn compatible(a: RelationshipCategory, b: RelationshipCategory) -> bool {
    if a == b {
        return true;
    }
    if a == Unspecified || b == Unspecified {
        return false;
    }
    if WILDCARDS.contains(&a) || WILDCARDS.contains(&b) {
        return true;
    }
    COMPATIBILITY_GROUPS
        .iter()
        .any(|group| group.contains(&a) && group.contains(&b))
}
