use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque database identifier of a person (record id in the family tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Sex {
    #[serde(alias = "M", alias = "m", alias = "male")]
    Male,
    #[serde(alias = "F", alias = "f", alias = "female")]
    Female,
    #[default]
    #[serde(alias = "U", alias = "u", alias = "unknown", alias = "")]
    Unknown,
}

impl Sex {
    pub fn is_known(&self) -> bool {
        !matches!(self, Sex::Unknown)
    }
}

/// Name components. Every part may be missing on a noisy census row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    #[serde(default)]
    pub given: String,
    #[serde(default)]
    pub surname: String,
    /// Maiden or alternate surnames.
    #[serde(default)]
    pub alternates: Vec<String>,
}

impl PersonName {
    pub fn new(given: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            given: given.into(),
            surname: surname.into(),
            alternates: Vec::new(),
        }
    }

    pub fn with_alternate(mut self, surname: impl Into<String>) -> Self {
        self.alternates.push(surname.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.given.trim().is_empty()
            && self.surname.trim().is_empty()
            && self.alternates.iter().all(|s| s.trim().is_empty())
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.given.trim(), self.surname.trim()) {
            ("", "") => write!(f, "<unnamed>"),
            (g, "") => write!(f, "{g}"),
            ("", s) => write!(f, "{s}"),
            (g, s) => write!(f, "{g} {s}"),
        }
    }
}

/// One transcribed census row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPerson {
    /// Line number on the census page.
    pub line: u32,
    pub name: PersonName,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Sex,
    /// Relationship to head, as written.
    #[serde(default)]
    pub relationship: String,
}

impl ExtractedPerson {
    pub fn new(line: u32, given: &str, surname: &str) -> Self {
        Self {
            line,
            name: PersonName::new(given, surname),
            age: None,
            sex: Sex::Unknown,
            relationship: String::new(),
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    pub fn with_relationship(mut self, relationship: &str) -> Self {
        self.relationship = relationship.to_string();
        self
    }

    /// A row with neither a name nor a relationship carries nothing to score.
    pub fn is_malformed(&self) -> bool {
        self.name.is_empty() && self.relationship.trim().is_empty()
    }

    /// Share of the scoreable fields that are filled in, in [0, 1].
    pub fn completeness(&self) -> f64 {
        let present = [
            !self.name.given.trim().is_empty(),
            !self.name.surname.trim().is_empty(),
            self.age.is_some(),
            self.sex.is_known(),
            !self.relationship.trim().is_empty(),
        ];
        present.iter().filter(|p| **p).count() as f64 / present.len() as f64
    }
}

/// All rows of one household/page plus the census year they were taken in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensusHousehold {
    pub household_id: String,
    #[serde(default)]
    pub census_year: Option<i32>,
    pub persons: Vec<ExtractedPerson>,
}

impl CensusHousehold {
    pub fn new(household_id: impl Into<String>, census_year: Option<i32>, persons: Vec<ExtractedPerson>) -> Self {
        Self {
            household_id: household_id.into(),
            census_year,
            persons,
        }
    }

    /// Rows that carry a name or a relationship.
    pub fn scoreable(&self) -> impl Iterator<Item = &ExtractedPerson> {
        self.persons.iter().filter(|p| !p.is_malformed())
    }

    /// Mean completeness of the scoreable rows; malformed rows are left
    /// out, and a household without scoreable rows counts as complete.
    pub fn completeness(&self) -> f64 {
        let (sum, count) = self
            .scoreable()
            .fold((0.0, 0usize), |(sum, count), p| (sum + p.completeness(), count + 1));
        if count == 0 {
            1.0
        } else {
            sum / count as f64
        }
    }
}

/// An existing family-tree person offered as a possible identity for a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePerson {
    pub id: PersonId,
    pub name: PersonName,
    #[serde(default)]
    pub birth_year: Option<i32>,
    /// Birth year derived from an "about"/"before" date or from a prior census age.
    #[serde(default)]
    pub birth_year_approximate: bool,
    #[serde(default)]
    pub sex: Sex,
    /// Relationship to the household head as the repository derives it from its tree.
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub family: Vec<super::FamilyLink>,
}

impl CandidatePerson {
    pub fn new(id: i64, given: &str, surname: &str) -> Self {
        Self {
            id: PersonId(id),
            name: PersonName::new(given, surname),
            birth_year: None,
            birth_year_approximate: false,
            sex: Sex::Unknown,
            relationship: None,
            family: Vec::new(),
        }
    }

    pub fn born(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    pub fn with_relationship(mut self, relationship: &str) -> Self {
        self.relationship = Some(relationship.to_string());
        self
    }

    pub fn with_link(mut self, kind: super::EdgeKind, other: i64) -> Self {
        self.family.push(super::FamilyLink {
            kind,
            other: PersonId(other),
        });
        self
    }

    /// Age the candidate would have had in `census_year`.
    pub fn expected_age(&self, census_year: i32) -> Option<i64> {
        self.birth_year.map(|b| i64::from(census_year) - i64::from(b))
    }
}
