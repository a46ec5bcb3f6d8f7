use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::relationship::{compatible, normalize, RelationshipCategory};
use crate::config::{MatchConfig, ScoreWeights};
use crate::models::{
    CandidatePerson, EdgeKind, ExtractedPerson, FamilyGraph, MatchCandidate, PersonName, SubScores,
};

/// Given-name similarity when one side is only an initial of the other.
const INITIAL_SCORE: f64 = 0.8;
/// Given-name similarity for a known nickname or abbreviation.
const NICKNAME_SCORE: f64 = 0.92;

/// Nickname or clerk abbreviation -> formal given name (folded).
const NICKNAMES: &[(&str, &str)] = &[
    ("jon", "john"), ("johnny", "john"), ("jno", "john"), ("jack", "john"),
    ("wm", "william"), ("will", "william"), ("bill", "william"), ("billy", "william"),
    ("jas", "james"), ("jim", "james"), ("jos", "joseph"), ("joe", "joseph"),
    ("chas", "charles"), ("charley", "charles"), ("charlie", "charles"),
    ("thos", "thomas"), ("tom", "thomas"), ("geo", "george"),
    ("saml", "samuel"), ("sam", "samuel"), ("benj", "benjamin"), ("ben", "benjamin"),
    ("robt", "robert"), ("bob", "robert"), ("richd", "richard"), ("dick", "richard"),
    ("edw", "edward"), ("ned", "edward"), ("danl", "daniel"), ("dan", "daniel"),
    ("alex", "alexander"), ("harry", "henry"), ("hy", "henry"),
    ("polly", "mary"), ("molly", "mary"), ("mollie", "mary"), ("mamie", "mary"),
    ("peggy", "margaret"), ("maggie", "margaret"), ("meg", "margaret"), ("marg", "margaret"),
    ("betsy", "elizabeth"), ("betsey", "elizabeth"), ("eliza", "elizabeth"), ("liz", "elizabeth"),
    ("lizzie", "elizabeth"), ("beth", "elizabeth"), ("bess", "elizabeth"), ("eliz", "elizabeth"),
    ("patsy", "martha"), ("mattie", "martha"), ("sally", "sarah"), ("sallie", "sarah"),
    ("nancy", "ann"), ("annie", "ann"), ("anna", "ann"), ("jenny", "jane"), ("jennie", "jane"),
    ("kate", "catherine"), ("katie", "catherine"), ("kitty", "catherine"), ("cath", "catherine"),
    ("nellie", "eleanor"), ("nell", "eleanor"), ("fanny", "frances"), ("sukey", "susan"),
    ("susie", "susan"), ("lou", "louisa"), ("abby", "abigail"), ("nabby", "abigail"),
];

/// Household-level facts every pair in the household shares.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub census_year: Option<i32>,
    /// Census line of the head of household, if one was identified.
    pub head_line: Option<u32>,
    pub graph: &'a FamilyGraph,
}

/// Pure per-pair scoring.
pub struct AttributeScorer<'a> {
    config: &'a MatchConfig,
}

impl<'a> AttributeScorer<'a> {
    pub fn new(config: &'a MatchConfig) -> Self {
        Self { config }
    }

    pub fn score(
        &self,
        extracted: &ExtractedPerson,
        candidate: &CandidatePerson,
        ctx: &ScoringContext<'_>,
    ) -> MatchCandidate {
        let scores = SubScores {
            name: self.name_score(&extracted.name, &candidate.name),
            relationship: self.relationship_score(
                normalize(&extracted.relationship),
                candidate.relationship.as_deref().map(normalize),
            ),
            age: ctx
                .census_year
                .and_then(|year| self.age_score(extracted.age, candidate, year)),
            sex: sex_score(extracted, candidate),
            position: position_score(extracted.line, ctx.head_line, candidate, ctx.graph),
        };

        MatchCandidate {
            line: extracted.line,
            person_id: candidate.id,
            scores,
            composite: composite(&scores, &self.config.weights),
        }
    }

    /// Given and surname compared separately, then averaged over what is present.
    pub fn name_score(&self, extracted: &PersonName, candidate: &PersonName) -> Option<f64> {
        let given = given_similarity(&extracted.given, &candidate.given);
        let surname = surname_similarity(extracted, candidate);

        let base = match (given, surname.map(|(s, _)| s)) {
            (Some(g), Some(s)) => (g + s) / 2.0,
            (Some(g), None) => g,
            (None, Some(s)) => s,
            (None, None) => return None,
        };
        let bonus = match surname {
            Some((_, true)) => self.config.exact_surname_bonus,
            _ => 0.0,
        };
        Some((base + bonus).clamp(0.0, 1.0))
    }

    pub fn relationship_score(
        &self,
        extracted: RelationshipCategory,
        candidate: Option<RelationshipCategory>,
    ) -> Option<f64> {
        let candidate = candidate?;
        if extracted == RelationshipCategory::Unspecified
            || candidate == RelationshipCategory::Unspecified
        {
            return None;
        }
        Some(if extracted == candidate {
            1.0
        } else if compatible(extracted, candidate) {
            self.config.relationship_partial
        } else {
            0.0
        })
    }

    /// 1.0 inside the tolerance window, linear down to 0 at the max drift.
    pub fn age_score(&self, age: Option<u32>, candidate: &CandidatePerson, census_year: i32) -> Option<f64> {
        let age = i64::from(age?);
        let expected = candidate.expected_age(census_year)?;
        if expected < 0 {
            // Born after the census was taken.
            return Some(0.0);
        }

        let cfg = &self.config.age;
        let (mut tolerance, mut max_drift) = if census_year < cfg.early_era_before {
            (cfg.early_tolerance_years, cfg.early_max_drift_years)
        } else {
            (cfg.tolerance_years, cfg.max_drift_years)
        };
        if candidate.birth_year_approximate {
            tolerance = tolerance.saturating_add(cfg.approximate_birth_slack);
            max_drift = max_drift.saturating_add(cfg.approximate_birth_slack);
        }

        let diff = (age - expected).unsigned_abs() as f64;
        let (tolerance, max_drift) = (f64::from(tolerance), f64::from(max_drift));
        Some(if diff <= tolerance {
            1.0
        } else if diff >= max_drift {
            0.0
        } else {
            1.0 - (diff - tolerance) / (max_drift - tolerance)
        })
    }
}

/// Weighted mean over the sub-scores that are present.
pub fn composite(scores: &SubScores, weights: &ScoreWeights) -> f64 {
    let parts = [
        (scores.name, weights.name),
        (scores.relationship, weights.relationship),
        (scores.age, weights.age),
        (scores.sex, weights.sex),
        (scores.position, weights.position),
    ];

    let (sum, total_weight) = parts
        .iter()
        .filter_map(|(score, weight)| score.map(|s| (s * weight, *weight)))
        .fold((0.0, 0.0), |(acc, tw), (ws, w)| (acc + ws, tw + w));

    if total_weight <= 0.0 {
        0.0
    } else {
        (sum / total_weight).clamp(0.0, 1.0)
    }
}

fn sex_score(extracted: &ExtractedPerson, candidate: &CandidatePerson) -> Option<f64> {
    if !extracted.sex.is_known() || !candidate.sex.is_known() {
        return None;
    }
    Some(if extracted.sex == candidate.sex { 1.0 } else { 0.0 })
}

/// Row tier by offset from the head: 0 head, 1 the slot after (usually the
/// spouse), 2 everyone further down.
fn row_tier(line: u32, head_line: Option<u32>) -> Option<u8> {
    let offset = line.checked_sub(head_line?)?;
    Some(offset.min(2) as u8)
}

/// Tiers the candidate's recorded edges allow: a spouse or parent belongs at
/// the top of the household, someone recorded only as a child further down.
fn candidate_tiers(candidate: &CandidatePerson, graph: &FamilyGraph) -> Option<(u8, u8)> {
    let kinds = graph.kinds_of(candidate.id);
    if kinds.contains(&EdgeKind::Spouse) || kinds.contains(&EdgeKind::ParentOf) {
        Some((0, 1))
    } else if kinds.contains(&EdgeKind::ChildOf) {
        Some((2, 2))
    } else {
        None
    }
}

fn position_score(
    line: u32,
    head_line: Option<u32>,
    candidate: &CandidatePerson,
    graph: &FamilyGraph,
) -> Option<f64> {
    let tier = row_tier(line, head_line)?;
    let (lo, hi) = candidate_tiers(candidate, graph)?;
    let distance = if tier < lo { lo - tier } else { tier.saturating_sub(hi) };
    Some(match distance {
        0 => 1.0,
        1 => 0.5,
        _ => 0.0,
    })
}

/// Case-insensitive, diacritics removed, punctuation dropped.
pub fn fold(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_alphabetic() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn formal_name(token: &str) -> &str {
    NICKNAMES
        .iter()
        .find(|(nick, _)| *nick == token)
        .map(|(_, formal)| *formal)
        .unwrap_or(token)
}

fn given_similarity(a: &str, b: &str) -> Option<f64> {
    let (a, b) = (fold(a), fold(b));
    let first_a = a.split(' ').next().filter(|t| !t.is_empty())?;
    let first_b = b.split(' ').next().filter(|t| !t.is_empty())?;

    let mut best = strsim::jaro_winkler(&a, &b).max(strsim::jaro_winkler(first_a, first_b));

    if first_a.chars().count() == 1 || first_b.chars().count() == 1 {
        if first_a.chars().next() == first_b.chars().next() {
            best = best.max(INITIAL_SCORE);
        }
    } else if formal_name(first_a) == formal_name(first_b) && first_a != first_b {
        best = best.max(NICKNAME_SCORE);
    }

    Some(best)
}

/// Best pairing of all known surnames on both sides, plus whether any pair
/// is an exact match.
fn surname_similarity(extracted: &PersonName, candidate: &PersonName) -> Option<(f64, bool)> {
    let folded = |name: &PersonName| -> Vec<String> {
        std::iter::once(&name.surname)
            .chain(name.alternates.iter())
            .map(|s| fold(s))
            .filter(|s| !s.is_empty())
            .collect()
    };
    let left = folded(extracted);
    let right = folded(candidate);

    let mut best: Option<(f64, bool)> = None;
    for l in &left {
        for r in &right {
            let exact = l == r;
            let sim = if exact { 1.0 } else { strsim::jaro_winkler(l, r) };
            best = Some(match best {
                Some((s, e)) => (s.max(sim), e || exact),
                None => (sim, exact),
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FamilyEdge, PersonId, Sex};

    fn ctx(graph: &FamilyGraph) -> ScoringContext<'_> {
        ScoringContext { census_year: Some(1880), head_line: Some(1), graph }
    }

    #[test]
    fn fold_strips_diacritics_and_case() {
        assert_eq!(fold("  José  MÜLLER "), "jose muller");
        assert_eq!(fold("O'Brien"), "o brien");
    }

    #[test]
    fn nickname_and_initial_tolerance() {
        assert!(given_similarity("Wm", "William").unwrap() >= NICKNAME_SCORE);
        assert!(given_similarity("Polly", "Mary").unwrap() >= NICKNAME_SCORE);
        assert!(given_similarity("J.", "John").unwrap() >= INITIAL_SCORE);
        assert!(given_similarity("J.", "Mary").unwrap() < INITIAL_SCORE);
        assert!(given_similarity("", "Mary").is_none());
    }

    #[test]
    fn exact_surname_earns_bonus() {
        let cfg = MatchConfig::default();
        let scorer = AttributeScorer::new(&cfg);
        let exact = scorer
            .name_score(&PersonName::new("Mary", "Smith"), &PersonName::new("Maria", "Smith"))
            .unwrap();
        let close = scorer
            .name_score(&PersonName::new("Mary", "Smyth"), &PersonName::new("Maria", "Smith"))
            .unwrap();
        assert!(exact > close);
    }

    #[test]
    fn maiden_name_is_considered() {
        let cfg = MatchConfig::default();
        let scorer = AttributeScorer::new(&cfg);
        let census = PersonName::new("Mary", "Jones");
        let tree = PersonName::new("Mary", "Smith").with_alternate("Jones");
        assert_eq!(scorer.name_score(&census, &tree), Some(1.0));
    }

    #[test]
    fn relationship_identical_compatible_and_opposed() {
        let cfg = MatchConfig::default();
        let scorer = AttributeScorer::new(&cfg);
        use RelationshipCategory::*;
        assert_eq!(scorer.relationship_score(Spouse, Some(Spouse)), Some(1.0));
        assert_eq!(scorer.relationship_score(Boarder, Some(Lodger)), Some(0.6));
        assert_eq!(scorer.relationship_score(Spouse, Some(Child)), Some(0.0));
        assert_eq!(scorer.relationship_score(Unspecified, Some(Child)), None);
        assert_eq!(scorer.relationship_score(Child, None), None);
    }

    #[test]
    fn age_window_and_linear_decay() {
        let cfg = MatchConfig::default();
        let scorer = AttributeScorer::new(&cfg);
        let c = CandidatePerson::new(1, "Jon", "Smith").born(1840);

        assert_eq!(scorer.age_score(Some(40), &c, 1880), Some(1.0));
        assert_eq!(scorer.age_score(Some(42), &c, 1880), Some(1.0));
        let mid = scorer.age_score(Some(46), &c, 1880).unwrap();
        assert!((mid - 0.5).abs() < 1e-9);
        assert_eq!(scorer.age_score(Some(55), &c, 1880), Some(0.0));
        assert_eq!(scorer.age_score(None, &c, 1880), None);
    }

    #[test]
    fn extreme_inputs_stay_in_range() {
        let mut cfg = MatchConfig::default();
        cfg.age.approximate_birth_slack = u32::MAX;
        let scorer = AttributeScorer::new(&cfg);

        let mut approx = CandidatePerson::new(1, "Jon", "Smith").born(1840);
        approx.birth_year_approximate = true;
        assert_eq!(scorer.age_score(Some(90), &approx, 1880), Some(1.0));

        let corrupt = CandidatePerson::new(2, "Jon", "Smith").born(i32::MIN);
        assert_eq!(scorer.age_score(Some(40), &corrupt, 1880), Some(0.0));
        let future = CandidatePerson::new(3, "Jon", "Smith").born(i32::MAX);
        assert_eq!(scorer.age_score(Some(40), &future, 1880), Some(0.0));
    }

    #[test]
    fn early_censuses_allow_wider_drift() {
        let cfg = MatchConfig::default();
        let scorer = AttributeScorer::new(&cfg);
        let c = CandidatePerson::new(1, "Jon", "Smith").born(1800);
        // Eight years off: outside the modern window, inside the early one.
        let early = scorer.age_score(Some(48), &c, 1840).unwrap();
        let modern = scorer.age_score(Some(58), &c, 1850).unwrap();
        assert!(early > modern);
    }

    #[test]
    fn unknown_sex_is_neutral_not_penalised() {
        let cfg = MatchConfig::default();
        let scorer = AttributeScorer::new(&cfg);
        let graph = FamilyGraph::new();
        let row = ExtractedPerson::new(1, "Jon", "Smith").with_age(40).with_relationship("Head");
        let known = CandidatePerson::new(1, "John", "Smith").born(1840).with_relationship("Head");
        let unknown_row = row.clone().with_sex(Sex::Unknown);
        let male_cand = known.clone().with_sex(Sex::Male);

        let a = scorer.score(&unknown_row, &male_cand, &ctx(&graph));
        let b = scorer.score(&unknown_row, &known, &ctx(&graph));
        assert_eq!(a.scores.sex, None);
        assert_eq!(a.composite, b.composite);
    }

    #[test]
    fn composite_renormalises_over_present_scores() {
        let weights = ScoreWeights::default();
        let only_name = SubScores { name: Some(0.8), ..SubScores::default() };
        assert!((composite(&only_name, &weights) - 0.8).abs() < 1e-12);
        assert_eq!(composite(&SubScores::default(), &weights), 0.0);
    }

    #[test]
    fn position_rewards_spouse_after_head() {
        let graph = FamilyGraph::build(
            &[FamilyEdge::new(10, EdgeKind::Spouse, 11), FamilyEdge::new(10, EdgeKind::ParentOf, 12)],
            Vec::<&CandidatePerson>::new(),
        );
        let wife = CandidatePerson::new(11, "Mary", "Smith");
        let child = CandidatePerson::new(12, "Ann", "Smith");
        let loner = CandidatePerson::new(13, "Zed", "Smith");

        assert_eq!(position_score(2, Some(1), &wife, &graph), Some(1.0));
        assert_eq!(position_score(1, Some(1), &child, &graph), Some(0.0));
        assert_eq!(position_score(4, Some(1), &child, &graph), Some(1.0));
        assert_eq!(position_score(3, Some(1), &wife, &graph), Some(0.5));
        assert_eq!(position_score(2, Some(1), &loner, &graph), None);
        assert_eq!(position_score(2, None, &wife, &graph), None);
        assert_eq!(graph.kinds_of(PersonId(12)).len(), 1);
    }
}
