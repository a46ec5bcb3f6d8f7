use census_linker::models::{
    CandidatePerson, CensusHousehold, EdgeKind, ExtractedPerson, FamilyEdge, MatchOutcome,
    PersonId, Sex, UnmatchedReason,
};
use census_linker::sources::{InMemorySource, MatchPipeline};
use census_linker::{telemetry, HouseholdInput, HouseholdMatcher, MatchConfig, MatchError};

fn matcher() -> HouseholdMatcher {
    telemetry::init_for_tests();
    HouseholdMatcher::new(MatchConfig::default()).unwrap()
}

fn smith_household() -> CensusHousehold {
    CensusHousehold::new(
        "1880-ED45-p2-h11",
        Some(1880),
        vec![
            ExtractedPerson::new(1, "Jon", "Smith")
                .with_age(40)
                .with_sex(Sex::Male)
                .with_relationship("Head"),
            ExtractedPerson::new(2, "Mary", "Smith")
                .with_age(38)
                .with_sex(Sex::Female)
                .with_relationship("Wife"),
        ],
    )
}

fn smith_candidates() -> Vec<CandidatePerson> {
    vec![
        CandidatePerson::new(101, "John", "Smith")
            .born(1840)
            .with_sex(Sex::Male)
            .with_relationship("Head"),
        CandidatePerson::new(102, "Mary", "Smith")
            .born(1842)
            .with_sex(Sex::Female)
            .with_relationship("Wife"),
        CandidatePerson::new(250, "Ezra", "Whitcomb").born(1801).with_sex(Sex::Male),
    ]
}

// -------------------------------------------------------------------------
// Head and wife against three candidates
// -------------------------------------------------------------------------

#[test]
fn head_and_wife_both_matched() {
    let out = matcher()
        .match_household(&smith_household(), &smith_candidates(), &[])
        .unwrap();

    assert_eq!(out.results.len(), 2);
    assert_eq!(out.results[0].person_id(), Some(PersonId(101)));
    assert_eq!(out.results[1].person_id(), Some(PersonId(102)));
    assert!(out.validation.consistent);
    assert!(out.validation.conflicts.is_empty());
    assert_eq!(out.statistics.matched, 2);
    assert_eq!(out.statistics.conflicts, 0);

    for r in &out.results {
        assert!(r.confidence().unwrap() >= out.threshold);
    }
    let scores = out.statistics.scores.unwrap();
    assert!(scores.min <= scores.median && scores.median <= scores.max);
}

#[test]
fn recorded_spouse_edge_is_consistent() {
    let edges = [FamilyEdge::new(101, EdgeKind::Spouse, 102)];
    let out = matcher()
        .match_household(&smith_household(), &smith_candidates(), &edges)
        .unwrap();
    assert_eq!(out.statistics.matched, 2);
    assert!(out.validation.consistent);
}

#[test]
fn siblings_in_tree_flag_a_conflict_but_keep_matches() {
    let edges = [FamilyEdge::new(101, EdgeKind::Sibling, 102)];
    let out = matcher()
        .match_household(&smith_household(), &smith_candidates(), &edges)
        .unwrap();

    assert_eq!(out.statistics.matched, 2);
    assert!(!out.validation.consistent);
    assert_eq!(out.validation.conflicts.len(), 1);
    assert_eq!(out.statistics.conflicts, 1);

    let conflict = &out.validation.conflicts[0];
    assert_eq!((conflict.line_a, conflict.line_b), (1, 2));
    assert_eq!(conflict.implied, EdgeKind::Spouse);
    assert_eq!(conflict.recorded, vec![EdgeKind::Sibling]);
}

// -------------------------------------------------------------------------
// Witness / Unmatched
// -------------------------------------------------------------------------

#[test]
fn boarder_without_strong_candidate_is_witness() {
    let household = CensusHousehold::new(
        "1880-ED45-p2-h12",
        Some(1880),
        vec![ExtractedPerson::new(17, "Patrick", "Kelly")
            .with_age(25)
            .with_sex(Sex::Male)
            .with_relationship("Boarder")],
    );
    let candidates = [CandidatePerson::new(250, "Ezra", "Whitcomb").born(1801).with_sex(Sex::Male)];

    let out = matcher().match_household(&household, &candidates, &[]).unwrap();
    let row = &out.results[0];

    assert_eq!(row.outcome, MatchOutcome::Witness);
    assert!(row.confidence().is_none());
    let best = row.best.as_ref().unwrap();
    assert!(best.composite < out.threshold);
    assert_eq!(out.statistics.witness, 1);
}

#[test]
fn exact_name_off_the_best_pair_still_makes_a_witness() {
    let household = CensusHousehold::new(
        "1880-ED45-p2-h16",
        Some(1880),
        vec![ExtractedPerson::new(5, "Mary", "Smith").with_age(30).with_sex(Sex::Female)],
    );
    // Exact name but wrong age and sex, against a closer-aged stranger and
    // two distant names that push the threshold to its cap.
    let exact = CandidatePerson::new(401, "Mary", "Smith").born(1800).with_sex(Sex::Male);
    let others = vec![
        CandidatePerson::new(402, "Mae", "Quux").born(1850).with_sex(Sex::Female),
        CandidatePerson::new(403, "Olof", "Quist").born(1790).with_sex(Sex::Male),
        CandidatePerson::new(404, "Otto", "Quist").born(1790).with_sex(Sex::Male),
    ];
    let mut pool = others.clone();
    pool.push(exact);

    let m = matcher();
    let out = m.match_household(&household, &pool, &[]).unwrap();
    let row = &out.results[0];
    assert_eq!(row.outcome, MatchOutcome::Witness);
    let best = row.best.as_ref().unwrap();
    assert_eq!(best.person_id, PersonId(402));
    assert!(best.scores.name.unwrap() < 0.5);

    let without = m.match_household(&household, &others, &[]).unwrap();
    assert_eq!(
        without.results[0].outcome,
        MatchOutcome::Unmatched { reason: UnmatchedReason::NoSignal }
    );
}

#[test]
fn empty_row_is_unmatched_with_reason() {
    let household = CensusHousehold::new(
        "1880-ED45-p2-h13",
        Some(1880),
        vec![
            ExtractedPerson::new(1, "", ""),
            ExtractedPerson::new(2, "Jon", "Smith")
                .with_age(40)
                .with_sex(Sex::Male)
                .with_relationship("Head"),
        ],
    );
    let out = matcher()
        .match_household(&household, &smith_candidates(), &[])
        .unwrap();

    assert_eq!(
        out.results[0].outcome,
        MatchOutcome::Unmatched { reason: UnmatchedReason::MalformedRow }
    );
    assert_eq!(
        UnmatchedReason::MalformedRow.describe(),
        "row has neither a name nor a relationship"
    );
    assert_eq!(out.results[1].person_id(), Some(PersonId(101)));
}

// -------------------------------------------------------------------------
// Global assignment and tie-breaks
// -------------------------------------------------------------------------

#[test]
fn competing_rows_get_the_globally_best_pairing() {
    // Father and son share a name; ages decide who is who.
    let household = CensusHousehold::new(
        "1900-ED3-p9-h2",
        Some(1900),
        vec![
            ExtractedPerson::new(1, "William", "Hale").with_age(52).with_sex(Sex::Male).with_relationship("Head"),
            ExtractedPerson::new(3, "Wm", "Hale").with_age(24).with_sex(Sex::Male).with_relationship("Son"),
        ],
    );
    let candidates = [
        CandidatePerson::new(7, "William", "Hale").born(1876).with_sex(Sex::Male),
        CandidatePerson::new(8, "William", "Hale").born(1848).with_sex(Sex::Male),
    ];

    let out = matcher().match_household(&household, &candidates, &[]).unwrap();
    assert_eq!(out.result_for_line(1).unwrap().person_id(), Some(PersonId(8)));
    assert_eq!(out.result_for_line(3).unwrap().person_id(), Some(PersonId(7)));
}

#[test]
fn tie_prefers_candidate_connected_to_household() {
    let household = CensusHousehold::new(
        "1880-ED45-p2-h14",
        Some(1880),
        vec![
            ExtractedPerson::new(1, "Jon", "Smith").with_age(40).with_sex(Sex::Male).with_relationship("Head"),
            ExtractedPerson::new(2, "Ann", "Smith").with_age(10).with_sex(Sex::Female).with_relationship("Dau"),
        ],
    );
    // Two identical Ann Smiths; only 305 is recorded as the head's daughter.
    let candidates = [
        CandidatePerson::new(101, "John", "Smith").born(1840).with_sex(Sex::Male),
        CandidatePerson::new(303, "Ann", "Smith").born(1870).with_sex(Sex::Female).with_link(EdgeKind::ChildOf, 900),
        CandidatePerson::new(305, "Ann", "Smith").born(1870).with_sex(Sex::Female).with_link(EdgeKind::ChildOf, 101),
    ];

    let out = matcher().match_household(&household, &candidates, &[]).unwrap();
    assert_eq!(out.results[1].person_id(), Some(PersonId(305)));
    assert!(out.validation.consistent);
}

#[test]
fn tie_without_support_takes_lower_id() {
    let household = CensusHousehold::new(
        "1880-ED45-p2-h15",
        Some(1880),
        vec![ExtractedPerson::new(4, "Ann", "Smith").with_age(10).with_sex(Sex::Female)],
    );
    let candidates = [
        CandidatePerson::new(305, "Ann", "Smith").born(1870).with_sex(Sex::Female),
        CandidatePerson::new(303, "Ann", "Smith").born(1870).with_sex(Sex::Female),
    ];
    let out = matcher().match_household(&household, &candidates, &[]).unwrap();
    assert_eq!(out.results[0].person_id(), Some(PersonId(303)));
}

// -------------------------------------------------------------------------
// Determinism and structural errors
// -------------------------------------------------------------------------

#[test]
fn identical_input_gives_identical_bytes() {
    let m = matcher();
    let edges = [FamilyEdge::new(101, EdgeKind::Sibling, 102)];
    let a = m.match_household(&smith_household(), &smith_candidates(), &edges).unwrap();
    let b = m.match_household(&smith_household(), &smith_candidates(), &edges).unwrap();
    assert_eq!(
        serde_json::to_string(&a.results).unwrap(),
        serde_json::to_string(&b.results).unwrap()
    );

    let mut reversed = smith_candidates();
    reversed.reverse();
    let c = m.match_household(&smith_household(), &reversed, &edges).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&c).unwrap()
    );
}

#[test]
fn duplicate_candidate_ids_are_a_caller_error() {
    let mut candidates = smith_candidates();
    candidates.push(CandidatePerson::new(101, "Johnny", "Smith"));
    let err = matcher()
        .match_household(&smith_household(), &candidates, &[])
        .unwrap_err();
    assert_eq!(err, MatchError::DuplicateCandidate { id: PersonId(101) });
    assert!(err.is_structural());
}

// -------------------------------------------------------------------------
// Batches
// -------------------------------------------------------------------------

#[test]
fn batch_matches_households_independently() {
    let m = matcher();
    let inputs = vec![
        HouseholdInput { household: smith_household(), candidates: smith_candidates(), edges: vec![] },
        HouseholdInput {
            household: CensusHousehold::new("empty", Some(1880), vec![]),
            candidates: vec![],
            edges: vec![],
        },
        HouseholdInput {
            household: smith_household(),
            candidates: vec![CandidatePerson::new(1, "A", "B"), CandidatePerson::new(1, "C", "D")],
            edges: vec![],
        },
    ];

    let outcomes = m.match_households(&inputs);
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].as_ref().unwrap().statistics.matched, 2);
    assert_eq!(outcomes[1].as_ref().unwrap().results.len(), 0);
    assert!(outcomes[2].is_err());

    let summary = HouseholdMatcher::summarize(&outcomes);
    assert_eq!(summary.households, 2);
    assert_eq!(summary.failed_households, 1);
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.total, 2);
}

#[test]
fn pipeline_runs_from_json_fixture() {
    let inputs = vec![HouseholdInput {
        household: smith_household(),
        candidates: smith_candidates(),
        edges: vec![FamilyEdge::new(101, EdgeKind::Spouse, 102)],
    }];
    let json = serde_json::to_string(&inputs).unwrap();
    let source = InMemorySource::from_json(&json).unwrap();

    let m = matcher();
    let pipeline = MatchPipeline::new(&m, &source, &source);
    let out = pipeline.run(&source.household_ids());

    assert_eq!(out.len(), 1);
    let household = out[0].as_ref().unwrap();
    assert_eq!(household.household_id, "1880-ED45-p2-h11");
    assert_eq!(household.statistics.matched, 2);
}
