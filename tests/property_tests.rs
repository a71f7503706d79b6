//! Tests de propriétés (proptest) sur les contrôles et la recherche d'échanges.
//!
//! ```bash
//! PROPTEST_CASES=2000 cargo test --test property_tests
//! ```

use garde::{
    overlap, suggest_swaps, validate, ErrorKind, ShiftInterval, ShiftKind, SwapOptions, SwapQuery,
};
use proptest::prelude::*;

const DOCTORS: &[&str] = &["ali", "veli", "can", "ece"];

fn kind() -> impl Strategy<Value = ShiftKind> {
    prop_oneof![
        Just(ShiftKind::Full),
        Just(ShiftKind::Morning),
        Just(ShiftKind::Evening),
        Just(ShiftKind::Long),
        Just(ShiftKind::Day),
    ]
}

fn interval() -> impl Strategy<Value = ShiftInterval> {
    (0..DOCTORS.len(), 1u32..8, kind(), 1usize..4)
        .prop_map(|(d, day, k, col)| ShiftInterval::new(DOCTORS[d], day, k, col, ""))
}

fn roster() -> impl Strategy<Value = Vec<ShiftInterval>> {
    prop::collection::vec(interval(), 0..30)
}

proptest! {
    #[test]
    fn validate_is_idempotent(shifts in roster()) {
        prop_assert_eq!(validate(&shifts), validate(&shifts));
    }

    #[test]
    fn overlap_is_symmetric(a in interval(), b in interval()) {
        prop_assert_eq!(overlap(&a, &b), overlap(&b, &a));
    }

    #[test]
    fn full_shift_never_shares_a_day(shifts in roster()) {
        let errors = validate(&shifts);
        for s in shifts.iter().filter(|s| s.shift_type == ShiftKind::Full) {
            let same_day = shifts
                .iter()
                .filter(|o| o.day == s.day && o.doctor_name == s.doctor_name)
                .count();
            if same_day > 1 {
                let flagged = errors.iter().any(|e| {
                    matches!(e.kind, ErrorKind::Duplicate | ErrorKind::Overlap)
                        && e.day == Some(s.day)
                        && e.doctor.as_deref() == Some(s.doctor_name.as_str())
                });
                prop_assert!(flagged, "24h of {} on day {} not flagged", s.doctor_name, s.day);
            }
        }
    }

    #[test]
    fn swaps_conserve_hours(shifts in roster(), d in 0..DOCTORS.len(), day in 1u32..8) {
        let doctor = DOCTORS[d];
        let opts = SwapOptions::default();
        let found = suggest_swaps(&shifts, doctor, day, &SwapQuery::new(), opts);
        let hours_of = |who: &str, on: u32| -> u32 {
            shifts
                .iter()
                .filter(|s| s.doctor_name == who && s.day == on)
                .map(|s| s.hours)
                .sum()
        };
        prop_assert!(found.len() <= opts.max_results);
        for s in &found {
            prop_assert_eq!(hours_of(&s.problem_doctor, s.problem_day), s.hours);
            prop_assert_eq!(hours_of(&s.candidate_doctor, s.candidate_day), s.hours);
            prop_assert!(s.conflicts.len() <= opts.max_conflicts);
            prop_assert_ne!(s.candidate_day, day);
            prop_assert_ne!(s.candidate_doctor.as_str(), doctor);
        }
        prop_assert!(found.windows(2).all(|w| w[0].conflicts.len() <= w[1].conflicts.len()));
    }
}
