use agentic_form_filler::matcher::{best_match, MatchTier};
use proptest::collection::hash_set;
use proptest::prelude::*;

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn exact_label_is_found_in_any_case_and_padding(
        words in hash_set("[a-z]{1,10}( [a-z]{1,6})?", 1..8),
        pick in any::<prop::sample::Index>(),
        upper in any::<bool>(),
        pad_left in 0usize..3,
        pad_right in 0usize..3,
    ) {
        let labels: Vec<String> = words.iter().map(|w| capitalize(w)).collect();
        let target = pick.get(&labels);
        let cased = if upper { target.to_uppercase() } else { target.to_lowercase() };
        let requested = format!("{}{}{}", " ".repeat(pad_left), cased, "\t".repeat(pad_right));

        let found = best_match(&requested, &labels).expect("exact label must match");
        prop_assert_eq!(&found.label, target);
        prop_assert_eq!(found.tier, MatchTier::Exact);
    }

    #[test]
    fn unique_strict_prefix_selects_its_label(
        prefix in "[a-z]{2,5}",
        suffix in "[a-z]{1,5}",
        others in hash_set("[a-z]{1,10}", 0..6),
        position in 0usize..6,
    ) {
        let others: Vec<String> = others
            .into_iter()
            .filter(|o| !o.starts_with(&prefix))
            .collect();
        let target = format!("{prefix}{suffix}");
        let mut labels = others;
        let at = position.min(labels.len());
        labels.insert(at, target.clone());

        let found = best_match(&prefix, &labels).expect("prefix must match");
        prop_assert_eq!(found.label, target);
        prop_assert_eq!(found.tier, MatchTier::Prefix);
        prop_assert_eq!(found.index, at);
    }
}

#[test]
fn male_female_example() {
    let found = best_match("male", &["Male", "Female"]).unwrap();
    assert_eq!(found.label, "Male");
}

#[test]
fn trader_example() {
    let found = best_match("Trader", &["Trader / Shop Assistant", "Teacher"]).unwrap();
    assert_eq!(found.label, "Trader / Shop Assistant");
    assert_eq!(found.tier, MatchTier::Prefix);
}
