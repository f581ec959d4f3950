//! Rule-by-rule normalization cases
//!
//! Each case feeds one raw transcript line through the full rule sequence
//! and checks the cleaned result.

use addex_config::load_defaults;
use addex_extract::extract::normalize::Normalizer;
use rstest::rstest;

fn normalizer() -> Normalizer {
    Normalizer::new(&load_defaults().unwrap())
}

#[rstest]
// Page references, in both body and appendix form.
#[case("7 score = w (p. 131)", " score = w ")]
#[case("7 score = w (p. E-4)", " score = w ")]
// Leading numbering and known stray tokens.
#[case("12 x = y", " x = y")]
#[case("D x = y", "x = y")]
#[case("RA x = y", "x = y")]
// Encoding artifacts.
#[case("s = â€™a'", "s = 'a'")]
#[case("s = \u{92}a\u{92}", "s = 'a'")]
// Spacing and dash repair.
#[case("3 if(a > b)", " if (a > b)")]
#[case("3 x = y - ", " x = y")]
#[case("3 track_- id", " track_id")]
#[case("3 foo( a, b )", " foo(a, b)")]
fn cleans_line(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(normalizer().normalize(input), expected);
}

#[rstest]
// Chained field access becomes string-keyed mapping access on the receiver,
// index suffixes and trailing punctuation carried through.
#[case(
    "params.target_db.hyp_track_db[STM]",
    "this.params[\"target_db\"][\"hyp_track_db\"][STM]"
)]
#[case("x = params.cycle_time;", "x = this.params[\"cycle_time\"];")]
#[case("foo(params.cycle_time)", "foo(this.params[\"cycle_time\"])")]
// The explicit call form collapses to a bare field access.
#[case("foo(params(), x)", "foo(this.params, x)")]
#[case("x = params()", "x = this.params")]
fn rewrites_params_idiom(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(normalizer().normalize(input), expected);
}

#[rstest]
#[case("x = target_db[i]", "x = this.target_db[i]")]
#[case("update(modecIntervals)", "update(this.modecIntervals)")]
#[case("alt = own.alt_baro", "alt = this.own.alt_baro")]
// Already-qualified occurrences are left alone.
#[case("x = this.target_db[i]", "x = this.target_db[i]")]
fn qualifies_bare_globals(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(normalizer().normalize(input), expected);
}

#[test]
fn global_declarations_are_elided() {
    let n = normalizer();
    assert_eq!(n.normalize("4 global target_db"), "");
    assert_eq!(n.normalize("4 global hyp_track_db"), "");
}

#[test]
fn params_rewrite_does_not_requalify_its_own_keys() {
    // The string keys produced by the params rewrite name global-context
    // fields; they must not pick up a second receiver.
    let n = normalizer();
    assert_eq!(
        n.normalize("params.target_db.hyp_track_db[STM]"),
        "this.params[\"target_db\"][\"hyp_track_db\"][STM]"
    );
}

#[test]
fn bracket_collapse_is_idempotent() {
    let n = normalizer();
    let once = n.normalize("foo( a, b )");
    assert_eq!(n.normalize(&once), once);
}
