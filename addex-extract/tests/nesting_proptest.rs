//! Property tests for block-nesting balance
//!
//! For any well-formed definition (matching openers and `end`s in valid
//! nesting order) the counter must stay positive inside the body, return to
//! exactly zero at the close, and the indentation engine must accept every
//! line.

use addex_config::load_defaults;
use addex_extract::extract::indentation::Indenter;
use addex_extract::extract::nesting::NestingCounter;
use proptest::prelude::*;

/// A balanced block: an opener line, nested child blocks or plain
/// statements, and a closing `end`. Statement identifiers carry a `_v`
/// suffix so they can never collide with a keyword.
fn block_lines() -> impl Strategy<Value = Vec<String>> {
    let statement = "[a-z]{1,4}_v = [0-9]{1,3}".prop_map(|s| vec![s]);
    statement.prop_recursive(3, 24, 3, |inner| {
        (
            prop::sample::select(vec!["if cond_v", "for i_v = 1:n_v", "while cond_v"]),
            prop::collection::vec(inner, 0..3),
        )
            .prop_map(|(opener, children)| {
                let mut lines = vec![opener.to_string()];
                for child in children {
                    lines.extend(child);
                }
                lines.push("end".to_string());
                lines
            })
    })
}

proptest! {
    #[test]
    fn balanced_definitions_close_at_zero(blocks in prop::collection::vec(block_lines(), 0..4)) {
        let config = load_defaults().unwrap();
        let mut counter = NestingCounter::new(&config.keywords);
        let mut indenter = Indenter::new(&config.keywords, config.output.indent_width);

        counter.observe("function Foo_v()").unwrap();
        indenter.apply("function Foo_v()").unwrap();
        for block in &blocks {
            for line in block {
                counter.observe(line).unwrap();
                indenter.apply(line).unwrap();
                // The enclosing function stays open throughout the body.
                prop_assert!(counter.depth() >= 1);
            }
        }
        counter.observe("end").unwrap();
        indenter.apply("end").unwrap();
        prop_assert!(counter.is_balanced());
    }

    #[test]
    fn statement_lines_never_move_the_counter(name in "[a-z]{1,8}_v", value in 0u32..1000) {
        let config = load_defaults().unwrap();
        let mut counter = NestingCounter::new(&config.keywords);
        counter.observe(&format!("{} = {}", name, value)).unwrap();
        prop_assert_eq!(counter.depth(), 0);
    }
}
