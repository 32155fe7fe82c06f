use proptest::prelude::*;
use runblock_lib::fence::{parse_blocks, pick_block};

fn doc_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("```".to_string()),
        Just("~~~".to_string()),
        Just("```sh".to_string()),
        Just("~~~json".to_string()),
        Just("  ```python  ".to_string()),
        Just("````".to_string()),
        Just(String::new()),
        "[a-z ]{0,12}",
        "echo [a-z]{1,6}\r",
    ]
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(doc_line(), 0..40).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn blocks_are_ordered_and_disjoint(text in document()) {
        let blocks = parse_blocks(&text);

        for block in &blocks {
            prop_assert!(block.start < block.code_start);
            prop_assert!(block.code_start <= block.code_end);
            prop_assert!(block.code_end < block.end);
            prop_assert!(block.end <= text.len());
            prop_assert!(!block.code.contains("\r\n"));
            prop_assert!(block.range().contains(&block.code_start));
            prop_assert!(text[block.code_range()].replace("\r\n", "\n").starts_with(&block.code));
        }
        for pair in blocks.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn some_block_is_always_selected(text in document(), cursor in 0usize..2000) {
        let blocks = parse_blocks(&text);
        let picked = pick_block(&blocks, cursor);
        prop_assert_eq!(picked.is_some(), !blocks.is_empty());

        if let Some(picked) = picked {
            if blocks.iter().any(|b| b.contains(cursor)) {
                prop_assert!(picked.contains(cursor));
            } else {
                let best = blocks.iter().map(|b| b.distance_from(cursor)).min().unwrap_or(0);
                prop_assert_eq!(picked.distance_from(cursor), best);
            }
        }
    }
}
