//! Property tests for the record tokenizer.

use craftgraph_core::record::tokenize_line;
use proptest::prelude::*;

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,11}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "-?[0-9]{1,4}(\\.[0-9]{1,3})?"
}

proptest! {
    // Every key=value pair survives tokenization, whatever separator joins
    // the fragments.
    #[test]
    fn all_keyed_attributes_are_recovered(
        pairs in prop::collection::vec((key_strategy(), value_strategy()), 1..6),
        use_hash in prop::collection::vec(any::<bool>(), 6),
    ) {
        let line = pairs
            .iter()
            .enumerate()
            .map(|(i, (k, v))| {
                let sep = if i == 0 { "" } else if use_hash[i % use_hash.len()] { "#" } else { "," };
                format!("{sep}{k}={v}")
            })
            .collect::<String>();
        let attributes = tokenize_line(&line);
        prop_assert_eq!(attributes.len(), pairs.len());
        for (attribute, (key, value)) in attributes.iter().zip(pairs.iter()) {
            prop_assert_eq!(&attribute.key, key);
            prop_assert_eq!(&attribute.values[0], value);
        }
    }

    // Comma-joined bare fragments all land on the preceding attribute.
    #[test]
    fn continuation_values_accumulate(
        key in key_strategy(),
        values in prop::collection::vec("[0-9]{1,4}", 1..5),
    ) {
        let line = format!("{key}={}", values.join(","));
        let attributes = tokenize_line(&line);
        prop_assert_eq!(attributes.len(), 1);
        prop_assert_eq!(&attributes[0].key, &key);
        prop_assert_eq!(&attributes[0].values, &values);
    }

    // Tokenization never panics on arbitrary input.
    #[test]
    fn arbitrary_lines_do_not_panic(line in ".{0,200}") {
        let _ = tokenize_line(&line);
    }
}
