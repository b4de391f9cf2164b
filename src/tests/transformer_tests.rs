#[cfg(test)]
mod test {
    use crate::{ExtractionEvent, TokenTransformer};

    #[test]
    fn test_uppercase_transformation() {
        let transformer = TokenTransformer::uppercase();
        let token = transformer.apply(3, &ExtractionEvent::StringValue("hello world".into()));
        assert_eq!(token.text, "HELLO WORLD");
        assert_eq!(token.index, 3);
        assert!(!token.is_key);
        assert_eq!(token.to_string(), "HELLO WORLD");

        let token = transformer.apply(0, &ExtractionEvent::Key("string".into()));
        assert_eq!(token.text, "STRING");
        assert!(token.is_key);
    }

    #[test]
    fn test_uppercase_is_unicode_aware_and_idempotent() {
        let transformer = TokenTransformer::default();
        let samples = ["stra\u{df}e", "h\u{e9}llo", "\u{1c6}emal", "\u{3b1}\u{3b2}\u{3b3}", "MiXeD 123 !?", ""];
        for sample in samples {
            let once = transformer.apply(0, &ExtractionEvent::Key(sample.into())).text;
            let twice = transformer.apply(0, &ExtractionEvent::Key(once.clone())).text;
            assert_eq!(once, twice, "uppercasing {sample:?} is not stable");
        }
        let strasse = transformer.apply(0, &ExtractionEvent::Key("stra\u{df}e".into()));
        assert_eq!(strasse.text, "STRASSE");
    }

    #[test]
    fn test_keys_only_filter() {
        let transformer = TokenTransformer::uppercase().keys_only();
        assert!(transformer.accepts(&ExtractionEvent::Key("a".into())));
        assert!(!transformer.accepts(&ExtractionEvent::StringValue("a".into())));

        let everything = TokenTransformer::identity();
        assert!(everything.accepts(&ExtractionEvent::StringValue("a".into())));
        assert_eq!(
            everything.apply(0, &ExtractionEvent::StringValue("MiXeD".into())).text,
            "MiXeD"
        );
    }

    #[test]
    fn test_custom_transform_and_filter() {
        let transformer = TokenTransformer::new(|s| s.chars().rev().collect())
            .with_filter(|event| event.as_str().len() > 1);
        assert!(!transformer.accepts(&ExtractionEvent::Key("x".into())));
        assert_eq!(
            transformer.apply(1, &ExtractionEvent::Key("abc".into())).text,
            "cba"
        );
    }
}
