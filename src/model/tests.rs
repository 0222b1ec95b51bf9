use super::mock::{CountingScorer, FailingScorer, FixedScorer};
use super::scorer::{STUB_IGNORED_LOGIT, STUB_MATCH_LOGIT, STUB_MISS_LOGIT, lexical_logits};
use super::tokenizer::segment;
use super::*;
use std::path::PathBuf;

mod config_tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        for var in [
            ModelConfig::ENV_MODEL_PATH,
            ModelConfig::ENV_TOKENIZER_PATH,
            ModelConfig::ENV_MAX_LENGTH,
            ModelConfig::ENV_DOC_STRIDE,
            ModelConfig::ENV_BATCH_SIZE,
        ] {
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    fn test_model_config_default() {
        let config = ModelConfig::default();
        assert!(config.model_path.is_none());
        assert!(config.tokenizer_path.is_none());
        assert_eq!(config.max_length, 512);
        assert_eq!(config.doc_stride, 128);
        assert_eq!(config.batch_size, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_model_config_new_uses_model_dir_for_tokenizer() {
        let config = ModelConfig::new("/models/restberta");
        assert_eq!(
            config.resolved_tokenizer_path(),
            Some(&PathBuf::from("/models/restberta"))
        );
    }

    #[test]
    fn test_explicit_tokenizer_path_wins() {
        let config = ModelConfig {
            tokenizer_path: Some(PathBuf::from("/tok/tokenizer.json")),
            ..ModelConfig::new("/models/restberta")
        };
        assert_eq!(
            config.resolved_tokenizer_path(),
            Some(&PathBuf::from("/tok/tokenizer.json"))
        );
    }

    #[test]
    #[serial]
    fn test_model_config_from_env_defaults() {
        clear_env();
        assert_eq!(ModelConfig::from_env(), ModelConfig::default());
    }

    #[test]
    #[serial]
    fn test_model_config_from_env_custom() {
        clear_env();
        unsafe {
            env::set_var(ModelConfig::ENV_MODEL_PATH, " /models/qa ");
            env::set_var(ModelConfig::ENV_MAX_LENGTH, "384");
            env::set_var(ModelConfig::ENV_DOC_STRIDE, "64");
            env::set_var(ModelConfig::ENV_BATCH_SIZE, "not-a-number");
        }

        let config = ModelConfig::from_env();
        assert_eq!(config.model_path, Some(PathBuf::from("/models/qa")));
        assert!(config.tokenizer_path.is_none());
        assert_eq!(config.max_length, 384);
        assert_eq!(config.doc_stride, 64);
        assert_eq!(config.batch_size, 8);

        clear_env();
    }

    #[test]
    fn test_validate_rejects_stride_not_below_max_length() {
        let config = ModelConfig {
            max_length: 128,
            doc_stride: 128,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(crate::config::ConfigError::InvalidValue { name, .. })
                if name == ModelConfig::ENV_DOC_STRIDE
        ));
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let config = ModelConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_missing_model_dir() {
        let config = ModelConfig::new("/nonexistent/propmatch/model");
        assert!(matches!(
            config.validate(),
            Err(crate::config::ConfigError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_validate_model_path_must_be_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ModelConfig::new(file.path());
        assert!(matches!(
            config.validate(),
            Err(crate::config::ConfigError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_validate_existing_model_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(ModelConfig::new(dir.path()).validate().is_ok());
    }
}

mod tokenizer_tests {
    use super::*;

    #[test]
    fn test_segment_property_paths() {
        let pieces = segment("a.b users[*].id");
        let texts: Vec<&str> = pieces.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["a", ".", "b", "users", "[", "*", "]", ".", "id"]);
        assert_eq!((pieces[3].start, pieces[3].end), (4, 9));
        assert_eq!((pieces[8].start, pieces[8].end), (13, 15));
    }

    #[test]
    fn test_segment_uses_char_offsets() {
        let pieces = segment("größe.wert");
        assert_eq!(pieces[0].text, "größe");
        assert_eq!((pieces[0].start, pieces[0].end), (0, 5));
        assert_eq!((pieces[2].start, pieces[2].end), (6, 10));
    }

    #[test]
    fn test_stub_single_fragment_layout() {
        let tokenizer = QaTokenizer::stub(512, 128);
        assert!(tokenizer.is_stub());

        let fragments = tokenizer
            .tokenize(&[QaSample::new("the zip", "location.zip state", false)])
            .unwrap();
        assert_eq!(fragments.len(), 1);

        let fragment = &fragments[0];
        assert_eq!(fragment.sample_index, 0);
        assert_eq!(fragment.cls_index, 0);
        assert_eq!(fragment.tokens[0], "[CLS]");
        assert_eq!(fragment.tokens[3], "[SEP]");
        assert_eq!(fragment.tokens.last().map(String::as_str), Some("[SEP]"));
        assert_eq!(fragment.len(), fragment.offset_map.len());
        assert_eq!(fragment.len(), fragment.sequence_ids.len());

        // Only paragraph tokens carry offsets.
        for (index, offsets) in fragment.offset_map.iter().enumerate() {
            assert_eq!(offsets.is_some(), fragment.is_paragraph_token(index));
        }
        assert_eq!(fragment.offset_map[4], Some((0, 8)));
        assert!(fragment.fragment.is_none());
        assert!(fragment.fragment_tokens.is_none());
    }

    #[test]
    fn test_stub_verbose_keeps_fragment() {
        let tokenizer = QaTokenizer::stub(512, 128);
        let fragments = tokenizer
            .tokenize(&[QaSample::new("q", "a.b c", true)])
            .unwrap();

        assert_eq!(fragments[0].fragment.as_deref(), Some("a.b c"));
        assert_eq!(
            fragments[0].fragment_tokens,
            Some(vec!["a".to_string(), ".".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_stub_long_paragraph_overlaps() {
        // budget = 10 - 3 = 7, one query token, window 6, stride 2 => step 4.
        let tokenizer = QaTokenizer::stub(10, 2);
        let paragraph = "p0 p1 p2 p3 p4 p5 p6 p7 p8 p9";
        let fragments = tokenizer
            .tokenize(&[
                QaSample::new("q", paragraph, false),
                QaSample::new("q", "short", false),
            ])
            .unwrap();

        assert_eq!(fragments.len(), 3);
        assert_eq!(
            fragments.iter().map(|f| f.sample_index).collect::<Vec<_>>(),
            vec![0, 0, 1]
        );

        let paragraph_tokens = |f: &TokenizedFragment| -> Vec<String> {
            (0..f.len())
                .filter(|i| f.is_paragraph_token(*i))
                .map(|i| f.tokens[i].clone())
                .collect()
        };
        assert_eq!(
            paragraph_tokens(&fragments[0]),
            vec!["p0", "p1", "p2", "p3", "p4", "p5"]
        );
        assert_eq!(
            paragraph_tokens(&fragments[1]),
            vec!["p4", "p5", "p6", "p7", "p8", "p9"]
        );
        assert_eq!(paragraph_tokens(&fragments[2]), vec!["short"]);
        for fragment in &fragments {
            assert!(fragment.len() <= 10);
        }
    }

    #[test]
    fn test_stub_empty_batch() {
        let tokenizer = QaTokenizer::stub(512, 128);
        assert!(tokenizer.tokenize(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_load_without_paths_is_stub() {
        let tokenizer = QaTokenizer::load(&ModelConfig::stub()).unwrap();
        assert!(tokenizer.is_stub());
        assert_eq!(tokenizer.max_length(), 512);
        assert_eq!(tokenizer.doc_stride(), 128);
    }

    #[test]
    fn test_load_missing_tokenizer_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = QaTokenizer::load(&ModelConfig::new(dir.path()));
        assert!(matches!(result, Err(ModelError::TokenizationFailed { .. })));
    }
}

mod scorer_tests {
    use super::*;

    fn stub_fragment(query: &str, paragraph: &str) -> TokenizedFragment {
        QaTokenizer::stub(512, 128)
            .tokenize(&[QaSample::new(query, paragraph, false)])
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_lexical_logits_prefer_matching_tokens() {
        let fragment = stub_fragment("The ZIP code", "location.zip state");
        let logits = lexical_logits(&fragment);

        assert_eq!(logits.start, logits.end);
        assert_eq!(logits.start.len(), fragment.len());
        assert_eq!(logits.start[fragment.cls_index], 0.0);

        let zip = fragment.tokens.iter().position(|t| t == "zip").unwrap();
        let state = fragment.tokens.iter().position(|t| t == "state").unwrap();
        assert_eq!(logits.start[zip], STUB_MATCH_LOGIT);
        assert_eq!(logits.start[state], STUB_MISS_LOGIT);
        assert_eq!(logits.start[1], STUB_IGNORED_LOGIT);
    }

    #[test]
    fn test_stub_model_predicts_in_order() {
        let model = QaModel::stub();
        assert!(model.is_stub());

        let fragments = vec![stub_fragment("a", "a b"), stub_fragment("b", "a b c")];
        let logits = model.predict(&fragments).unwrap();
        assert_eq!(logits.len(), 2);
        assert_eq!(logits[0].start.len(), fragments[0].len());
        assert_eq!(logits[1].start.len(), fragments[1].len());
        assert!(model.predict(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_load_without_model_path_is_stub() {
        let model = QaModel::load(&ModelConfig::stub()).unwrap();
        assert!(model.is_stub());
        assert_eq!(model.batch_size(), 8);
    }

    #[test]
    fn test_load_rejects_zero_batch_size() {
        let config = ModelConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            QaModel::load(&config),
            Err(ModelError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_load_missing_model_dir() {
        let result = QaModel::load(&ModelConfig::new("/nonexistent/propmatch/model"));
        assert!(matches!(result, Err(ModelError::ModelNotFound { .. })));
    }

    #[test]
    fn test_load_dir_without_weights() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        let result = QaModel::load(&ModelConfig::new(dir.path()));
        assert!(matches!(result, Err(ModelError::ModelLoadFailed { .. })));
    }
}

mod mock_tests {
    use super::*;

    #[test]
    fn test_counting_scorer_counts() {
        let scorer = CountingScorer::new();
        let fragments = QaTokenizer::stub(512, 128)
            .tokenize(&[QaSample::new("a", "a", false), QaSample::new("b", "b", false)])
            .unwrap();

        scorer.predict(&fragments).unwrap();
        scorer.predict(&fragments[..1]).unwrap();

        assert_eq!(scorer.calls(), 2);
        assert_eq!(scorer.fragments_scored(), 3);
    }

    #[test]
    fn test_fixed_scorer_fits_fragment_length() {
        let scorer = FixedScorer::new(vec![1.0, 2.0], vec![3.0]).with_fill(-5.0);
        let fragment = TokenizedFragment {
            input_ids: vec![0; 4],
            ..Default::default()
        };

        let logits = scorer.predict(&[fragment]).unwrap();
        assert_eq!(logits[0].start, vec![1.0, 2.0, -5.0, -5.0]);
        assert_eq!(logits[0].end, vec![3.0, -5.0, -5.0, -5.0]);
    }

    #[test]
    fn test_failing_scorer() {
        let result = FailingScorer.predict(&[]);
        assert!(matches!(result, Err(ModelError::InferenceFailed { .. })));
    }
}
