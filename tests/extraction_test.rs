use usneseni::config::PipelineConfig;
use usneseni::extraction::*;
use usneseni::types::*;

fn labels() -> Vec<String> {
    PipelineConfig::default().organ_headers
}

fn raw(id: &str, text: &str) -> RawRecord {
    RawRecord {
        id: id.to_string(),
        datum: None,
        organ: Some("Rada města Litovel".to_string()),
        text_raw: text.to_string(),
    }
}

fn parse(text: &str) -> StructuredRecord {
    RecordParser::new(&PipelineConfig::default())
        .parse(&raw("RM/1853/60/2025", text))
        .expect("valid record")
}

// ---------------------------------------------------------------------------
// HeaderStripper
// ---------------------------------------------------------------------------

#[test]
fn test_header_stripped_with_separators() {
    let labels = labels();
    let stripper = HeaderStripper::new(&labels);
    let (organ, body) = stripper.strip("  Rada města Litovel,\n schvaluje program");
    assert_eq!(organ, Some("Rada města Litovel"));
    assert_eq!(body, "schvaluje program");
}

#[test]
fn test_header_absent_returns_text_unchanged() {
    let labels = labels();
    let stripper = HeaderStripper::new(&labels);
    let text = "schvaluje program";
    assert_eq!(stripper.strip(text), (None, text));
}

#[test]
fn test_header_match_is_case_sensitive() {
    let labels = labels();
    let stripper = HeaderStripper::new(&labels);
    let (organ, _) = stripper.strip("rada města Litovel schvaluje");
    assert!(organ.is_none());
}

// ---------------------------------------------------------------------------
// ItemSegmenter
// ---------------------------------------------------------------------------

#[test]
fn test_segment_without_markers_is_head_only() {
    let segments = ItemSegmenter::segment("  schvaluje program jednání \n");
    assert_eq!(segments.head, "schvaluje program jednání");
    assert!(segments.items.is_empty());
}

#[test]
fn test_segment_head_and_items() {
    let text = "schvaluje:\na) prodej pozemku\nb) pronájem\nnebytových prostor\nc) výpůjčku";
    let segments = ItemSegmenter::segment(text);
    assert_eq!(segments.head, "schvaluje:");
    let labels: Vec<char> = segments.items.iter().map(|i| i.label).collect();
    assert_eq!(labels, vec!['a', 'b', 'c']);
    assert_eq!(segments.items[1].text, "pronájem\nnebytových prostor");
    assert_eq!(segments.items[2].text, "výpůjčku");
}

#[test]
fn test_segment_marker_must_start_a_line() {
    let segments = ItemSegmenter::segment("viz bod a) výše a b) níže");
    assert!(segments.items.is_empty());
}

#[test]
fn test_segment_keeps_labels_verbatim() {
    let segments = ItemSegmenter::segment("a) první\nc) třetí\nb) druhý");
    let labels: Vec<char> = segments.items.iter().map(|i| i.label).collect();
    assert_eq!(labels, vec!['a', 'c', 'b']);
}

#[test]
fn test_segment_is_lossless_minus_markers() {
    let text = "bere na vědomí zprávu:\na) o činnosti\nodboru\nb) o hospodaření 2024";
    let segments = ItemSegmenter::segment(text);
    let mut rebuilt = segments.head.clone();
    for item in &segments.items {
        rebuilt.push(' ');
        rebuilt.push_str(&item.text);
    }
    let expected = "bere na vědomí zprávu: o činnosti odboru o hospodaření 2024";
    assert_eq!(
        rebuilt.split_whitespace().collect::<Vec<_>>().join(" "),
        expected
    );
}

// ---------------------------------------------------------------------------
// ActionClassifier
// ---------------------------------------------------------------------------

#[test]
fn test_classify_plain_verb() {
    assert_eq!(
        ActionClassifier::classify("schvaluje rozpočet"),
        Some("schvaluje".to_string())
    );
    assert_eq!(
        ActionClassifier::classify("Schvaluje rozpočet"),
        Some("schvaluje".to_string())
    );
}

#[test]
fn test_classify_negated_verb_is_distinct() {
    assert_eq!(
        ActionClassifier::classify("neschvaluje žádost o dotaci"),
        Some("neschvaluje".to_string())
    );
    assert_eq!(
        ActionClassifier::classify("nebere na vědomí"),
        Some("nebere na vědomí".to_string())
    );
}

#[test]
fn test_classify_prefers_longest_phrase() {
    assert_eq!(
        ActionClassifier::classify("uděluje předběžný souhlas s umístěním stavby"),
        Some("uděluje předběžný souhlas".to_string())
    );
    assert_eq!(
        ActionClassifier::classify("uděluje výjimku z počtu žáků"),
        Some("uděluje výjimku".to_string())
    );
}

#[test]
fn test_classify_normalizes_variants() {
    assert_eq!(
        ActionClassifier::classify("rozhodla o zadání zakázky"),
        Some("rozhoduje".to_string())
    );
    assert_eq!(
        ActionClassifier::classify("byla seznámena s výsledkem"),
        Some("bere na vědomí".to_string())
    );
    assert_eq!(
        ActionClassifier::classify("projednala návrh"),
        Some("projednává".to_string())
    );
}

#[test]
fn test_classify_only_leading_occurrence() {
    assert_eq!(ActionClassifier::classify("žádost, kterou schvaluje rada"), None);
    assert_eq!(ActionClassifier::classify(""), None);
}

#[test]
fn test_classify_skips_invisible_prefix() {
    assert_eq!(
        ActionClassifier::classify("\u{feff}\u{a0} ,schvaluje"),
        Some("schvaluje".to_string())
    );
}

#[test]
fn test_classify_requires_word_boundary() {
    assert_eq!(ActionClassifier::classify("schvalujeme"), None);
    assert_eq!(ActionClassifier::classify("volíme"), None);
}

#[test]
fn test_classify_multiword_phrase_across_line_break() {
    assert_eq!(
        ActionClassifier::classify("bere na\nvědomí informaci"),
        Some("bere na vědomí".to_string())
    );
}

#[test]
fn test_match_leading_returns_rest() {
    let m = ActionClassifier::match_leading("  neschvaluje žádost").unwrap();
    assert_eq!(m.action.verb, ActionVerb::Schvaluje);
    assert!(m.action.negated);
    assert_eq!(m.rest, " žádost");
}

#[test]
fn test_phrase_table_is_ordered_by_specificity() {
    for (i, (earlier, _)) in PHRASE_TABLE.iter().enumerate() {
        for (later, _) in &PHRASE_TABLE[i + 1..] {
            assert!(
                !later.starts_with(earlier),
                "'{}' shadows the longer '{}'",
                earlier,
                later
            );
        }
    }
}

// ---------------------------------------------------------------------------
// SubjectExtractor
// ---------------------------------------------------------------------------

#[test]
fn test_subject_after_action() {
    let labels = labels();
    let extractor = SubjectExtractor::new(&labels);
    let (action, subject) = extractor.extract("Rada města Litovel schvaluje prodej pozemku:");
    assert_eq!(action.as_deref(), Some("schvaluje"));
    assert_eq!(subject.as_deref(), Some("prodej pozemku"));
}

#[test]
fn test_subject_defaults_to_whole_head() {
    let labels = labels();
    let extractor = SubjectExtractor::new(&labels);
    let (action, subject) = extractor.extract("k návrhu na změnu územního plánu:");
    assert!(action.is_none());
    assert_eq!(subject.as_deref(), Some("k návrhu na změnu územního plánu"));
}

#[test]
fn test_subject_empty_after_action_is_none() {
    let labels = labels();
    let extractor = SubjectExtractor::new(&labels);
    let (action, subject) = extractor.extract("schvaluje:");
    assert_eq!(action.as_deref(), Some("schvaluje"));
    assert!(subject.is_none());
}

// ---------------------------------------------------------------------------
// TailSplitter
// ---------------------------------------------------------------------------

#[test]
fn test_tail_split_on_lowercase_line() {
    let mut items = vec![
        Item::new('a', "první bod"),
        Item::new('b', "prodej pozemku parc. č. 123\nusnesení nabývá účinnosti dnem podpisu"),
    ];
    let tail = TailSplitter::new(3).split(&mut items);
    assert_eq!(tail.as_deref(), Some("usnesení nabývá účinnosti dnem podpisu"));
    assert_eq!(items[1].text, "prodej pozemku parc. č. 123");
    assert_eq!(items[0].text, "první bod");
}

#[test]
fn test_tail_split_recognizes_accented_lowercase() {
    let mut items = vec![Item::new('a', "nákup nového vozidla hasičů\nčástka bude hrazena")];
    let tail = TailSplitter::default().split(&mut items);
    assert_eq!(tail.as_deref(), Some("částka bude hrazena"));
}

#[test]
fn test_tail_not_split_when_head_too_short() {
    let original = "prodej pozemku\nsoučasně ukládá starostovi";
    let mut items = vec![Item::new('a', original)];
    assert!(TailSplitter::new(3).split(&mut items).is_none());
    assert_eq!(items[0].text, original);
}

#[test]
fn test_tail_not_split_on_uppercase_line() {
    let mut items = vec![Item::new('a', "prodej pozemku parc. č. 123\nMěsto Litovel")];
    assert!(TailSplitter::default().split(&mut items).is_none());
}

#[test]
fn test_tail_split_on_empty_items() {
    let mut items: Vec<Item> = Vec::new();
    assert!(TailSplitter::default().split(&mut items).is_none());
}

// ---------------------------------------------------------------------------
// ReferenceExtractor & AmountExtractor
// ---------------------------------------------------------------------------

#[test]
fn test_explicit_reference_resolves_to_itself() {
    let refs = ReferenceExtractor::extract("ruší usnesení RM/1200/55/2024 v plném rozsahu");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].raw, "RM/1200/55/2024");
    assert_eq!(refs[0].kind, ReferenceKind::Explicit);
    assert_eq!(
        refs[0].resolved.as_deref(),
        Some("RM/1200/55/2024")
    );
}

#[test]
fn test_explicit_reference_keeps_zero_padding() {
    let refs = ReferenceExtractor::extract("revokuje RM/0012/03/2024");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].raw, "RM/0012/03/2024");
    assert_eq!(refs[0].resolved.as_deref(), Some("RM/0012/03/2024"));
}

#[test]
fn test_explicit_reference_needs_word_boundary() {
    assert!(ReferenceExtractor::extract("kód XRM/1/2/2024 a ZZM/3/4/2025").is_empty());
    let refs = ReferenceExtractor::extract("(RM/1/2/2024)");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].raw, "RM/1/2/2024");
}

#[test]
fn test_implicit_reference_needs_context_keyword() {
    let refs = ReferenceExtractor::extract("revokuje usnesení 1200/55 a bod 3/4 zprávy");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].raw, "1200/55");
    assert_eq!(refs[0].kind, ReferenceKind::Implicit);
    assert!(refs[0].resolved.is_none());
}

#[test]
fn test_implicit_reference_variants() {
    let refs = ReferenceExtractor::extract("dle usn. č. 12/3, Usnesení č.45/6 a usnesení č 7/8");
    let raws: Vec<&str> = refs.iter().map(|r| r.raw.as_str()).collect();
    assert_eq!(raws, vec!["12/3", "45/6", "7/8"]);
}

#[test]
fn test_implicit_reference_skips_longer_numbers() {
    let refs = ReferenceExtractor::extract("usnesení č. 12/3/2024 a usnesení 1/2345");
    assert!(refs.is_empty());
}

#[test]
fn test_references_in_text_order() {
    let refs = ReferenceExtractor::extract("usnesení 1/2 nahrazuje ZM/5/6/2023");
    let raws: Vec<&str> = refs.iter().map(|r| r.raw.as_str()).collect();
    assert_eq!(raws, vec!["1/2", "ZM/5/6/2023"]);
}

#[test]
fn test_dedupe_references_first_wins() {
    let refs = vec![
        Reference::implicit("1/2"),
        Reference::implicit("3/4"),
        Reference::implicit("1/2"),
    ];
    let deduped = dedupe_references(refs);
    let raws: Vec<&str> = deduped.iter().map(|r| r.raw.as_str()).collect();
    assert_eq!(raws, vec!["1/2", "3/4"]);
}

#[test]
fn test_amounts_found_and_sorted() {
    let amounts = AmountExtractor::extract("dotace 50.000 Kč, spoluúčast 1 250 000 Kč a 900 Kč, opět 900 Kč");
    let amounts: Vec<&str> = amounts.iter().map(String::as_str).collect();
    assert_eq!(amounts, vec!["1 250 000 Kč", "50.000 Kč", "900 Kč"]);
}

#[test]
fn test_ungrouped_amounts_found() {
    let amounts = AmountExtractor::extract("schvaluje dotaci 15000 Kč a 2000 Kč, celkem 1250000Kč");
    let amounts: Vec<&str> = amounts.iter().map(String::as_str).collect();
    assert_eq!(amounts, vec!["1250000Kč", "15000 Kč", "2000 Kč"]);
}

#[test]
fn test_amount_repaired_across_line_break() {
    assert_eq!(AmountExtractor::normalize("ve výši 2.\n000 Kč"), "ve výši 2.000 Kč");
    assert_eq!(AmountExtractor::normalize("ve výši 2\n000 Kč"), "ve výši 2 000 Kč");
    let amounts = AmountExtractor::extract("částka 15.\n000 Kč bez DPH");
    assert!(amounts.contains("15.000 Kč"));
}

#[test]
fn test_amount_normalization_is_idempotent() {
    let text = "a) 2.\n000 Kč\nb) 3\n500 Kč\nc) 10 000 Kč";
    let once = AmountExtractor::normalize(text);
    assert_eq!(AmountExtractor::normalize(&once), once);
}

// ---------------------------------------------------------------------------
// RecordParser
// ---------------------------------------------------------------------------

#[test]
fn test_negated_global_record() {
    let record = parse("Rada města Litovel neschvaluje žádost o dotaci");
    assert_eq!(record.organ.as_deref(), Some("Rada města Litovel"));
    assert_eq!(record.actions.iter().collect::<Vec<_>>(), vec!["neschvaluje"]);
    assert_eq!(record.subject(), Some("žádost o dotaci"));
    assert!(!record.shape.is_sequence());
}

#[test]
fn test_sequence_record() {
    let record = parse("a) revokuje usnesení 1200/55\nb) schvaluje dotaci 50.000 Kč");
    assert!(record.shape.is_sequence());
    assert_eq!(
        record.actions.iter().collect::<Vec<_>>(),
        vec!["revokuje", "schvaluje"]
    );
    assert!(record.subject().is_none());
    assert!(record.tail().is_none());
    assert_eq!(record.items()[0].action.as_deref(), Some("revokuje"));
    assert_eq!(record.items()[1].action.as_deref(), Some("schvaluje"));
    assert_eq!(record.references_out, vec![Reference::implicit("1200/55")]);
    assert_eq!(
        record.amounts.iter().collect::<Vec<_>>(),
        vec!["50.000 Kč"]
    );
}

#[test]
fn test_item_markers_inside_a_line_are_not_split() {
    let record = parse("a) revokuje usnesení 1200/55 b) schvaluje dotaci 50.000 Kč");
    assert!(record.shape.is_sequence());
    assert_eq!(record.items().len(), 1);
    assert_eq!(record.actions.iter().collect::<Vec<_>>(), vec!["revokuje"]);
    assert!(record.amounts.contains("50.000 Kč"));
}

#[test]
fn test_sequence_item_without_own_action() {
    let record = parse("a) schvaluje smlouvu\nb) v předloženém znění");
    assert!(record.shape.is_sequence());
    assert_eq!(record.items()[1].action, None);
    assert_eq!(record.actions.len(), 1);
}

#[test]
fn test_global_record_with_items_and_tail() {
    let text = "Zastupitelstvo města Litovel schvaluje:\n\
                a) rozpočet na rok 2025 ve výši 120 000 000 Kč\n\
                b) střednědobý výhled rozpočtu do roku 2027\n\
                a ukládá radě předložit změny podle usnesení 17/3";
    let record = parse(text);
    assert_eq!(record.organ.as_deref(), Some("Zastupitelstvo města Litovel"));
    assert_eq!(record.actions.iter().collect::<Vec<_>>(), vec!["schvaluje"]);
    assert!(record.subject().is_none());
    assert_eq!(record.items().len(), 2);
    assert_eq!(record.items()[1].text, "střednědobý výhled rozpočtu do roku 2027");
    assert_eq!(
        record.tail(),
        Some("a ukládá radě předložit změny podle usnesení 17/3")
    );
    assert_eq!(record.references_out, vec![Reference::implicit("17/3")]);
    assert!(record.amounts.contains("120 000 000 Kč"));
}

#[test]
fn test_record_without_action_keeps_subject() {
    let record = parse("Rada města Litovel\nk žádosti spolku o příspěvek 5 000 Kč");
    assert!(record.actions.is_empty());
    assert_eq!(
        record.subject(),
        Some("k žádosti spolku o příspěvek 5 000 Kč")
    );
    assert!(record.amounts.contains("5 000 Kč"));
}

#[test]
fn test_record_without_header() {
    let record = parse("bere na vědomí zprávu o kontrole usnesení RM/10/2/2025");
    assert!(record.organ.is_none());
    assert_eq!(record.actions.iter().collect::<Vec<_>>(), vec!["bere na vědomí"]);
    assert_eq!(record.references_out.len(), 1);
    assert_eq!(record.references_out[0].kind, ReferenceKind::Explicit);
}

#[test]
fn test_references_deduplicated_across_spans() {
    let record = parse("a) revokuje usnesení 1/2\nb) mění usnesení 1/2 a usnesení 3/4");
    let raws: Vec<&str> = record.references_out.iter().map(|r| r.raw.as_str()).collect();
    assert_eq!(raws, vec!["1/2", "3/4"]);
}

#[test]
fn test_malformed_identifier_is_rejected() {
    let parser = RecordParser::new(&PipelineConfig::default());
    let err = parser.parse(&raw("RM/1853/60", "schvaluje")).unwrap_err();
    assert!(err.to_string().contains("malformed identifier"));
}

#[test]
fn test_parse_keeps_identity_fields() {
    let mut input = raw("ZM/7/2/2024", "schvaluje program");
    input.datum = chrono::NaiveDate::from_ymd_opt(2024, 6, 20);
    let record = RecordParser::new(&PipelineConfig::default())
        .parse(&input)
        .unwrap();
    assert_eq!(record.id.to_string(), "ZM/7/2/2024");
    assert_eq!(record.datum, input.datum);
    assert!(record.references_in.is_empty());
}
