use notecluster::{
    cluster, ClusterConfig, Error, KmeansInit, Note, NoteId, NoteList, NoteRepository, StopWords,
};

fn topics() -> Vec<(u64, &'static str)> {
    vec![
        (1, "cats and dogs"),
        (2, "dogs and cats"),
        (3, "stock market rises"),
        (4, "market stocks climb"),
    ]
}

#[test]
fn two_topics_split_into_two_clusters() {
    let report = cluster(&topics(), &ClusterConfig::new(2).with_seed(42)).unwrap();

    let label = |id| report.label(NoteId(id)).unwrap();
    assert_eq!(label(1), label(2));
    assert_eq!(label(3), label(4));
    assert_ne!(label(1), label(3));
    assert!(report.converged());
    assert_eq!(report.retained(), 4);
}

#[test]
fn two_topics_split_with_random_init() {
    let config = ClusterConfig::new(2).with_init(KmeansInit::Random);
    let report = cluster(&topics(), &config).unwrap();
    let label = |id| report.label(NoteId(id)).unwrap();
    assert_eq!(label(1), label(2));
    assert_eq!(label(3), label(4));
    assert_ne!(label(1), label(3));
}

#[test]
fn empty_note_is_unclustered() {
    let notes = [(1, ""), (2, "hello world")];
    let report = cluster(&notes, &ClusterConfig::new(1)).unwrap();
    assert_eq!(report.label(NoteId(1)), None);
    assert!(report.is_excluded(NoteId(1)));
    assert_eq!(report.label(NoteId(2)), Some(0));
    assert!(!report.is_excluded(NoteId(2)));

    let map = report.to_map();
    assert_eq!(map.len(), 2);
    assert_eq!(map[&NoteId(1)], None);
    assert_eq!(map[&NoteId(2)], Some(0));
}

#[test]
fn k_larger_than_corpus_is_invalid() {
    let notes = [(1, "a")];
    let err = cluster(&notes, &ClusterConfig::new(2)).unwrap_err();
    assert!(err.is_invalid_parameter());
    assert!(matches!(
        err,
        Error::InvalidClusterCount {
            requested: 2,
            n_items: 1
        }
    ));
}

#[test]
fn k_zero_is_invalid() {
    let err = cluster(&topics(), &ClusterConfig::new(0)).unwrap_err();
    assert!(err.is_invalid_parameter());
}

#[test]
fn excluded_notes_do_not_count_toward_k() {
    let notes = [(1, "alpha"), (2, "   "), (3, "")];
    let err = cluster(&notes, &ClusterConfig::new(2)).unwrap_err();
    assert!(matches!(err, Error::InvalidClusterCount { n_items: 1, .. }));
}

#[test]
fn empty_corpus_errors() {
    let none: [(u64, &str); 0] = [];
    assert!(matches!(
        cluster(&none, &ClusterConfig::new(1)),
        Err(Error::EmptyCorpus)
    ));

    let blank = [(1, ""), (2, " \n\t")];
    assert!(matches!(
        cluster(&blank, &ClusterConfig::new(1)),
        Err(Error::EmptyCorpus)
    ));
}

#[test]
fn single_cluster_labels_everything_zero() {
    let mut notes = topics();
    notes.push((5, ""));
    let report = cluster(&notes, &ClusterConfig::new(1)).unwrap();
    for id in 1..=4 {
        assert_eq!(report.label(NoteId(id)), Some(0));
    }
    assert_eq!(report.label(NoteId(5)), None);
}

#[test]
fn runs_are_deterministic() {
    let notes = [
        (1, "rust borrow checker lifetimes"),
        (2, "borrow checker errors"),
        (3, "sourdough bread starter"),
        (4, "bread flour starter hydration"),
        (5, "lifetimes and traits in rust"),
        (6, "weekend hiking trail"),
        (7, "trail running shoes"),
    ];
    let config = ClusterConfig::new(3)
        .with_seed(1234)
        .with_max_iterations(50);
    let a = cluster(&notes, &config).unwrap();
    let b = cluster(&notes, &config).unwrap();
    assert_eq!(a.assignments(), b.assignments());
    assert_eq!(a.inertia().to_bits(), b.inertia().to_bits());
}

#[test]
fn duplicate_texts_share_a_label() {
    let notes = [
        (1, "meeting notes for monday"),
        (2, "grocery list eggs milk"),
        (3, "meeting notes for monday"),
        (4, "quarterly planning meeting"),
        (5, "grocery list eggs milk"),
    ];
    for k in 1..=3 {
        let report = cluster(&notes, &ClusterConfig::new(k)).unwrap();
        assert_eq!(report.label(NoteId(1)), report.label(NoteId(3)));
        assert_eq!(report.label(NoteId(2)), report.label(NoteId(5)));
    }
}

#[test]
fn identical_corpus_terminates() {
    let notes: Vec<(u64, &str)> = (1..=6).map(|i| (i, "same words here")).collect();
    let report = cluster(&notes, &ClusterConfig::new(3)).unwrap();
    assert!(report.converged());
    let labels: Vec<_> = report.assignments().iter().map(|(_, l)| *l).collect();
    assert!(labels.iter().all(|l| *l == labels[0]));
}

#[test]
fn stopword_only_note_is_retained() {
    let notes = [(1, "the and of"), (2, "garden tomatoes")];
    let report = cluster(&notes, &ClusterConfig::new(2)).unwrap();
    assert_eq!(report.retained(), 2);
    assert!(report.label(NoteId(1)).is_some());
    assert_ne!(report.label(NoteId(1)), report.label(NoteId(2)));
}

#[test]
fn custom_stop_words_change_vocabulary() {
    let notes = [(1, "the cat"), (2, "the dog")];
    let english = cluster(&notes, &ClusterConfig::new(1)).unwrap();
    assert_eq!(english.vocabulary_size(), 2);

    let keep_all = ClusterConfig::new(1).with_stop_words(StopWords::None);
    assert_eq!(cluster(&notes, &keep_all).unwrap().vocabulary_size(), 3);

    let custom = ClusterConfig::new(1).with_stop_words(StopWords::custom(["Cat"]));
    assert_eq!(cluster(&notes, &custom).unwrap().vocabulary_size(), 2);
}

#[test]
fn clusters_group_members_and_keywords_describe_them() {
    let report = cluster(&topics(), &ClusterConfig::new(2)).unwrap();
    let clusters = report.clusters();
    assert_eq!(clusters.len(), 2);

    let pets = report.label(NoteId(1)).unwrap();
    assert_eq!(clusters[&pets], vec![NoteId(1), NoteId(2)]);
    let words = report.keywords(pets);
    assert!(words.contains(&"cats".to_string()));
    assert!(words.contains(&"dogs".to_string()));

    let markets = report.label(NoteId(3)).unwrap();
    assert_eq!(report.keywords(markets)[0], "market");

    let mut links = report.links();
    links.sort();
    assert_eq!(links, vec![(NoteId(1), NoteId(2)), (NoteId(3), NoteId(4))]);
}

#[test]
fn iteration_cap_is_not_an_error() {
    let notes = [
        (1, "apples oranges"),
        (2, "oranges pears"),
        (3, "pears plums"),
        (4, "plums cherries"),
        (5, "cherries apples"),
    ];
    let config = ClusterConfig::new(2).with_max_iterations(1).with_n_init(1);
    let report = cluster(&notes, &config).unwrap();
    assert_eq!(report.iterations(), 1);
    assert!(report
        .assignments()
        .iter()
        .all(|(_, l)| l.is_some_and(|l| l < 2)));
}

#[test]
fn note_list_round_trip() {
    let mut repo = NoteList::new();
    let mut add = |title: &str, text: &str| repo.add_note(Note::new(title, text)).unwrap();
    let cats = add("pets", "cats and dogs");
    let dogs = add("pets again", "dogs and cats");
    let stocks = add("finance", "stock market rises");
    let climb = add("finance 2", "market stocks climb");
    let empty = add("draft", "");

    let snapshot = repo.snapshot();
    let report = cluster(&snapshot, &ClusterConfig::new(2)).unwrap();
    assert_eq!(repo.apply_clusters(&report), 5);

    let label = |id| repo.get_note_by_id(id).and_then(|n| n.cluster);
    assert_eq!(label(cats), label(dogs));
    assert_eq!(label(stocks), label(climb));
    assert_ne!(label(cats), label(stocks));
    assert_eq!(label(empty), None);
    assert!(label(cats).is_some());
}

#[test]
fn note_list_refuses_duplicate_ids_so_snapshots_cluster() {
    let mut repo = NoteList::new();
    let first = Note::new("first", "cats and dogs").with_id(1);
    let second = Note::new("second", "dogs and cats").with_id(1);
    repo.add_note(first).unwrap();
    let err = repo.add_note(second).unwrap_err();
    assert!(matches!(err, Error::DuplicateNoteId(NoteId(1))));

    let third = Note::new("third", "stock market rises");
    assert_eq!(repo.add_note(third).unwrap(), NoteId(2));
    let report = cluster(&repo.snapshot(), &ClusterConfig::new(2)).unwrap();
    assert_eq!(report.assignments().len(), 2);
}

#[test]
fn id_less_note_is_rejected() {
    let notes = [Note::new("no id", "text")];
    let err = cluster(&notes, &ClusterConfig::new(1)).unwrap_err();
    assert!(err.is_invalid_parameter());
}

#[test]
fn config_round_trips_through_json() {
    let config = ClusterConfig::new(3)
        .with_seed(7)
        .with_init(KmeansInit::Random)
        .with_stop_words(StopWords::custom(["foo"]));
    let json = serde_json::to_string(&config).unwrap();
    let back: ClusterConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let partial: ClusterConfig = serde_json::from_str(r#"{"k": 4}"#).unwrap();
    assert_eq!(partial, ClusterConfig::new(4));

    let words: ClusterConfig = serde_json::from_str(r#"{"stop_words": "none"}"#).unwrap();
    assert_eq!(words.stop_words, StopWords::None);
}
