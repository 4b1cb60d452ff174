use spam_features::{
    Message, WordCount, WordCounter, WordCounterConfig, remove_punctuation, replace_numbers,
    replace_urls,
};

// --- Normalization steps ---

#[test]
fn test_replace_numbers() {
    let text = replace_numbers("Order 3.14 units or 42 total");

    assert_eq!(text.matches("NUMBER").count(), 2);
    assert!(!text.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn test_replace_numbers_with_exponent() {
    assert_eq!(replace_numbers("ratio 3.14e-2 and 1E5"), "ratio NUMBER and NUMBER");
}

#[test]
fn test_replace_urls_hostnames_and_schemes() {
    let text = replace_urls("will it detect github.com and https://youtu.be/7pq-s557xqu?t=3m32s");

    assert_eq!(text.matches(" URL ").count(), 2);
    assert!(!text.contains("github"));
    assert!(!text.contains("youtu"));
}

#[test]
fn test_replace_urls_longest_first() {
    let text = replace_urls("see example.com/page and example.com");

    assert_eq!(text.matches("URL").count(), 2);
    assert!(!text.contains("example"));
    assert!(!text.contains("page"));
}

#[test]
fn test_replace_urls_trims_trailing_punctuation() {
    assert_eq!(replace_urls("visit example.com."), "visit  URL .");
}

#[test]
fn test_replace_urls_ignores_email_addresses() {
    let text = "write to john@example.com";
    assert_eq!(replace_urls(text), text);
}

#[test]
fn test_replace_urls_leaves_plain_words() {
    let text = "nothing to see here. really";
    assert_eq!(replace_urls(text), text);
}

#[test]
fn test_replace_urls_country_and_new_generic_domains() {
    assert_eq!(replace_urls("visit example.ie now"), "visit  URL  now");
    assert_eq!(replace_urls("shop.club"), " URL ");
    assert_eq!(replace_urls("go to site.ro"), "go to  URL ");
    assert_eq!(replace_urls("www.foo.gr/index"), " URL ");
}

#[test]
fn test_replace_urls_uppercase_hostname() {
    assert_eq!(replace_urls("WWW.EXAMPLE.IE"), " URL ");
}

#[test]
fn test_replace_urls_unknown_suffix_is_not_a_url() {
    let text = "open report.docx and notes.txt";
    assert_eq!(replace_urls(text), text);
}

#[test]
fn test_replace_urls_keeps_balanced_parenthesis() {
    assert_eq!(
        replace_urls("see http://en.wikipedia.org/wiki/foo_(bar) now"),
        "see  URL  now"
    );
    assert_eq!(
        replace_urls("see http://en.wikipedia.org/wiki/foo_(bar)."),
        "see  URL ."
    );
}

#[test]
fn test_replace_urls_drops_unbalanced_closing_bracket() {
    assert_eq!(replace_urls("(see example.com)"), "(see  URL )");
    assert_eq!(replace_urls("[http://example.org/a]"), "[ URL ]");
}

#[test]
fn test_remove_punctuation() {
    assert_eq!(remove_punctuation("hello, world!!! (yes)"), "hello world yes ");
}

// --- Stemming ---

#[test]
fn test_inflections_share_stem() {
    let counter = WordCounter::default();
    let counts =
        counter.count_words("Computations Computation Computing Computed Compute");

    assert_eq!(counts.len(), 1);
    assert_eq!(counts.get("comput"), 5);
}

#[test]
fn test_compulsive_has_different_stem() {
    let counter = WordCounter::default();

    assert_eq!(counter.stem("compute"), "comput");
    assert_ne!(counter.stem("compulsive"), counter.stem("compute"));
}

#[test]
fn test_stem_lowercases_without_lower_case_step() {
    let counter = WordCounter::new(WordCounterConfig {
        lower_case: false,
        ..WordCounterConfig::default()
    });

    assert_eq!(counter.stem("Computations"), "comput");
}

// --- Word counting ---

#[test]
fn test_count_words_full_normalization() {
    let counter = WordCounter::default();
    let counts = counter.count_words("Visit http://spam.example.com NOW!!! Only $99.99, now");

    assert_eq!(counts.get("visit"), 1);
    assert_eq!(counts.get("url"), 1);
    assert_eq!(counts.get("number"), 1);
    assert_eq!(counts.get("now"), 2);
    assert_eq!(counts.get("spam"), 0);
}

#[test]
fn test_count_words_without_stemming() {
    let counter = WordCounter::new(WordCounterConfig {
        stemming: false,
        ..WordCounterConfig::default()
    });
    let counts = counter.count_words("Running running RUNNING");

    assert_eq!(counts.get("running"), 3);
    assert_eq!(counts.len(), 1);
}

#[test]
fn test_count_words_case_preserved_when_disabled() {
    let counter = WordCounter::new(WordCounterConfig {
        lower_case: false,
        stemming: false,
        ..WordCounterConfig::default()
    });
    let counts = counter.count_words("Hello hello");

    assert_eq!(counts.get("Hello"), 1);
    assert_eq!(counts.get("hello"), 1);
}

#[test]
fn test_count_words_everything_disabled() {
    let counter = WordCounter::new(WordCounterConfig {
        strip_headers: false,
        lower_case: false,
        remove_punctuation: false,
        replace_urls: false,
        replace_numbers: false,
        stemming: false,
    });
    let counts = counter.count_words("Call 555, now!");

    assert_eq!(counts.get("555,"), 1);
    assert_eq!(counts.get("now!"), 1);
}

#[test]
fn test_count_words_empty_text() {
    assert!(WordCounter::default().count_words("").is_empty());
}

#[test]
fn test_word_count_keeps_first_seen_order() {
    let counts: WordCount = "b a b c a b".split_whitespace().collect();
    let flat: Vec<(&str, u32)> = counts.iter().collect();

    assert_eq!(flat, vec![("b", 3), ("a", 2), ("c", 1)]);
    assert_eq!(counts.total(), 6);
}

// --- Batch transform ---

#[test]
fn test_transform_one_count_per_message_in_order() {
    let messages = vec![
        Message::leaf("text/plain", "alpha"),
        Message::leaf("image/png", "no text here"),
        Message::leaf("text/html", "<p>gamma</p>"),
        Message::leaf("text/plain", "delta delta"),
    ];
    let counter = WordCounter::default();

    let counts = counter.fit(&messages).transform(&messages);

    assert_eq!(counts.len(), messages.len());
    assert_eq!(counts[0].get("alpha"), 1);
    assert!(counts[1].is_empty());
    assert_eq!(counts[2].get("gamma"), 1);
    assert_eq!(counts[3].get("delta"), 2);
}

#[test]
fn test_transform_single_message() {
    let messages = [Message::leaf("text/plain", "just one")];
    assert_eq!(WordCounter::default().transform(&messages).len(), 1);
}

#[test]
fn test_transform_empty_batch() {
    assert!(WordCounter::default().transform(&[]).is_empty());
}
