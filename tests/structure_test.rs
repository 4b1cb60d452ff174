use spam_features::{Message, structure_counts, structure_of};

#[test]
fn test_leaf_structure_is_content_type() {
    let message = Message::leaf("text/html", "<p>hi</p>");
    assert_eq!(structure_of(&message).as_str(), "text/html");
}

#[test]
fn test_nested_structure() {
    let message = Message::composite(
        "multipart/mixed",
        vec![
            Message::leaf("text/plain", "a"),
            Message::composite(
                "multipart/alternative",
                vec![
                    Message::leaf("text/plain", "b"),
                    Message::leaf("text/html", "c"),
                ],
            ),
            Message::leaf("application/pdf", "d"),
        ],
    );

    assert_eq!(
        structure_of(&message).to_string(),
        "multipart(text/plain, multipart(text/plain, text/html), application/pdf)"
    );
}

#[test]
fn test_structure_counts_most_common_first() {
    let alternative = || {
        Message::composite(
            "multipart/alternative",
            vec![
                Message::leaf("text/plain", "a"),
                Message::leaf("text/html", "b"),
            ],
        )
    };
    let messages = vec![
        Message::leaf("text/html", "x"),
        alternative(),
        Message::leaf("text/plain", "y"),
        alternative(),
        Message::leaf("text/plain", "z"),
    ];

    let counts = structure_counts(&messages);
    let flat: Vec<(&str, usize)> = counts.iter().map(|(s, n)| (s.as_str(), *n)).collect();

    assert_eq!(
        flat,
        vec![
            ("multipart(text/plain, text/html)", 2),
            ("text/plain", 2),
            ("text/html", 1),
        ]
    );
}

#[test]
fn test_structure_counts_empty_batch() {
    assert!(structure_counts(&[]).is_empty());
}
