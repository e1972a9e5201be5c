use crate::{
    proposals::{DELIBERATION_ACCEPTED, NOT_PUBLISHED},
    reviews::{FEELING_NEGATIVE, FEELING_POSITIVE},
    reviews::search::{
        RESULTS_PER_PAGE, ReviewsSearch, SpeakerDisplay, UserReview,
        filters::{DeliberationFilter, ProposalsFilters},
    },
    test::factories::{
        add_member, attach_category, attach_format, create_category,
        create_event, create_format, create_proposal, create_review,
        create_team, create_user, set_deliberation_status, setup_pool,
    },
    util_resp::FailureResponse,
};

#[test]
fn search_returns_shaped_rows() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let reviewer = create_user("Clara Reviewer", "clara", conn);
    let other = create_user("Olaf Organizer", "olaf", conn);
    let alice = create_user("Alice Speaker", "alice", conn);
    let bob = create_user("Bob Speaker", "bob", conn);

    let team = create_team("Dev Collective", "devcol", &reviewer, conn);
    add_member(&team, &other, crate::teams::ROLE_REVIEWER, conn);
    create_event(&team, "DevConf", "devconf", true, true, conn);

    let event_id = crate::events::Event::fetch_by_slug("devconf", conn)
        .unwrap()
        .id;
    let proposal =
        create_proposal(&event_id, "Rust at scale", &[&bob, &alice], conn);

    create_review(&proposal, &reviewer, FEELING_POSITIVE, Some(3), conn);
    create_review(&proposal, &other, FEELING_NEGATIVE, Some(5), conn);

    let found = ReviewsSearch::new(&reviewer, "devcol", "devconf")
        .search(ProposalsFilters::default(), conn)
        .unwrap();

    assert_eq!(found.results.len(), 1);
    let row = &found.results[0];

    assert_eq!(row.id, proposal);
    assert_eq!(row.title, "Rust at scale");
    assert_eq!(row.deliberation_status, "PENDING");
    assert_eq!(row.confirmation_status, None);
    assert_eq!(row.publication_status, NOT_PUBLISHED);

    // Speakers come back sorted by name.
    assert_eq!(
        row.speakers,
        vec![
            SpeakerDisplay {
                name: "Alice Speaker".to_string(),
                picture: None
            },
            SpeakerDisplay {
                name: "Bob Speaker".to_string(),
                picture: None
            },
        ]
    );

    let summary = row.reviews.summary.as_ref().unwrap();
    assert_eq!(summary.positives, 1);
    assert_eq!(summary.negatives, 1);
    assert_eq!(summary.average, Some(4.0));

    assert_eq!(
        row.reviews.you,
        UserReview {
            note: Some(3),
            feeling: Some(FEELING_POSITIVE.to_string()),
            comment: None,
        }
    );

    assert_eq!(found.statistics.total, 1);
    assert_eq!(found.statistics.reviewed, 1);
    assert_eq!(found.pagination.current, 1);
    assert_eq!(found.pagination.total, 1);
}

#[test]
fn search_is_forbidden_for_non_members() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let outsider = create_user("Imposter", "imposter", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    create_event(&team, "DevConf", "devconf", true, true, conn);

    let err = ReviewsSearch::new(&outsider, "devcol", "devconf")
        .search(ProposalsFilters::default(), conn)
        .unwrap_err();

    assert!(matches!(err, FailureResponse::ForbiddenOperation(())));
}

#[test]
fn unknown_event_is_indistinguishable_from_forbidden() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    create_team("Dev Collective", "devcol", &owner, conn);

    let err = ReviewsSearch::new(&owner, "devcol", "no-such-event")
        .search(ProposalsFilters::default(), conn)
        .unwrap_err();

    assert!(matches!(err, FailureResponse::ForbiddenOperation(())));
}

#[test]
fn search_over_empty_event() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let team = create_team("Dev Collective", "devcol", &owner, conn);
    create_event(&team, "DevConf", "devconf", true, true, conn);

    let found = ReviewsSearch::new(&owner, "devcol", "devconf")
        .search(ProposalsFilters::default(), conn)
        .unwrap();

    assert!(found.results.is_empty());
    assert_eq!(found.statistics.total, 0);
    assert_eq!(found.statistics.reviewed, 0);
    assert_eq!(found.pagination.total, 0);
}

#[test]
fn hidden_speakers_are_empty_and_unsearchable() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let speaker = create_user("Alice Speaker", "alice", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    let event_id =
        create_event(&team, "DevConf", "devconf", false, true, conn);
    create_proposal(&event_id, "Rust at scale", &[&speaker], conn);

    let search = ReviewsSearch::new(&owner, "devcol", "devconf");

    let found = search.search(ProposalsFilters::default(), conn).unwrap();
    assert_eq!(found.results.len(), 1);
    assert!(found.results[0].speakers.is_empty());

    // A name query must not reveal that the hidden speaker exists.
    let by_name = search
        .search(
            ProposalsFilters {
                query: Some("Alice".to_string()),
                ..Default::default()
            },
            conn,
        )
        .unwrap();
    assert!(by_name.results.is_empty());

    let by_title = search
        .search(
            ProposalsFilters {
                query: Some("rust".to_string()),
                ..Default::default()
            },
            conn,
        )
        .unwrap();
    assert_eq!(by_title.results.len(), 1);
}

#[test]
fn hidden_reviews_omit_the_summary_but_keep_your_own() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let speaker = create_user("Alice Speaker", "alice", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    let event_id =
        create_event(&team, "DevConf", "devconf", true, false, conn);
    let proposal = create_proposal(&event_id, "Rust at scale", &[&speaker], conn);
    create_review(&proposal, &owner, FEELING_POSITIVE, Some(4), conn);

    let found = ReviewsSearch::new(&owner, "devcol", "devconf")
        .search(ProposalsFilters::default(), conn)
        .unwrap();

    let row = &found.results[0];
    assert_eq!(row.reviews.summary, None);
    assert_eq!(row.reviews.you.note, Some(4));

    // The summary key disappears from the serialized form entirely.
    let json = serde_json::to_value(&row.reviews).unwrap();
    assert!(json.get("summary").is_none());
    assert!(json.get("you").is_some());
}

#[test]
fn filters_restrict_the_result_set() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let speaker = create_user("Alice Speaker", "alice", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    let event_id =
        create_event(&team, "DevConf", "devconf", true, true, conn);

    let format = create_format(&event_id, "Talk", conn);
    let category = create_category(&event_id, "Web", conn);

    let first = create_proposal(&event_id, "Async I/O", &[&speaker], conn);
    let second = create_proposal(&event_id, "Web assembly", &[&speaker], conn);

    set_deliberation_status(&first, DELIBERATION_ACCEPTED, conn);
    attach_format(&first, &format, conn);
    attach_category(&second, &category, conn);

    let search = ReviewsSearch::new(&owner, "devcol", "devconf");

    let accepted = search
        .search(
            ProposalsFilters {
                status: Some(DeliberationFilter::Accepted),
                ..Default::default()
            },
            conn,
        )
        .unwrap();
    assert_eq!(accepted.results.len(), 1);
    assert_eq!(accepted.results[0].id, first);

    let by_format = search
        .search(
            ProposalsFilters {
                format: Some(format.clone()),
                ..Default::default()
            },
            conn,
        )
        .unwrap();
    assert_eq!(by_format.results.len(), 1);
    assert_eq!(by_format.results[0].id, first);

    let by_category = search
        .search(
            ProposalsFilters {
                category: Some(category.clone()),
                ..Default::default()
            },
            conn,
        )
        .unwrap();
    assert_eq!(by_category.results.len(), 1);
    assert_eq!(by_category.results[0].id, second);

    // Title matching is a case-insensitive substring search.
    let by_title = search
        .search(
            ProposalsFilters {
                query: Some("async".to_string()),
                ..Default::default()
            },
            conn,
        )
        .unwrap();
    assert_eq!(by_title.results.len(), 1);
    assert_eq!(by_title.results[0].id, first);
}

#[test]
fn results_are_paginated() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let speaker = create_user("Alice Speaker", "alice", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    let event_id =
        create_event(&team, "DevConf", "devconf", true, true, conn);

    for i in 0..(RESULTS_PER_PAGE + 1) {
        create_proposal(&event_id, &format!("Talk {i}"), &[&speaker], conn);
    }

    let search = ReviewsSearch::new(&owner, "devcol", "devconf");

    let first_page = search.search(ProposalsFilters::default(), conn).unwrap();
    assert_eq!(first_page.results.len(), RESULTS_PER_PAGE as usize);
    assert_eq!(first_page.statistics.total, RESULTS_PER_PAGE + 1);
    assert_eq!(first_page.pagination.current, 1);
    assert_eq!(first_page.pagination.total, 2);

    let second_page = search
        .search(
            ProposalsFilters {
                page: Some(2),
                ..Default::default()
            },
            conn,
        )
        .unwrap();
    assert_eq!(second_page.results.len(), 1);
    assert_eq!(second_page.pagination.current, 2);

    // Out-of-range pages come back empty but still echo the request.
    let far_page = search
        .search(
            ProposalsFilters {
                page: Some(9),
                ..Default::default()
            },
            conn,
        )
        .unwrap();
    assert!(far_page.results.is_empty());
    assert_eq!(far_page.pagination.current, 9);

    let clamped = search
        .search(
            ProposalsFilters {
                page: Some(0),
                ..Default::default()
            },
            conn,
        )
        .unwrap();
    assert_eq!(clamped.pagination.current, 1);
}

#[test]
fn statistics_count_only_the_callers_reviews() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let colleague = create_user("Clara Reviewer", "clara", conn);
    let speaker = create_user("Alice Speaker", "alice", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    add_member(&team, &colleague, crate::teams::ROLE_REVIEWER, conn);
    let event_id =
        create_event(&team, "DevConf", "devconf", true, true, conn);

    let first = create_proposal(&event_id, "Async I/O", &[&speaker], conn);
    let second = create_proposal(&event_id, "Web assembly", &[&speaker], conn);

    create_review(&first, &owner, FEELING_POSITIVE, Some(5), conn);
    create_review(&first, &colleague, FEELING_POSITIVE, Some(5), conn);
    create_review(&second, &colleague, FEELING_NEGATIVE, Some(1), conn);

    let found = ReviewsSearch::new(&owner, "devcol", "devconf")
        .search(ProposalsFilters::default(), conn)
        .unwrap();

    assert_eq!(found.statistics.total, 2);
    assert_eq!(found.statistics.reviewed, 1);
}

#[test]
fn json_export_includes_full_speaker_profiles() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let speaker = create_user("Alice Speaker", "alice", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    let event_id =
        create_event(&team, "DevConf", "devconf", true, true, conn);
    let proposal = create_proposal(&event_id, "Rust at scale", &[&speaker], conn);
    create_review(&proposal, &owner, FEELING_POSITIVE, Some(4), conn);

    let rows = ReviewsSearch::new(&owner, "devcol", "devconf")
        .for_json_export(ProposalsFilters::default(), conn)
        .unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];

    assert_eq!(row.title, "Rust at scale");
    assert_eq!(row.abstract_, "An abstract for Rust at scale.");
    assert_eq!(row.languages, serde_json::json!(["en"]));

    let speakers = row.speakers.as_ref().unwrap();
    assert_eq!(speakers.len(), 1);
    assert_eq!(speakers[0].name, "Alice Speaker");
    assert_eq!(speakers[0].email, "alice@example.com");
    assert_eq!(speakers[0].socials, serde_json::json!({}));

    let reviews = row.reviews.as_ref().unwrap();
    assert_eq!(reviews.positives, 1);
    assert_eq!(reviews.average, Some(4.0));

    // Exports carry no caller-specific data.
    let json = serde_json::to_value(row).unwrap();
    assert!(json.get("reviews").unwrap().get("you").is_none());
}

#[test]
fn exports_omit_hidden_sections_entirely() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let speaker = create_user("Alice Speaker", "alice", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    let event_id =
        create_event(&team, "DevConf", "devconf", false, false, conn);
    create_proposal(&event_id, "Rust at scale", &[&speaker], conn);

    let search = ReviewsSearch::new(&owner, "devcol", "devconf");

    let rows = search
        .for_json_export(ProposalsFilters::default(), conn)
        .unwrap();
    let json = serde_json::to_value(&rows[0]).unwrap();
    assert!(json.get("speakers").is_none());
    assert!(json.get("reviews").is_none());

    let cards = search
        .for_cards_export(ProposalsFilters::default(), conn)
        .unwrap();
    let json = serde_json::to_value(&cards[0]).unwrap();
    assert!(json.get("speakers").is_none());
    assert!(json.get("reviews").is_none());
}

#[test]
fn cards_export_is_condensed() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let speaker = create_user("Alice Speaker", "alice", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    let event_id =
        create_event(&team, "DevConf", "devconf", true, true, conn);

    let format = create_format(&event_id, "Talk", conn);
    let category = create_category(&event_id, "Web", conn);
    let proposal = create_proposal(&event_id, "Rust at scale", &[&speaker], conn);
    attach_format(&proposal, &format, conn);
    attach_category(&proposal, &category, conn);

    let cards = ReviewsSearch::new(&owner, "devcol", "devconf")
        .for_cards_export(ProposalsFilters::default(), conn)
        .unwrap();

    assert_eq!(cards.len(), 1);
    let card = &cards[0];
    assert_eq!(card.title, "Rust at scale");
    assert_eq!(card.formats, vec!["Talk".to_string()]);
    assert_eq!(card.categories, vec!["Web".to_string()]);
    assert_eq!(
        card.speakers,
        Some(vec!["Alice Speaker".to_string()])
    );
}

#[test]
fn exports_respect_filters_without_pagination() {
    let pool = setup_pool();
    let conn = &mut pool.get().unwrap();

    let owner = create_user("Olaf Organizer", "olaf", conn);
    let speaker = create_user("Alice Speaker", "alice", conn);

    let team = create_team("Dev Collective", "devcol", &owner, conn);
    let event_id =
        create_event(&team, "DevConf", "devconf", true, true, conn);

    for i in 0..(RESULTS_PER_PAGE + 3) {
        let proposal =
            create_proposal(&event_id, &format!("Talk {i}"), &[&speaker], conn);
        if i == 0 {
            set_deliberation_status(&proposal, DELIBERATION_ACCEPTED, conn);
        }
    }

    let search = ReviewsSearch::new(&owner, "devcol", "devconf");

    let all = search
        .for_json_export(ProposalsFilters::default(), conn)
        .unwrap();
    assert_eq!(all.len(), (RESULTS_PER_PAGE + 3) as usize);

    let accepted = search
        .for_json_export(
            ProposalsFilters {
                status: Some(DeliberationFilter::Accepted),
                ..Default::default()
            },
            conn,
        )
        .unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].title, "Talk 0");
}
