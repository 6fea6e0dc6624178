table! {
    benchmark (id) {
        id -> Text,
        title -> Text,
        description -> Nullable<Text>,
        requirement_doc -> Nullable<Text>,
        prototype_url -> Nullable<Text>,
        user_stories -> Nullable<Text>,
        is_active -> Bool,
        created_by_id -> Uuid,
        created_at -> Timestamp,
        updated_at -> Nullable<Timestamp>,
    }
}

table! {
    like (id) {
        id -> Uuid,
        submission_id -> Uuid,
        fingerprint -> Text,
        created_at -> Timestamp,
    }
}

table! {
    submission (id) {
        id -> Uuid,
        benchmark_id -> Text,
        user_id -> Uuid,
        status -> Text,
        repo_url -> Text,
        base_model -> Text,
        coding_tool -> Text,
        plugins -> Array<Text>,
        author_name -> Nullable<Text>,
        author_email -> Nullable<Text>,
        chat_log_url -> Nullable<Text>,
        chat_log_text -> Nullable<Text>,
        chat_log_files -> Array<Text>,
        like_count -> Int4,
        created_at -> Timestamp,
    }
}

table! {
    user (id) {
        id -> Uuid,
        email -> Text,
        name -> Text,
        image -> Nullable<Text>,
        role -> Text,
        created_at -> Timestamp,
        updated_at -> Nullable<Timestamp>,
    }
}

joinable!(benchmark -> user (created_by_id));
joinable!(like -> submission (submission_id));
joinable!(submission -> benchmark (benchmark_id));
joinable!(submission -> user (user_id));

allow_tables_to_appear_in_same_query!(
    benchmark,
    like,
    submission,
    user,
);
