//! Integration tests for the contract state container: lifecycle, loading,
//! local copies and the filtered view.


use contract_state::{
    init_contract, ContractId, ContractState, ContractStore, FieldChange, FormSchema,
    InMemoryContractStore, LoadContract, LocalCopy, Mutation, MutationError, StoreError,
    UNLOADED_ID,
};
use serde_json::json;
use support::{loaded_session, persisted, RecordingStore};

#[test]
fn starts_unloaded_with_default_body() {
    let state = ContractState::new(InMemoryContractStore::new());
    assert_eq!(state.id(), UNLOADED_ID);
    assert!(!state.load_error());
    assert_eq!(state.body(), &init_contract(&FormSchema::default()));
    assert_eq!(state.update_count(), 0);
}

#[test]
fn create_new_loads_a_stored_default() {
    let (state, store) = loaded_session();

    assert_ne!(state.id(), UNLOADED_ID);
    assert!(!state.load_error());
    assert_eq!(store.writes(), 1);

    let mut expected = init_contract(&FormSchema::default());
    expected.id = state.id();
    assert_eq!(state.body(), &expected);
    assert_eq!(&persisted(&state), state.body());
}

#[test]
fn create_new_twice_gives_distinct_ids() {
    let (mut state, _) = loaded_session();
    let first = state.id();
    state.create_new().unwrap();
    assert_ne!(state.id(), first);
    assert_eq!(state.all_contracts().unwrap().len(), 2);
}

#[test]
fn load_contract_replaces_body() {
    let store = InMemoryContractStore::new();
    let mut stored = init_contract(&FormSchema::default());
    stored
        .form_data
        .fields
        .insert("title".into(), "Warehouse lease".into());
    let id = store.save_new(&stored).unwrap();

    let mut state = ContractState::new(store.clone());
    state.load_contract(LoadContract::new(id)).unwrap();

    assert_eq!(state.id(), id);
    assert!(!state.load_error());
    assert_eq!(state.body(), &store.get(id).unwrap().unwrap());
    assert_eq!(state.body().form_data.fields["title"], "Warehouse lease");
}

#[test]
fn load_with_invalid_id_keeps_body() {
    let (mut state, store) = loaded_session();
    let before = state.body().clone();

    let err = state.load_contract(LoadContract::new(-5)).unwrap_err();

    assert_eq!(err, MutationError::InvalidId(-5));
    assert!(state.load_error());
    assert_eq!(state.id(), UNLOADED_ID);
    assert_eq!(state.body(), &before);
    assert_eq!(store.writes(), 1);
}

#[test]
fn load_of_missing_contract_keeps_stale_body() {
    let (mut state, _) = loaded_session();
    let before = state.body().clone();

    let err = state.load_contract(LoadContract::new(404)).unwrap_err();

    assert_eq!(err, MutationError::NotFound(404));
    assert!(state.load_error());
    assert_eq!(state.id(), UNLOADED_ID);
    assert_eq!(state.body(), &before);
}

#[test]
fn successful_load_clears_load_error() {
    let (mut state, _) = loaded_session();
    let id = state.id();

    state.load_contract(LoadContract::new(404)).unwrap_err();
    assert!(state.load_error());

    state.load_contract(LoadContract::new(id)).unwrap();
    assert!(!state.load_error());
    assert_eq!(state.id(), id);
}

#[test]
fn edits_before_loading_are_saved_under_the_unloaded_id() {
    let store = RecordingStore::new();
    let mut state = ContractState::new(store.clone());

    state
        .change_string(FieldChange::new("title", "hello"))
        .unwrap();

    assert_eq!(state.id(), UNLOADED_ID);
    assert_eq!(state.body().form_data.fields["title"], "hello");
    assert_eq!(&persisted(&state), state.body());
    assert_eq!(store.writes(), 1);

    state.create_new().unwrap();
    assert_eq!(state.id(), 0);
    assert_eq!(state.body().form_data.fields["title"], "");
}

#[test]
fn edits_after_failed_load_keep_the_stale_body() {
    let (mut state, _) = loaded_session();
    let loaded = state.id();
    state.load_contract(LoadContract::new(404)).unwrap_err();

    state.change_required_sign(json!(true)).unwrap();

    assert!(state.body().form_data.purpose);
    assert!(persisted(&state).form_data.purpose);
    assert!(!state.store().get(loaded).unwrap().unwrap().form_data.purpose);
}

#[test]
fn local_copy_merges_proposal_into_fresh_contract() {
    let schema = FormSchema::builder()
        .text("a")
        .text("b")
        .text("c")
        .role("buyer")
        .build()
        .unwrap();
    let store = RecordingStore::new();
    let mut state = ContractState::with_schema(store.clone(), schema);

    state
        .create_new_local_copy(LocalCopy::new(json!({ "a": "x" }), "T1", "V1"))
        .unwrap();

    let body = state.body();
    assert_eq!(body.form_data.fields["a"], "x");
    assert_eq!(body.form_data.fields["b"], "");
    assert_eq!(body.form_data.fields["c"], "");
    assert_eq!(body.tid, json!("T1"));
    assert_eq!(body.version, json!("V1"));
    assert_eq!(body.id, state.id());
    assert_eq!(store.writes(), 1);
    assert_eq!(&persisted(&state), body);
}

#[test]
fn local_copy_never_introduces_new_keys() {
    let (mut state, _) = loaded_session();

    state
        .create_new_local_copy(LocalCopy::new(
            json!({ "title": "Copy", "unheardOf": "dropped", "parties": { "buyer": [1], "ghost": [2] } }),
            "T2",
            json!(3),
        ))
        .unwrap();

    let form = &state.body().form_data;
    assert_eq!(form.fields["title"], "Copy");
    assert!(!form.fields.contains_key("unheardOf"));
    assert_eq!(form.parties["buyer"], vec![1]);
    assert!(!form.parties.contains_key("ghost"));
    assert_eq!(state.body().version, json!(3));
}

#[test]
fn local_copy_supersedes_the_loaded_contract() {
    let (mut state, _) = loaded_session();
    let original = state.id();

    state
        .create_new_local_copy(LocalCopy::new(json!({}), "T", "V"))
        .unwrap();

    assert_ne!(state.id(), original);
    assert_eq!(state.all_contracts().unwrap().len(), 2);
}

#[test]
fn ill_typed_local_copy_values_are_skipped() {
    let (mut state, store) = loaded_session();

    state
        .create_new_local_copy(LocalCopy::new(
            json!({
                "title": 7,
                "description": "ok",
                "payment": { "amount": "12.5" },
                "dates": { "start": "2024-06-01T09:30:00+05:00", "end": "someday" }
            }),
            "T",
            "V",
        ))
        .unwrap();

    let form = &state.body().form_data;
    assert_eq!(form.fields["title"], "");
    assert_eq!(form.fields["description"], "ok");
    assert_eq!(form.payment.amount, 12.5);
    assert_eq!(form.dates["start"], "2024-06-01T09:30:00+05:00");
    assert_eq!(form.dates["end"], "");
    assert_eq!(store.writes(), 2);
    assert_eq!(&persisted(&state), state.body());
}

#[test]
fn local_copy_requires_an_object() {
    let (mut state, store) = loaded_session();
    let before = state.body().clone();

    let err = state
        .create_new_local_copy(LocalCopy::new(json!(["title"]), "T", "V"))
        .unwrap_err();

    assert!(matches!(err, MutationError::TypeMismatch { .. }));
    assert_eq!(state.body(), &before);
    assert_eq!(store.writes(), 1);
}

#[test]
fn filtered_view_omits_empty_values() {
    let (mut state, _) = loaded_session();

    let view = state.filtered();
    assert!(view["formData"].get("note").is_none());
    assert!(view["formData"]["parties"].get("buyer").is_none());

    state
        .change_string(FieldChange::new("note", "hi"))
        .unwrap();
    let view = state.filtered();
    assert_eq!(view["formData"]["note"], json!("hi"));
}

#[test]
fn filtered_view_is_read_only() {
    let (state, _) = loaded_session();
    let before = state.body().clone();
    let _ = state.filtered();
    assert_eq!(state.body(), &before);
}

#[test]
fn commit_dispatches_decoded_mutations() {
    let store = RecordingStore::new();
    let mut state = ContractState::new(store.clone());

    let messages = json!([
        { "type": "createNew" },
        { "type": "changeString", "payload": { "key": "title", "content": "From the wire" } },
        { "type": "changePaymentAmount", "payload": "250.5" },
        { "type": "changeRequiredSign", "payload": true },
        { "type": "setTid", "payload": { "data": "tid-9" } }
    ]);
    let mutations: Vec<Mutation> = serde_json::from_value(messages).unwrap();
    for mutation in mutations {
        state.commit(mutation).unwrap();
    }

    let form = &state.body().form_data;
    assert_eq!(form.fields["title"], "From the wire");
    assert_eq!(form.payment.amount, 250.5);
    assert!(form.purpose);
    assert_eq!(form.tid, json!("tid-9"));
    assert_eq!(store.writes(), 5);
    assert_eq!(&persisted(&state), state.body());
}

#[test]
fn commit_reports_refusals() {
    let (mut state, _) = loaded_session();
    let mutation: Mutation = serde_json::from_value(json!({
        "type": "changeString",
        "payload": { "content": "no key" }
    }))
    .unwrap();

    assert_eq!(
        state.commit(mutation).unwrap_err(),
        MutationError::MissingField("key")
    );
}

#[test]
fn update_count_tracks_writes() {
    let (mut state, store) = loaded_session();
    state.change_payment_note(json!("a")).unwrap();
    state.change_payment_note(json!(1)).unwrap_err();
    state.reset().unwrap();

    assert_eq!(state.update_count(), 3);
    assert_eq!(store.writes(), 3);
}

#[test]
fn create_new_fails_cleanly_when_store_refuses() {
    let store = RecordingStore::new();
    store.fail_writes(true);
    let mut state = ContractState::new(store.clone());

    let err = state.create_new().unwrap_err();

    assert!(matches!(err, MutationError::Store(_)));
    assert_eq!(state.id(), UNLOADED_ID);
    assert_eq!(state.update_count(), 0);
    assert!(state.all_contracts().unwrap().is_empty());
}

#[test]
fn create_new_reports_exhausted_id_space() {
    let store = InMemoryContractStore::new();
    store
        .save(&init_contract(&FormSchema::default()), ContractId::MAX)
        .unwrap();
    let mut state = ContractState::new(store.clone());

    let err = state.create_new().unwrap_err();

    assert_eq!(
        err,
        MutationError::Store(StoreError::Storage("id space exhausted".into()))
    );
    assert_eq!(state.id(), UNLOADED_ID);
    assert_eq!(state.update_count(), 0);
    assert_eq!(store.len(), 1);
}

#[test]
fn sessions_sharing_a_store_see_each_others_writes() {
    let store = InMemoryContractStore::new();
    let mut first = ContractState::new(store.clone());
    first.create_new().unwrap();
    first.change_payment_note(json!("from first")).unwrap();

    let mut second = ContractState::new(store);
    second.load_contract(LoadContract::new(first.id())).unwrap();
    assert_eq!(second.body().form_data.payment.note, "from first");
}
