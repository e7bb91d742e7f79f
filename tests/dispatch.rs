mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{bag_value, dispatch, form_request, handled_names, json_request, query_request, recording};
use http_path_handler::error::{BoxError, ErrorDescriptor};
use http_path_handler::keyring::{Keyring, RequestSnapshot, RequestSources, UploadedFile};
use http_path_handler::param::{ComparisonType, ParameterSpec, SourceKind, SourceSet, Value};
use http_path_handler::routing::{
    Arguments, DispatchSettings, Dispatcher, PathDefinition, PathTable, RequestContext, Resolver,
};

#[test]
fn declared_value_wins_over_override_in_query() {
    let path = recording("a")
        .param(ParameterSpec::expecting("target", "test"))
        .unwrap();
    let overrides = BTreeMap::from([("target".to_string(), Value::from("noway"))]);
    assert_eq!(path.build_query(Some(&overrides)), "?target=test");
}

#[test]
fn integer_parameter_is_coerced() {
    let table = PathTable::new().with(
        recording("numbers")
            .param(ParameterSpec::named("validNumber").comparison_type(ComparisonType::Integer))
            .unwrap(),
    );
    let ctx = dispatch(table, query_request("validNumber=2"));
    assert_eq!(handled_names(&ctx), ["numbers"]);
    assert_eq!(bag_value(&ctx, "numbers.validNumber"), Some(&Value::Int(2)));
}

#[test]
fn non_numeric_list_does_not_match() {
    let table = PathTable::new().with(
        recording("numbers")
            .param(ParameterSpec::named("badNumber").comparison_type(ComparisonType::Integer))
            .unwrap(),
    );
    let ctx = dispatch(table, query_request("badNumber[]=anyvaluehere"));
    assert!(ctx.handled().is_empty());
}

#[test]
fn json_body_keys() {
    let sources = RequestSources::from_snapshot(json_request(r#"{"a":1}"#));
    let body = sources.keyring(SourceKind::Body).unwrap();
    assert!(body.has_key("a"));
    assert!(!body.has_key("b"));
    assert_eq!(body.get_checked("a").unwrap(), &Value::Int(1));
    assert_eq!(body.get_checked("b").unwrap_err().kind(), "NotFoundError");
}

#[test]
fn authorization_scheme_is_the_key() {
    let sources = RequestSources::from_snapshot(RequestSnapshot::new().with_authorization("Bearer abc123"));
    let header = sources.keyring(SourceKind::Authorization).unwrap();
    assert!(header.has_key("Bearer"));
    assert_eq!(header.get_unchecked("Bearer"), &Value::from("abc123"));

    let sources = RequestSources::from_snapshot(RequestSnapshot::new().with_authorization("Bearer"));
    let header = sources.keyring(SourceKind::Authorization).unwrap();
    assert!(!header.has_key("Bearer"));
    assert!(!header.has_key(""));
}

#[test]
fn resolution_follows_priority_not_declaration() {
    let table = PathTable::new().with(
        recording("p")
            .param(ParameterSpec::named("k").sources(&[SourceKind::Body, SourceKind::Query]))
            .unwrap(),
    );

    for _ in 0..3 {
        let ctx = dispatch(
            PathTable::new().with(
                recording("p")
                    .param(ParameterSpec::named("k").sources(&[SourceKind::Body, SourceKind::Query]))
                    .unwrap(),
            ),
            form_request("k=fromquery", "k=frombody"),
        );
        assert_eq!(bag_value(&ctx, "p.k"), Some(&Value::from("fromquery")));
    }

    let settings = DispatchSettings {
        source_order: vec![
            SourceKind::Body,
            SourceKind::Query,
            SourceKind::Authorization,
            SourceKind::Files,
            SourceKind::Context,
        ],
        ..DispatchSettings::default()
    };
    let ctx = Dispatcher::with_settings(
        Arc::new(table),
        RequestSources::from_snapshot(form_request("k=fromquery", "k=frombody")),
        &settings,
    )
    .dispatch(None)
    .unwrap();
    assert_eq!(bag_value(&ctx, "p.k"), Some(&Value::from("frombody")));
}

#[test]
fn handlers_share_values_through_the_context() {
    let producer = PathDefinition::new("producer", |args: &Arguments<'_>, ctx: &mut RequestContext| -> Result<(), BoxError> {
        let token = args.value("Bearer").cloned().unwrap_or_default();
        ctx.bag_mut().insert("user", token);
        Ok(())
    })
    .param(ParameterSpec::named("Bearer").sources(&[SourceKind::Authorization]))
    .unwrap();
    let consumer = recording("consumer")
        .param(ParameterSpec::named("user").sources(&[SourceKind::Context]))
        .unwrap();

    // The consumer is registered first, so it only sees the value in the
    // second pass.
    let table = PathTable::new().with(consumer).with(producer).with(PathDefinition::new(
        "again",
        |_: &Arguments<'_>, ctx: &mut RequestContext| -> Result<(), BoxError> {
            if ctx.run() == 0 {
                ctx.request_another_pass();
            }
            Ok(())
        },
    ));

    let ctx = dispatch(table, RequestSnapshot::new().with_authorization("Bearer jane"));
    assert_eq!(ctx.passes(), 2);
    assert_eq!(handled_names(&ctx), ["producer", "again", "consumer", "producer", "again"]);
    assert_eq!(bag_value(&ctx, "consumer.user"), Some(&Value::from("jane")));
    assert_eq!(ctx.handled()[2].run, 1);
}

#[test]
fn continuation_stops_the_current_pass() {
    let table = PathTable::new()
        .with(PathDefinition::new(
            "first",
            |_: &Arguments<'_>, ctx: &mut RequestContext| -> Result<(), BoxError> {
                if ctx.run() < 2 {
                    ctx.request_another_pass();
                }
                Ok(())
            },
        ))
        .with(recording("second"));

    let ctx = dispatch(table, query_request(""));
    assert_eq!(ctx.run(), 2);
    assert_eq!(handled_names(&ctx), ["first", "first", "first", "second"]);
}

#[test]
fn supplied_context_continues_at_next_run() {
    let table = Arc::new(PathTable::new().with(
        recording("n")
            .param(ParameterSpec::named("n").comparison_type(ComparisonType::Integer))
            .unwrap(),
    ));
    let dispatcher = Dispatcher::new(table, RequestSources::from_snapshot(query_request("n[]=5&n[]=6")));

    let first = dispatcher.dispatch(None).unwrap();
    assert_eq!(bag_value(&first, "n.n"), Some(&Value::Int(5)));

    let second = dispatcher.dispatch(Some(first)).unwrap();
    assert_eq!(second.run(), 1);
    assert_eq!(bag_value(&second, "n.n"), Some(&Value::Int(6)));
    assert_eq!(second.handled().len(), 2);
}

#[test]
fn handler_failure_chain() {
    #[derive(Debug, thiserror::Error)]
    #[error("quota exceeded")]
    struct Quota;

    let table = PathTable::new()
        .with(PathDefinition::new(
            "failing",
            |_: &Arguments<'_>, _: &mut RequestContext| -> Result<(), BoxError> { Err(Box::new(Quota)) },
        ))
        .with(recording("never"));

    let dispatcher = Dispatcher::new(Arc::new(table), RequestSources::from_snapshot(query_request("")));
    let err = dispatcher.dispatch(None).unwrap_err();
    assert_eq!(err.path(), Some("failing"));

    let mut chain = Vec::new();
    let tagged = |e: &(dyn std::error::Error + 'static)| ErrorDescriptor::new("T", e.to_string());
    assert!(dispatcher
        .dispatch_with_error_handling(|c| chain = c, Some(&tagged))
        .is_none());
    assert_eq!(
        chain,
        vec![
            ErrorDescriptor::new("T", "quota exceeded"),
            ErrorDescriptor::new("T", "an error occurred in path 'failing'"),
        ]
    );
}

#[test]
fn uploaded_files_are_descriptors() {
    let snapshot = RequestSnapshot::new()
        .with_content_type("multipart/form-data; boundary=x")
        .with_form_field("title", "report")
        .with_file(UploadedFile::new("document", "a.pdf", 42).with_content_type("application/pdf"));

    let table = PathTable::new().with(
        recording("upload")
            .param(ParameterSpec::named("document").sources(&[SourceKind::Files]))
            .unwrap()
            .param(ParameterSpec::named("title").sources(&[SourceKind::Body]))
            .unwrap(),
    );
    let ctx = dispatch(table, snapshot);

    let Some(Value::Map(file)) = bag_value(&ctx, "upload.document") else {
        panic!("expected a file descriptor");
    };
    assert_eq!(file.get("name"), Some(&Value::from("a.pdf")));
    assert_eq!(file.get("size"), Some(&Value::Int(42)));
    assert_eq!(bag_value(&ctx, "upload.title"), Some(&Value::from("report")));
}

#[test]
fn lookup_reads_undeclared_keys() {
    let table = PathTable::new().with(PathDefinition::new(
        "peek",
        |args: &Arguments<'_>, ctx: &mut RequestContext| -> Result<(), BoxError> {
            if let Some((kind, value)) = args.lookup("extra", SourceSet::all()) {
                ctx.bag_mut().insert("kind", kind.name());
                ctx.bag_mut().insert("extra", value.clone());
            }
            Ok(())
        },
    ));
    let ctx = dispatch(table, json_request(r#"{"extra":[1,2]}"#));
    assert_eq!(bag_value(&ctx, "kind"), Some(&Value::from("body")));
    assert_eq!(bag_value(&ctx, "extra"), Some(&Value::from(vec![1i64, 2])));
}

#[test]
fn resolver_is_deterministic() {
    let sources = RequestSources::from_snapshot(form_request("a=1", "a=2&b=3"));
    let resolver = Resolver::new(&sources, None);
    let declared = SourceSet::of(&[SourceKind::Body, SourceKind::Query]);

    let kinds: Vec<_> = (0..5)
        .map(|_| resolver.find("a", declared).map(|r| r.kind))
        .collect();
    assert!(kinds.iter().all(|k| *k == Some(SourceKind::Query)));
    assert_eq!(resolver.find("b", declared).map(|r| r.kind), Some(SourceKind::Body));
    assert!(resolver.find("c", declared).is_none());
}
