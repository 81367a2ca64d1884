use pretty_assertions::assert_eq;
use rpiter::{
    Config, Context, Flow, PipeErr, Pipeline, RawIter, Segment, Separator, Spec, TargetKind, TargetRegistry, Value,
};

fn ints(items: &[i64]) -> Vec<Value> {
    items.iter().map(|&i| Value::from(i)).collect()
}

fn range(n: i64) -> Value {
    Value::List(ints(&(0..n).collect::<Vec<_>>()))
}

fn run(pipeline: &Pipeline, target: Value) -> Result<Vec<Value>, PipeErr> {
    pipeline.execute(target, &Context::new())?.try_collect_values()
}

fn eval(target: Value, spec: &Spec) -> Result<Flow, PipeErr> {
    Context::new().evaluate(target, spec)
}

fn lower() -> Spec {
    Spec::func("lower", |v| match v {
        Value::Str(s) => Value::Str(s.to_lowercase()),
        other => other,
    })
}

/// 以整数为目标时生成`0..n`。
fn range_context() -> Context {
    let mut registry = TargetRegistry::default();
    registry.register(TargetKind::Int, |target| {
        let n = target.as_int().unwrap_or_default();
        Ok(Box::new((0..n).map(|i| Ok(Value::from(i)))) as RawIter)
    });
    Context::with_parts(registry, rpiter::DefaultEvaluator)
}

#[test]
fn test_chunked_examples() {
    let chunks = run(&Pipeline::new().chunked(3, None).unwrap(), range(10)).unwrap();
    assert_eq!(
        chunks,
        vec![
            Value::List(ints(&[0, 1, 2])),
            Value::List(ints(&[3, 4, 5])),
            Value::List(ints(&[6, 7, 8])),
            Value::List(ints(&[9]))
        ]
    );
    let filled = run(&Pipeline::new().chunked(3, Some(Value::Null)).unwrap(), range(10)).unwrap();
    assert_eq!(filled.last(), Some(&Value::List(vec![Value::from(9), Value::Null, Value::Null])));
}

#[test]
fn test_windowed_example() {
    let windows = run(&Pipeline::new().windowed(2).unwrap(), range(4)).unwrap();
    assert_eq!(windows, vec![Value::List(ints(&[0, 1])), Value::List(ints(&[1, 2])), Value::List(ints(&[2, 3]))]);
}

#[test]
fn test_unique_with_lower_key() {
    let chars = run(&Pipeline::new().unique_by(lower()), Value::from("gloMolIcious")).unwrap();
    let text: String = chars.iter().filter_map(Value::as_str).collect();
    assert_eq!(text, "gloMIcus");
}

#[test]
fn test_split_examples() {
    let target = Value::List(vec![
        Value::from(1),
        Value::from(2),
        Value::Null,
        Value::Null,
        Value::from(3),
        Value::Null,
        Value::from(4),
        Value::Null,
    ]);
    let groups = |items: Vec<Vec<Value>>| items.into_iter().map(Value::List).collect::<Vec<_>>();
    assert_eq!(
        run(&Pipeline::new().split(Separator::Null, None), target.clone()).unwrap(),
        groups(vec![ints(&[1, 2]), ints(&[3]), ints(&[4])])
    );
    assert_eq!(
        run(&Pipeline::new().split(Separator::any_of([Value::Null]), None), target.clone()).unwrap(),
        groups(vec![ints(&[1, 2]), vec![], ints(&[3]), ints(&[4]), vec![]])
    );
    assert_eq!(
        run(&Pipeline::new().split(Separator::default(), Some(2)), target).unwrap(),
        groups(vec![ints(&[1, 2]), ints(&[3]), vec![Value::from(4), Value::Null]])
    );
}

#[test]
fn test_flatten_example() {
    let target = Value::List(vec![Value::from(vec![1, 2]), Value::from(vec![3, 4]), Value::from(vec![5])]);
    assert_eq!(run(&Pipeline::new().flatten(), target), Ok(ints(&[1, 2, 3, 4, 5])));
}

#[test]
fn test_slice_examples() {
    let target = range(6);
    assert_eq!(run(&Pipeline::new().slice(&[Value::from(3)]).unwrap(), target.clone()), Ok(ints(&[0, 1, 2])));
    assert_eq!(
        run(&Pipeline::new().slice(&[Value::from(2), Value::from(4)]).unwrap(), target.clone()),
        Ok(ints(&[2, 3]))
    );
    assert_eq!(run(&Pipeline::new().limit(4), target), Ok(ints(&[0, 1, 2, 3])));
}

#[test]
fn test_invalid_slice_fails_before_any_target() {
    let err = Pipeline::new().map(lower()).slice(&[Value::from(1), Value::from(2), Value::from(3), Value::from(4)]);
    assert_eq!(
        err.err(),
        Some(PipeErr::InvalidArguments { stage: "slice", reason: "expected 1 to 3 arguments, got 4".to_string() })
    );
}

#[test]
fn test_take_and_drop_while() {
    let small = Spec::func("small", |v| Value::from(v.as_int().is_some_and(|i| i < 3)));
    let target = Value::from(vec![1, 2, 5, 1, 2]);
    assert_eq!(run(&Pipeline::new().take_while(small.clone()), target.clone()), Ok(ints(&[1, 2])));
    assert_eq!(run(&Pipeline::new().drop_while(small), target), Ok(ints(&[5, 1, 2])));
}

#[test]
fn test_skip_applies_before_chunk_boundaries() {
    let skip_threes = Spec::flow_func("skip_threes", |v, _| {
        Ok(if v.as_int().is_some_and(|i| i % 3 == 0) { Flow::Skip } else { Flow::Value(v) })
    });
    let pipeline = Pipeline::with_subspec(skip_threes).chunked(2, None).unwrap();
    let chunks = run(&pipeline, range(8)).unwrap();
    assert_eq!(chunks, vec![Value::List(ints(&[1, 2])), Value::List(ints(&[4, 5])), Value::List(ints(&[7]))]);
}

#[test]
fn test_stop_ends_windowed_stream() {
    let stop_at_4 = Spec::flow_func("stop_at_4", |v, _| Ok(if v.as_int() == Some(4) { Flow::Stop } else { Flow::Value(v) }));
    let pipeline = Pipeline::with_subspec(stop_at_4).windowed(2).unwrap();
    let windows = run(&pipeline, range(100)).unwrap();
    assert_eq!(windows, vec![Value::List(ints(&[0, 1])), Value::List(ints(&[1, 2])), Value::List(ints(&[2, 3]))]);
}

#[test]
fn test_all_collects() {
    let spec = Pipeline::new().filter(Spec::Identity).all();
    assert_eq!(eval(range(4), &spec), Ok(Flow::Value(Value::List(ints(&[1, 2, 3])))));
}

#[test]
fn test_first_examples() {
    let target = Value::List(vec![Value::from(false), Value::from(1), Value::from(2), Value::from(3)]);
    assert_eq!(eval(target, &Pipeline::new().first()), Ok(Flow::Value(Value::from(1))));
    let none = Pipeline::new().first_by(Spec::func("never", |_| Value::from(false)), Value::from("D"));
    assert_eq!(eval(range(5), &none), Ok(Flow::Value(Value::from("D"))));
    assert_eq!(eval(Value::List(vec![]), &Pipeline::new().first()), Ok(Flow::Value(Value::Null)));
}

#[test]
fn test_first_consumes_lazily_over_unbounded_target() {
    let ctx = range_context();
    let big = Spec::func("big", |v| Value::from(v.as_int().is_some_and(|i| i > 10)));
    let spec = Pipeline::new().first_by(big, Value::Null);
    assert_eq!(ctx.evaluate(Value::from(i64::MAX), &spec), Ok(Flow::Value(Value::from(11))));
}

#[test]
fn test_nested_pipeline_in_map() {
    let inner = Pipeline::new().filter(Spec::Identity).all();
    let pipeline = Pipeline::new().map(inner);
    let target = Value::List(vec![Value::from(vec![0, 1]), Value::from(vec![2, 0, 3])]);
    assert_eq!(run(&pipeline, target), Ok(vec![Value::from(vec![1]), Value::from(vec![2, 3])]));
}

#[test]
fn test_flatten_nested_streams() {
    let ctx = range_context();
    let pipeline = Pipeline::new().map(Spec::from(Pipeline::new())).flatten().limit(4);
    let items = pipeline.execute(Value::from(vec![2, 0, 3]), &ctx).unwrap().try_collect_values();
    assert_eq!(items, Ok(ints(&[0, 1, 0, 1])));
}

#[test]
fn test_nested_failure_reports_stage_path() {
    let ctx = range_context();
    let inner = Pipeline::new().map(Spec::try_func("fail", |_| Err("inner failure".to_string()))).all();
    let err = Pipeline::new().map(inner).execute(Value::from(vec![1]), &ctx).unwrap().next();
    assert_eq!(
        err,
        Some(Err(PipeErr::Evaluation {
            path: rpiter::Path::from([
                Segment::Stage("map"),
                Segment::Index(0),
                Segment::Stage("map"),
                Segment::Index(0)
            ]),
            reason: "inner failure".to_string()
        }))
    );
}

#[test]
fn test_stage_failure_names_element() {
    let bad = Spec::try_func("bad", |v| if v.as_int() == Some(2) { Err("bad".to_string()) } else { Ok(v) });
    let err = run(&Pipeline::new().map(bad), range(3)).err().map(|e| e.to_string());
    assert_eq!(err.as_deref(), Some("[Eval] Evaluation failed at `$.map[2]`: bad"));
}

#[test]
fn test_nested_pipelines_through_subspec() {
    let outer = Pipeline::with_subspec(Pipeline::new().first()).all();
    let target = Value::List(vec![Value::from(vec![0, 2]), Value::from(vec![0, 0])]);
    assert_eq!(eval(target, &outer), Ok(Flow::Value(Value::List(vec![Value::from(2), Value::Null]))));
}

#[test]
fn test_not_iterable_target() {
    let err = run(&Pipeline::new(), Value::from(3)).err();
    assert_eq!(err.map(|e| e.to_string()), Some("[Not Iterable] Failed to iterate on instance of type `int` at `$`".to_string()));
}

#[test]
fn test_filter_asymmetry_and_strict_config() {
    let fragile = Spec::try_func("fragile", |v| if v.as_int() == Some(1) { Err("fragile".to_string()) } else { Ok(v) });
    let pipeline = Pipeline::new().filter(fragile.clone());
    assert_eq!(run(&pipeline, range(4)), Ok(ints(&[2, 3])));
    let strict = Context::new().with_configs([Config::StrictFilter]);
    let strict_result = pipeline.execute(range(4), &strict).unwrap().try_collect_values();
    assert!(matches!(strict_result, Err(PipeErr::Evaluation { .. })));
    let taken = run(&Pipeline::new().take_while(fragile), Value::from(vec![1, 2]));
    assert!(matches!(taken, Err(PipeErr::Evaluation { .. })));
}

#[test]
fn test_reexecution_is_independent() {
    let pipeline = Pipeline::new().map(lower()).unique();
    let ctx = Context::new().with_configs([Config::Verbose]);
    let first = pipeline.execute(Value::from("AaB"), &ctx).unwrap().try_collect_values();
    let second = pipeline.execute(Value::from("AaB"), &ctx).unwrap().try_collect_values();
    assert_eq!(first, Ok(vec![Value::from("a"), Value::from("b")]));
    assert_eq!(first, second);
}
