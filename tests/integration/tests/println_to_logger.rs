//! Integration tests for rewriting `System.out.println` calls into logger
//! calls.
//!
//! Drives the whole pipeline: listeners registered on an engine, a walk over
//! a class, rewrite requests collected in a batch, shared state memoising the
//! logger field per class, and a second walk over the rewritten tree.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::io::Write;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use treewalk_ast::{
    AstArena, CompilationUnit, Import, JavaNode, NodeData, NodeKind, PrimitiveKind, TreeMaker,
    compare_methods, compare_variables,
};
use treewalk_core::{
    CollectingSink, Engine, EngineConfig, LifecycleListener, ListenerError, NodeListener,
    RewriteBatch, SharedState, StateValue, TraversalContext, TraversalEvent,
};

const LOGGER_TYPE: &str = "java.util.logging.Logger";
const LOGGER_FIELD: &str = "LOGGER";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn field_key(class: &JavaNode<'_>) -> String {
    format!("logger-field:{}", class.name().unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rewritten {
    message: String,
    path: Vec<NodeKind>,
}

/// Replaces `System.out.println(x);` with `LOGGER.info(x);` and remembers,
/// per enclosing class, the logger field those calls need.
#[derive(Default)]
struct PrintlnToLogger {
    rewritten: RefCell<Vec<Rewritten>>,
    fields_built: Cell<usize>,
}

impl NodeListener for PrintlnToLogger {
    fn kind(&self) -> Option<NodeKind> {
        Some(NodeKind::ExpressionStatement)
    }

    fn on_enter<'a>(
        &self,
        event: &TraversalEvent<'a, '_>,
        cx: &mut TraversalContext<'a, '_>,
    ) -> Result<(), ListenerError> {
        let NodeData::ExpressionStatement { expression } = event.node().data else {
            return Ok(());
        };
        let NodeData::MethodInvocation {
            method_select,
            arguments,
            ..
        } = expression.data
        else {
            return Ok(());
        };
        if method_select.qualified_name().as_deref() != Some("System.out.println") {
            return Ok(());
        }

        let class = event
            .ancestors()
            .nearest(NodeKind::Class)
            .ok_or_else(|| ListenerError::failed("println outside of a class"))?;
        let key = field_key(class);
        if !cx.state().contains(&key) {
            let make = cx.maker();
            let logger_type = if event.imports().is_type_imported(LOGGER_TYPE) {
                make.identifier("Logger")
            } else {
                make.qualified_name(LOGGER_TYPE)
            };
            let get_logger = make.invocation(
                make.member_select(logger_type, "getLogger"),
                &[make.string_literal(class.name().unwrap_or_default())],
            );
            let field = make.variable(LOGGER_FIELD, Some(logger_type), Some(get_logger));
            cx.state_mut().set(key, field);
            self.fields_built.set(self.fields_built.get() + 1);
        }

        let make = cx.maker();
        let call = make.invocation(
            make.member_select(make.identifier(LOGGER_FIELD), "info"),
            arguments,
        );
        cx.rewrite(event.node(), make.expression_statement(call))?;

        let mut path = event.ancestors().kinds();
        path.push(event.kind());
        self.rewritten.borrow_mut().push(Rewritten {
            message: arguments
                .first()
                .and_then(|argument| argument.as_string_literal())
                .unwrap_or_default()
                .to_string(),
            path,
        });
        Ok(())
    }
}

/// Adds the memoised logger field to its class once the class is done,
/// unless the class already declares the same field.
#[derive(Default)]
struct InstallLoggerField {
    installed: Cell<usize>,
    already_declared: Cell<usize>,
}

impl NodeListener for InstallLoggerField {
    fn kind(&self) -> Option<NodeKind> {
        Some(NodeKind::Class)
    }

    fn on_exit<'a>(
        &self,
        event: &TraversalEvent<'a, '_>,
        cx: &mut TraversalContext<'a, '_>,
    ) -> Result<(), ListenerError> {
        let class = event.node();
        let Some(field) = cx
            .state()
            .get(&field_key(class))
            .and_then(StateValue::as_node)
        else {
            return Ok(());
        };
        if class
            .children()
            .iter()
            .any(|member| compare_variables(member, field) == Ordering::Equal)
        {
            self.already_declared.set(self.already_declared.get() + 1);
            return Ok(());
        }

        let with_field = cx
            .maker()
            .insert_into(class, 0, field)
            .ok_or_else(|| ListenerError::state("logger field owner is not a class"))?;
        cx.rewrite(class, with_field)?;
        self.installed.set(self.installed.get() + 1);
        Ok(())
    }
}

/// Replaces each `System.out.println(x)` call expression with
/// `LOGGER.info(x)`, leaving the enclosing statement alone.
#[derive(Default)]
struct PrintlnCallToInfo {
    rewritten: RefCell<Vec<Rewritten>>,
}

impl NodeListener for PrintlnCallToInfo {
    fn kind(&self) -> Option<NodeKind> {
        Some(NodeKind::MethodInvocation)
    }

    fn on_enter<'a>(
        &self,
        event: &TraversalEvent<'a, '_>,
        cx: &mut TraversalContext<'a, '_>,
    ) -> Result<(), ListenerError> {
        let NodeData::MethodInvocation {
            method_select,
            arguments,
            ..
        } = event.node().data
        else {
            return Ok(());
        };
        if method_select.qualified_name().as_deref() != Some("System.out.println") {
            return Ok(());
        }

        let make = cx.maker();
        let info = make.invocation(
            make.member_select(make.identifier(LOGGER_FIELD), "info"),
            arguments,
        );
        cx.rewrite(event.node(), info)?;

        self.rewritten.borrow_mut().push(Rewritten {
            message: arguments
                .first()
                .and_then(|argument| argument.as_string_literal())
                .unwrap_or_default()
                .to_string(),
            path: event.ancestors().kinds(),
        });
        Ok(())
    }
}

/// Collects the dotted names of every method call.
#[derive(Default)]
struct CallNames {
    names: RefCell<Vec<String>>,
}

impl NodeListener for CallNames {
    fn kind(&self) -> Option<NodeKind> {
        Some(NodeKind::MethodInvocation)
    }

    fn on_enter<'a>(
        &self,
        event: &TraversalEvent<'a, '_>,
        _cx: &mut TraversalContext<'a, '_>,
    ) -> Result<(), ListenerError> {
        if let NodeData::MethodInvocation { method_select, .. } = event.node().data {
            let name = method_select.qualified_name().unwrap_or_default();
            self.names.borrow_mut().push(name);
        }
        Ok(())
    }
}

fn println<'a>(make: &TreeMaker<'a>, text: &str) -> &'a JavaNode<'a> {
    make.expression_statement(make.invocation(
        make.qualified_name("System.out.println"),
        &[make.string_literal(text)],
    ))
}

/// `class Main { void main(boolean x) { if (x) { println("a"); } else { println("b"); } } }`
fn if_else_class<'a>(make: &TreeMaker<'a>) -> &'a JavaNode<'a> {
    let if_stmt = make.if_statement(
        make.identifier("x"),
        make.block(&[println(make, "a")]),
        Some(make.block(&[println(make, "b")])),
    );
    let method = make.method(
        "main",
        &[make.variable("x", Some(make.primitive_type(PrimitiveKind::Boolean)), None)],
        Some(make.primitive_type(PrimitiveKind::Void)),
        Some(make.block(&[if_stmt])),
    );
    make.class("Main", &[method])
}

fn call_names<'a>(arena: &'a AstArena, root: &'a JavaNode<'a>) -> Vec<String> {
    let engine = Engine::new();
    let calls = Rc::new(CallNames::default());
    engine.register(calls.clone());

    let mut batch = RewriteBatch::new();
    let mut state = SharedState::new();
    let mut cx = TraversalContext::new(arena, &mut batch, &mut state);
    engine.traverse(root, &[], &mut cx).unwrap();

    calls.names.take()
}

#[test]
fn rewrites_both_branches_with_full_path() {
    init_tracing();
    let arena = AstArena::new();
    let make = TreeMaker::new(&arena);
    let root = if_else_class(&make);

    let engine = Engine::new();
    let println_listener = Rc::new(PrintlnToLogger::default());
    engine.register(println_listener.clone());

    let mut batch = RewriteBatch::new();
    let mut state = SharedState::new();
    let mut cx = TraversalContext::new(&arena, &mut batch, &mut state);
    engine.traverse(root, &[], &mut cx).unwrap();

    let expected_path = vec![
        NodeKind::Class,
        NodeKind::Method,
        NodeKind::Block,
        NodeKind::If,
        NodeKind::Block,
        NodeKind::ExpressionStatement,
    ];
    assert_eq!(
        *println_listener.rewritten.borrow(),
        vec![
            Rewritten {
                message: "a".to_string(),
                path: expected_path.clone(),
            },
            Rewritten {
                message: "b".to_string(),
                path: expected_path,
            },
        ]
    );
    assert_eq!(batch.len(), 2);
}

#[test]
fn invocation_listener_sees_statement_ancestors() {
    init_tracing();
    let arena = AstArena::new();
    let make = TreeMaker::new(&arena);
    let root = if_else_class(&make);

    let engine = Engine::new();
    let calls = Rc::new(PrintlnCallToInfo::default());
    engine.register(calls.clone());

    let mut batch = RewriteBatch::new();
    let mut state = SharedState::new();
    let mut cx = TraversalContext::new(&arena, &mut batch, &mut state);
    engine.traverse(root, &[], &mut cx).unwrap();

    let expected_path = vec![
        NodeKind::Class,
        NodeKind::Method,
        NodeKind::Block,
        NodeKind::If,
        NodeKind::Block,
        NodeKind::ExpressionStatement,
    ];
    assert_eq!(
        *calls.rewritten.borrow(),
        vec![
            Rewritten {
                message: "a".to_string(),
                path: expected_path.clone(),
            },
            Rewritten {
                message: "b".to_string(),
                path: expected_path,
            },
        ]
    );
    assert_eq!(batch.len(), 2);
    for request in batch.requests() {
        assert_eq!(request.old.kind(), NodeKind::MethodInvocation);
        assert_eq!(request.new.kind(), NodeKind::MethodInvocation);
    }

    let rewritten = batch.apply(&arena, root);
    assert_eq!(
        call_names(&arena, rewritten),
        vec!["LOGGER.info".to_string(), "LOGGER.info".to_string()]
    );
}

#[test]
fn logger_field_is_built_once_per_class() {
    init_tracing();
    let arena = AstArena::new();
    let make = TreeMaker::new(&arena);
    let root = if_else_class(&make);

    let engine = Engine::new();
    let println_listener = Rc::new(PrintlnToLogger::default());
    let installer = Rc::new(InstallLoggerField::default());
    engine.register(println_listener.clone());
    engine.register(installer.clone());

    let mut batch = RewriteBatch::new();
    let mut state = SharedState::new();
    let mut cx = TraversalContext::new(&arena, &mut batch, &mut state);
    engine.traverse(root, &[], &mut cx).unwrap();

    assert_eq!(println_listener.fields_built.get(), 1);
    assert_eq!(installer.installed.get(), 1);
    // Two statement rewrites plus the class rewrite.
    assert_eq!(batch.len(), 3);

    let rewritten = batch.apply(&arena, root);
    let members = rewritten.children();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].name(), Some(LOGGER_FIELD));
    assert_eq!(
        compare_methods(members[1], root.children()[0]),
        Ordering::Equal
    );

    // The statement rewrites are applied inside the rewritten class.
    assert_eq!(
        call_names(&arena, rewritten),
        vec![
            format!("{}.getLogger", LOGGER_TYPE),
            "LOGGER.info".to_string(),
            "LOGGER.info".to_string(),
        ]
    );
    // The original version is untouched.
    assert_eq!(
        call_names(&arena, root),
        vec!["System.out.println".to_string(), "System.out.println".to_string()]
    );
}

#[rstest]
#[case::not_imported(&[], LOGGER_TYPE)]
#[case::imported(&["java.util.logging.Logger"], "Logger")]
#[case::imported_on_demand(&["java.util.logging.*"], "Logger")]
#[case::shadowed_by_single_type(&["com.acme.Logger", "java.util.logging.*"], LOGGER_TYPE)]
fn logger_type_follows_imports(#[case] imports: &[&str], #[case] expected_type: &str) {
    let arena = AstArena::new();
    let make = TreeMaker::new(&arena);
    let root = if_else_class(&make);
    let imports: Vec<Import<'_>> = imports.iter().map(|&name| Import::new(name)).collect();

    let engine = Engine::new();
    engine.register(Rc::new(PrintlnToLogger::default()));

    let mut batch = RewriteBatch::new();
    let mut state = SharedState::new();
    let mut cx = TraversalContext::new(&arena, &mut batch, &mut state);
    engine.traverse(root, &imports, &mut cx).unwrap();

    let field = state
        .get("logger-field:Main")
        .and_then(StateValue::as_node)
        .unwrap();
    let NodeData::Variable { var_type, .. } = field.data else {
        panic!("Expected a variable");
    };
    assert_eq!(
        var_type.and_then(|t| t.qualified_name()).as_deref(),
        Some(expected_type)
    );
}

#[test]
fn declared_logger_field_is_not_added_again() {
    let arena = AstArena::new();
    let make = TreeMaker::new(&arena);
    let existing = make.variable(LOGGER_FIELD, Some(make.identifier("Logger")), None);
    let method = make.method("m", &[], None, Some(make.block(&[println(&make, "hi")])));
    let root = make.class("Main", &[existing, method]);
    let imports = [Import::new(LOGGER_TYPE)];

    let engine = Engine::new();
    let installer = Rc::new(InstallLoggerField::default());
    engine.register(Rc::new(PrintlnToLogger::default()));
    engine.register(installer.clone());

    let mut batch = RewriteBatch::new();
    let mut state = SharedState::new();
    let mut cx = TraversalContext::new(&arena, &mut batch, &mut state);
    engine.traverse(root, &imports, &mut cx).unwrap();

    assert_eq!(installer.installed.get(), 0);
    assert_eq!(installer.already_declared.get(), 1);
    let rewritten = batch.apply(&arena, root);
    assert_eq!(rewritten.children().len(), 2);
}

#[rstest]
#[case::stderr("System.err.println")]
#[case::unqualified("out.println")]
#[case::print("System.out.print")]
fn other_calls_are_left_alone(#[case] callee: &str) {
    let arena = AstArena::new();
    let make = TreeMaker::new(&arena);
    let stmt = make.expression_statement(
        make.invocation(make.qualified_name(callee), &[make.string_literal("x")]),
    );
    let root = make.class("Main", &[make.method("m", &[], None, Some(make.block(&[stmt])))]);

    let engine = Engine::new();
    let println_listener = Rc::new(PrintlnToLogger::default());
    engine.register(println_listener.clone());

    let mut batch = RewriteBatch::new();
    let mut state = SharedState::new();
    let mut cx = TraversalContext::new(&arena, &mut batch, &mut state);
    engine.traverse(root, &[], &mut cx).unwrap();

    assert!(batch.is_empty());
    assert!(state.is_empty());
    assert!(println_listener.rewritten.borrow().is_empty());
}

/// Marks the shared state initialized at the start of a run and counts the
/// runs that completed.
struct RunTracker {
    state_ready: Cell<bool>,
    completed: Cell<usize>,
}

impl LifecycleListener for RunTracker {
    fn on_begin(&self) {
        self.state_ready.set(true);
    }

    fn on_end(&self) {
        self.completed.set(self.completed.get() + 1);
    }
}

#[test]
fn compilation_unit_keeps_one_field_per_class() {
    init_tracing();
    let arena = AstArena::new();
    let make = TreeMaker::new(&arena);
    let first = make.class(
        "First",
        &[make.method("a", &[], None, Some(make.block(&[println(&make, "1"), println(&make, "2")])))],
    );
    let inner = make.class(
        "Inner",
        &[make.method("b", &[], None, Some(make.block(&[println(&make, "3")])))],
    );
    let second = make.class("Second", &[inner]);
    let imports = arena.alloc_slice_copy(&[Import::new("java.util.logging.Logger")]);
    let unit = CompilationUnit::new(
        Some("com.example"),
        imports,
        arena.alloc_nodes(&[first, second]),
    );

    let engine = Engine::new();
    let println_listener = Rc::new(PrintlnToLogger::default());
    let installer = Rc::new(InstallLoggerField::default());
    let tracker = Rc::new(RunTracker {
        state_ready: Cell::new(false),
        completed: Cell::new(0),
    });
    engine.register(println_listener.clone());
    engine.register(installer.clone());
    engine.add_lifecycle_listener(tracker.clone());

    let mut batch = RewriteBatch::new();
    let mut state = SharedState::new();
    let mut cx = TraversalContext::new(&arena, &mut batch, &mut state);
    engine.traverse_unit(&unit, &mut cx).unwrap();

    assert!(tracker.state_ready.get());
    assert_eq!(tracker.completed.get(), 1);
    // First and Inner need a field; Second has no println of its own.
    assert_eq!(println_listener.fields_built.get(), 2);
    assert_eq!(installer.installed.get(), 2);
    assert!(state.contains("logger-field:First"));
    assert!(state.contains("logger-field:Inner"));
    assert!(!state.contains("logger-field:Second"));

    let second_rewritten = batch.apply(&arena, second);
    let inner_rewritten = second_rewritten.children()[0];
    assert_eq!(inner_rewritten.children()[0].name(), Some(LOGGER_FIELD));
}

#[test]
fn unknown_constructs_are_reported_and_skipped() {
    init_tracing();
    let arena = AstArena::new();
    let make = TreeMaker::new(&arena);
    let hidden = println(&make, "inside lambda");
    let lambda = make.unknown("Lambda", &[make.block(&[hidden])]);
    let body = make.block(&[make.expression_statement(lambda), println(&make, "visible")]);
    let root = make.class("Main", &[make.method("m", &[], None, Some(body))]);

    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(config_file, r#"{{ "report_unrecognized": true, "trace_events": true }}"#).unwrap();
    let config = EngineConfig::from_file(config_file.path()).unwrap();

    let sink = Rc::new(CollectingSink::new());
    let engine = Engine::with_config(config).with_diagnostics(Rc::clone(&sink));
    let println_listener = Rc::new(PrintlnToLogger::default());
    engine.register(println_listener.clone());

    let mut batch = RewriteBatch::new();
    let mut state = SharedState::new();
    let mut cx = TraversalContext::new(&arena, &mut batch, &mut state);
    let summary = engine.traverse(root, &[], &mut cx).unwrap();

    assert_eq!(summary.unrecognized, 1);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.diagnostics()[0].label.as_deref(), Some("Lambda"));
    let messages: Vec<_> = println_listener
        .rewritten
        .borrow()
        .iter()
        .map(|r| r.message.clone())
        .collect();
    assert_eq!(messages, vec!["visible".to_string()]);
}

#[test]
fn descending_into_unknown_reaches_nested_calls() {
    let arena = AstArena::new();
    let make = TreeMaker::new(&arena);
    let lambda = make.unknown("Lambda", &[make.block(&[println(&make, "inside lambda")])]);
    let body = make.block(&[make.expression_statement(lambda)]);
    let root = make.class("Main", &[make.method("m", &[], None, Some(body))]);

    let config = EngineConfig::from_json(r#"{ "descend_into_unknown": true }"#).unwrap();
    let engine = Engine::with_config(config).with_diagnostics(CollectingSink::new());
    let println_listener = Rc::new(PrintlnToLogger::default());
    engine.register(println_listener.clone());

    let mut batch = RewriteBatch::new();
    let mut state = SharedState::new();
    let mut cx = TraversalContext::new(&arena, &mut batch, &mut state);
    engine.traverse(root, &[], &mut cx).unwrap();

    let rewritten = println_listener.rewritten.borrow();
    assert_eq!(rewritten.len(), 1);
    assert_eq!(
        rewritten[0].path,
        vec![
            NodeKind::Class,
            NodeKind::Method,
            NodeKind::Block,
            NodeKind::ExpressionStatement,
            NodeKind::Other,
            NodeKind::Block,
            NodeKind::ExpressionStatement,
        ]
    );
}
