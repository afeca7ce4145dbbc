use thunderbird_ast::domain::{AstError, DataType, Declaration, Program, ScopeId, SymbolKind};

#[test]
fn innermost_declaration_wins() {
    let mut builder = Program::builder();
    let ast = builder.ast_mut();
    let outer = ast.open_scope(ScopeId::GLOBAL).unwrap();
    let inner = ast.open_scope(outer).unwrap();

    ast.declare(ScopeId::GLOBAL, Declaration::variable("x", DataType::Int, 1)).unwrap();
    ast.declare(outer, Declaration::variable("x", DataType::Float, 2)).unwrap();
    ast.declare(ScopeId::GLOBAL, Declaration::variable("g", DataType::Bool, 3)).unwrap();

    let found = ast.lookup(inner, "x").unwrap();
    assert_eq!(found.data_type, DataType::Float);
    assert_eq!(found.scope, outer);

    // Falls through every level to the global table.
    assert_eq!(ast.lookup(inner, "g").unwrap().scope, ScopeId::GLOBAL);
    assert_eq!(ast.scopes().depth(inner).unwrap(), 2);

    match ast.lookup(inner, "nope") {
        Err(AstError::UndefinedSymbol { name, scope }) => {
            assert_eq!(name, "nope");
            assert_eq!(scope, inner);
        }
        other => panic!("expected UndefinedSymbol, got {:?}", other),
    }
}

#[test]
fn shadowing_leaves_outer_entry_intact_after_discard() {
    let mut builder = Program::builder();
    builder
        .ast_mut()
        .declare(ScopeId::GLOBAL, Declaration::variable("count", DataType::Int, 1))
        .unwrap();

    let checkpoint = builder.checkpoint();
    let ast = builder.ast_mut();
    let scope = ast.open_scope(ScopeId::GLOBAL).unwrap();
    ast.declare(scope, Declaration::variable("count", DataType::Float, 7)).unwrap();
    assert_eq!(ast.lookup(scope, "count").unwrap().data_type, DataType::Float);
    builder.rollback(checkpoint);

    let program = builder.finish();
    let entry = program.lookup(ScopeId::GLOBAL, "count").unwrap();
    assert_eq!(entry.data_type, DataType::Int);
    assert_eq!(entry.line, 1);
    assert_eq!(entry.kind, SymbolKind::Variable);
    assert_eq!(program.ast().scopes().len(), 1);
    program.validate().unwrap();
}

#[test]
fn duplicate_in_same_table_is_rejected() {
    let mut builder = Program::builder();
    let ast = builder.ast_mut();
    let scope = ast.open_scope(ScopeId::GLOBAL).unwrap();
    ast.declare(scope, Declaration::variable("y", DataType::Int, 4)).unwrap();

    let err = ast
        .declare(scope, Declaration::variable("y", DataType::Float, 9))
        .unwrap_err();
    assert_eq!(
        err,
        AstError::DuplicateSymbol {
            name: "y".to_string(),
            scope,
            previous_line: 4,
        }
    );
    assert_eq!(err.category(), "symbol");
    // The first declaration is untouched.
    assert_eq!(ast.lookup(scope, "y").unwrap().data_type, DataType::Int);
}

#[test]
fn shadowing_in_nested_scope_is_legal() {
    let mut builder = Program::builder();
    let ast = builder.ast_mut();
    let outer = ast.open_scope(ScopeId::GLOBAL).unwrap();
    let inner = ast.open_scope(outer).unwrap();
    ast.declare(outer, Declaration::variable("z", DataType::Int, 1)).unwrap();
    ast.declare(inner, Declaration::variable("z", DataType::Bool, 2)).unwrap();

    assert_eq!(ast.lookup(inner, "z").unwrap().data_type, DataType::Bool);
    assert_eq!(ast.lookup(outer, "z").unwrap().data_type, DataType::Int);
    assert!(ast.local_lookup(inner, "z").unwrap().is_some());
}
