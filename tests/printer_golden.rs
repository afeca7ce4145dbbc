use thunderbird_ast::domain::ast::{Parameter, Prototype};
use thunderbird_ast::domain::{Ast, DataType, Declaration, Program, ProgramBuilder, ScopeId, Token, TokenKind};
use thunderbird_ast::ports::tree_printer::{AstPrinter, PrintOptions};

fn tok(kind: TokenKind, literal: &str) -> Token {
    Token::synthetic(kind, literal)
}

fn push_add(builder: &mut ProgramBuilder) {
    let proto = Prototype::new(
        "add",
        DataType::Int,
        vec![Parameter::new("a", DataType::Int), Parameter::new("b", DataType::Int)],
    );
    let ast = builder.ast_mut();
    let scope = ast.open_scope(ScopeId::GLOBAL).unwrap();
    ast.declare_parameters(scope, &proto, 1).unwrap();
    let a = ast.identifier("a", DataType::Int);
    let b = ast.identifier("b", DataType::Int);
    let sum = ast.binary(tok(TokenKind::Plus, "+"), Some(a), Some(b)).unwrap();
    let ret = ast.return_stmt(tok(TokenKind::Return, "return"), Some(sum)).unwrap();
    let body = ast.code_block(scope, vec![ret]).unwrap();
    ast.declare(ScopeId::GLOBAL, Declaration::function(&proto, 1)).unwrap();
    let func = ast.function_decl(false, proto, Some(body), ScopeId::GLOBAL).unwrap();
    builder.push(func).unwrap();
}

#[test]
fn add_function_golden() {
    let mut builder = Program::builder();
    push_add(&mut builder);
    let program = builder.finish();

    let expected = "define int add (int a, int b) {\n  return [ a ] + [ b ]\n} end [add]\n";
    assert_eq!(AstPrinter::render(&program), expected);
    assert_eq!(program.to_string(), expected);
}

#[test]
fn printing_twice_is_byte_identical() {
    let mut builder = Program::builder();
    push_add(&mut builder);
    let program = builder.finish();

    let first = AstPrinter::render(&program);
    let second = AstPrinter::render(&program);
    assert_eq!(first.as_bytes(), second.as_bytes());

    let mut sink = Vec::new();
    AstPrinter::print_to(&program, &mut sink).unwrap();
    assert_eq!(sink, first.into_bytes());
}

#[test]
fn missing_expression_prints_placeholder() {
    let mut builder = Program::builder();
    let ast = builder.ast_mut();
    let stmt = ast.expression_stmt(tok(TokenKind::Ident, "f"), None).unwrap();
    let ok = ast.integer(5);
    let next = ast.expression_stmt(tok(TokenKind::Int, "5"), Some(ok)).unwrap();
    builder.push(stmt).unwrap();
    builder.push(next).unwrap();
    let program = builder.finish();

    assert_eq!(
        AstPrinter::render(&program),
        "null expr\n[[ intexpr val: 5 type: int ]]\n"
    );
}

#[test]
fn else_if_chain_golden() {
    let mut builder = Program::builder();
    let ast = builder.ast_mut();

    let branch = |ast: &mut Ast, value: i64| {
        let scope = ast.open_scope(ScopeId::GLOBAL).unwrap();
        let v = ast.integer(value);
        let ret = ast.return_stmt(tok(TokenKind::Return, "return"), Some(v)).unwrap();
        ast.code_block(scope, vec![ret]).unwrap()
    };
    let first = branch(ast, 1);
    let second = branch(ast, 2);
    let otherwise = branch(ast, 3);

    let c1 = ast.boolean(false);
    let c2 = ast.boolean(true);
    let inner = ast
        .conditional(tok(TokenKind::If, "if"), Some(c2), Some(second), Some(otherwise), ScopeId::GLOBAL)
        .unwrap();
    let head = ast
        .conditional(tok(TokenKind::If, "if"), Some(c1), Some(first), Some(inner), ScopeId::GLOBAL)
        .unwrap();
    builder.push(head).unwrap();
    let program = builder.finish();

    let expected = "\
if ([[ boolean val: false ]]) {
  return [[ intexpr val: 1 type: int ]]
} else if ([[ boolean val: true ]]) {
  return [[ intexpr val: 2 type: int ]]
} else {
  return [[ intexpr val: 3 type: int ]]
} end [if]
";
    assert_eq!(AstPrinter::render(&program), expected);
}

#[test]
fn loops_golden() {
    let mut builder = Program::builder();
    let ast = builder.ast_mut();

    let i = ast.variable("i", DataType::Int);
    let zero = ast.integer(0);
    let init = ast.let_decl(tok(TokenKind::Let, "let"), Some(i), 1, Some(zero)).unwrap();
    let i_ref = ast.identifier("i", DataType::Int);
    let ten = ast.integer(10);
    let cond = ast.binary(tok(TokenKind::Lt, "<"), Some(i_ref), Some(ten)).unwrap();
    let i_target = ast.identifier("i", DataType::Int);
    let i_rhs = ast.identifier("i", DataType::Int);
    let one = ast.integer(1);
    let step = ast.binary(tok(TokenKind::Plus, "+"), Some(i_rhs), Some(one)).unwrap();
    let post = ast.assignment(tok(TokenKind::Assign, "="), Some(i_target), Some(step)).unwrap();

    let scope = ast.open_scope(ScopeId::GLOBAL).unwrap();
    let flag = ast.boolean(true);
    let call = ast.call("tick", vec![]).unwrap();
    let call_stmt = ast.expression_stmt(tok(TokenKind::Ident, "tick"), Some(call)).unwrap();
    let while_scope = ast.open_scope(scope).unwrap();
    let while_body = ast.code_block(while_scope, vec![call_stmt]).unwrap();
    let inner = ast.while_loop(tok(TokenKind::While, "while"), Some(flag), Some(while_body), scope).unwrap();
    let body = ast.code_block(scope, vec![inner]).unwrap();

    let for_loop = ast
        .for_loop(tok(TokenKind::For, "for"), Some(init), Some(cond), Some(post), Some(body), ScopeId::GLOBAL)
        .unwrap();
    builder.push(for_loop).unwrap();
    let program = builder.finish();

    let expected = "\
for (
    let [name: 'i' type: 'int'] = [[ intexpr val: 0 type: int ]]
    [ i ] < [ [[ intexpr val: 10 type: int ]] ]
    i = [ i ] + [ [[ intexpr val: 1 type: int ]] ]
) {
    while ([[ boolean val: true ]]) {
        tick()
    } end [while]
} end [for]
";
    assert_eq!(
        AstPrinter::render_with(&program, PrintOptions { indent_width: 4 }),
        expected
    );
}
