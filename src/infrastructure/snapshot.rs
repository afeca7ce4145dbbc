//! Program Snapshots
//!
//! Compact `bincode` bytes for caching a built tree, JSON for humans and
//! tooling. Decoding re-validates the structure, so a tampered or truncated
//! snapshot is rejected rather than producing a tree that breaks the
//! ownership rules.

use anyhow::{Context, Result};
use tracing::debug;

use crate::domain::program::Program;

pub fn to_bytes(program: &Program) -> Result<Vec<u8>> {
    let bytes = bincode::serialize(program).context("failed to encode program snapshot")?;
    debug!(bytes = bytes.len(), "program snapshot encoded");
    Ok(bytes)
}

pub fn from_bytes(bytes: &[u8]) -> Result<Program> {
    let program: Program =
        bincode::deserialize(bytes).context("failed to decode program snapshot")?;
    program.validate().context("decoded snapshot is malformed")?;
    Ok(program)
}

pub fn to_json(program: &Program) -> Result<String> {
    serde_json::to_string_pretty(program).context("failed to serialize program to JSON")
}

pub fn from_json(text: &str) -> Result<Program> {
    let program: Program = serde_json::from_str(text).context("failed to parse program JSON")?;
    program.validate().context("program JSON is malformed")?;
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::Prototype;
    use crate::domain::data_type::DataType;
    use crate::domain::symbol_table::ScopeId;
    use crate::domain::token::{Token, TokenKind};
    use crate::ports::tree_printer::AstPrinter;

    // s0 return, s1 block in scope 1, s2 entry function `main`
    fn sample() -> Program {
        returning(1.5)
    }

    fn returning(value: f64) -> Program {
        let mut builder = Program::builder();
        let ast = builder.ast_mut();
        let scope = ast.open_scope(ScopeId::GLOBAL).unwrap();
        let value = ast.float(value);
        let ret = ast
            .return_stmt(Token::synthetic(TokenKind::Return, "return"), Some(value))
            .unwrap();
        let body = ast.code_block(scope, vec![ret]).unwrap();
        let proto = Prototype::new("main", DataType::Float, vec![]);
        let main = ast.function_decl(true, proto, Some(body), ScopeId::GLOBAL).unwrap();
        builder.push(main).unwrap();
        builder.finish()
    }

    #[test]
    fn test_bincode_snapshot_preserves_dump() {
        let program = sample();
        let restored = from_bytes(&to_bytes(&program).unwrap()).unwrap();
        assert_eq!(AstPrinter::render(&restored), AstPrinter::render(&program));
        assert_eq!(restored.entry_point_id(), program.entry_point_id());
    }

    #[test]
    fn test_truncated_snapshot_rejected() {
        let bytes = to_bytes(&sample()).unwrap();
        assert!(from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn test_json_snapshot_preserves_dump() {
        let program = sample();
        let text = to_json(&program).unwrap();
        let restored = from_json(&text).unwrap();
        assert_eq!(AstPrinter::render(&restored), AstPrinter::render(&program));
    }

    #[test]
    fn test_json_snapshot_keeps_non_finite_floats() {
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let program = returning(value);
            let restored = from_json(&to_json(&program).unwrap()).unwrap();
            assert_eq!(AstPrinter::render(&restored), AstPrinter::render(&program));
        }
        let text = to_json(&returning(f64::INFINITY)).unwrap();
        assert!(text.contains("\"inf\""));
        let restored = from_json(&text).unwrap();
        assert!(AstPrinter::render(&restored).contains("[[ floatexpr val: inf type: float ]]"));
    }

    #[test]
    fn test_bincode_snapshot_keeps_non_finite_floats() {
        let program = returning(f64::NAN);
        let restored = from_bytes(&to_bytes(&program).unwrap()).unwrap();
        assert!(AstPrinter::render(&restored).contains("[[ floatexpr val: NaN type: float ]]"));
    }

    fn tampered(edit: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut value: serde_json::Value = serde_json::from_str(&to_json(&sample()).unwrap()).unwrap();
        edit(&mut value);
        value.to_string()
    }

    fn assert_rejected(text: &str, reason: &str) {
        let err = from_json(text).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("program JSON is malformed"), "{}", message);
        assert!(message.contains(reason), "{}", message);
    }

    #[test]
    fn test_untouched_json_is_accepted() {
        assert!(from_json(&tampered(|_| {})).is_ok());
    }

    #[test]
    fn test_json_with_double_owner_rejected() {
        // The return statement is both inside the block and a root.
        let text = tampered(|v| v["statements"] = serde_json::json!([2, 0]));
        assert_rejected(&text, "has 2 owners");
    }

    #[test]
    fn test_json_with_unknown_scope_rejected() {
        let text = tampered(|v| v["ast"]["stmts"][1]["Block"]["scope"] = serde_json::json!(99));
        assert_rejected(&text, "unknown scope");
    }

    #[test]
    fn test_json_with_forward_scope_parent_rejected() {
        let text = tampered(|v| v["ast"]["scopes"]["tables"][1]["parent"] = serde_json::json!(1));
        assert_rejected(&text, "no valid enclosing scope");
    }

    #[test]
    fn test_json_with_nested_entry_point_rejected() {
        let text = tampered(|v| v["entry_point"] = serde_json::json!(1));
        assert_rejected(&text, "not a function declaration");
    }

    #[test]
    fn test_json_with_global_block_rejected() {
        let text = tampered(|v| {
            v["ast"]["stmts"][1]["Block"]["scope"] = serde_json::json!(0);
            v["ast"]["block_scopes"] = serde_json::json!([0]);
        });
        assert_rejected(&text, "global scope");
    }

    #[test]
    fn test_tampered_bincode_snapshot_rejected() {
        let text = tampered(|v| v["statements"] = serde_json::json!([2, 0]));
        let program: Program = serde_json::from_str(&text).unwrap();
        let err = from_bytes(&to_bytes(&program).unwrap()).unwrap_err();
        assert!(format!("{:#}", err).contains("decoded snapshot is malformed"));
    }
}
