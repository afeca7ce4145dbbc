// Application layer: inspection of a finished program.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::api::dto::AstGraphDto;
use crate::domain::ast::StmtId;
use crate::domain::program::Program;
use crate::infrastructure::concurrency::build_pool;
use crate::infrastructure::config::{DumpFormat, InspectConfig};
use crate::ports::dot_exporter::DotExporter;
use crate::ports::tree_printer::AstPrinter;

/// Dump of one top-level function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDump {
    pub name: String,
    pub is_entry_point: bool,
    pub dump: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub format: DumpFormat,
    /// Whole-program output in the configured format
    pub output: String,
    pub statements: usize,
    pub nodes: usize,
    pub entry_point: Option<String>,
    /// Present only when `per_function` is set; source order
    pub functions: Vec<FunctionDump>,
}

pub struct InspectUsecase {
    config: InspectConfig,
}

impl InspectUsecase {
    pub fn new(config: InspectConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    pub fn run(&self, program: &Program) -> Result<InspectReport> {
        program.validate().context("refusing to inspect a malformed program")?;

        let output = match self.config.format {
            DumpFormat::Text => AstPrinter::render_with(program, self.config.print_options()),
            DumpFormat::Json => serde_json::to_string_pretty(&AstGraphDto::from(program))
                .context("failed to serialize tree graph")?,
            DumpFormat::Dot => DotExporter::to_dot(&AstGraphDto::from(program)),
        };

        let functions = if self.config.per_function {
            self.dump_functions(program)?
        } else {
            Vec::new()
        };

        let ast = program.ast();
        let report = InspectReport {
            format: self.config.format,
            output,
            statements: program.statements().len(),
            nodes: ast.expr_count() + ast.stmt_count(),
            entry_point: program.entry_point().map(|f| f.prototype.name.clone()),
            functions,
        };

        info!(
            format = ?report.format,
            statements = report.statements,
            nodes = report.nodes,
            functions = report.functions.len(),
            "program inspected"
        );
        Ok(report)
    }

    /// Render each top-level function concurrently. The tree is shared
    /// read-only between workers; results keep source order.
    fn dump_functions(&self, program: &Program) -> Result<Vec<FunctionDump>> {
        let pool = build_pool(self.config.workers)?;
        let options = self.config.print_options();
        let targets: Vec<(StmtId, String, bool)> = program
            .functions()
            .map(|(id, f)| (id, f.prototype.name.clone(), f.is_entry_point))
            .collect();

        let dumps: Vec<FunctionDump> = pool.install(|| {
            targets
                .par_iter()
                .map(|(id, name, is_entry_point)| FunctionDump {
                    name: name.clone(),
                    is_entry_point: *is_entry_point,
                    dump: AstPrinter::render_stmt(program.ast(), *id, options),
                })
                .collect()
        });
        Ok(dumps)
    }
}
