use anyhow::{Context, Result, anyhow};
use log::{debug, info};

use crate::{
    cli::{PresetArgs, TransformArgs},
    io_utils,
    transform::{self, TransformOp, TransformPlan},
};

pub fn execute_transform(args: &TransformArgs) -> Result<()> {
    let mut plan = match &args.plan {
        Some(path) => {
            if !args.ops.is_empty() {
                return Err(anyhow!("--plan cannot be combined with --op"));
            }
            TransformPlan::load(path)?
        }
        None => {
            let operations = args
                .ops
                .iter()
                .map(|text| TransformOp::parse(text))
                .collect::<Result<Vec<_>>>()?;
            if operations.is_empty() {
                return Err(anyhow!("Provide at least one --op or a --plan file"));
            }
            TransformPlan::new(operations)
        }
    };
    if let Some(section) = &args.section {
        plan.section = section.clone();
    }
    if let Some(codec) = args.codec {
        plan.codec = codec;
    }
    if args.lenient_columns {
        for op in &mut plan.operations {
            op.required = false;
        }
    }
    run_plan(
        &plan,
        &args.io.input,
        args.io.output.as_deref(),
        args.io.input_encoding.as_deref(),
        args.io.output_encoding.as_deref(),
    )
}

pub fn execute_preset(args: &PresetArgs) -> Result<()> {
    let mut plan = TransformPlan::preset(args.preset);
    if let Some(section) = &args.section {
        plan.section = section.clone();
    }
    run_plan(
        &plan,
        &args.io.input,
        args.io.output.as_deref(),
        args.io.input_encoding.as_deref(),
        args.io.output_encoding.as_deref(),
    )
}

fn run_plan(
    plan: &TransformPlan,
    input: &std::path::Path,
    output: Option<&std::path::Path>,
    input_encoding: Option<&str>,
    output_encoding: Option<&str>,
) -> Result<()> {
    let input_encoding = io_utils::resolve_encoding(input_encoding)?;
    let output_encoding = io_utils::resolve_encoding(output_encoding)?;
    info!(
        "Transforming '{}' in {:?} -> {} ({} operation(s), {:?} codec)",
        plan.section,
        input,
        io_utils::describe_destination(output),
        plan.operations.len(),
        plan.codec
    );
    for op in &plan.operations {
        debug!("{} <- {}", op.column, op.transform);
    }

    let mut document = io_utils::read_document(input, input_encoding)?;
    let report = transform::apply_plan(&mut document, plan)
        .with_context(|| format!("Transforming {input:?}"))?;
    io_utils::write_document(output, &document, output_encoding)?;

    for anomaly in &report.anomalies {
        debug!("{anomaly}");
    }
    info!(
        "Rewrote {} token(s) in {} of {} row(s); {} anomaly(ies) tolerated",
        report.tokens_rewritten,
        report.rows_rewritten,
        report.rows_scanned,
        report.anomalies.len()
    );
    Ok(())
}
