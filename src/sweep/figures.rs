//! Figure sweeps
//!
//! Each function walks its exponent range × `BRANCHING_FACTORS` grid and
//! appends to series named `data.<metric>.m<m>.txt`, keyed by node count.

use super::{ParameterPoint, SamplingMode, SweepContext, BRANCHING_FACTORS};
use crate::derive::{field_ratio, field_sum, reduction_percent, NANOS_PER_SEC};
use crate::Result;
use std::ops::RangeInclusive;

const BUCKET_OPS: [&str; 2] = ["TotalBucketsInserted", "TotalBucketsRemoved"];

/// Exponent × branching factor grid, exponent-major.
fn grid(exponents: RangeInclusive<u32>) -> impl Iterator<Item = (u32, u32)> {
    exponents.flat_map(|exp| BRANCHING_FACTORS.into_iter().map(move |m| (exp, m)))
}

/// Fig 2: percentage of nodes saved by bucketing in roll-tree.
pub(super) fn fig2(ctx: &mut SweepContext<'_>) -> Result<()> {
    for (exp, m) in grid(3..=9) {
        let point = ParameterPoint::new(SamplingMode::RollTree, exp, m);
        let n = point.node_count().to_string();
        let result = ctx.average(&point)?;
        let saved = reduction_percent(result.mean("NumBuckets")?, result.mean("NumNodes")?);
        ctx.persist(&format!("data.red.m{m}.txt"), &n, saved)?;
    }
    Ok(())
}

/// Fig 3: comparisons and wall time, roll-bucket vs roll-bucket-sorted.
pub(super) fn fig3(ctx: &mut SweepContext<'_>) -> Result<()> {
    let variants = [
        (SamplingMode::RollBucket, "RWB"),
        (SamplingMode::RollBucketSorted, "RWB_Sorted"),
    ];
    for (exp, m) in grid(3..=8) {
        for (mode, label) in variants {
            let point = ParameterPoint::new(mode, exp, m);
            let n = point.node_count().to_string();
            let result = ctx.average(&point)?;
            ctx.persist(
                &format!("data.nComp.{label}.m{m}.txt"),
                &n,
                result.mean("NumComparisons")?,
            )?;
            ctx.persist(
                &format!("data.e1.{label}.m{m}.txt"),
                &n,
                result.mean("TotalTime")? / NANOS_PER_SEC,
            )?;
        }
    }
    Ok(())
}

/// Fig 5: tree code word length against the optimal Huffman length.
pub(super) fn fig5(ctx: &mut SweepContext<'_>) -> Result<()> {
    for (exp, m) in grid(3..=9) {
        let point = ParameterPoint::new(SamplingMode::RollTree, exp, m);
        let n = point.node_count().to_string();
        let result = ctx.average(&point)?;
        ctx.persist(
            &format!("data.cwl.Huffman.m{m}.txt"),
            &n,
            result.mean("TreeOptimalHuffmanCodeWordLength")?,
        )?;
        ctx.persist(
            &format!("data.cwl.RWBT.m{m}.txt"),
            &n,
            result.mean("TreeCodeWordLength")?,
        )?;
    }
    Ok(())
}

/// Fig 6: bucket insert/remove operations saved by roll-tree-reduced.
pub(super) fn fig6(ctx: &mut SweepContext<'_>) -> Result<()> {
    for (exp, m) in grid(3..=8) {
        let tree = ParameterPoint::new(SamplingMode::RollTree, exp, m);
        let n = tree.node_count().to_string();
        let tree_ops = field_sum(&ctx.average(&tree)?, &BUCKET_OPS)?;

        let reduced = ParameterPoint::new(SamplingMode::RollTreeReduced, exp, m);
        let reduced_ops = field_sum(&ctx.average(&reduced)?, &BUCKET_OPS)?;

        ctx.persist(
            &format!("data.ins_reduce.m{m}.txt"),
            &n,
            reduction_percent(reduced_ops, tree_ops),
        )?;
    }
    Ok(())
}

/// Fig 7: comparisons per edge, tree sampling vs bucket sampling.
pub(super) fn fig7(ctx: &mut SweepContext<'_>) -> Result<()> {
    let variants = [(SamplingMode::RollTree, "T"), (SamplingMode::RollBucket, "B")];
    for (exp, m) in grid(3..=8) {
        for (mode, label) in variants {
            let point = ParameterPoint::new(mode, exp, m);
            let n = point.node_count().to_string();
            let result = ctx.average(&point)?;
            ctx.persist(
                &format!("data.BvsT.{label}.m{m}.txt"),
                &n,
                field_ratio(&result, "NumComparisons", "NumEdges")?,
            )?;
        }
    }
    Ok(())
}

/// Fig 8: a single 10^9-node roll-tree run that dumps its degree distribution.
///
/// The distribution file is written by the benchmark itself; nothing is
/// averaged or appended here.
pub(super) fn fig8(ctx: &mut SweepContext<'_>) -> Result<()> {
    let path = ctx.config().output_dir.join("data.distribution.txt");
    let point = ParameterPoint::new(SamplingMode::RollTree, 9, 2).with_distribution_file(path);
    ctx.run_once(&point)?;
    Ok(())
}
