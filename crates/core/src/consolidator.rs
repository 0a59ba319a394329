use crate::models::{ConsolidationOptions, MergedPassage, RankOrder, RetrievedPassage};
use tracing::debug;

/// Folds passages that share a section into one record per section, ordered by
/// ascending section order. Passages inside a section keep their input order.
pub fn merge_results(results: Vec<RetrievedPassage>) -> Vec<MergedPassage> {
    let mut sorted = results;
    sorted.sort_by_key(RetrievedPassage::section_order);

    let input_count = sorted.len();
    let mut merged = Vec::new();
    let mut group: Vec<RetrievedPassage> = Vec::new();

    for passage in sorted {
        let starts_new_group = group
            .last()
            .is_some_and(|last| last.section_order() != passage.section_order());

        if starts_new_group {
            if let Some(record) = merge_group(&group) {
                merged.push(record);
            }
            group.clear();
        }
        group.push(passage);
    }

    if let Some(record) = merge_group(&group) {
        merged.push(record);
    }

    debug!(
        input_count,
        section_count = merged.len(),
        "merged passages by section"
    );
    merged
}

/// Joins a run of same-section passages. Everything except content, score and
/// merged scores is taken from the first member.
pub fn merge_group(group: &[RetrievedPassage]) -> Option<MergedPassage> {
    let first = group.first()?;

    let merged_scores: Vec<f64> = group.iter().map(|passage| passage.score).collect();
    let max_score = merged_scores
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let content = group
        .iter()
        .map(|passage| passage.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Some(MergedPassage {
        content,
        score: max_score,
        rank: first.rank,
        document_id: first.document_id.clone(),
        passage_id: first.passage_id,
        metadata: first.metadata.clone(),
        merged_scores,
    })
}

/// `1 + alpha * (n - 1)` for a section backed by `n` passages.
pub fn match_amplification_factor(match_count: usize, alpha: f64) -> f64 {
    1.0 + alpha * (match_count.max(1) as f64 - 1.0)
}

/// `ln(1 + factor * sum(exp(s)))`. Large scores overflow to infinity.
pub fn amplified_score(scores: &[f64], factor: f64) -> f64 {
    let sum_exp_scores: f64 = scores.iter().map(|score| score.exp()).sum();
    (1.0 + sum_exp_scores * factor).ln()
}

/// Rescores every merged section and reassigns ranks starting at 1.
/// `merged_scores` is left as it was.
pub fn rerank_after_merge(
    merged: Vec<MergedPassage>,
    options: &ConsolidationOptions,
) -> Vec<MergedPassage> {
    let mut reranked = merged;

    for passage in &mut reranked {
        let factor = match_amplification_factor(passage.match_count(), options.alpha);
        let rescored = amplified_score(&passage.effective_scores(), factor);
        debug!(
            section_order = passage.section_order(),
            matches = passage.match_count(),
            previous = passage.score,
            rescored,
            "rescored section"
        );
        passage.score = rescored;
    }

    match options.order {
        RankOrder::Ascending => reranked.sort_by(|left, right| left.score.total_cmp(&right.score)),
        RankOrder::Descending => {
            reranked.sort_by(|left, right| right.score.total_cmp(&left.score))
        }
    }

    for (position, passage) in reranked.iter_mut().enumerate() {
        passage.rank = position + 1;
    }

    reranked
}

/// `merge_results` followed by `rerank_after_merge`.
pub fn consolidate(
    results: Vec<RetrievedPassage>,
    options: &ConsolidationOptions,
) -> Vec<MergedPassage> {
    rerank_after_merge(merge_results(results), options)
}
