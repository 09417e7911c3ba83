use crate::errors::LessonError;
use crate::language::{self, LanguagePolicy};
use crate::models::RawSentence;

// 选中的核心短语，带复杂度分数和在选集里的次序
#[derive(Debug, Clone)]
pub struct SelectedSentence {
    pub sentence: RawSentence,
    pub complexity_score: u32,
    pub order: usize,
}

// 复杂度评分：分数越低越简单，越适合做核心操练条目。
// 对固定输入是纯函数，没有任何随机性
pub fn score(sentence: &RawSentence, policy: &LanguagePolicy) -> u32 {
    let text = sentence.text.trim();
    let length = text.chars().count() as i64;
    let mut score = length;

    if policy.logographic {
        let logographs = sentence
            .kanji_count
            .unwrap_or_else(|| language::logograph_count(text));
        score += 2 * logographs as i64;
    } else {
        score += 2 * language::word_count(text) as i64;
    }

    // 疑问句教学价值高
    if language::is_interrogative(text) {
        score -= 5;
    }
    // 带句末语气词的句子更自然
    if language::has_naturalness_marker(text, policy) {
        score -= 3;
    }
    // 超短句是极好的教学单位
    if length <= 10 {
        score -= 10;
    }
    // 长句放到对话里，不做单独操练
    if length > 50 {
        score += 20;
    }

    score.max(0) as u32
}

// 步进抽样：从 n 个元素里均匀取 target 个下标。
// 不是只挑最前面的，这样选集能覆盖整个范围
pub fn stride_sample_indices(n: usize, target: usize) -> Vec<usize> {
    let target = target.max(1).min(n);
    let step = (n / target).max(1);
    (0..target).map(|k| k * step).filter(|&i| i < n).collect()
}

// 从整段对话里选出一批按复杂度排序的核心短语。
// 平分的句子保持原有先后（稳定排序），抽样横跨整个复杂度区间
pub fn select_core(
    sentences: &[RawSentence],
    policy: &LanguagePolicy,
    min_items: usize,
    max_items: usize,
) -> Result<Vec<SelectedSentence>, LessonError> {
    if sentences.is_empty() {
        return Err(LessonError::EmptyDialogue);
    }

    let mut scored: Vec<(usize, u32)> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| (i, score(s, policy)))
        .collect();
    scored.sort_by_key(|&(_, s)| s);

    let n = sentences.len();
    // 目标数不能超过句子总数，否则步长退化成 0
    let target = (n / 3).clamp(min_items, max_items).min(n).max(1);

    let picked = stride_sample_indices(n, target)
        .into_iter()
        .enumerate()
        .map(|(order, idx)| {
            let (original, complexity_score) = scored[idx];
            SelectedSentence {
                sentence: sentences[original].clone(),
                complexity_score,
                order,
            }
        })
        .collect();

    Ok(picked)
}
