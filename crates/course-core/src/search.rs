// course-core/src/search.rs
//! 查询模块 - 关键词查询、打分排序、片段截取

use crate::config::SearchSettings;
use crate::error::{CoreError, Result};
use crate::indexer::SearchIndex;
use crate::models::SearchResult;
use crate::render::MarkdownRenderer;
use crate::text::{chars_after, chars_before, fold_case, terms};

/// 查询归一化：转小写、按空白切分、丢弃过短的词
///
/// 没有剩下任何词时返回 `InvalidQuery`，与"没有匹配结果"区分开。
pub fn normalize_query(raw: &str, min_term_length: usize) -> Result<Vec<String>> {
    let folded = fold_case(raw);
    let query_terms: Vec<String> = terms(&folded, min_term_length).map(str::to_string).collect();

    if query_terms.is_empty() {
        return Err(CoreError::InvalidQuery(format!(
            "'{}' 中没有长度不少于 {} 的词",
            raw.trim(),
            min_term_length
        )));
    }
    Ok(query_terms)
}

/// 文档打分：每个匹配的索引词对其倒排表中的文档 +1
///
/// 返回 (文档位置, 分数)，分数降序；同分保持首次被匹配到的顺序。
pub fn rank_documents(index: &SearchIndex, query_terms: &[String]) -> Vec<(usize, usize)> {
    let mut scores = vec![0usize; index.len()];
    let mut discovered = Vec::new();

    for term in query_terms {
        for posting in index.matching_postings(term) {
            for &position in &posting.documents {
                if scores[position] == 0 {
                    discovered.push(position);
                }
                scores[position] += 1;
            }
        }
    }

    // sort_by 是稳定排序
    discovered.sort_by(|a, b| scores[*b].cmp(&scores[*a]));
    discovered
        .into_iter()
        .map(|position| (position, scores[position]))
        .collect()
}

#[derive(Debug)]
struct Window {
    start: usize,
    end: usize,
    text: String,
    relevance: usize,
}

impl Window {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        start <= self.end && end >= self.start
    }
}

/// 截取查询词周围的片段（未渲染的 markdown）
///
/// `folded` 必须是 `fold_case(body)`，两者按字节对齐。
/// 窗口宽度按字符计：命中词前后各取 `snippet_length / 2` 个字符。
/// 片段之间互不重叠，总数不超过 `max_snippets`，按窗口内查询词出现次数降序排列。
pub fn extract_snippets(
    body: &str,
    folded: &str,
    query_terms: &[String],
    max_snippets: usize,
    snippet_length: usize,
) -> Vec<String> {
    let half = snippet_length / 2;
    let mut windows: Vec<Window> = Vec::new();

    'terms: for term in query_terms {
        if term.is_empty() {
            continue;
        }
        let mut from = 0;
        while let Some(offset) = folded[from..].find(term.as_str()) {
            if windows.len() >= max_snippets {
                break 'terms;
            }

            let hit = from + offset;
            let start = chars_before(folded, hit, half);
            let end = chars_after(folded, hit + term.len(), half);

            if !windows.iter().any(|w| w.overlaps(start, end)) {
                let mut text = String::with_capacity(end - start + 6);
                if start > 0 {
                    text.push_str("...");
                }
                text.push_str(&body[start..end]);
                if end < body.len() {
                    text.push_str("...");
                }

                let window_folded = &folded[start..end];
                let relevance = query_terms
                    .iter()
                    .filter(|t| !t.is_empty())
                    .map(|t| window_folded.matches(t.as_str()).count())
                    .sum();

                windows.push(Window {
                    start,
                    end,
                    text,
                    relevance,
                });
            }

            from = hit + term.len();
        }
    }

    windows.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    windows.into_iter().map(|w| w.text).collect()
}

/// 在索引上执行查询
///
/// 查询无效时返回 `InvalidQuery`；没有匹配时返回空列表。
pub fn search(
    index: &SearchIndex,
    raw_query: &str,
    settings: &SearchSettings,
    renderer: &dyn MarkdownRenderer,
) -> Result<Vec<SearchResult>> {
    let query_terms = normalize_query(raw_query, settings.min_term_length)?;
    tracing::debug!("查询词: {:?}", query_terms);

    let ranked = rank_documents(index, &query_terms);
    let results: Vec<SearchResult> = ranked
        .into_iter()
        .filter_map(|(position, _score)| index.entry(position))
        .map(|entry| {
            let snippets = extract_snippets(
                &entry.body,
                entry.folded_body(),
                &query_terms,
                settings.max_snippets,
                settings.snippet_length,
            )
            .iter()
            .map(|snippet| renderer.render(snippet))
            .collect();

            SearchResult {
                title: entry.title.clone(),
                url: entry.url.clone(),
                snippets,
            }
        })
        .collect();

    tracing::debug!("查询 '{}' 命中 {} 个文档", raw_query, results.len());
    Ok(results)
}

/// 结果分页；`page` 从 1 开始，没有 `limit` 时返回全部
pub fn paginate<T>(results: Vec<T>, page: Option<usize>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(limit) => {
            let page = page.unwrap_or(1).max(1);
            results
                .into_iter()
                .skip((page - 1).saturating_mul(limit))
                .take(limit)
                .collect()
        }
        None => results,
    }
}
