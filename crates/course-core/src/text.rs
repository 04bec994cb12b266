// course-core/src/text.rs
//! 文本归一化与分词
//!
//! 索引和查询必须走同一套规则，否则子串匹配会失配。

/// 逐字符转小写，且保证结果与原文逐字节对齐
///
/// 小写形式长度不同的字符（如 `İ`）保持原样，这样在折叠文本上找到的
/// 字节偏移可以直接用于切原文。
pub fn fold_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let mut lower = c.to_lowercase();
        match (lower.next(), lower.next()) {
            (Some(l), None) if l.len_utf8() == c.len_utf8() => out.push(l),
            _ => out.push(c),
        }
    }
    out
}

/// 按空白切分，丢弃字符数少于 `min_len` 的词
///
/// 输入应当已经过 `fold_case`。
pub fn terms(text: &str, min_len: usize) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .filter(move |term| term.chars().count() >= min_len)
}

/// 从字节位置 `index`（须在字符边界上）向前退 `count` 个字符
pub(crate) fn chars_before(text: &str, index: usize, count: usize) -> usize {
    text[..index]
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map_or(index, |(i, _)| i)
}

/// 从字节位置 `index`（须在字符边界上）向后进 `count` 个字符
pub(crate) fn chars_after(text: &str, index: usize, count: usize) -> usize {
    text[index..]
        .char_indices()
        .nth(count)
        .map_or(text.len(), |(i, _)| index + i)
}
