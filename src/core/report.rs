// ScanTrail - core/report.rs
//
// Markdown summary of closed attempts.
// Core layer: pure string building, deterministic for a given input.
//
// Report labels are in Russian, the scanner application's UI language,
// because the report is read by the same people who read the scanner log.

use crate::core::model::{AttemptRecord, Label};
use crate::util::constants;
use std::collections::HashMap;

/// Report heading, shared by the empty and the full report.
const TITLE: &str = "# AI training summary";

/// Body of the report when no attempt was closed.
const NO_ATTEMPTS: &str = "Нет завершённых попыток scanner_finish в логе.";

/// Bullet shown in a "top" section with no rows.
const NO_DATA: &str = "- нет данных";

/// Static guidance appended to every non-empty report.
const GUIDANCE: [&str; 3] = [
    "- Используйте только запросы с `label=success` для пополнения шаблонов `LocalAiQueryAssistant`.",
    "- Для `dns/timeout` не обучайте AI-формулировки, сначала исправьте сеть/DNS/прокси.",
    "- Новые AI-варианты добавляйте партиями по 3-5 и проверяйте успех до/после.",
];

/// Row limits for the ranked sections.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub top_queries: usize,
    pub top_error_types: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_queries: constants::DEFAULT_TOP_QUERIES,
            top_error_types: constants::DEFAULT_TOP_ERROR_TYPES,
        }
    }
}

/// Count occurrences of each value.
///
/// Sorted by count descending; equal counts keep first-seen order.
pub fn frequencies<'a, I>(values: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, usize)> = Vec::new();

    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }

    // Stable sort preserves first-seen order among ties.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn push_ranked(lines: &mut Vec<String>, ranked: &[(&str, usize)], empty_marker: bool) {
    if ranked.is_empty() && empty_marker {
        lines.push(NO_DATA.to_string());
        return;
    }
    for (value, count) in ranked {
        lines.push(format!("- `{value}`: {count}"));
    }
}

/// Build the Markdown report for `records`.
pub fn build_summary(records: &[AttemptRecord], config: &ReportConfig) -> String {
    if records.is_empty() {
        return format!("{TITLE}\n\n{NO_ATTEMPTS}\n");
    }

    let with_label = |label: Label| records.iter().filter(move |r| r.label == label);

    let successes = with_label(Label::Success).count();
    let empties = with_label(Label::Empty).count();
    let failures = with_label(Label::Failed).count();

    let mut top_queries = frequencies(
        with_label(Label::Success)
            .map(|r| r.query.as_str())
            .filter(|q| !q.is_empty()),
    );
    top_queries.truncate(config.top_queries);

    let mut top_errors = frequencies(
        with_label(Label::Failed)
            .map(|r| r.error_type_str())
            .filter(|t| !t.is_empty()),
    );
    top_errors.truncate(config.top_error_types);

    let providers = frequencies(records.iter().map(|r| r.provider.as_str()));
    let modes = frequencies(records.iter().map(|r| r.mode.as_str()));

    let mut lines = vec![
        TITLE.to_string(),
        String::new(),
        format!("- Всего попыток: {}", records.len()),
        format!("- Успешных (found>0): {successes}"),
        format!("- Пустых (found=0, без явной ошибки): {empties}"),
        format!("- Ошибок: {failures}"),
        String::new(),
        "## Топ успешных запросов".to_string(),
    ];
    push_ranked(&mut lines, &top_queries, true);

    lines.push(String::new());
    lines.push("## Частые причины ошибок".to_string());
    push_ranked(&mut lines, &top_errors, true);

    lines.push(String::new());
    lines.push("## Распределение по provider".to_string());
    push_ranked(&mut lines, &providers, false);

    lines.push(String::new());
    lines.push("## Распределение по mode".to_string());
    push_ranked(&mut lines, &modes, false);

    lines.push(String::new());
    lines.push("## Рекомендация по обучению".to_string());
    lines.extend(GUIDANCE.iter().map(|s| s.to_string()));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
