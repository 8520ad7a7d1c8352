// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// CV snippet generation from a finished metrics report.
///
/// Pure and deterministic: the same report always renders the same text.
/// Optional lines are simply omitted when their data is absent, so there is
/// no error case.
use crate::{metrics::ReportMetrics, repos::RepositoryRole};

/// Languages listed on the final line of the snippet.
const CV_LANGUAGE_COUNT: usize = 3;

/// Renders the fixed-order bullet list inserted into a CV.
///
/// The header and the active-repository line are always present. The
/// maintainer line appears only when at least one top repository is owned,
/// the praise lines only past their thresholds (consistency >= 60,
/// collaboration >= 50), and the languages line only when a language was
/// detected.
pub fn generate_cv_insert(metrics: &ReportMetrics) -> String {
    let mut lines = vec![
        "GitHub Activity (Verified)".to_owned(),
        format!(
            "\u{2022} Active contributor across {} repositories ({} months)",
            metrics.active_repos, metrics.window_months
        ),
    ];

    let owner_count = metrics
        .top_repositories
        .iter()
        .filter(|repository| repository.role == RepositoryRole::Owner)
        .count();
    if owner_count > 0 {
        let plural = if owner_count > 1 { "s" } else { "" };
        lines.push(format!("\u{2022} Maintainer of {owner_count} project{plural}"));
    }

    if metrics.consistency_index >= 60 {
        lines.push("\u{2022} Consistent weekly activity with sustained ownership".to_owned());
    }

    if metrics.collaboration_index >= 50.0 {
        lines.push("\u{2022} Strong collaboration via PRs and code reviews".to_owned());
    }

    let languages: Vec<String> = metrics
        .primary_languages
        .iter()
        .take(CV_LANGUAGE_COUNT)
        .map(|stat| format!("{} ({}%)", stat.language, stat.percentage))
        .collect();
    if !languages.is_empty() {
        lines.push(format!("\u{2022} Primary languages: {}", languages.join(", ")));
    }

    lines.join("\n")
}
