//! Terminal output formatting with colors.

use colored::Colorize;

use crate::result::{ConfidenceInterval, InferenceKind, PValue, StatisticReport, VariableReport};

/// Format every statistic of one variable for human-readable output.
pub fn format_report(report: &VariableReport) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str(&format!("{}\n", report.variable.bold()));
    output.push_str(&format!(
        "  {} data, {} units, {} observers\n",
        report.scale,
        report.units,
        report.observers.len()
    ));
    output.push_str(&sep);
    output.push('\n');

    for statistic in &report.statistics {
        output.push('\n');
        output.push_str(&format_statistic(statistic));
    }

    output.push_str(&sep);
    output.push('\n');
    output
}

/// Format one statistic: estimate, intervals, tests, advisories, tables.
pub fn format_statistic(statistic: &StatisticReport) -> String {
    let mut output = String::new();

    let title = match &statistic.observers {
        Some((a, b)) => format!("{} ({}, {})", statistic.name, a, b),
        None => statistic.name.clone(),
    };
    output.push_str(&format!(
        "  {}: {} = {}\n",
        title.bold(),
        statistic.letter,
        format_estimate(statistic.estimate)
    ));

    for ci in &statistic.intervals {
        output.push_str(&format!(
            "    {:.0}% CI: {}\n",
            ci.level * 100.0,
            format_interval(ci)
        ));
    }

    if !statistic.significance.is_empty() {
        output.push_str(&format!("    P({} ≤ min):\n", statistic.letter));
        for test in &statistic.significance {
            output.push_str(&format!(
                "      {:>6.3}  {}\n",
                test.threshold,
                format_p_value(&test.p_value)
            ));
        }
    }

    for advisory in &statistic.advisories {
        output.push_str(&format!(
            "    {} {}\n",
            "\u{26A0}".yellow().bold(),
            advisory.description().yellow()
        ));
    }

    if !statistic.supplementary.is_empty() {
        output.push('\n');
        for line in statistic.supplementary.lines() {
            output.push_str("    ");
            output.push_str(line);
            output.push('\n');
        }
    }

    output
}

fn format_estimate(estimate: f64) -> String {
    if estimate.is_nan() {
        return "undefined".red().to_string();
    }
    let text = format!("{:.3}", estimate);
    if estimate >= 0.8 {
        text.green().bold().to_string()
    } else if estimate >= 0.667 {
        text.yellow().bold().to_string()
    } else {
        text.red().bold().to_string()
    }
}

fn format_interval(ci: &ConfidenceInterval) -> String {
    let body = match ci.kind {
        InferenceKind::NotImplemented => return "not available".dimmed().to_string(),
        _ if !ci.is_defined() => "undefined".to_string(),
        _ => format!("[{:.3}, {:.3}]", ci.lower, ci.upper),
    };
    match &ci.note {
        Some(note) => format!("{} ({})", body, note),
        None => body,
    }
}

fn format_p_value(p: &PValue) -> String {
    if !p.is_implemented() {
        return "not available".dimmed().to_string();
    }
    if p.p.is_nan() {
        return "p = undefined".to_string();
    }
    let text = format!("p = {:.4}", p.p);
    let text = match &p.statistic {
        Some(stat) => format!("{}  ({} = {:.3})", text, stat.name, stat.value),
        None => text,
    };
    if p.p < 0.05 {
        text.green().to_string()
    } else {
        text
    }
}
