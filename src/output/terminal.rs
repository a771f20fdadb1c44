//! Terminal output utilities.
//!
//! Provides the per-provider summary table printed after a run.

use crate::pipeline::ProviderSummary;
use colored::Colorize;

/// Format a value as a right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A right-aligned string, never truncated
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    format!("{:>width$}", value.to_string())
}

/// Source and aggregated counts as `source->aggregated`.
fn format_counts(source: usize, aggregated: usize, width: usize) -> String {
    format_field(format!("{source}->{aggregated}"), width)
}

/// One summary row, uncoloured.
pub fn summary_row(summary: &ProviderSummary) -> String {
    format!(
        "{name} {ipv4} {ipv6} {rejected}",
        name = format!("{:<14}", summary.name),
        ipv4 = format_counts(summary.source_ipv4, summary.aggregated_ipv4, 14),
        ipv6 = format_counts(summary.source_ipv6, summary.aggregated_ipv6, 14),
        rejected = format_field(summary.rejected, 9),
    )
}

/// Print the summary table to stdout.
pub fn print_summary(summaries: &[ProviderSummary]) {
    println!(
        "{}",
        format!(
            "{:<14} {} {} {}",
            "provider",
            format_field("ipv4", 14),
            format_field("ipv6", 14),
            format_field("rejected", 9)
        )
        .bold()
    );
    for summary in summaries {
        let row = summary_row(summary);
        if summary.rejected > 0 {
            println!("{}", row.yellow());
        } else {
            println!("{row}");
        }
    }

    let (source, aggregated) = summaries.iter().fold((0, 0), |(s, a), summary| {
        (
            s + summary.source_ipv4 + summary.source_ipv6,
            a + summary.aggregated_ipv4 + summary.aggregated_ipv6,
        )
    });
    println!(
        "#{}# {} provider(s), {source} prefixes aggregated to {aggregated}",
        "DONE".on_green(),
        summaries.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("test", 10), "      test");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("long_value", 5), "long_value");
    }

    #[test]
    fn test_format_field_number() {
        assert_eq!(format_field(42, 6), "    42");
    }

    #[test]
    fn test_summary_row() {
        let summary = ProviderSummary {
            name: "aws".to_string(),
            source_ipv4: 120,
            source_ipv6: 30,
            aggregated_ipv4: 80,
            aggregated_ipv6: 12,
            rejected: 1,
        };
        assert_eq!(
            summary_row(&summary),
            "aws                   120->80         30->12         1"
        );
    }
}
