//! Prometheus text exposition format.
//!
//! Renders a [`MetricsSnapshot`] for scraping by a Prometheus server or
//! compatible agent.

use std::fmt::Write;

use crate::collector::MetricsSnapshot;
use crate::histogram::HistogramSnapshot;

const PREFIX: &str = "ingredients_balancer";

/// Render a metrics snapshot into Prometheus text format.
pub fn render_prometheus(snapshot: &MetricsSnapshot) -> String {
    let mut out = String::new();

    header(
        &mut out,
        "balance_operations_total",
        "Total number of successful balance operations.",
        "counter",
    );
    for b in &snapshot.balance {
        let _ = writeln!(
            out,
            "{PREFIX}_balance_operations_total{{recipe_type=\"{}\"}} {}",
            escape(&b.recipe_type),
            b.operations
        );
    }

    header(
        &mut out,
        "balance_operation_duration_seconds",
        "Duration of successful balance operations in seconds.",
        "histogram",
    );
    for b in &snapshot.balance {
        let labels = format!("recipe_type=\"{}\"", escape(&b.recipe_type));
        histogram(&mut out, "balance_operation_duration_seconds", &labels, &b.duration);
    }

    header(
        &mut out,
        "balance_operation_errors_total",
        "Total number of failed balance operations.",
        "counter",
    );
    for b in &snapshot.balance {
        for (error_type, count) in &b.errors {
            let _ = writeln!(
                out,
                "{PREFIX}_balance_operation_errors_total{{recipe_type=\"{}\",error_type=\"{}\"}} {}",
                escape(&b.recipe_type),
                escape(error_type),
                count
            );
        }
    }

    header(
        &mut out,
        "ingredient_processing_total",
        "Total number of ingredient processing operations.",
        "counter",
    );
    for (kind, success, count) in &snapshot.ingredient_processing {
        let _ = writeln!(
            out,
            "{PREFIX}_ingredient_processing_total{{ingredient_type=\"{}\",success=\"{}\"}} {}",
            escape(kind),
            success,
            count
        );
    }

    header(
        &mut out,
        "recipe_portions",
        "Number of pans per balanced recipe.",
        "histogram",
    );
    histogram(&mut out, "recipe_portions", "", &snapshot.portions);

    header(
        &mut out,
        "http_requests_total",
        "Total number of HTTP requests.",
        "counter",
    );
    for r in &snapshot.requests {
        for (status, count) in &r.by_status {
            let _ = writeln!(
                out,
                "{PREFIX}_http_requests_total{{route=\"{}\",status_code=\"{}\"}} {}",
                escape(&r.route),
                status,
                count
            );
        }
    }

    header(
        &mut out,
        "http_request_duration_seconds",
        "Duration of HTTP requests in seconds.",
        "histogram",
    );
    for r in &snapshot.requests {
        let labels = format!("route=\"{}\"", escape(&r.route));
        histogram(&mut out, "http_request_duration_seconds", &labels, &r.duration);
    }

    out
}

fn header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {PREFIX}_{name} {help}");
    let _ = writeln!(out, "# TYPE {PREFIX}_{name} {kind}");
}

fn histogram(out: &mut String, name: &str, labels: &str, h: &HistogramSnapshot) {
    let sep = if labels.is_empty() { "" } else { "," };
    for (bound, count) in &h.buckets {
        let _ = writeln!(out, "{PREFIX}_{name}_bucket{{{labels}{sep}le=\"{bound}\"}} {count}");
    }
    let _ = writeln!(out, "{PREFIX}_{name}_bucket{{{labels}{sep}le=\"+Inf\"}} {}", h.count);
    if labels.is_empty() {
        let _ = writeln!(out, "{PREFIX}_{name}_sum {}", h.sum);
        let _ = writeln!(out, "{PREFIX}_{name}_count {}", h.count);
    } else {
        let _ = writeln!(out, "{PREFIX}_{name}_sum{{{labels}}} {}", h.sum);
        let _ = writeln!(out, "{PREFIX}_{name}_count{{{labels}}} {}", h.count);
    }
}

/// Escape a label value per the exposition format.
fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::collector::{BalanceOutcome, MetricsCollector, UNKNOWN_RECIPE_TYPE};

    async fn populated() -> MetricsSnapshot {
        let c = MetricsCollector::new(Duration::from_secs(60));
        c.record_balance(
            UNKNOWN_RECIPE_TYPE,
            Duration::from_millis(3),
            BalanceOutcome::Success { pans: 2 },
        )
        .await;
        c.record_balance(
            UNKNOWN_RECIPE_TYPE,
            Duration::from_millis(1),
            BalanceOutcome::Failure {
                error_type: "validation_error",
            },
        )
        .await;
        c.record_request("/api/v1/balance", 200, Duration::from_millis(4)).await;
        c.record_request("/api/v1/balance", 400, Duration::from_millis(1)).await;
        c.snapshot().await
    }

    #[tokio::test]
    async fn render_empty() {
        let c = MetricsCollector::new(Duration::from_secs(60));
        let output = render_prometheus(&c.snapshot().await);
        // Type declarations are always present.
        assert!(output.contains("# TYPE ingredients_balancer_balance_operations_total counter"));
        assert!(output.contains("# TYPE ingredients_balancer_recipe_portions histogram"));
        assert!(output.contains("ingredients_balancer_recipe_portions_count 0"));
    }

    #[tokio::test]
    async fn render_balance_series() {
        let output = render_prometheus(&populated().await);

        assert!(output.contains("ingredients_balancer_balance_operations_total{recipe_type=\"unknown\"} 1"));
        assert!(output.contains(
            "ingredients_balancer_balance_operation_errors_total{recipe_type=\"unknown\",error_type=\"validation_error\"} 1"
        ));
        assert!(output.contains(
            "ingredients_balancer_balance_operation_duration_seconds_bucket{recipe_type=\"unknown\",le=\"0.005\"} 1"
        ));
        assert!(output.contains(
            "ingredients_balancer_balance_operation_duration_seconds_count{recipe_type=\"unknown\"} 1"
        ));
        assert!(output.contains(
            "ingredients_balancer_ingredient_processing_total{ingredient_type=\"balanced\",success=\"false\"} 1"
        ));
        assert!(output.contains("ingredients_balancer_recipe_portions_bucket{le=\"2\"} 1"));
    }

    #[tokio::test]
    async fn render_request_series() {
        let output = render_prometheus(&populated().await);
        assert!(output.contains(
            "ingredients_balancer_http_requests_total{route=\"/api/v1/balance\",status_code=\"400\"} 1"
        ));
        assert!(output.contains(
            "ingredients_balancer_http_request_duration_seconds_bucket{route=\"/api/v1/balance\",le=\"+Inf\"} 2"
        ));
    }

    #[tokio::test]
    async fn render_format_is_prometheus_compatible() {
        let output = render_prometheus(&populated().await);

        // Every sample line is `name[{labels}] value`.
        for line in output.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            assert!(line.starts_with("ingredients_balancer_"), "bad prefix: {line}");
            let value = line.rsplit(' ').next().unwrap();
            assert!(value.parse::<f64>().is_ok(), "bad value: {line}");
        }
    }

    #[test]
    fn escape_label_values() {
        assert_eq!(escape("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }
}
