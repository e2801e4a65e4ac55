//! Integration tests for harry-monitoring crate.

use harry_config::{AiConfig, BudgetConfig};
use harry_monitoring::{CostTracker, PerformanceMetrics};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_concurrent_cost_recording() {
    let ai = AiConfig {
        input_cost_per_1k: 1.0,
        output_cost_per_1k: 0.0,
        ..AiConfig::default()
    };
    let tracker = Arc::new(
        CostTracker::new(BudgetConfig::default(), &ai).with_month_provider(|| "2026-05".into()),
    );

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                tracker.record_ai_usage(1000, 0).await;
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let status = tracker.budget_status().await;
    assert_eq!(status.usage.ai_requests, 10);
    assert!((status.costs.ai - 10.0).abs() < 1e-9);
    assert!((status.percentages.ai - 100.0).abs() < 1e-9);
}

#[test]
fn test_metrics_shared_across_threads() {
    let metrics = Arc::new(PerformanceMetrics::new(Duration::from_secs(5)));
    let threads: Vec<_> = (0..4)
        .map(|_| {
            let metrics = metrics.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    metrics.record_command("fun target", Duration::from_millis(10));
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    let stats = metrics.command_stats("fun target").unwrap();
    assert_eq!(stats.count, 100);
    assert_eq!(metrics.all_stats().total_commands, 100);
}
