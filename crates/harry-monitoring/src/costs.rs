//! Monthly API cost tracking with budget alerts.

use chrono::Utc;
use harry_config::{AiConfig, BudgetConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Percentages of a budget at which an alert is logged.
pub const ALERT_THRESHOLDS: [u8; 4] = [50, 80, 90, 100];

/// The spending bucket a cost belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    /// AI text generation.
    Ai,
    /// Zyte web scraping.
    Zyte,
    /// Both combined.
    Total,
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ai => "AI",
            Self::Zyte => "Zyte",
            Self::Total => "Total",
        };
        f.write_str(label)
    }
}

/// A value per spending bucket.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// AI value.
    pub ai: f64,
    /// Zyte value.
    pub zyte: f64,
    /// Combined value.
    pub total: f64,
}

impl CostBreakdown {
    /// Value for one bucket.
    pub const fn get(&self, category: CostCategory) -> f64 {
        match category {
            CostCategory::Ai => self.ai,
            CostCategory::Zyte => self.zyte,
            CostCategory::Total => self.total,
        }
    }
}

/// Request and token counters for a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageCounters {
    /// Chat completion requests.
    pub ai_requests: u64,
    /// Prompt plus completion tokens.
    pub ai_tokens: u64,
    /// Scrape requests.
    pub zyte_requests: u64,
}

/// A budget threshold crossed for the first time this month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    /// Bucket that crossed the threshold.
    pub category: CostCategory,
    /// Threshold percentage.
    pub threshold: u8,
    /// Spend at the time of the alert.
    pub spent: f64,
    /// The configured budget.
    pub budget: f64,
}

/// Everything `/admin budget` shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// Month key, `YYYY-MM`.
    pub month: String,
    /// Spend so far.
    pub costs: CostBreakdown,
    /// Configured budgets.
    pub budgets: CostBreakdown,
    /// Spend as a percentage of each budget; 0 where the budget is 0.
    pub percentages: CostBreakdown,
    /// Budget left, never negative.
    pub remaining: CostBreakdown,
    /// Request counters.
    pub usage: UsageCounters,
    /// Zyte hard cap; 0 means no cap.
    pub zyte_spend_limit: f64,
    /// Whether the Zyte cap has been reached.
    pub zyte_over_limit: bool,
}

#[derive(Debug, Default)]
struct MonthlyRecord {
    ai_cost: f64,
    zyte_cost: f64,
    usage: UsageCounters,
    alerted: BTreeSet<(CostCategory, u8)>,
}

impl MonthlyRecord {
    fn costs(&self) -> CostBreakdown {
        CostBreakdown {
            ai: self.ai_cost,
            zyte: self.zyte_cost,
            total: self.ai_cost + self.zyte_cost,
        }
    }
}

type MonthProvider = Arc<dyn Fn() -> String + Send + Sync>;

/// Per-month accumulator for external API spend.
///
/// State lives in memory only and starts from zero on every restart.
pub struct CostTracker {
    budgets: BudgetConfig,
    input_cost_per_1k: f64,
    output_cost_per_1k: f64,
    months: RwLock<HashMap<String, MonthlyRecord>>,
    month: MonthProvider,
}

impl fmt::Debug for CostTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CostTracker")
            .field("budgets", &self.budgets)
            .finish_non_exhaustive()
    }
}

impl CostTracker {
    /// Creates a tracker using the configured budgets and token prices.
    pub fn new(budgets: BudgetConfig, ai: &AiConfig) -> Self {
        Self {
            budgets,
            input_cost_per_1k: ai.input_cost_per_1k,
            output_cost_per_1k: ai.output_cost_per_1k,
            months: RwLock::new(HashMap::new()),
            month: Arc::new(|| Utc::now().format("%Y-%m").to_string()),
        }
    }

    /// Replaces the clock used to pick the current month.
    #[must_use]
    pub fn with_month_provider(mut self, provider: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.month = Arc::new(provider);
        self
    }

    /// The Zyte hard cap; 0 means no cap.
    pub const fn zyte_spend_limit(&self) -> f64 {
        self.budgets.zyte_spend_limit
    }

    fn current_month(&self) -> String {
        (self.month)()
    }

    /// Prices a chat completion and adds it to this month's AI spend.
    pub async fn record_ai_usage(&self, prompt_tokens: u64, completion_tokens: u64) -> Vec<BudgetAlert> {
        let cost = (prompt_tokens as f64 / 1000.0) * self.input_cost_per_1k
            + (completion_tokens as f64 / 1000.0) * self.output_cost_per_1k;
        let month = self.current_month();
        let mut months = self.months.write().await;
        let record = months.entry(month).or_default();
        record.ai_cost += cost;
        record.usage.ai_requests += 1;
        record.usage.ai_tokens += prompt_tokens + completion_tokens;
        info!(
            "AI usage: {} prompt + {} completion tokens (${:.6})",
            prompt_tokens, completion_tokens, cost
        );
        self.check_alerts(record)
    }

    /// Adds one scrape request costing `cost` USD.
    pub async fn record_scrape_request(&self, cost: f64) -> Vec<BudgetAlert> {
        let month = self.current_month();
        let mut months = self.months.write().await;
        let record = months.entry(month).or_default();
        record.zyte_cost += cost.max(0.0);
        record.usage.zyte_requests += 1;
        self.check_alerts(record)
    }

    /// Overwrites this month's AI and/or Zyte spend, e.g. after reconciling
    /// with the provider's dashboard. Returns the resulting totals.
    pub async fn set_monthly_costs(&self, ai_cost: Option<f64>, zyte_cost: Option<f64>) -> CostBreakdown {
        let month = self.current_month();
        let mut months = self.months.write().await;
        let record = months.entry(month).or_default();
        if let Some(ai) = ai_cost {
            record.ai_cost = ai.max(0.0);
        }
        if let Some(zyte) = zyte_cost {
            record.zyte_cost = zyte.max(0.0);
        }
        let costs = record.costs();
        self.check_alerts(record);
        costs
    }

    /// This month's spend.
    pub async fn monthly_costs(&self) -> CostBreakdown {
        let month = self.current_month();
        self.months
            .read()
            .await
            .get(&month)
            .map(MonthlyRecord::costs)
            .unwrap_or_default()
    }

    /// Whether Zyte spend reached the hard cap. Always false without a cap.
    pub async fn is_zyte_over_limit(&self) -> bool {
        let limit = self.budgets.zyte_spend_limit;
        if limit <= 0.0 {
            return false;
        }
        self.monthly_costs().await.zyte >= limit
    }

    /// Full budget view for this month.
    pub async fn budget_status(&self) -> BudgetStatus {
        let month = self.current_month();
        let (costs, usage) = {
            let months = self.months.read().await;
            months
                .get(&month)
                .map(|r| (r.costs(), r.usage))
                .unwrap_or_default()
        };
        let budgets = CostBreakdown {
            ai: self.budgets.ai_monthly,
            zyte: self.budgets.zyte_monthly,
            total: self.budgets.total_monthly,
        };
        let percent = |spent: f64, budget: f64| if budget > 0.0 { spent / budget * 100.0 } else { 0.0 };
        let remaining = |spent: f64, budget: f64| (budget - spent).max(0.0);
        let zyte_over_limit =
            self.budgets.zyte_spend_limit > 0.0 && costs.zyte >= self.budgets.zyte_spend_limit;

        BudgetStatus {
            month,
            costs,
            budgets,
            percentages: CostBreakdown {
                ai: percent(costs.ai, budgets.ai),
                zyte: percent(costs.zyte, budgets.zyte),
                total: percent(costs.total, budgets.total),
            },
            remaining: CostBreakdown {
                ai: remaining(costs.ai, budgets.ai),
                zyte: remaining(costs.zyte, budgets.zyte),
                total: remaining(costs.total, budgets.total),
            },
            usage,
            zyte_spend_limit: self.budgets.zyte_spend_limit,
            zyte_over_limit,
        }
    }

    fn check_alerts(&self, record: &mut MonthlyRecord) -> Vec<BudgetAlert> {
        let costs = record.costs();
        let budgets = [
            (CostCategory::Ai, self.budgets.ai_monthly),
            (CostCategory::Zyte, self.budgets.zyte_monthly),
            (CostCategory::Total, self.budgets.total_monthly),
        ];

        let mut alerts = Vec::new();
        for (category, budget) in budgets {
            if budget <= 0.0 {
                continue;
            }
            let spent = costs.get(category);
            let percent = spent / budget * 100.0;
            for threshold in ALERT_THRESHOLDS {
                if percent >= f64::from(threshold) && record.alerted.insert((category, threshold)) {
                    warn!(
                        "{} spend reached {}% of the monthly budget (${:.2} of ${:.2})",
                        category, threshold, spent, budget
                    );
                    alerts.push(BudgetAlert {
                        category,
                        threshold,
                        spent,
                        budget,
                    });
                }
            }
        }
        alerts
    }
}

/// Renders a ten-segment bar such as `[██████░░░░]`.
pub fn progress_bar(percent: f64) -> String {
    let filled = (percent.clamp(0.0, 100.0) / 10.0).round() as usize;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(10 - filled))
}

/// Traffic-light emoji for a budget percentage.
pub fn budget_indicator(percent: f64) -> &'static str {
    if percent < 50.0 {
        "🟢"
    } else if percent < 80.0 {
        "🟡"
    } else {
        "🔴"
    }
}
