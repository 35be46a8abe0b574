//! Token/cost accounting and budget ceilings for a single run.
//!
//! `Usage` values combine by independent field-wise addition, so merge
//! order never matters. A `Budget` bounds each dimension independently;
//! a missing field leaves that dimension unbounded.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Running token and cost counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Estimated spend in US dollars.
    pub usd: f64,
}

impl Usage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64, usd: f64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            usd,
        }
    }

    /// Prompt plus completion tokens.
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Merge a delta into this total. Pure; neither input is modified.
    pub fn add(&self, delta: &Usage) -> Usage {
        Usage {
            prompt_tokens: self.prompt_tokens + delta.prompt_tokens,
            completion_tokens: self.completion_tokens + delta.completion_tokens,
            usd: self.usd + delta.usd,
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Usage) {
        *self = Usage::add(self, &rhs);
    }
}

/// Optional per-run ceiling on tokens and/or cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cost_usd: Option<f64>,
}

impl Budget {
    pub fn tokens(max_tokens: u64) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            max_cost_usd: None,
        }
    }

    pub fn cost(max_cost_usd: f64) -> Self {
        Self {
            max_tokens: None,
            max_cost_usd: Some(max_cost_usd),
        }
    }

    /// True if either configured dimension is strictly exceeded.
    pub fn is_exceeded_by(&self, total: &Usage) -> bool {
        if let Some(max) = self.max_tokens {
            if total.total_tokens() > max {
                return true;
            }
        }
        if let Some(max) = self.max_cost_usd {
            if total.usd > max {
                return true;
            }
        }
        false
    }
}

/// `false` whenever no budget is configured.
pub fn budget_exceeded(total: &Usage, budget: Option<&Budget>) -> bool {
    budget.is_some_and(|b| b.is_exceeded_by(total))
}
