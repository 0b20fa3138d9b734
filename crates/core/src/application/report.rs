// Run Report - outcome of one producer/consumer run

use crate::application::order_queue::StatsSnapshot;
use crate::application::producer::ProducerSummary;
use crate::application::worker::ConsumerSummary;
use crate::domain::{ItemId, WorkItem};
use crate::error::{AppError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Why a driver loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    /// Fixed iteration count reached
    Completed,
    Cancelled,
    Closed,
    /// Cancelled in the middle of processing an order
    Interrupted,
}

/// Everything a run produced, checkable against the queue guarantees
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub producer: ProducerSummary,
    pub consumers: Vec<ConsumerSummary>,
    pub stats: StatsSnapshot,
    /// Items still queued when the run ended
    pub remaining: Vec<WorkItem>,
}

impl RunReport {
    /// Ids of fulfilled orders in global removal order
    pub fn removal_order(&self) -> Vec<ItemId> {
        let mut fulfilled: Vec<(u64, ItemId)> = self
            .consumers
            .iter()
            .flat_map(|c| c.fulfilled.iter().map(|f| (f.sequence, f.item.id())))
            .collect();
        fulfilled.sort_unstable();
        fulfilled.into_iter().map(|(_, id)| id).collect()
    }

    pub fn fulfilled_count(&self) -> usize {
        self.consumers.iter().map(|c| c.fulfilled.len()).sum()
    }

    /// Check FIFO order and that every submitted item is accounted for once.
    ///
    /// # Errors
    /// - AppError::Validation describing the first violation found
    pub fn verify(&self) -> Result<()> {
        let order = self.removal_order();
        if let Some(pair) = order.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(AppError::Validation(format!(
                "removal order not FIFO: {} taken before {}",
                pair[0], pair[1]
            )));
        }

        let mut seen: HashMap<ItemId, usize> = HashMap::new();
        let interrupted = self.consumers.iter().filter_map(|c| c.interrupted.as_ref());
        let remaining = self.remaining.iter();
        for id in order
            .iter()
            .copied()
            .chain(interrupted.chain(remaining).map(WorkItem::id))
        {
            *seen.entry(id).or_default() += 1;
        }

        if let Some((id, count)) = seen.iter().find(|(_, count)| **count > 1) {
            return Err(AppError::Validation(format!(
                "order {} delivered {} times",
                id, count
            )));
        }
        if let Some(id) = self.producer.submitted.iter().find(|id| !seen.contains_key(id)) {
            return Err(AppError::Validation(format!("order {} lost", id)));
        }
        if seen.len() != self.producer.submitted.len() {
            return Err(AppError::Validation(format!(
                "{} orders delivered but {} submitted",
                seen.len(),
                self.producer.submitted.len()
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable summary, one line per driver
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "{}: submitted {} of {} orders ({:?})\n",
            self.producer.name,
            self.producer.submitted.len(),
            self.producer.generated,
            self.producer.stop
        );
        for consumer in &self.consumers {
            let ids: Vec<String> = consumer
                .fulfilled
                .iter()
                .map(|f| f.item.id().to_string())
                .collect();
            out.push_str(&format!(
                "{}: fulfilled [{}] ({:?})\n",
                consumer.name,
                ids.join(", "),
                consumer.stop
            ));
        }
        out.push_str(&format!(
            "queue: {} taken, {} left, {} producer waits, {} consumer waits\n",
            self.stats.taken,
            self.remaining.len(),
            self.stats.producer_waits,
            self.stats.consumer_waits
        ));
        out
    }
}
