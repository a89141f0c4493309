// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: mean teacher-forced loss over training batches
//   - val_loss:   mean greedy-decoding loss over held-out batches
//   - accuracy:   token accuracy of greedy predictions
//
// Output file: checkpoints/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,val_loss,accuracy
//   1,2.412300,2.901100,0.314000
//   2,1.503200,2.250400,0.447000
//   ...
//
// val_loss is measured without teacher forcing, so it sits well
// above train_loss even when the model is not overfitting.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "epoch,train_loss,val_loss,accuracy";

/// One row of metrics for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:      usize,
    pub train_loss: f64,
    pub val_loss:   f64,
    /// Range: [0.0, 1.0]
    pub accuracy:   f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, accuracy: f64) -> Self {
        Self { epoch, train_loss, val_loss, accuracy }
    }

    /// CSV row matching `HEADER`
    fn to_row(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6}",
            self.epoch, self.train_loss, self.val_loss, self.accuracy
        )
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Start a fresh metrics file for a new run.
    /// Any previous metrics.csv in `dir` is replaced.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(f, "{}", m.to_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}, accuracy={:.4}",
            m.epoch, m.train_loss, m.val_loss, m.accuracy,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
