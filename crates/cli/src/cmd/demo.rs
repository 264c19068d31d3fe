//! Debounced label demo
//!
//! Every stdin line is a new value for a label. With debouncing on, rapid
//! bursts of values collapse into a single label update.

use crate::system_config;
use anyhow::{Context, Result};
use pacer::{BindingRegistry, Debounced, HasOwner, Invocation, Owner};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Extra wait after EOF so a pending update lands before exit
const SETTLE_MARGIN: Duration = Duration::from_millis(50);

pub struct DemoOptions {
    pub config: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub fire_on_first: bool,
    pub ignore_delayed: bool,
    pub no_debounce: bool,
}

/// Label printing the last applied value to stdout
struct ValueLabel {
    owner: Owner,
}

impl ValueLabel {
    fn new(owner: Owner) -> Self {
        Self { owner }
    }

    fn update(&self, value: &str) -> Result<()> {
        let text = format!("Last updated value is {}.", value);

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", text).context("Failed to write label update")?;
        stdout.flush().context("Failed to flush label update")?;
        Ok(())
    }
}

impl HasOwner for ValueLabel {
    fn owner(&self) -> &Owner {
        &self.owner
    }
}

pub async fn run(opts: DemoOptions) -> Result<()> {
    let file = system_config::load(opts.config.as_deref())?;
    let settings = file
        .debounce
        .with_overrides(opts.interval_ms, opts.fire_on_first, opts.ignore_delayed);
    let config = settings.to_config()?;

    let registry = BindingRegistry::new()?;
    let label = Arc::new(ValueLabel::new(registry.owner()));
    let update = Debounced::new(config, |label: &ValueLabel, value: String| {
        label.update(&value)
    });

    if opts.no_debounce {
        info!("debouncing disabled, updating on every value");
    } else {
        info!(%config, "debouncing label updates");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                None
            }
        };

        let Some(line) = line else {
            break;
        };
        let value = line.trim();
        if value.is_empty() {
            continue;
        }

        if opts.no_debounce {
            label.update(value)?;
            continue;
        }

        match update.call(&label, value.to_string())? {
            Invocation::Fired(result) => result?,
            Invocation::Deferred { superseded } => debug!(value, superseded, "update deferred"),
            Invocation::Dropped => debug!(value, "update dropped"),
        }
    }

    if !opts.no_debounce {
        tokio::time::sleep(config.interval() + SETTLE_MARGIN).await;
    }

    Ok(())
}
