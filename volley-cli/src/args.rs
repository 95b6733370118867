use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// Overrides on top of the defaults and `VOLLEY_*` environment values.
#[derive(Debug, Args, Clone, Default)]
pub struct BatchArgs {
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Milliseconds between chunks.
    #[arg(long, value_name = "MS")]
    pub inter_chunk_delay_ms: Option<String>,
    /// Base unit of the 2.5x / 7.5x / 15x retry backoff, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub retry_base_ms: Option<String>,
    /// Per-request timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<String>,
    #[arg(long)]
    pub correlation_id: Option<String>,
    /// Retry these statuses instead of the default 403-only policy.
    #[arg(long = "retry-status", value_name = "CODE")]
    pub retry_statuses: Vec<u16>,
}
