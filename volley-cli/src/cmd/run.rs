use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;
use volley_core::BatchResult;
use volley_exec::executor::{
    http_work_item, EventSink, HttpClient, HttpResponseParts, NoOpEventSink, ReqwestHttpClient,
    RequestLimits, StderrEventSink, StdoutEventSink,
};
use volley_exec::{BatchRunner, CancellationToken, StatusRetryPolicy};

use crate::exit_codes;
use crate::manifest::load_manifest;
use crate::output::{print_error, print_result, EventsTarget, OutputFormat};
use crate::{BatchArgs, OutputArgs};

use super::config::build_batch_config;

/// What is kept of a successful response in the printed result.
#[derive(Serialize)]
struct ResponseSummary {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    bytes: usize,
}

impl From<HttpResponseParts> for ResponseSummary {
    fn from(resp: HttpResponseParts) -> Self {
        Self {
            status: resp.status,
            content_type: resp.headers.get("content-type").cloned(),
            bytes: resp.body.len(),
        }
    }
}

#[derive(Serialize)]
struct RunOutput {
    correlation_id: String,
    #[serde(flatten)]
    result: BatchResult<ResponseSummary>,
}

pub async fn run_cmd(
    path: &Path,
    events: EventsTarget,
    batch: BatchArgs,
    output: OutputArgs,
) -> i32 {
    let requests = match load_manifest(path) {
        Ok(r) => r,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::VALIDATION_FAILED;
        }
    };

    let mut config = match build_batch_config(&batch) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::VALIDATION_FAILED;
        }
    };
    let correlation_id = config
        .correlation_id
        .get_or_insert_with(|| Uuid::new_v4().to_string())
        .clone();

    let event_sink: Arc<dyn EventSink> = match events {
        EventsTarget::None => Arc::new(NoOpEventSink),
        EventsTarget::Stderr => Arc::new(StderrEventSink),
        EventsTarget::Stdout => Arc::new(StdoutEventSink),
    };

    let client: Arc<dyn HttpClient> = match ReqwestHttpClient::new() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to build http client: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let mut limits = RequestLimits::default();
    if let Some(timeout) = config.operation_timeout {
        limits = limits.with_timeout(timeout);
    }
    let items: Vec<_> = requests
        .into_iter()
        .map(|(id, req)| http_work_item(id, client.clone(), req, limits))
        .collect();

    let token = CancellationToken::new();
    let ctrl_c = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; finishing in-flight requests");
                token.cancel();
            }
        })
    };

    let mut runner = BatchRunner::new(config)
        .with_cancellation(token)
        .with_event_sink(event_sink);
    if !batch.retry_statuses.is_empty() {
        runner = runner.with_policy(StatusRetryPolicy::new(batch.retry_statuses.iter().copied()));
    }

    let result = runner.run(&items).await;
    ctrl_c.abort();

    let result = match result {
        Ok(r) => r.map_values(ResponseSummary::from),
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::VALIDATION_FAILED;
        }
    };

    let code = if result.is_complete_success() {
        exit_codes::SUCCESS
    } else {
        exit_codes::RUN_FAILED
    };

    if output.format == OutputFormat::Text && !output.quiet {
        print_text_summary(&correlation_id, &result);
    } else {
        let out = RunOutput {
            correlation_id,
            result,
        };
        print_result(output.format, output.quiet, &out);
    }
    code
}

fn print_text_summary(correlation_id: &str, result: &BatchResult<ResponseSummary>) {
    println!(
        "run {correlation_id}: {} succeeded, {} failed, {} retry round(s){}",
        result.successful.len(),
        result.failed.len(),
        result.rounds,
        if result.cancelled { " (cancelled)" } else { "" }
    );
    for f in &result.failed {
        let status = f.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        println!("  FAILED {} status={status} attempt={} {}", f.id, f.attempt, f.reason);
    }
}
