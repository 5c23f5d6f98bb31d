use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use citeflow_application::{ReferencePipeline, SearchSessionManager};
use citeflow_core::config::CiteflowConfig;
use citeflow_core::disapproval::DisapprovalReason;
use citeflow_core::search::{Priority, SearchPreferences, SelectionContext};
use citeflow_core::session::{SearchSession, SessionStatus};
use citeflow_infrastructure::{ConfigStorage, SecretStorage};
use citeflow_interaction::build_reference_backends;
use clap::{Args, ValueEnum};

#[derive(Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    Newest,
    MostCited,
    HighImpact,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Newest => Priority::Newest,
            PriorityArg::MostCited => Priority::MostCited,
            PriorityArg::HighImpact => Priority::HighImpact,
        }
    }
}

#[derive(Args)]
pub struct SearchArgs {
    /// Document containing the passage
    #[arg(long)]
    document: PathBuf,

    /// Exact passage to find citations for
    #[arg(long)]
    highlight: String,

    /// Number of references to show (1-5)
    #[arg(long)]
    num: Option<usize>,

    #[arg(long, value_enum)]
    priority: Option<PriorityArg>,

    /// Restrict to a publisher (repeatable)
    #[arg(long = "publisher")]
    publishers: Vec<String>,

    /// Restrict to a document type (repeatable)
    #[arg(long = "source-type")]
    source_types: Vec<String>,

    #[arg(long)]
    year_start: Option<String>,

    /// Provider model override
    #[arg(long)]
    model: Option<String>,

    /// Reject a shown reference, e.g. `2:not-new` (1-based, repeatable)
    #[arg(long = "reject", value_parser = parse_rejection)]
    rejections: Vec<(usize, DisapprovalReason)>,

    /// Ask for more results after the search completes
    #[arg(long)]
    more: bool,

    /// Print the session and citations as JSON
    #[arg(long)]
    json: bool,
}

fn parse_rejection(value: &str) -> Result<(usize, DisapprovalReason), String> {
    let (index, reason) = value
        .split_once(':')
        .ok_or_else(|| format!("expected INDEX:REASON, got '{value}'"))?;
    let index: usize = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid index '{index}'"))?;
    if index == 0 {
        return Err("indices start at 1".to_string());
    }
    Ok((index - 1, reason.parse()?))
}

impl SearchArgs {
    fn preferences(&self, config: &CiteflowConfig) -> SearchPreferences {
        let mut prefs = config.search.default_preferences();
        if let Some(num) = self.num {
            prefs.num_references = num;
        }
        if let Some(priority) = self.priority {
            prefs.priority = priority.into();
        }
        prefs.publisher_filter.extend(self.publishers.iter().cloned());
        prefs.source_types.extend(self.source_types.iter().cloned());
        if let Some(year) = &self.year_start {
            prefs.year_start = year.clone();
        }
        if let Some(model) = &self.model {
            prefs.model = model.clone();
        }
        prefs
    }
}

fn build_manager(config: &CiteflowConfig) -> SearchSessionManager {
    let secrets = match SecretStorage::new() {
        Ok(storage) => storage.load_or_default(),
        Err(err) => {
            tracing::warn!("Secret storage unavailable: {err}");
            Default::default()
        }
    };
    let (provider, verifier) = build_reference_backends(config, &secrets);

    let mut pipeline = ReferencePipeline::new(Arc::new(provider)).with_settings(&config.search);
    if let Some(verifier) = verifier {
        pipeline = pipeline.with_verifier(Arc::new(verifier));
    }
    SearchSessionManager::new(pipeline)
}

pub async fn run(args: SearchArgs) -> Result<()> {
    let document = std::fs::read_to_string(&args.document)
        .with_context(|| format!("Failed to read {}", args.document.display()))?;
    let context = SelectionContext::find(&document, &args.highlight)?;
    let config = ConfigStorage::new()?.load()?;
    let prefs = args.preferences(&config);

    let manager = build_manager(&config);
    let handle = manager.create_session(context, prefs).await;
    handle.completion.await?;
    let session_id = handle.session_id;

    for (index, reason) in &args.rejections {
        match manager.disapprove(&session_id, *index, *reason).await {
            Some(outcome) => {
                if let Some(refill) = outcome.refill {
                    refill.await?;
                }
            }
            None => tracing::warn!(index = index + 1, "No reference at that position; rejection ignored"),
        }
    }

    if args.more {
        if let Some(more) = manager.request_more(&session_id).await {
            more.await?;
        }
    }

    let session = manager
        .get(&session_id)
        .await
        .ok_or_else(|| anyhow!("session {session_id} disappeared"))?;
    let export = manager.export_citations(std::slice::from_ref(&session_id)).await;

    if args.json {
        let output = serde_json::json!({
            "session": session,
            "citations": export,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_session(&session);
        if let Some(marker) = export.marker_for(&session_id) {
            println!("\nMarker: {marker}");
            println!("{}", export.render_bibliography());
        }
    }

    if session.status == SessionStatus::Error {
        bail!(
            "search failed: {}",
            session.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn print_session(session: &SearchSession) {
    match session.status {
        SessionStatus::Error => return,
        _ if session.has_no_results() => {
            println!("No references found.");
            return;
        }
        _ => {}
    }

    println!(
        "References for \"{}\" ({}):",
        session.context.highlighted_text,
        session.query_prefs.priority.label()
    );
    for (idx, reference) in session.visible.iter().enumerate() {
        println!(
            "{}. {} ({}) {}",
            idx + 1,
            reference.title,
            reference.year,
            reference.publication
        );
        if !reference.relevance.is_empty() {
            println!("   {}", reference.relevance);
        }
    }
    if !session.pool.is_empty() {
        println!("({} more in reserve)", session.pool.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejection() {
        assert_eq!(parse_rejection("2:not-new"), Ok((1, DisapprovalReason::NotNew)));
        assert!(parse_rejection("0:not-new").is_err());
        assert!(parse_rejection("abc").is_err());
        assert!(parse_rejection("1:bogus").is_err());
    }

    #[test]
    fn test_cli_flags_override_config() {
        let args = SearchArgs {
            document: PathBuf::from("doc.txt"),
            highlight: "claim".to_string(),
            num: Some(4),
            priority: Some(PriorityArg::MostCited),
            publishers: vec!["Nature".to_string()],
            source_types: Vec::new(),
            year_start: Some("2018".to_string()),
            model: None,
            rejections: Vec::new(),
            more: false,
            json: false,
        };

        let prefs = args.preferences(&CiteflowConfig::default());

        assert_eq!(prefs.num_references, 4);
        assert_eq!(prefs.priority, Priority::MostCited);
        assert!(prefs.publisher_filter.contains("Nature"));
        assert_eq!(prefs.year_start, "2018");
    }
}
